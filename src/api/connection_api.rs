// ==========================================
// 供应商目录系统 - 供应商连接 API
// ==========================================
// 职责: 连接配置的保存与维护（不会自动执行）
// 规则: 更新时新配置按键合并到已保存配置之上
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{import_source_from_connection, SavedImportSource};
use crate::domain::{ConnectionConfig, ConnectionType, RecordStatus, VendorConnection};
use crate::repository::CatalogStore;

pub struct ConnectionApi {
    store: Arc<dyn CatalogStore>,
}

impl ConnectionApi {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// 保存新连接
    ///
    /// # 参数
    /// - vendor_id: 所属供应商（须存在）
    /// - name: 连接名称
    /// - conn_type: 连接类型
    /// - config: 连接参数
    pub async fn create_connection(
        &self,
        vendor_id: i64,
        name: &str,
        conn_type: ConnectionType,
        config: ConnectionConfig,
    ) -> ApiResult<i64> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("连接名称不能为空".to_string()));
        }
        if self.store.vendors().find_by_id(vendor_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("供应商(id={})不存在", vendor_id)));
        }

        let mut connection = VendorConnection::new(vendor_id, name.trim(), conn_type);
        connection.config = config;
        let id = self.store.connections().save(&connection).await?;
        tracing::info!(connection_id = id, vendor_id, conn_type = %conn_type, "连接已保存");
        Ok(id)
    }

    /// 更新连接
    ///
    /// # 参数
    /// - name / conn_type / status: None 表示保持不变
    /// - config_patch: 按键合并到已保存配置
    pub async fn update_connection(
        &self,
        id: i64,
        name: Option<&str>,
        conn_type: Option<ConnectionType>,
        config_patch: Option<ConnectionConfig>,
        status: Option<RecordStatus>,
    ) -> ApiResult<VendorConnection> {
        let mut connection = self.get_connection(id).await?;

        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(ApiError::InvalidInput("连接名称不能为空".to_string()));
            }
            connection.name = name.trim().to_string();
        }
        if let Some(conn_type) = conn_type {
            connection.conn_type = conn_type;
        }
        if let Some(patch) = config_patch {
            connection.merge_config(patch);
        }
        if let Some(status) = status {
            connection.status = status;
        }

        self.store.connections().update(&connection).await?;
        Ok(connection)
    }

    pub async fn delete_connection(&self, id: i64) -> ApiResult<()> {
        if !self.store.connections().delete(id).await? {
            return Err(ApiError::NotFound(format!("连接(id={})不存在", id)));
        }
        Ok(())
    }

    pub async fn get_connection(&self, id: i64) -> ApiResult<VendorConnection> {
        self.store
            .connections()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("连接(id={})不存在", id)))
    }

    /// 列出连接（指定供应商时只列该供应商的）
    pub async fn list_connections(&self, vendor_id: Option<i64>) -> ApiResult<Vec<VendorConnection>> {
        let repo = self.store.connections();
        Ok(match vendor_id {
            Some(vendor_id) => repo.find_by_vendor(vendor_id).await?,
            None => repo.find_all().await?,
        })
    }

    /// 预览已保存连接对应的导入配置（不执行导入）
    pub async fn preview_import_source(&self, id: i64) -> ApiResult<SavedImportSource> {
        let connection = self.get_connection(id).await?;
        Ok(import_source_from_connection(&connection)?)
    }
}
