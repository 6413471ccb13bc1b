// ==========================================
// 供应商目录系统 - 商品导入 API
// ==========================================
// 职责: 封装各类导入入口，统一返回 (成功条数, 错误列表) + 耗时
// 说明: 配置错误（映射 JSON / 端口 / 请求头）在导入开始前以 ApiError 返回
// ==========================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{load_field_mapping, ApiImportConfig, SftpImportConfig};
use crate::domain::{FieldMapping, ImportOutcome};
use crate::importer::{spawn_import, CatalogImporter, ImportJob, ImportTaskHandle};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 成功导入（新增或更新）的商品数量
    pub imported: usize,
    /// 错误列表（读取失败 / 记录级错误）
    pub errors: Vec<String>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

impl ImportApiResponse {
    fn from_outcome(outcome: ImportOutcome, started: Instant) -> Self {
        Self {
            imported: outcome.imported,
            errors: outcome.errors,
            elapsed_ms: started.elapsed().as_millis() as i64,
        }
    }
}

/// 导入API
pub struct ImportApi {
    importer: Arc<CatalogImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<CatalogImporter>) -> Self {
        Self { importer }
    }

    pub fn importer(&self) -> Arc<CatalogImporter> {
        Arc::clone(&self.importer)
    }

    /// 读取映射文件（None → 默认映射）
    pub fn load_mapping(&self, mapping_path: Option<&Path>) -> ApiResult<Option<FieldMapping>> {
        match mapping_path {
            Some(path) => Ok(Some(load_field_mapping(path)?)),
            None => Ok(None),
        }
    }

    /// 从本地文件导入
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv/.xlsx/.xls/.xlsm/.ods/.json/.xml）
    /// - vendor_id: 目标供应商
    /// - mapping: 可选字段映射
    /// - bulk: 是否使用分块批量装载
    pub async fn import_file(
        &self,
        file_path: &str,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
        bulk: bool,
    ) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        let started = Instant::now();
        let outcome = if bulk {
            self.importer.import_file_bulk(file_path, vendor_id, mapping).await
        } else {
            self.importer.import_file(file_path, vendor_id, mapping).await
        };
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    pub async fn import_from_api(
        &self,
        config: &ApiImportConfig,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        if config.url.trim().is_empty() {
            return Err(ApiError::InvalidInput("API 地址不能为空".to_string()));
        }
        let started = Instant::now();
        let outcome = self.importer.import_from_api(config, vendor_id, mapping).await;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    pub async fn import_from_sftp(
        &self,
        config: &SftpImportConfig,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        if config.host.trim().is_empty() {
            return Err(ApiError::InvalidInput("SFTP 主机不能为空".to_string()));
        }
        let started = Instant::now();
        let outcome = self.importer.import_from_sftp(config, vendor_id, mapping).await;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    pub async fn import_from_multiple_sftp(
        &self,
        configs: &[SftpImportConfig],
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        if configs.is_empty() {
            return Err(ApiError::InvalidInput("至少需要一个 SFTP 目录配置".to_string()));
        }
        let started = Instant::now();
        let outcome = self
            .importer
            .import_from_multiple_sftp(configs, vendor_id, mapping, None)
            .await;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    pub async fn import_edi_text(
        &self,
        text: &str,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();
        let outcome = self.importer.import_edi_text(text, vendor_id, mapping).await;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    pub async fn import_edi_file(
        &self,
        file_path: &str,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();
        let outcome = self.importer.import_edi_file(file_path, vendor_id, mapping).await;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    /// 按已保存连接导入
    pub async fn import_from_connection(
        &self,
        connection_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ApiResult<ImportApiResponse> {
        let started = Instant::now();
        let outcome = self
            .importer
            .import_from_connection(connection_id, mapping)
            .await?;
        Ok(ImportApiResponse::from_outcome(outcome, started))
    }

    /// 后台执行导入
    ///
    /// # 返回
    /// - ImportTaskHandle: 任务 ID + 进度通道 + 结果句柄
    pub fn start_background(
        &self,
        job: ImportJob,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportTaskHandle {
        spawn_import(self.importer(), job, vendor_id, mapping)
    }
}
