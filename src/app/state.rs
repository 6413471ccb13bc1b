// ==========================================
// 供应商目录系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 初始化顺序: 目录 → 配置 → 存储（工厂 + 建表）→ 导入器 → API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiResult, ConfigApi, ConnectionApi, ImportApi, ProductApi, VendorApi};
use crate::config::{AppConfig, AppPaths, ConfigManager};
use crate::importer::CatalogImporter;
use crate::repository::{open_catalog_store, CatalogStore};

/// 应用状态
///
/// 包含所有API实例和共享资源；配置作为显式值向下传递
pub struct AppState {
    /// 应用文件位置
    pub paths: AppPaths,

    /// 启动时加载的类型化配置
    pub config: AppConfig,

    /// 目录存储
    pub store: Arc<dyn CatalogStore>,

    pub vendor_api: Arc<VendorApi>,
    pub product_api: Arc<ProductApi>,
    pub connection_api: Arc<ConnectionApi>,
    pub import_api: Arc<ImportApi>,
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - paths: 应用文件位置
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 创建应用目录
    /// 2. 加载配置（缺失时写出默认配置）
    /// 3. 按配置打开存储并建表
    /// 4. 创建所有API实例
    pub async fn new(paths: AppPaths) -> ApiResult<Self> {
        paths.ensure_dirs()?;
        let manager = ConfigManager::load(&paths.config)?;
        Self::open(paths, manager).await
    }

    /// 使用已加载的配置打开存储并组装状态
    ///
    /// # 参数
    /// - paths: 应用文件位置（目录需已创建）
    /// - manager: 启动时加载的配置管理器
    pub async fn open(paths: AppPaths, manager: ConfigManager) -> ApiResult<Self> {
        let config = manager.app_config()?;

        tracing::info!(
            root = %paths.root.display(),
            backend = %config.database.db_type,
            "初始化AppState"
        );

        let store = open_catalog_store(&config.database, &paths.database).await?;
        Ok(Self::assemble(paths, config, manager, store))
    }

    /// 使用已打开的存储组装状态（测试 / 嵌入场景）
    pub fn with_store(
        paths: AppPaths,
        manager: ConfigManager,
        store: Arc<dyn CatalogStore>,
    ) -> ApiResult<Self> {
        let config = manager.app_config()?;
        Ok(Self::assemble(paths, config, manager, store))
    }

    fn assemble(
        paths: AppPaths,
        config: AppConfig,
        manager: ConfigManager,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        let importer = Arc::new(CatalogImporter::new(Arc::clone(&store)));

        Self {
            vendor_api: Arc::new(VendorApi::new(Arc::clone(&store))),
            product_api: Arc::new(ProductApi::new(Arc::clone(&store))),
            connection_api: Arc::new(ConnectionApi::new(Arc::clone(&store))),
            import_api: Arc::new(ImportApi::new(importer)),
            config_api: Arc::new(ConfigApi::new(Arc::new(Mutex::new(manager)))),
            paths,
            config,
            store,
        }
    }
}
