// ==========================================
// 供应商目录系统 - 目录存储 Repository Trait
// ==========================================
// 职责: 定义各实体的数据访问接口（不包含业务逻辑）
// 实现者: SqliteCatalogStore（rusqlite） / PostgresCatalogStore（sqlx）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::{
    Category, DatabaseBackend, MasterProduct, Vendor, VendorConnection, VendorProduct,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// VendorRepository
// ==========================================
#[async_trait]
pub trait VendorRepository: Send + Sync {
    /// 建表（幂等）
    async fn create_table(&self) -> RepositoryResult<()>;

    /// 新增供应商
    ///
    /// # 返回
    /// - Ok(i64): 新行主键
    async fn save(&self, vendor: &Vendor) -> RepositoryResult<i64>;

    /// 按主键更新（id 为空时返回 NotFound）
    async fn update(&self, vendor: &Vendor) -> RepositoryResult<()>;

    /// 按主键删除
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Vendor>>;

    /// 名称子串查询
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Vendor>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Vendor>>;
}

// ==========================================
// CategoryRepository
// ==========================================
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_table(&self) -> RepositoryResult<()>;
    async fn save(&self, category: &Category) -> RepositoryResult<i64>;
    async fn update(&self, category: &Category) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<Category>>;

    /// 直接下级分类
    async fn find_children(&self, parent_id: i64) -> RepositoryResult<Vec<Category>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Category>>;
}

// ==========================================
// MasterProductRepository
// ==========================================
#[async_trait]
pub trait MasterProductRepository: Send + Sync {
    async fn create_table(&self) -> RepositoryResult<()>;
    async fn save(&self, product: &MasterProduct) -> RepositoryResult<i64>;
    async fn update(&self, product: &MasterProduct) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MasterProduct>>;

    // ===== 自然键查询 =====
    async fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<MasterProduct>>;
    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<MasterProduct>>;
    async fn find_by_mpn(
        &self,
        manufacturer: &str,
        mpn: &str,
    ) -> RepositoryResult<Option<MasterProduct>>;

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<MasterProduct>>;
    async fn find_all(&self) -> RepositoryResult<Vec<MasterProduct>>;
}

// ==========================================
// VendorProductRepository
// ==========================================
// 自然键: (vendor_id, vendor_sku)
#[async_trait]
pub trait VendorProductRepository: Send + Sync {
    async fn create_table(&self) -> RepositoryResult<()>;
    async fn save(&self, product: &VendorProduct) -> RepositoryResult<i64>;
    async fn update(&self, product: &VendorProduct) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorProduct>>;

    /// 按自然键查询
    async fn find_by_vendor_sku(
        &self,
        vendor_id: i64,
        vendor_sku: &str,
    ) -> RepositoryResult<Option<VendorProduct>>;

    /// 按自然键批量查询（批量装载用，一次查询）
    async fn find_by_vendor_skus(
        &self,
        vendor_id: i64,
        vendor_skus: &[String],
    ) -> RepositoryResult<Vec<VendorProduct>>;

    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorProduct>>;
    async fn find_by_master_product(
        &self,
        master_product_id: i64,
    ) -> RepositoryResult<Vec<VendorProduct>>;
    async fn find_all(&self) -> RepositoryResult<Vec<VendorProduct>>;
    async fn count_by_vendor(&self, vendor_id: i64) -> RepositoryResult<i64>;

    /// 多行 upsert（单事务，ON CONFLICT (vendor_id, vendor_sku) DO UPDATE）
    ///
    /// # 参数
    /// - products: 已合并好的完整行
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    /// - Err: 数据库错误（整个事务回滚）
    async fn upsert_many(&self, products: &[VendorProduct]) -> RepositoryResult<usize>;
}

// ==========================================
// ConnectionRepository
// ==========================================
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn create_table(&self) -> RepositoryResult<()>;
    async fn save(&self, connection: &VendorConnection) -> RepositoryResult<i64>;
    async fn update(&self, connection: &VendorConnection) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<VendorConnection>>;
    async fn find_by_vendor(&self, vendor_id: i64) -> RepositoryResult<Vec<VendorConnection>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<VendorConnection>>;
    async fn find_all(&self) -> RepositoryResult<Vec<VendorConnection>>;
}

// ==========================================
// CatalogStore - 统一存储入口
// ==========================================
#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn backend(&self) -> DatabaseBackend;

    fn vendors(&self) -> &dyn VendorRepository;
    fn categories(&self) -> &dyn CategoryRepository;
    fn master_products(&self) -> &dyn MasterProductRepository;
    fn vendor_products(&self) -> &dyn VendorProductRepository;
    fn connections(&self) -> &dyn ConnectionRepository;

    /// 按依赖顺序建表（幂等）
    async fn init_schema(&self) -> RepositoryResult<()> {
        self.vendors().create_table().await?;
        self.categories().create_table().await?;
        self.master_products().create_table().await?;
        self.vendor_products().create_table().await?;
        self.connections().create_table().await?;
        Ok(())
    }
}
