// ==========================================
// 供应商目录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、导入记录
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod connection;
pub mod import;
pub mod product;
pub mod types;
pub mod vendor;

// 重导出核心类型
pub use connection::{ConnectionConfig, VendorConnection};
pub use import::{
    CanonicalRecord, FieldMapping, ImportOutcome, ImportProgress, ImportReport, RawRecord,
};
pub use product::{Category, MasterProduct, PropertyBag, VendorProduct, VendorProductDraft};
pub use types::{ConnectionType, DatabaseBackend, RecordStatus};
pub use vendor::Vendor;
