// ==========================================
// 供应商目录系统 - 导入层
// ==========================================
// 职责: 外部商品数据 → 目录
// 支持: CSV / Excel / JSON / XML 文件, HTTP API, SFTP, EDI
// 流程: 读取源 → 字段映射 → 逐条 upsert（或批量装载）
// ==========================================

// 模块声明
pub mod api_reader;
pub mod bulk_loader;
pub mod catalog_importer;
pub mod edi_parser;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod import_task;
pub mod record_converter;
pub mod sftp_reader;
pub mod source_trait;
pub mod upsert;

// 重导出核心类型
pub use api_reader::ApiReader;
pub use bulk_loader::{BulkLoader, DEFAULT_CHUNK_SIZE};
pub use catalog_importer::{CatalogImporter, ProgressSender};
pub use edi_parser::EdiParser;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, JsonParser, UniversalFileParser, XmlParser};
pub use import_task::{spawn_import, ImportJob, ImportTaskHandle};
pub use sftp_reader::{pattern_matches, FetchedFile, RemoteConnector, RemoteSession, SftpReader};
pub use upsert::UpsertCoordinator;

// 重导出 Trait 接口
pub use source_trait::{FileParser, TextParser};
