// ==========================================
// 供应商目录系统 - 目录导入器（统一入口）
// ==========================================
// 流程: 读取源 → 字段映射 → 逐条 upsert / 批量装载 → (成功条数, 错误列表)
// 边界:
// - 读取器失败在此处转换为 (0, [错误文本])，调用方只看到 ImportOutcome
// - 多目录 SFTP: 单个目录失败贡献一条错误，循环继续
// ==========================================

use crate::config::{
    import_source_from_connection, ApiImportConfig, SavedImportSource, SftpImportConfig,
};
use crate::domain::{FieldMapping, ImportOutcome, ImportProgress, RawRecord};
use crate::importer::api_reader::ApiReader;
use crate::importer::bulk_loader::{BulkLoader, DEFAULT_CHUNK_SIZE};
use crate::importer::edi_parser::EdiParser;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::sftp_reader::SftpReader;
use crate::importer::source_trait::{FileParser, TextParser};
use crate::importer::upsert::UpsertCoordinator;
use crate::repository::{CatalogStore, RepositoryError};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, instrument};

/// 进度事件发送端
pub type ProgressSender = UnboundedSender<ImportProgress>;

pub struct CatalogImporter {
    store: Arc<dyn CatalogStore>,
    api_reader: ApiReader,
    sftp_reader: Option<SftpReader>,
    chunk_size: usize,
}

impl CatalogImporter {
    /// 创建导入器（启用 sftp feature 时默认使用 ssh2 读取器）
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        #[cfg(feature = "sftp")]
        let sftp_reader = Some(SftpReader::ssh());
        #[cfg(not(feature = "sftp"))]
        let sftp_reader = None;

        Self {
            store,
            api_reader: ApiReader::new(),
            sftp_reader,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_api_reader(mut self, reader: ApiReader) -> Self {
        self.api_reader = reader;
        self
    }

    pub fn with_sftp_reader(mut self, reader: SftpReader) -> Self {
        self.sftp_reader = Some(reader);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn store(&self) -> Arc<dyn CatalogStore> {
        Arc::clone(&self.store)
    }

    // ==========================================
    // 记录级入口
    // ==========================================

    /// 映射 + 逐条 upsert
    pub async fn import_records(
        &self,
        raws: Vec<RawRecord>,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        let records = FieldMapper::new(mapping).map_records(raws);
        UpsertCoordinator::new(self.store())
            .upsert_records(records, vendor_id)
            .await
    }

    /// 映射 + 分块批量装载
    pub async fn load_records_bulk(
        &self,
        raws: Vec<RawRecord>,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        let records = FieldMapper::new(mapping).map_records(raws);
        BulkLoader::new(self.store())
            .with_chunk_size(self.chunk_size)
            .load(records, vendor_id)
            .await
    }

    // ==========================================
    // 文件
    // ==========================================

    /// 从本地文件导入（按扩展名选择解析器）
    #[instrument(skip(self, file_path, mapping), fields(path = %file_path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        match UniversalFileParser.parse(file_path.as_ref()) {
            Ok(raws) => {
                info!(rows = raws.len(), "文件解析完成");
                self.import_records(raws, vendor_id, mapping).await
            }
            Err(e) => source_failure("文件导入失败", e),
        }
    }

    /// 从本地文件批量导入
    #[instrument(skip(self, file_path, mapping), fields(path = %file_path.as_ref().display()))]
    pub async fn import_file_bulk<P: AsRef<Path>>(
        &self,
        file_path: P,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        match UniversalFileParser.parse(file_path.as_ref()) {
            Ok(raws) => {
                info!(rows = raws.len(), "文件解析完成，开始批量装载");
                self.load_records_bulk(raws, vendor_id, mapping).await
            }
            Err(e) => source_failure("文件导入失败", e),
        }
    }

    // ==========================================
    // HTTP API
    // ==========================================
    #[instrument(skip(self, config, mapping), fields(url = %config.url))]
    pub async fn import_from_api(
        &self,
        config: &ApiImportConfig,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        match self.api_reader.fetch(config).await {
            Ok(raws) => self.import_records(raws, vendor_id, mapping).await,
            Err(e) => source_failure("API 导入失败", e),
        }
    }

    // ==========================================
    // SFTP
    // ==========================================

    /// 单目录 SFTP 导入
    ///
    /// # 说明
    /// - 每个匹配文件单独映射与导入（记录序号按文件重新计数）
    /// - 单个文件解析失败 → 一条错误，其余文件继续
    #[instrument(skip(self, config, mapping), fields(host = %config.host, directory = %config.directory))]
    pub async fn import_from_sftp(
        &self,
        config: &SftpImportConfig,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        let Some(reader) = self.sftp_reader.as_ref() else {
            return source_failure("SFTP 导入失败", ImportError::SftpUnavailable);
        };

        let files = match reader.fetch(config).await {
            Ok(files) => files,
            Err(e) => return source_failure("SFTP 导入失败", e),
        };

        let mut outcome = ImportOutcome::default();
        for file in files {
            match file.records {
                Ok(raws) => {
                    let file_outcome = self.import_records(raws, vendor_id, mapping.clone()).await;
                    outcome.absorb(file_outcome);
                }
                Err(e) => outcome.errors.push(format!("文件 {}: {}", file.name, e)),
            }
        }
        outcome
    }

    /// 多目录 SFTP 导入（按配置顺序依次执行并汇总）
    ///
    /// # 参数
    /// - progress: 可选的进度发送端（每个目录开始前发送 Directory 事件）
    pub async fn import_from_multiple_sftp(
        &self,
        configs: &[SftpImportConfig],
        vendor_id: i64,
        mapping: Option<FieldMapping>,
        progress: Option<&ProgressSender>,
    ) -> ImportOutcome {
        let total = configs.len();
        let mut outcome = ImportOutcome::default();

        for (i, config) in configs.iter().enumerate() {
            if let Some(tx) = progress {
                // 接收端已关闭时忽略
                let _ = tx.send(ImportProgress::Directory {
                    index: i + 1,
                    total,
                    directory: config.directory.clone(),
                });
            }
            info!(index = i + 1, total, host = %config.host, directory = %config.directory, "处理 SFTP 目录");

            let dir_outcome = self
                .import_from_sftp(config, vendor_id, mapping.clone())
                .await;
            outcome.imported += dir_outcome.imported;
            outcome.errors.extend(
                dir_outcome
                    .errors
                    .into_iter()
                    .map(|e| format!("[{}:{}] {}", config.host, config.directory, e)),
            );
        }

        info!(
            directories = total,
            imported = outcome.imported,
            errors = outcome.errors.len(),
            "多目录 SFTP 导入完成"
        );
        outcome
    }

    // ==========================================
    // EDI
    // ==========================================
    pub async fn import_edi_text(
        &self,
        text: &str,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        match EdiParser.parse_text(text) {
            Ok(raws) => self.import_records(raws, vendor_id, mapping).await,
            Err(e) => source_failure("EDI 导入失败", e),
        }
    }

    pub async fn import_edi_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        vendor_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportOutcome {
        let path = file_path.as_ref();
        if !path.exists() {
            return source_failure(
                "EDI 导入失败",
                ImportError::FileNotFound(path.display().to_string()),
            );
        }
        match EdiParser.parse_to_raw_records(path) {
            Ok(raws) => self.import_records(raws, vendor_id, mapping).await,
            Err(e) => source_failure("EDI 导入失败", e),
        }
    }

    // ==========================================
    // 已保存的连接
    // ==========================================

    /// 按已保存连接导入（目标供应商为连接所属供应商）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入已执行（可能含记录级错误）
    /// - Err: 连接不存在 / 配置无效 / 类型不支持直接导入
    pub async fn import_from_connection(
        &self,
        connection_id: i64,
        mapping: Option<FieldMapping>,
    ) -> ImportResult<ImportOutcome> {
        let connection = self
            .store
            .connections()
            .find_by_id(connection_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("VendorConnection", connection_id))?;

        info!(
            connection_id,
            vendor_id = connection.vendor_id,
            conn_type = %connection.conn_type,
            "按已保存连接导入"
        );

        let outcome = match import_source_from_connection(&connection)? {
            SavedImportSource::Api(config) => {
                self.import_from_api(&config, connection.vendor_id, mapping)
                    .await
            }
            SavedImportSource::Sftp(config) => {
                self.import_from_sftp(&config, connection.vendor_id, mapping)
                    .await
            }
        };
        Ok(outcome)
    }
}

/// 读取器失败 → (0, [错误])
fn source_failure(context: &str, err: ImportError) -> ImportOutcome {
    error!(error = %err, "{}", context);
    ImportOutcome::failed(format!("{}: {}", context, err))
}
