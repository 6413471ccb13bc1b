// ==========================================
// 供应商目录系统 - 后台导入任务
// ==========================================
// 模型: 每次导入一个 tokio 任务
// - 任务 ID: uuid v4
// - 进度: mpsc 通道（Started → [Directory ...] → Finished）
// - 结果: JoinHandle<ImportReport>；任务 panic → ImportError::TaskFailed
// 不做: 取消 / 超时 / 跨任务互斥
// ==========================================

use crate::config::{ApiImportConfig, SftpImportConfig};
use crate::domain::{FieldMapping, ImportOutcome, ImportProgress, ImportReport};
use crate::importer::catalog_importer::{CatalogImporter, ProgressSender};
use crate::importer::error::{ImportError, ImportResult};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{info, Instrument};
use uuid::Uuid;

/// 后台导入作业
#[derive(Debug, Clone)]
pub enum ImportJob {
    File(PathBuf),
    FileBulk(PathBuf),
    Api(ApiImportConfig),
    Sftp(SftpImportConfig),
    MultiSftp(Vec<SftpImportConfig>),
    EdiText(String),
    EdiFile(PathBuf),
    /// 已保存连接（目标供应商取连接所属供应商）
    Connection(i64),
}

impl ImportJob {
    /// 来源描述（用于日志与报告）
    pub fn source_label(&self) -> String {
        match self {
            ImportJob::File(path) => format!("file:{}", path.display()),
            ImportJob::FileBulk(path) => format!("bulk:{}", path.display()),
            ImportJob::Api(config) => format!("api:{}", config.url),
            ImportJob::Sftp(config) => format!("sftp:{}{}", config.host, config.directory),
            ImportJob::MultiSftp(configs) => format!("sftp-multi:{}", configs.len()),
            ImportJob::EdiText(_) => "edi:text".to_string(),
            ImportJob::EdiFile(path) => format!("edi:{}", path.display()),
            ImportJob::Connection(id) => format!("connection:{}", id),
        }
    }
}

pub struct ImportTaskHandle {
    pub task_id: String,
    pub progress: UnboundedReceiver<ImportProgress>,
    handle: JoinHandle<ImportReport>,
}

impl ImportTaskHandle {
    /// 等待任务结束
    ///
    /// # 返回
    /// - Ok(ImportReport): 任务正常结束（导入错误在 outcome.errors 中）
    /// - Err(TaskFailed): 任务 panic 或被中止
    pub async fn wait(self) -> ImportResult<ImportReport> {
        self.handle
            .await
            .map_err(|e| ImportError::TaskFailed(format!("{}: {}", self.task_id, e)))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// 启动后台导入
///
/// # 参数
/// - importer: 共享导入器
/// - job: 导入作业
/// - vendor_id: 目标供应商（Connection 作业忽略此值）
/// - mapping: 可选字段映射
pub fn spawn_import(
    importer: Arc<CatalogImporter>,
    job: ImportJob,
    vendor_id: i64,
    mapping: Option<FieldMapping>,
) -> ImportTaskHandle {
    let task_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel();
    let source = job.source_label();
    let span = tracing::info_span!("import_task", task_id = %task_id, source = %source);

    let id = task_id.clone();
    let handle = tokio::spawn(
        async move {
            let started_at = Utc::now();
            let _ = tx.send(ImportProgress::Started {
                task_id: id.clone(),
                source: source.clone(),
            });
            info!(vendor_id, "后台导入开始");

            let outcome = run_job(&importer, job, vendor_id, mapping, &tx).await;

            let _ = tx.send(ImportProgress::Finished {
                imported: outcome.imported,
                errors: outcome.errors.len(),
            });
            info!(
                imported = outcome.imported,
                errors = outcome.errors.len(),
                "后台导入结束"
            );

            ImportReport {
                task_id: id,
                source,
                vendor_id,
                outcome,
                started_at,
                finished_at: Utc::now(),
            }
        }
        .instrument(span),
    );

    ImportTaskHandle {
        task_id,
        progress: rx,
        handle,
    }
}

async fn run_job(
    importer: &CatalogImporter,
    job: ImportJob,
    vendor_id: i64,
    mapping: Option<FieldMapping>,
    progress: &ProgressSender,
) -> ImportOutcome {
    match job {
        ImportJob::File(path) => importer.import_file(path, vendor_id, mapping).await,
        ImportJob::FileBulk(path) => importer.import_file_bulk(path, vendor_id, mapping).await,
        ImportJob::Api(config) => importer.import_from_api(&config, vendor_id, mapping).await,
        ImportJob::Sftp(config) => importer.import_from_sftp(&config, vendor_id, mapping).await,
        ImportJob::MultiSftp(configs) => {
            importer
                .import_from_multiple_sftp(&configs, vendor_id, mapping, Some(progress))
                .await
        }
        ImportJob::EdiText(text) => importer.import_edi_text(&text, vendor_id, mapping).await,
        ImportJob::EdiFile(path) => importer.import_edi_file(path, vendor_id, mapping).await,
        ImportJob::Connection(id) => importer
            .import_from_connection(id, mapping)
            .await
            .unwrap_or_else(|e| ImportOutcome::failed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label() {
        assert_eq!(ImportJob::File(PathBuf::from("a.csv")).source_label(), "file:a.csv");
        assert_eq!(ImportJob::EdiText("LIN".into()).source_label(), "edi:text");
        assert_eq!(ImportJob::Connection(7).source_label(), "connection:7");
        let sftp = SftpImportConfig::new("h", "u");
        assert_eq!(ImportJob::Sftp(sftp.clone()).source_label(), "sftp:h/");
        assert_eq!(ImportJob::MultiSftp(vec![sftp.clone(), sftp]).source_label(), "sftp-multi:2");
    }
}
