// ==========================================
// 供应商目录系统 - SFTP 读取器
// ==========================================
// 工具: ssh2（阻塞 API，放入 spawn_blocking）+ tempfile
// 流程: 连接 → 列出目录 → 按模式过滤 → 逐个下载到临时目录 → 交给文件解析器
// 约束:
// - 临时目录随 TempDir 析构删除（成功与失败路径一致）
// - 无匹配文件 → NoMatchingFiles
// - 单个文件解析失败只影响该文件
// ==========================================

use crate::config::SftpImportConfig;
use crate::domain::RawRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 简单通配匹配
///
/// # 规则
/// - `*` → 全部
/// - `*x*` → 包含 x
/// - `*suffix` → 以 suffix 结尾
/// - `prefix*` → 以 prefix 开头
/// - 其他 → 完全相等
pub fn pattern_matches(filename: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let starts = pattern.starts_with('*');
    let ends = pattern.ends_with('*');
    match (starts, ends) {
        (true, true) if pattern.len() >= 2 => filename.contains(&pattern[1..pattern.len() - 1]),
        (true, false) => filename.ends_with(&pattern[1..]),
        (false, true) => filename.starts_with(&pattern[..pattern.len() - 1]),
        _ => filename == pattern,
    }
}

// ==========================================
// 传输层 Trait
// ==========================================

/// 远程会话（阻塞调用，在 spawn_blocking 中使用）
pub trait RemoteSession {
    /// 列出目录下的普通文件名（不含路径）
    fn list_files(&mut self, directory: &str) -> ImportResult<Vec<String>>;

    /// 下载单个文件到本地路径
    fn download(&mut self, directory: &str, filename: &str, local_path: &Path) -> ImportResult<()>;
}

/// 远程连接器
pub trait RemoteConnector: Send + Sync {
    fn connect(&self, config: &SftpImportConfig) -> ImportResult<Box<dyn RemoteSession>>;
}

/// 单个下载文件的解析结果
#[derive(Debug)]
pub struct FetchedFile {
    pub name: String,
    pub records: ImportResult<Vec<RawRecord>>,
}

/// 远程路径拼接（目录为空或 "." 时直接用文件名）
pub fn remote_path(directory: &str, filename: &str) -> String {
    let dir = directory.trim_end_matches('/');
    if directory.is_empty() || directory == "." {
        filename.to_string()
    } else if dir.is_empty() {
        format!("/{}", filename)
    } else {
        format!("{}/{}", dir, filename)
    }
}

// ==========================================
// SftpReader
// ==========================================
pub struct SftpReader {
    connector: Arc<dyn RemoteConnector>,
}

impl SftpReader {
    pub fn new(connector: Arc<dyn RemoteConnector>) -> Self {
        Self { connector }
    }

    /// 基于 ssh2 的默认读取器
    #[cfg(feature = "sftp")]
    pub fn ssh() -> Self {
        Self::new(Arc::new(ssh::Ssh2Connector))
    }

    /// 下载并解析所有匹配文件
    ///
    /// # 返回
    /// - Ok(Vec<FetchedFile>): 按文件名排序，每个文件各自的解析结果
    /// - Err: 连接 / 认证 / 列目录 / 下载失败，或没有匹配文件
    pub async fn fetch(&self, config: &SftpImportConfig) -> ImportResult<Vec<FetchedFile>> {
        let connector = Arc::clone(&self.connector);
        let config = config.clone();

        tokio::task::spawn_blocking(move || fetch_blocking(connector.as_ref(), &config))
            .await
            .map_err(|e| ImportError::TaskFailed(format!("SFTP 读取任务异常: {}", e)))?
    }
}

fn fetch_blocking(
    connector: &dyn RemoteConnector,
    config: &SftpImportConfig,
) -> ImportResult<Vec<FetchedFile>> {
    info!(host = %config.host, port = config.port, directory = %config.directory, "连接 SFTP 服务器");
    let mut session = connector.connect(config)?;

    let mut matched: Vec<String> = session
        .list_files(&config.directory)?
        .into_iter()
        .filter(|name| pattern_matches(name, &config.file_pattern))
        .collect();
    matched.sort();

    if matched.is_empty() {
        return Err(ImportError::NoMatchingFiles {
            directory: config.directory.clone(),
            pattern: config.file_pattern.clone(),
        });
    }
    debug!(files = matched.len(), pattern = %config.file_pattern, "匹配到远程文件");

    let temp_dir = tempfile::tempdir()?;
    let parser = UniversalFileParser;
    let mut fetched = Vec::with_capacity(matched.len());

    for name in matched {
        // 只取最后一段，防止文件名中的路径分隔符逃出临时目录
        let Some(local_name) = Path::new(&name).file_name() else {
            warn!(file = %name, "跳过无效的远程文件名");
            continue;
        };
        let local_path = temp_dir.path().join(local_name);

        session.download(&config.directory, &name, &local_path)?;
        let records = parser.parse(&local_path);
        if let Err(e) = &records {
            warn!(file = %name, error = %e, "远程文件解析失败");
        }
        fetched.push(FetchedFile { name, records });
    }

    info!(files = fetched.len(), "SFTP 文件下载解析完成");
    Ok(fetched)
}

// ==========================================
// ssh2 实现
// ==========================================
#[cfg(feature = "sftp")]
pub mod ssh {
    use super::{remote_path, RemoteConnector, RemoteSession};
    use crate::config::SftpImportConfig;
    use crate::importer::error::{ImportError, ImportResult};
    use ssh2::{Session, Sftp};
    use std::fs::File;
    use std::net::TcpStream;
    use std::path::Path;

    fn remote_error(err: ssh2::Error) -> ImportError {
        ImportError::RemoteError(err.to_string())
    }

    pub struct Ssh2Connector;

    impl RemoteConnector for Ssh2Connector {
        fn connect(&self, config: &SftpImportConfig) -> ImportResult<Box<dyn RemoteSession>> {
            let tcp = TcpStream::connect((config.host.as_str(), config.port)).map_err(|e| {
                ImportError::TransportError(format!("{}:{} 连接失败: {}", config.host, config.port, e))
            })?;

            let mut session = Session::new().map_err(remote_error)?;
            session.set_tcp_stream(tcp);
            session.handshake().map_err(remote_error)?;
            session
                .userauth_password(&config.username, &config.password)
                .map_err(|e| ImportError::AuthenticationFailed(e.to_string()))?;
            if !session.authenticated() {
                return Err(ImportError::AuthenticationFailed(format!(
                    "用户 {} 认证未通过",
                    config.username
                )));
            }

            let sftp = session.sftp().map_err(remote_error)?;
            Ok(Box::new(Ssh2Session {
                _session: session,
                sftp,
            }))
        }
    }

    struct Ssh2Session {
        _session: Session,
        sftp: Sftp,
    }

    impl RemoteSession for Ssh2Session {
        fn list_files(&mut self, directory: &str) -> ImportResult<Vec<String>> {
            let entries = self.sftp.readdir(Path::new(directory)).map_err(remote_error)?;
            Ok(entries
                .into_iter()
                .filter(|(_, stat)| stat.is_file())
                .filter_map(|(path, _)| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .collect())
        }

        fn download(&mut self, directory: &str, filename: &str, local_path: &Path) -> ImportResult<()> {
            let remote = remote_path(directory, filename);
            let mut source = self.sftp.open(Path::new(&remote)).map_err(remote_error)?;
            let mut target = File::create(local_path)?;
            std::io::copy(&mut source, &mut target)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matches() {
        assert!(pattern_matches("anything.txt", "*"));
        assert!(pattern_matches("prices.csv", "*.csv"));
        assert!(!pattern_matches("prices.xlsx", "*.csv"));
        assert!(!pattern_matches("report.csv.bak", "*.csv"));
        assert!(pattern_matches("data_2024.json", "data_*"));
        assert!(pattern_matches("q1_sales_final.csv", "*sales*"));
        assert!(pattern_matches("data_2026.json", "data_*"));
        assert!(!pattern_matches("old_data_2026.json", "data_*"));
        assert!(pattern_matches("q3_sales_report.csv", "*sales*"));
        assert!(!pattern_matches("q3_report.csv", "*sales*"));
        assert!(pattern_matches("feed.xml", "feed.xml"));
        assert!(!pattern_matches("feed.xml.bak", "feed.xml"));
    }

    #[test]
    fn test_remote_path() {
        assert_eq!(remote_path("/", "a.csv"), "/a.csv");
        assert_eq!(remote_path("/out/", "a.csv"), "/out/a.csv");
        assert_eq!(remote_path("out", "a.csv"), "out/a.csv");
        assert_eq!(remote_path("", "a.csv"), "a.csv");
    }
}
