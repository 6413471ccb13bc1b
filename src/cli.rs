// ==========================================
// 供应商目录系统 - 命令行参数
// ==========================================

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vendor-catalog", version, about = "供应商目录管理与商品数据导入")]
pub struct Cli {
    /// 应用目录（默认 ~/.VendorCatalog）
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 供应商维护
    #[command(subcommand)]
    Vendor(VendorCommand),

    /// 供应商连接维护
    #[command(subcommand)]
    Connection(ConnectionCommand),

    /// 配置读写（点分路径）
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 商品数据导入
    Import(ImportArgs),
}

// ==========================================
// 供应商
// ==========================================
#[derive(Subcommand, Debug)]
pub enum VendorCommand {
    /// 列出供应商（可按名称搜索）
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        status: Option<StatusArg>,
    },
    Delete {
        id: i64,
    },
    /// 供应商商品汇总
    Summary {
        id: i64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Active,
    Inactive,
}

// ==========================================
// 连接
// ==========================================
#[derive(Subcommand, Debug)]
pub enum ConnectionCommand {
    List {
        #[arg(long)]
        vendor: Option<i64>,
    },
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        vendor: i64,
        #[arg(long)]
        name: String,
        /// sftp / ftp / api / edi / rest / soap / other
        #[arg(long = "type")]
        conn_type: String,
        /// 连接参数 JSON 对象
        #[arg(long, default_value = "{}")]
        config: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        conn_type: Option<String>,
        /// 按键合并到已保存配置
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        status: Option<StatusArg>,
    },
    Delete {
        id: i64,
    },
}

// ==========================================
// 配置
// ==========================================
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Get { key: String },
    /// 值能解析为 JSON 时按 JSON 写入，否则按字符串
    Set { key: String, value: String },
    /// 打印全部配置
    Show,
}

// ==========================================
// 导入
// ==========================================
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// 目标供应商（connection 导入时忽略）
    #[arg(long, global = true, default_value_t = 0)]
    pub vendor: i64,

    /// 字段映射 JSON 文件
    #[arg(long, global = true)]
    pub mapping: Option<PathBuf>,

    /// 后台任务执行并打印进度
    #[arg(long, global = true, default_value_t = false)]
    pub background: bool,

    #[command(subcommand)]
    pub source: ImportSource,
}

#[derive(Subcommand, Debug)]
pub enum ImportSource {
    /// 本地文件（.csv/.xlsx/.xls/.xlsm/.ods/.json/.xml）
    File {
        path: PathBuf,
        /// 使用分块批量装载
        #[arg(long, default_value_t = false)]
        bulk: bool,
    },
    /// HTTP API
    Api {
        #[arg(long)]
        url: String,
        /// none / basic / bearer
        #[arg(long, default_value = "none")]
        auth_type: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        token: Option<String>,
        /// 请求头 JSON 对象
        #[arg(long)]
        headers: Option<String>,
        /// 查询参数 key=value（可重复）
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        #[arg(long, default_value = "")]
        items_path: String,
        /// 设置后启用分页
        #[arg(long)]
        next_page_path: Option<String>,
    },
    /// SFTP 单目录
    Sftp {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "22")]
        port: String,
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "/")]
        directory: String,
        #[arg(long, default_value = "*")]
        pattern: String,
    },
    /// SFTP 多目录（JSON 数组文件，每项为一个 SFTP 配置对象）
    SftpMulti {
        config: PathBuf,
    },
    /// EDI 报文（文件或文本）
    Edi {
        #[arg(long, conflicts_with = "text")]
        path: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
    /// 已保存的连接
    Connection {
        id: i64,
    },
}

fn parse_key_value(text: &str) -> Result<(String, String), String> {
    text.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("参数格式应为 key=value: {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_file_parses() {
        let cli = Cli::parse_from(["vendor-catalog", "import", "--vendor", "3", "file", "a.csv", "--bulk"]);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.vendor, 3);
                assert!(matches!(args.source, ImportSource::File { bulk: true, .. }));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_import_api_params_parse() {
        let cli = Cli::parse_from([
            "vendor-catalog", "import", "--vendor", "1", "api", "--url", "http://x/p",
            "--param", "page_size=50", "--next-page-path", "links.next",
        ]);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        let ImportSource::Api { params, next_page_path, .. } = args.source else {
            panic!("expected api source");
        };
        assert_eq!(params, vec![("page_size".to_string(), "50".to_string())]);
        assert_eq!(next_page_path.as_deref(), Some("links.next"));
    }

    #[test]
    fn test_config_set_parses() {
        let cli = Cli::parse_from(["vendor-catalog", "config", "set", "ui.font_size", "14"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Set { ref key, ref value }) if key == "ui.font_size" && value == "14"
        ));
    }

    #[test]
    fn test_parse_key_value_rejects_missing_equals() {
        assert!(parse_key_value("novalue").is_err());
        assert_eq!(parse_key_value("a=b=c").unwrap(), ("a".to_string(), "b=c".to_string()));
    }
}
