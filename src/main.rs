// ==========================================
// 供应商目录系统 - 命令行主入口
// ==========================================
// 流程: 解析参数 → 应用目录 → 日志 → AppState → 执行子命令 → 输出 JSON
// ==========================================

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

use cli::{
    Cli, Command, ConfigCommand, ConnectionCommand, ImportArgs, ImportSource, StatusArg,
    VendorCommand,
};
use vendor_catalog::app::AppState;
use vendor_catalog::config::{
    parse_headers_json, ApiAuth, ApiImportConfig, AppPaths, ConfigManager, SftpImportConfig,
};
use vendor_catalog::domain::{ConnectionConfig, ConnectionType, RecordStatus, Vendor};
use vendor_catalog::importer::{ImportJob, ImportTaskHandle};
use vendor_catalog::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.home {
        Some(root) => AppPaths::under(root),
        None => AppPaths::from_home()?,
    };
    paths.ensure_dirs()?;

    // 日志级别取决于配置中的 debug_mode；配置只加载一次
    let manager = ConfigManager::load(&paths.config).context("配置加载失败")?;
    let debug_mode = manager.app_config().map(|c| c.debug_mode).unwrap_or(false);
    let _log_guard = logging::init(Some(&paths.logs), debug_mode);

    tracing::info!(version = vendor_catalog::VERSION, "{}", vendor_catalog::APP_NAME);

    let state = AppState::open(paths, manager)
        .await
        .context("应用初始化失败")?;

    match cli.command {
        Command::Vendor(cmd) => run_vendor(&state, cmd).await,
        Command::Connection(cmd) => run_connection(&state, cmd).await,
        Command::Config(cmd) => run_config(&state, cmd),
        Command::Import(args) => run_import(&state, args).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn to_status(status: StatusArg) -> RecordStatus {
    match status {
        StatusArg::Active => RecordStatus::Active,
        StatusArg::Inactive => RecordStatus::Inactive,
    }
}

fn parse_conn_type(text: &str) -> anyhow::Result<ConnectionType> {
    ConnectionType::parse(text).with_context(|| format!("未知的连接类型: {}", text))
}

fn parse_config_object(text: &str) -> anyhow::Result<ConnectionConfig> {
    serde_json::from_str(text).with_context(|| format!("连接参数必须是 JSON 对象: {}", text))
}

// ==========================================
// 供应商
// ==========================================
async fn run_vendor(state: &AppState, cmd: VendorCommand) -> anyhow::Result<()> {
    let api = &state.vendor_api;
    match cmd {
        VendorCommand::List { search } => {
            print_json(&api.search_vendors(search.as_deref().unwrap_or("")).await?)
        }
        VendorCommand::Show { id } => print_json(&api.get_vendor(id).await?),
        VendorCommand::Add {
            name,
            description,
            contact,
        } => {
            let mut vendor = Vendor::new(name);
            vendor.description = description;
            vendor.contact_info = contact;
            let id = api.create_vendor(vendor).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        VendorCommand::Update {
            id,
            name,
            description,
            contact,
            status,
        } => {
            let mut vendor = api.get_vendor(id).await?;
            if let Some(name) = name {
                vendor.name = name;
            }
            if description.is_some() {
                vendor.description = description;
            }
            if contact.is_some() {
                vendor.contact_info = contact;
            }
            if let Some(status) = status {
                vendor.status = to_status(status);
            }
            api.update_vendor(vendor.clone()).await?;
            print_json(&vendor)
        }
        VendorCommand::Delete { id } => {
            api.delete_vendor(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        VendorCommand::Summary { id } => {
            api.get_vendor(id).await?;
            print_json(&state.product_api.vendor_summary(id).await?)
        }
    }
}

// ==========================================
// 连接
// ==========================================
async fn run_connection(state: &AppState, cmd: ConnectionCommand) -> anyhow::Result<()> {
    let api = &state.connection_api;
    match cmd {
        ConnectionCommand::List { vendor } => print_json(&api.list_connections(vendor).await?),
        ConnectionCommand::Show { id } => print_json(&api.get_connection(id).await?),
        ConnectionCommand::Add {
            vendor,
            name,
            conn_type,
            config,
        } => {
            let id = api
                .create_connection(
                    vendor,
                    &name,
                    parse_conn_type(&conn_type)?,
                    parse_config_object(&config)?,
                )
                .await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        ConnectionCommand::Update {
            id,
            name,
            conn_type,
            config,
            status,
        } => {
            let conn_type = conn_type.as_deref().map(parse_conn_type).transpose()?;
            let patch = config.as_deref().map(parse_config_object).transpose()?;
            let updated = api
                .update_connection(id, name.as_deref(), conn_type, patch, status.map(to_status))
                .await?;
            print_json(&updated)
        }
        ConnectionCommand::Delete { id } => {
            api.delete_connection(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

// ==========================================
// 配置
// ==========================================
fn run_config(state: &AppState, cmd: ConfigCommand) -> anyhow::Result<()> {
    let api = &state.config_api;
    match cmd {
        ConfigCommand::Get { key } => print_json(&api.get_setting(&key)?),
        ConfigCommand::Set { key, value } => print_json(&api.set_setting(&key, &value)?),
        ConfigCommand::Show => print_json(&api.all_settings()?),
    }
}

// ==========================================
// 导入
// ==========================================
async fn run_import(state: &AppState, args: ImportArgs) -> anyhow::Result<()> {
    let api = &state.import_api;
    let mapping = api.load_mapping(args.mapping.as_deref())?;
    let vendor_id = args.vendor;

    let job = build_job(args.source)?;
    if !matches!(job, ImportJob::Connection(_)) && vendor_id <= 0 {
        bail!("请通过 --vendor 指定目标供应商");
    }

    if args.background {
        let handle = api.start_background(job, vendor_id, mapping);
        let report = drain_progress(handle).await?;
        return print_json(&report);
    }

    let response = match job {
        ImportJob::File(path) => {
            api.import_file(&path.to_string_lossy(), vendor_id, mapping, false)
                .await?
        }
        ImportJob::FileBulk(path) => {
            api.import_file(&path.to_string_lossy(), vendor_id, mapping, true)
                .await?
        }
        ImportJob::Api(config) => api.import_from_api(&config, vendor_id, mapping).await?,
        ImportJob::Sftp(config) => api.import_from_sftp(&config, vendor_id, mapping).await?,
        ImportJob::MultiSftp(configs) => {
            api.import_from_multiple_sftp(&configs, vendor_id, mapping)
                .await?
        }
        ImportJob::EdiText(text) => api.import_edi_text(&text, vendor_id, mapping).await?,
        ImportJob::EdiFile(path) => {
            api.import_edi_file(&path.to_string_lossy(), vendor_id, mapping)
                .await?
        }
        ImportJob::Connection(id) => api.import_from_connection(id, mapping).await?,
    };
    print_json(&response)
}

/// 命令行参数 → 导入作业（配置错误在此处暴露）
fn build_job(source: ImportSource) -> anyhow::Result<ImportJob> {
    let job = match source {
        ImportSource::File { path, bulk: false } => ImportJob::File(path),
        ImportSource::File { path, bulk: true } => ImportJob::FileBulk(path),
        ImportSource::Api {
            url,
            auth_type,
            username,
            password,
            token,
            headers,
            params,
            items_path,
            next_page_path,
        } => {
            let mut auth_params = BTreeMap::new();
            for (key, value) in [("username", username), ("password", password), ("token", token)] {
                if let Some(value) = value {
                    auth_params.insert(key.to_string(), value);
                }
            }

            let mut config = ApiImportConfig::new(url)
                .with_auth(ApiAuth::from_parts(&auth_type, &auth_params)?)
                .with_items_path(items_path);
            config.headers = parse_headers_json(headers.as_deref().unwrap_or(""))?;
            config.params = params.into_iter().collect();
            if let Some(path) = next_page_path {
                config = config.with_pagination(path);
            }
            ImportJob::Api(config)
        }
        ImportSource::Sftp {
            host,
            port,
            username,
            password,
            directory,
            pattern,
        } => {
            let mut config = SftpImportConfig::new(host, username);
            config.port = SftpImportConfig::parse_port(&port)?;
            config.password = password;
            config.directory = directory;
            config.file_pattern = pattern;
            ImportJob::Sftp(config)
        }
        ImportSource::SftpMulti { config } => {
            let text = fs::read_to_string(&config)
                .with_context(|| format!("无法读取 {}", config.display()))?;
            let objects: Vec<ConnectionConfig> =
                serde_json::from_str(&text).context("多目录配置必须是 JSON 对象数组")?;
            let configs = objects
                .iter()
                .map(SftpImportConfig::from_config)
                .collect::<Result<Vec<_>, _>>()?;
            ImportJob::MultiSftp(configs)
        }
        ImportSource::Edi { path, text } => match (path, text) {
            (Some(path), _) => ImportJob::EdiFile(path),
            (None, Some(text)) => ImportJob::EdiText(text),
            (None, None) => bail!("EDI 导入需要 --path 或 --text"),
        },
        ImportSource::Connection { id } => ImportJob::Connection(id),
    };
    Ok(job)
}

/// 打印进度事件直到任务结束
async fn drain_progress(
    mut handle: ImportTaskHandle,
) -> anyhow::Result<vendor_catalog::domain::ImportReport> {
    tracing::info!(task_id = %handle.task_id, "后台导入已启动");
    while let Some(event) = handle.progress.recv().await {
        eprintln!("{}", serde_json::to_string(&event)?);
    }
    Ok(handle.wait().await?)
}
