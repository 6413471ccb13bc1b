// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 输出: 控制台 + 日志目录下按天滚动的文件（tracing-appender）
// 支持环境变量配置日志级别
// ==========================================

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日志文件名前缀
pub const LOG_FILE_PREFIX: &str = "vendor-catalog.log";

/// 默认日志级别（debug_mode 打开时为 debug）
pub fn default_level(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "info"
    }
}

/// 初始化日志系统
///
/// # 参数
/// - log_dir: 日志目录；None 时只输出到控制台
/// - debug_mode: 未设置 RUST_LOG 时是否使用 debug 级别
///
/// # 返回
/// - Some(WorkerGuard): 文件写入线程守卫，需保持到进程结束
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（例如 RUST_LOG=vendor_catalog=trace）
pub fn init(log_dir: Option<&Path>, debug_mode: bool) -> Option<WorkerGuard> {
    let level = default_level(debug_mode);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let (file_layer, guard) = match log_dir.map(|dir| std::fs::create_dir_all(dir).map(|_| dir)) {
        Some(Ok(dir)) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("日志目录创建失败，仅输出到控制台: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    // 重复初始化时忽略
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
