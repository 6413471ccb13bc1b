// ==========================================
// 供应商目录系统 - 数据库连接初始化
// ==========================================
// 目标:
// - 统一所有 SQLite Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - PostgreSQL 连接池参数集中在此处
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// PostgreSQL 连接池上限
pub const PG_MAX_CONNECTIONS: u32 = 10;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 创建 PostgreSQL 连接池
pub async fn create_pg_pool(options: PgConnectOptions) -> RepositoryResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(PG_MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
}
