// ==========================================
// 课堂座位编排系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表幂等，首次打开即可使用
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SEAT_ARRANGE_DB_PATH";

/// 默认数据库文件名
pub const DEFAULT_DB_FILE: &str = "seat_arrange.db";

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

/// 确保所需表存在（幂等）
///
/// - confirmed_layout: 已确认布局 (每班级按 timestamp 倒序读取)
/// - config_kv: 配置键值 (scope_id = 'global' 或班级ID)
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS confirmed_layout (
            record_id   TEXT PRIMARY KEY,
            class_id    TEXT NOT NULL,
            timestamp   INTEGER NOT NULL,
            record_json TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_confirmed_layout_class_ts
            ON confirmed_layout (class_id, timestamp DESC);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}

/// 默认数据库路径
///
/// 优先读取环境变量 SEAT_ARRANGE_DB_PATH；否则使用系统数据目录，
/// 数据目录不可用时退回当前目录。
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let path = path.trim();
        if !path.is_empty() {
            return path.to_string();
        }
    }

    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("seat-arrange");
    if let Err(e) = std::fs::create_dir_all(&path) {
        tracing::warn!(dir = %path.display(), error = %e, "创建数据目录失败，使用当前目录");
        return DEFAULT_DB_FILE.to_string();
    }
    path.push(DEFAULT_DB_FILE);
    path.to_string_lossy().to_string()
}
