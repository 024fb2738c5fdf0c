use super::ConfirmedLayoutStore;
use crate::domain::confirmed_layout::{ConfirmedLayoutRecord, MAX_CONFIRMED_RECORDS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfirmedLayoutRepository - SQLite 已确认布局仓储
// ==========================================
// 表: confirmed_layout (record_id, class_id, timestamp, record_json)
pub struct ConfirmedLayoutRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ConfirmedLayoutRepository {
    /// 创建新的已确认布局仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 班级记录数 (含 JSON 损坏的行)
    pub fn count(&self, class_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM confirmed_layout WHERE class_id = ?1",
            params![class_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl ConfirmedLayoutStore for ConfirmedLayoutRepository {
    fn list(&self, class_id: &str) -> RepositoryResult<Vec<ConfirmedLayoutRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, record_json
            FROM confirmed_layout
            WHERE class_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![class_id, MAX_CONFIRMED_RECORDS as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (record_id, raw) = row?;
            match serde_json::from_str::<ConfirmedLayoutRecord>(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(class_id, record_id = %record_id, error = %e, "已确认布局 JSON 损坏，已跳过");
                }
            }
        }

        Ok(records)
    }

    fn append(&self, class_id: &str, record: &ConfirmedLayoutRecord) -> RepositoryResult<()> {
        let record_json = serde_json::to_string(record)?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO confirmed_layout (record_id, class_id, timestamp, record_json)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.id, class_id, record.timestamp, record_json],
        )?;

        let pruned = tx.execute(
            r#"
            DELETE FROM confirmed_layout
            WHERE class_id = ?1
              AND record_id NOT IN (
                  SELECT record_id FROM confirmed_layout
                  WHERE class_id = ?1
                  ORDER BY timestamp DESC, rowid DESC
                  LIMIT ?2
              )
            "#,
            params![class_id, MAX_CONFIRMED_RECORDS as i64],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(class_id, record_id = %record.id, pruned, "已确认布局已保存");
        Ok(())
    }

    fn delete(&self, class_id: &str, record_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM confirmed_layout WHERE class_id = ?1 AND record_id = ?2",
            params![class_id, record_id],
        )?;
        Ok(rows > 0)
    }
}
