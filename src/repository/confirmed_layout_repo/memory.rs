use super::ConfirmedLayoutStore;
use crate::domain::confirmed_layout::{normalize_records, ConfirmedLayoutRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// InMemoryConfirmedLayoutStore - 内存已确认布局存储
// ==========================================
// 用于测试与不需要落盘的会话
#[derive(Debug, Default)]
pub struct InMemoryConfirmedLayoutStore {
    records: Mutex<HashMap<String, Vec<ConfirmedLayoutRecord>>>,
}

impl InMemoryConfirmedLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> RepositoryResult<std::sync::MutexGuard<'_, HashMap<String, Vec<ConfirmedLayoutRecord>>>> {
        self.records
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl ConfirmedLayoutStore for InMemoryConfirmedLayoutStore {
    fn list(&self, class_id: &str) -> RepositoryResult<Vec<ConfirmedLayoutRecord>> {
        Ok(self.lock()?.get(class_id).cloned().unwrap_or_default())
    }

    fn append(&self, class_id: &str, record: &ConfirmedLayoutRecord) -> RepositoryResult<()> {
        let mut records = self.lock()?;
        let class_records = records.entry(class_id.to_string()).or_default();

        if class_records.iter().any(|r| r.id == record.id) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "confirmed_layout.record_id={}",
                record.id
            )));
        }

        class_records.insert(0, record.clone());
        normalize_records(class_records);
        Ok(())
    }

    fn delete(&self, class_id: &str, record_id: &str) -> RepositoryResult<bool> {
        let mut records = self.lock()?;
        let Some(class_records) = records.get_mut(class_id) else {
            return Ok(false);
        };
        let before = class_records.len();
        class_records.retain(|r| r.id != record_id);
        Ok(class_records.len() < before)
    }
}
