// ==========================================
// 课堂座位编排系统 - 布局历史领域模型
// ==========================================
// 用途: 撤销/重做栈中的单条快照
// 红线: payload 对核心不透明, 必须原样往返
// ==========================================

use crate::domain::types::HistoryEntryType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// HistoryEntry - 历史快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub entry_type: HistoryEntryType, // 快照类型
    pub payload: JsonValue,           // 快照内容 (调用方定义)
    pub timestamp: DateTime<Utc>,     // 记录时间
}

impl HistoryEntry {
    /// 以当前时间创建快照
    pub fn new(entry_type: HistoryEntryType, payload: JsonValue) -> Self {
        Self::at(entry_type, payload, Utc::now())
    }

    /// 以指定时间创建快照
    pub fn at(entry_type: HistoryEntryType, payload: JsonValue, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry_type,
            payload,
            timestamp,
        }
    }
}
