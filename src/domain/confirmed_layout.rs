// ==========================================
// 课堂座位编排系统 - 已确认布局领域模型
// ==========================================
// 用途: 教师"确认"后的座位表, 按班级保存, 作为下次编排的历史约束来源
// 规则: 按 timestamp 倒序, 每个班级最多 50 条
// ==========================================

use crate::domain::types::{Gender, SeatId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 每个班级保留的已确认布局上限
pub const MAX_CONFIRMED_RECORDS: usize = 50;

// ==========================================
// ConfirmedLayoutRecord - 已确认布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedLayoutRecord {
    pub id: String,                          // 记录ID (UUID)
    pub date: String,                        // 展示用日期
    pub timestamp: i64,                      // 毫秒时间戳 (排序键)
    pub layout: Vec<LayoutEntry>,            // 座位表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_info: Option<Vec<PairInfo>>,    // 同桌信息 (旧记录可能缺失)
}

impl ConfirmedLayoutRecord {
    /// 以指定确认时间创建记录
    pub fn new(
        confirmed_at: DateTime<Utc>,
        layout: Vec<LayoutEntry>,
        pair_info: Option<Vec<PairInfo>>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: confirmed_at.format("%Y-%m-%d %H:%M").to_string(),
            timestamp: confirmed_at.timestamp_millis(),
            layout,
            pair_info,
        }
    }
}

// ==========================================
// LayoutEntry - 座位表中的一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub seat_id: SeatId,
    pub student_name: String,
    pub gender: Gender,
}

// ==========================================
// PairInfo - 同桌关系
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    pub student1: String,
    pub student2: String,
}

/// 按时间倒序排列并截断到上限
pub fn normalize_records(records: &mut Vec<ConfirmedLayoutRecord>) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(MAX_CONFIRMED_RECORDS);
}
