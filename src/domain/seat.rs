// ==========================================
// 课堂座位编排系统 - 座位领域模型
// ==========================================
// 红线: seat.is_fixed == FixedSeatRegistry.contains(seat.id)
// 红线: 一个座位最多属于一个 PairSlot
// ==========================================

use crate::domain::types::{SeatId, StudentId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// Seat - 座位
// ==========================================
// position 归渲染层所有, 核心只做透传
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: SeatId,                        // 座位号 (1 起始)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<JsonValue>,       // 渲染坐标 (透传)
    pub is_fixed: bool,                    // 是否固定座位
    pub is_active: bool,                   // 是否可用
    pub student_id: Option<StudentId>,     // 当前学生
    pub student_name: Option<String>,      // 当前学生姓名
}

impl Seat {
    pub fn new(id: SeatId) -> Self {
        Self {
            id,
            position: None,
            is_fixed: false,
            is_active: true,
            student_id: None,
            student_name: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.student_id.is_some()
    }
}

// ==========================================
// SeatCell - 座位在布局中的逻辑坐标
// ==========================================
// partition/row/column 均从 1 开始
// row: 分区内第几排 (桌/组); column: 桌/组内第几个位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatCell {
    pub seat_id: SeatId,
    pub partition: u32,
    pub row: u32,
    pub column: u32,
}

// ==========================================
// PairSlot - 同桌/小组座位单元
// ==========================================
// 同桌: 2 个座位; 小组: 3-6 个座位 (末尾不完整小组 >= 2 个座位)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSlot {
    pub seat_ids: Vec<SeatId>,
}

impl PairSlot {
    pub fn new(seat_ids: Vec<SeatId>) -> Self {
        Self { seat_ids }
    }

    pub fn contains(&self, seat_id: SeatId) -> bool {
        self.seat_ids.contains(&seat_id)
    }

    pub fn len(&self) -> usize {
        self.seat_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seat_ids.is_empty()
    }
}
