// ==========================================
// 课堂座位编排系统 - 固定座位登记表
// ==========================================
// 职责: 记录哪些座位被固定给指定学生
// 红线: 只维护内存集合, Seat.is_fixed 与 UI 同步由调用方负责
// ==========================================

use crate::domain::types::SeatId;
use std::collections::BTreeSet;

// ==========================================
// FixedSeatRegistry - 固定座位登记表
// ==========================================
// 添加已存在的座位、移除不存在的座位均为空操作
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedSeatRegistry {
    seats: BTreeSet<SeatId>,
}

impl FixedSeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, seat_id: SeatId) {
        self.seats.insert(seat_id);
    }

    pub fn remove(&mut self, seat_id: SeatId) {
        self.seats.remove(&seat_id);
    }

    pub fn contains(&self, seat_id: SeatId) -> bool {
        self.seats.contains(&seat_id)
    }

    /// 全部固定座位 (升序)
    pub fn all(&self) -> BTreeSet<SeatId> {
        self.seats.clone()
    }

    pub fn clear(&mut self) {
        self.seats.clear();
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

impl FromIterator<SeatId> for FixedSeatRegistry {
    fn from_iter<I: IntoIterator<Item = SeatId>>(iter: I) -> Self {
        Self {
            seats: iter.into_iter().collect(),
        }
    }
}
