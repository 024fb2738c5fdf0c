// ==========================================
// 课堂座位编排系统 - 编排结果领域模型
// ==========================================
// 红线: 输入问题不抛错, 以原因码 (notice) 随部分结果返回
// ==========================================

use crate::domain::confirmed_layout::PairInfo;
use crate::domain::types::{SeatId, StudentId};
use crate::i18n::t_with_args;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ==========================================
// NoticeSeverity - 提示级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeSeverity {
    Info,    // 约束放宽等预期情况
    Warning, // 输入问题, 需要提示用户
}

// ==========================================
// AssignmentNotice - 编排原因码
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentNotice {
    /// 名单为空
    EmptyRoster,
    /// 没有可用座位
    NoSeats,
    /// 座位少于学生
    MoreStudentsThanSeats { unseated: usize },
    /// 学生的固定座位未登记为固定座位
    FixedSeatNotRegistered { student_name: String, seat_id: SeatId },
    /// 固定座位不存在或不可用
    FixedSeatUnavailable { student_name: String, seat_id: SeatId },
    /// 固定座位没有对应学生, 已作为普通座位参与编排
    UnclaimedFixedSeat { seat_id: SeatId },
    /// 多名学生固定到同一座位, 先到者被挤出
    FixedSeatConflict { seat_id: SeatId, displaced: String },
    /// 部分学生未能避开上次座位
    PrevSeatRelaxed { count: usize },
    /// 部分学生未能避开上次同桌
    PrevPartnerRelaxed { count: usize },
    /// 部分座位改用异性学生填充
    GenderFallback { count: usize },
}

impl AssignmentNotice {
    /// 稳定原因码
    pub fn code(&self) -> &'static str {
        match self {
            AssignmentNotice::EmptyRoster => "EMPTY_ROSTER",
            AssignmentNotice::NoSeats => "NO_SEATS",
            AssignmentNotice::MoreStudentsThanSeats { .. } => "MORE_STUDENTS_THAN_SEATS",
            AssignmentNotice::FixedSeatNotRegistered { .. } => "FIXED_SEAT_NOT_REGISTERED",
            AssignmentNotice::FixedSeatUnavailable { .. } => "FIXED_SEAT_UNAVAILABLE",
            AssignmentNotice::UnclaimedFixedSeat { .. } => "UNCLAIMED_FIXED_SEAT",
            AssignmentNotice::FixedSeatConflict { .. } => "FIXED_SEAT_CONFLICT",
            AssignmentNotice::PrevSeatRelaxed { .. } => "PREV_SEAT_RELAXED",
            AssignmentNotice::PrevPartnerRelaxed { .. } => "PREV_PARTNER_RELAXED",
            AssignmentNotice::GenderFallback { .. } => "GENDER_FALLBACK",
        }
    }

    pub fn severity(&self) -> NoticeSeverity {
        match self {
            AssignmentNotice::PrevSeatRelaxed { .. }
            | AssignmentNotice::PrevPartnerRelaxed { .. }
            | AssignmentNotice::GenderFallback { .. } => NoticeSeverity::Info,
            _ => NoticeSeverity::Warning,
        }
    }

    /// 本地化提示文本
    pub fn message(&self) -> String {
        match self {
            AssignmentNotice::EmptyRoster => t_with_args("notice.empty_roster", &[]),
            AssignmentNotice::NoSeats => t_with_args("notice.no_seats", &[]),
            AssignmentNotice::MoreStudentsThanSeats { unseated } => t_with_args(
                "notice.more_students_than_seats",
                &[("count", &unseated.to_string())],
            ),
            AssignmentNotice::FixedSeatNotRegistered {
                student_name,
                seat_id,
            } => t_with_args(
                "notice.fixed_seat_not_registered",
                &[("name", student_name), ("seat", &seat_id.to_string())],
            ),
            AssignmentNotice::FixedSeatUnavailable {
                student_name,
                seat_id,
            } => t_with_args(
                "notice.fixed_seat_unavailable",
                &[("name", student_name), ("seat", &seat_id.to_string())],
            ),
            AssignmentNotice::UnclaimedFixedSeat { seat_id } => t_with_args(
                "notice.unclaimed_fixed_seat",
                &[("seat", &seat_id.to_string())],
            ),
            AssignmentNotice::FixedSeatConflict { seat_id, displaced } => t_with_args(
                "notice.fixed_seat_conflict",
                &[("seat", &seat_id.to_string()), ("name", displaced)],
            ),
            AssignmentNotice::PrevSeatRelaxed { count } => t_with_args(
                "notice.prev_seat_relaxed",
                &[("count", &count.to_string())],
            ),
            AssignmentNotice::PrevPartnerRelaxed { count } => t_with_args(
                "notice.prev_partner_relaxed",
                &[("count", &count.to_string())],
            ),
            AssignmentNotice::GenderFallback { count } => t_with_args(
                "notice.gender_fallback",
                &[("count", &count.to_string())],
            ),
        }
    }
}

impl fmt::Display for AssignmentNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// AssignmentStatus - 编排结果状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Complete, // 所有学生均已入座
    Partial,  // 部分学生未入座
    Empty,    // 没有产生任何映射
}

// ==========================================
// AssignmentResult - 编排结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub mapping: BTreeMap<SeatId, StudentId>,  // 座位 → 学生
    pub unassigned_seats: Vec<SeatId>,         // 未分配学生的可用座位
    pub unassigned_students: Vec<StudentId>,   // 未入座学生
    pub notices: Vec<AssignmentNotice>,        // 原因码
}

impl AssignmentResult {
    pub fn status(&self) -> AssignmentStatus {
        if self.mapping.is_empty() {
            AssignmentStatus::Empty
        } else if self.unassigned_students.is_empty() {
            AssignmentStatus::Complete
        } else {
            AssignmentStatus::Partial
        }
    }

    pub fn student_at(&self, seat_id: SeatId) -> Option<StudentId> {
        self.mapping.get(&seat_id).copied()
    }

    pub fn seat_of(&self, student_id: StudentId) -> Option<SeatId> {
        self.mapping
            .iter()
            .find(|(_, sid)| **sid == student_id)
            .map(|(seat, _)| *seat)
    }

    pub fn has_notice(&self, code: &str) -> bool {
        self.notices.iter().any(|n| n.code() == code)
    }
}

// ==========================================
// RealizedPlacements - 实际落位 (下次编排的约束种子)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedPlacements {
    pub seat_by_student: HashMap<String, SeatId>,
    pub partner_by_student: HashMap<String, String>,
    pub pairs: Vec<PairInfo>,
}
