// ==========================================
// 课堂座位编排系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、编排结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod confirmed_layout;
pub mod history;
pub mod seat;
pub mod student;
pub mod types;

// 重导出核心类型
pub use assignment::{
    AssignmentNotice, AssignmentResult, AssignmentStatus, NoticeSeverity, RealizedPlacements,
};
pub use confirmed_layout::{ConfirmedLayoutRecord, LayoutEntry, PairInfo, MAX_CONFIRMED_RECORDS};
pub use history::HistoryEntry;
pub use seat::{PairSlot, Seat, SeatCell};
pub use student::{build_roster, RosterEntry, Student};
pub use types::{Gender, GenderTag, HistoryEntryType, LayoutKind, PairingPolicy, SeatId, StudentId};
