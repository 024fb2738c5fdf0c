// ==========================================
// 课堂座位编排系统 - 引擎层
// ==========================================
// 职责: 座位拓扑、编排策略、历史约束、座位分配、撤销/重做
// 红线: Engine 不拼 SQL, 不做 I/O; 所有放宽与异常输入都以原因码输出
// ==========================================

pub mod assignment;
pub mod constraint;
pub mod fixed_seat;
pub mod history;
pub mod pairing;
pub mod session;
pub mod topology;

// 重导出核心引擎
pub use assignment::AssignmentEngine;
pub use constraint::{ConstraintExtractor, ConstraintFlags, HistoricalConstraints};
pub use fixed_seat::FixedSeatRegistry;
pub use history::{HistoryError, HistoryResult, LayoutHistory, MAX_HISTORY_ENTRIES};
pub use pairing::{PairingStrategy, SeatSlot};
pub use session::{SeatingSession, SessionError, SessionResult, SessionSnapshot};
pub use topology::LayoutTopology;
