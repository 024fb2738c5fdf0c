// ==========================================
// 课堂座位编排系统 - API 层
// ==========================================
// 职责: 提供按班级组织的编排接口,供界面层调用
// ==========================================

pub mod error;
pub mod seating_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use seating_api::{ArrangeReport, NoticeMessage, SeatingApi};
