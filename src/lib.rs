// ==========================================
// 课堂座位编排系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排座辅助 (教师对座位表拥有最终控制权)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 已确认布局存储
pub mod repository;

// 引擎层 - 拓扑/策略/分配/撤销重做
pub mod engine;

// 配置层 - 编排选项与配置存储
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    Gender, GenderTag, HistoryEntryType, LayoutKind, PairingPolicy, SeatId, StudentId,
};

// 领域实体
pub use domain::{
    AssignmentNotice, AssignmentResult, AssignmentStatus, ConfirmedLayoutRecord, HistoryEntry,
    RosterEntry, Seat, Student,
};

// 引擎
pub use engine::{AssignmentEngine, LayoutHistory, LayoutTopology, SeatingSession};

// 配置
pub use config::{ArrangeOptions, ConfigManager};

// API
pub use api::{ApiError, ApiResult, SeatingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "课堂座位编排系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
