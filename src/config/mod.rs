// ==========================================
// 课堂座位编排系统 - 配置层
// ==========================================
// 职责: 编排选项定义与校验, 按班级持久化
// 存储: config_kv 表
// ==========================================

pub mod arrange_options;
pub mod config_manager;

pub use arrange_options::{ArrangeOptions, OptionsError, DEFAULT_PARTITION_COUNT, MAX_SEAT_COUNT};
pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
