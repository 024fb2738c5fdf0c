// ==========================================
// 课堂座位编排系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含编排逻辑
// ==========================================
// 职责: 提供已确认布局的存取接口,屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod confirmed_layout_repo;
pub mod error;

// 重导出核心仓储
pub use confirmed_layout_repo::{
    ConfirmedLayoutRepository, ConfirmedLayoutStore, InMemoryConfirmedLayoutStore,
};
pub use error::{RepositoryError, RepositoryResult};
