// ==========================================
// 课堂座位编排系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/会话/配置错误转换为用户可读的错误消息
// ==========================================

use crate::config::arrange_options::OptionsError;
use crate::engine::history::HistoryError;
use crate::engine::session::SessionError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    #[error("编排选项不合法: {0}")]
    InvalidOptions(String),

    /// 撤销/重做已到边界 (消息已本地化)
    #[error("{0}")]
    HistoryBoundary(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读写失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        ApiError::HistoryBoundary(err.message())
    }
}

impl From<OptionsError> for ApiError {
    fn from(err: OptionsError) -> Self {
        ApiError::InvalidOptions(err.to_string())
    }
}

// ==========================================
// 从 SessionError 转换
// ==========================================
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownSeat(id) => ApiError::NotFound(format!("座位(id={})不存在", id)),
            SessionError::UnknownStudent(id) => {
                ApiError::NotFound(format!("学生(id={})不存在", id))
            }
            SessionError::SeatFixed(_)
            | SessionError::SeatInactive(_)
            | SessionError::NothingToConfirm => ApiError::BusinessRuleViolation(err.to_string()),
            SessionError::InvalidOptions(e) => e.into(),
            SessionError::History(e) => e.into(),
            SessionError::Snapshot(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
