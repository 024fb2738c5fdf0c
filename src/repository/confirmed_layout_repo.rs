// ==========================================
// 课堂座位编排系统 - 已确认布局存储
// ==========================================
// 职责: 按班级保存/读取/删除已确认布局
// 规则: 读取结果按 timestamp 倒序, 每个班级最多保留 50 条
// 红线: Store 不做编排逻辑, 只做数据映射
// ==========================================

mod core;
mod memory;


pub use self::core::ConfirmedLayoutRepository;
pub use self::memory::InMemoryConfirmedLayoutStore;

use crate::domain::confirmed_layout::ConfirmedLayoutRecord;
use crate::repository::error::RepositoryResult;

// ==========================================
// ConfirmedLayoutStore - 已确认布局存储接口
// ==========================================
pub trait ConfirmedLayoutStore {
    /// 读取班级的已确认布局 (最新在前)
    fn list(&self, class_id: &str) -> RepositoryResult<Vec<ConfirmedLayoutRecord>>;

    /// 追加一条已确认布局, 超出上限时淘汰最旧记录
    fn append(&self, class_id: &str, record: &ConfirmedLayoutRecord) -> RepositoryResult<()>;

    /// 删除指定记录
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    fn delete(&self, class_id: &str, record_id: &str) -> RepositoryResult<bool>;
}
