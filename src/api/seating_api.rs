// ==========================================
// 课堂座位编排系统 - 编排 API
// ==========================================
// 职责: 把一个班级的编排会话、已确认布局存储和配置管理器接在一起
// 规则:
// 1) 只有开启避让开关时才读取已确认布局
// 2) 确认后立即写入存储, 供下次编排提取约束
// 3) 选项修改同时写入配置 (配置管理器存在时)
// 4) 打开班级时应用全局配置中保存的界面语言
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::arrange_options::ArrangeOptions;
use crate::config::config_manager::ConfigManager;
use crate::domain::assignment::{AssignmentResult, AssignmentStatus, NoticeSeverity};
use crate::domain::confirmed_layout::ConfirmedLayoutRecord;
use crate::domain::seat::Seat;
use crate::domain::student::RosterEntry;
use crate::domain::types::HistoryEntryType;
use crate::engine::session::SeatingSession;
use crate::i18n;
use crate::repository::confirmed_layout_repo::ConfirmedLayoutStore;
use crate::repository::error::RepositoryError;

// ==========================================
// 响应结构
// ==========================================

/// 单条本地化提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeMessage {
    pub code: String,
    pub severity: NoticeSeverity,
    pub message: String,
}

/// 编排结果报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeReport {
    pub status: AssignmentStatus,
    pub result: AssignmentResult,
    pub messages: Vec<NoticeMessage>,
    pub seats: Vec<Seat>,
}

// ==========================================
// SeatingApi - 编排 API
// ==========================================
pub struct SeatingApi {
    session: SeatingSession,
    store: Arc<dyn ConfirmedLayoutStore + Send + Sync>,
    config_manager: Option<Arc<ConfigManager>>,
}

impl SeatingApi {
    /// 创建班级编排 API
    ///
    /// 配置管理器存在时从中读取该班级的编排选项, 否则使用默认选项。
    pub fn new(
        class_id: &str,
        store: Arc<dyn ConfirmedLayoutStore + Send + Sync>,
        config_manager: Option<Arc<ConfigManager>>,
    ) -> ApiResult<Self> {
        if class_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("班级ID不能为空".to_string()));
        }

        let options = match &config_manager {
            Some(manager) => {
                i18n::apply_saved_locale(manager).map_err(|e| ApiError::ConfigError(e.to_string()))?;
                manager
                    .get_arrange_options(class_id)
                    .map_err(|e| ApiError::ConfigError(e.to_string()))?
            }
            None => ArrangeOptions::default(),
        };

        Ok(Self {
            session: SeatingSession::new(class_id, options)?,
            store,
            config_manager,
        })
    }

    pub fn session(&self) -> &SeatingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SeatingSession {
        &mut self.session
    }

    /// 导入名单
    ///
    /// # 返回
    /// 有效学生人数 (非法姓名行已跳过)
    pub fn load_roster(&mut self, entries: &[RosterEntry]) -> ApiResult<usize> {
        Ok(self.session.replace_roster(entries)?)
    }

    /// 执行编排
    pub fn arrange(&mut self) -> ApiResult<ArrangeReport> {
        let confirmed = if self.session.options().constraint_flags().any() {
            self.store.list(self.session.class_id())?
        } else {
            Vec::new()
        };

        let result = self.session.arrange(&confirmed)?;
        let messages = result
            .notices
            .iter()
            .map(|notice| NoticeMessage {
                code: notice.code().to_string(),
                severity: notice.severity(),
                message: notice.message(),
            })
            .collect();

        Ok(ArrangeReport {
            status: result.status(),
            result,
            messages,
            seats: self.session.seats(),
        })
    }

    /// 修改编排选项
    pub fn update_options(&mut self, options: ArrangeOptions) -> ApiResult<()> {
        self.session.set_options(options)?;

        if let Some(manager) = &self.config_manager {
            manager
                .save_arrange_options(self.session.class_id(), self.session.options())
                .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        }
        Ok(())
    }

    /// 确认当前座位表并写入存储
    pub fn confirm(&mut self, confirmed_at: DateTime<Utc>) -> ApiResult<ConfirmedLayoutRecord> {
        let record = self.session.confirm(confirmed_at)?;
        self.store.append(self.session.class_id(), &record)?;
        tracing::info!(
            class_id = %self.session.class_id(),
            record_id = %record.id,
            seats = record.layout.len(),
            "座位表已确认"
        );
        Ok(record)
    }

    /// 已确认布局 (最新在前)
    pub fn list_confirmed(&self) -> ApiResult<Vec<ConfirmedLayoutRecord>> {
        Ok(self.store.list(self.session.class_id())?)
    }

    /// 删除已确认布局
    pub fn delete_confirmed(&self, record_id: &str) -> ApiResult<()> {
        if self.store.delete(self.session.class_id(), record_id)? {
            Ok(())
        } else {
            Err(RepositoryError::NotFound {
                entity: "已确认布局".to_string(),
                id: record_id.to_string(),
            }
            .into())
        }
    }

    pub fn undo(&mut self) -> ApiResult<HistoryEntryType> {
        Ok(self.session.undo()?)
    }

    pub fn redo(&mut self) -> ApiResult<HistoryEntryType> {
        Ok(self.session.redo()?)
    }
}
