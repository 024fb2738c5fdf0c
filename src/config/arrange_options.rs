// ==========================================
// 课堂座位编排系统 - 编排选项
// ==========================================
// 职责: 布局类型 + 分区数 + 编排策略 + 避让开关 + 随机种子
// 规则: 分区数必须在布局允许的范围内, 策略必须适用于布局
// 规则: 指定座位总数时必须在 1..=MAX_SEAT_COUNT 内
// ==========================================

use crate::domain::types::{LayoutKind, PairingPolicy};
use crate::engine::constraint::ConstraintFlags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认分区数
pub const DEFAULT_PARTITION_COUNT: u32 = 4;

/// 座位总数上限
pub const MAX_SEAT_COUNT: usize = 500;

// ==========================================
// OptionsError - 选项校验错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("不支持的布局类型: {0}")]
    UnsupportedLayout(String),

    #[error("分区数超出范围: layout={layout}, count={count}, 允许 {min}-{max}")]
    PartitionOutOfRange {
        layout: String,
        count: u32,
        min: u32,
        max: u32,
    },

    #[error("编排策略与布局不匹配: policy={policy}, layout={layout}")]
    PolicyLayoutMismatch { policy: String, layout: String },

    #[error("座位总数超出范围: count={count}, 允许 1-{max}")]
    SeatCountOutOfRange { count: usize, max: usize },
}

// ==========================================
// ArrangeOptions - 编排选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeOptions {
    pub layout: LayoutKind,                // 布局类型
    pub policy: PairingPolicy,             // 编排策略
    pub partition_count: u32,              // 分区 (大组) 数
    #[serde(default)]
    pub seat_count: Option<usize>,         // 座位总数 (缺省为名单人数)
    #[serde(default)]
    pub avoid_prev_seat: bool,             // 避开上次座位
    #[serde(default)]
    pub avoid_prev_partner: bool,          // 避开上次同桌
    #[serde(default)]
    pub seed: Option<u64>,                 // 随机种子 (缺省为系统熵)
}

impl ArrangeOptions {
    /// 校验选项
    ///
    /// # 返回
    /// - Ok(()): 选项合法
    /// - Err(OptionsError): 第一个不合法的项
    pub fn validate(&self) -> Result<(), OptionsError> {
        let bounds = self
            .layout
            .partition_bounds()
            .ok_or_else(|| OptionsError::UnsupportedLayout(self.layout.to_string()))?;

        if !bounds.contains(&self.partition_count) {
            return Err(OptionsError::PartitionOutOfRange {
                layout: self.layout.to_string(),
                count: self.partition_count,
                min: *bounds.start(),
                max: *bounds.end(),
            });
        }

        if !self.policy.supports(self.layout) {
            return Err(OptionsError::PolicyLayoutMismatch {
                policy: self.policy.to_string(),
                layout: self.layout.to_string(),
            });
        }

        if let Some(count) = self.seat_count {
            if !(1..=MAX_SEAT_COUNT).contains(&count) {
                return Err(OptionsError::SeatCountOutOfRange {
                    count,
                    max: MAX_SEAT_COUNT,
                });
            }
        }

        Ok(())
    }

    pub fn constraint_flags(&self) -> ConstraintFlags {
        ConstraintFlags {
            avoid_prev_seat: self.avoid_prev_seat,
            avoid_prev_partner: self.avoid_prev_partner,
        }
    }

    /// 实际座位总数
    pub fn effective_seat_count(&self, roster_len: usize) -> usize {
        self.seat_count.unwrap_or(roster_len)
    }

    /// 布局或座位数是否与另一组选项不同 (需要重建座位拓扑)
    pub fn reshapes(&self, other: &ArrangeOptions) -> bool {
        self.layout != other.layout
            || self.partition_count != other.partition_count
            || self.seat_count != other.seat_count
    }
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        Self {
            layout: LayoutKind::SingleUniform,
            policy: PairingPolicy::Random,
            partition_count: DEFAULT_PARTITION_COUNT,
            seat_count: None,
            avoid_prev_seat: false,
            avoid_prev_partner: false,
            seed: None,
        }
    }
}
