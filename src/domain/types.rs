// ==========================================
// 课堂座位编排系统 - 领域类型定义
// ==========================================
// 职责: 性别、布局类型、编排策略、历史记录类型等枚举
// 红线: 纯数据,不含编排逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// 座位编号 (1 起始,布局内连续且稳定)
pub type SeatId = u32;

/// 学生编号 (会话内唯一且稳定)
pub type StudentId = u32;

// ==========================================
// 性别 (Gender)
// ==========================================
// 序列化格式: "M" / "F" (与名单导入格式一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// 相反性别
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    /// 从字符串解析性别
    ///
    /// 兼容 "M"/"F"、"男"/"女" 以及大小写
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" | "男" => Some(Gender::Male),
            "F" | "FEMALE" | "女" => Some(Gender::Female),
            _ => None,
        }
    }

    /// 转换为存储用字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 座位性别要求 (Gender Tag)
// ==========================================
// 由编排策略为每个座位位置给出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderTag {
    Male,   // 需要男生
    Female, // 需要女生
    Any,    // 不限
}

impl GenderTag {
    /// 对应的性别 (Any 返回 None)
    pub fn gender(self) -> Option<Gender> {
        match self {
            GenderTag::Male => Some(Gender::Male),
            GenderTag::Female => Some(Gender::Female),
            GenderTag::Any => None,
        }
    }
}

impl From<Gender> for GenderTag {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => GenderTag::Male,
            Gender::Female => GenderTag::Female,
        }
    }
}

impl fmt::Display for GenderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderTag::Male => write!(f, "M"),
            GenderTag::Female => write!(f, "F"),
            GenderTag::Any => write!(f, "ANY"),
        }
    }
}

// ==========================================
// 布局类型 (Layout Kind)
// ==========================================
// single-uniform: 单人座
// pair-uniform:   同桌双人座
// group(size):    小组座 (3-6 人一组)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    SingleUniform,
    PairUniform,
    Group(u8),
}

impl LayoutKind {
    /// 每个座位单元 (桌/组) 的座位数
    pub fn unit_size(&self) -> usize {
        match self {
            LayoutKind::SingleUniform => 1,
            LayoutKind::PairUniform => 2,
            LayoutKind::Group(size) => *size as usize,
        }
    }

    /// 允许的分区 (大组) 数量范围
    ///
    /// 单人 3-6, 同桌 3-5, 3/5 人组 3-5, 4 人组 3-4, 6 人组 2-4
    pub fn partition_bounds(&self) -> Option<RangeInclusive<u32>> {
        match self {
            LayoutKind::SingleUniform => Some(3..=6),
            LayoutKind::PairUniform => Some(3..=5),
            LayoutKind::Group(3) | LayoutKind::Group(5) => Some(3..=5),
            LayoutKind::Group(4) => Some(3..=4),
            LayoutKind::Group(6) => Some(2..=4),
            LayoutKind::Group(_) => None,
        }
    }

    /// 从字符串解析布局类型 ("single-uniform" / "pair-uniform" / "group-N")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single-uniform" | "single" => Some(LayoutKind::SingleUniform),
            "pair-uniform" | "pair" => Some(LayoutKind::PairUniform),
            other => other
                .strip_prefix("group-")
                .and_then(|n| n.parse::<u8>().ok())
                .map(LayoutKind::Group),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::SingleUniform => write!(f, "single-uniform"),
            LayoutKind::PairUniform => write!(f, "pair-uniform"),
            LayoutKind::Group(size) => write!(f, "group-{}", size),
        }
    }
}

// ==========================================
// 编排策略 (Pairing Policy)
// ==========================================
// 单人座子模式: BasicRow / SymmetricMaleFirst / SymmetricFemaleFirst
// 同桌模式:     GenderPair / SameGenderPair
// 小组模式:     GenderMixInGroup
// 通用:         Random (不考虑性别)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingPolicy {
    Random,
    BasicRow,
    SymmetricMaleFirst,
    SymmetricFemaleFirst,
    GenderPair,
    SameGenderPair,
    GenderMixInGroup,
}

impl PairingPolicy {
    /// 判断策略是否适用于指定布局
    pub fn supports(&self, layout: LayoutKind) -> bool {
        match self {
            PairingPolicy::Random => true,
            PairingPolicy::BasicRow
            | PairingPolicy::SymmetricMaleFirst
            | PairingPolicy::SymmetricFemaleFirst => layout == LayoutKind::SingleUniform,
            PairingPolicy::GenderPair | PairingPolicy::SameGenderPair => {
                layout == LayoutKind::PairUniform
            }
            PairingPolicy::GenderMixInGroup => matches!(layout, LayoutKind::Group(_)),
        }
    }

    /// 从字符串解析编排策略 (与 Display 输出一致)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "random" => Some(PairingPolicy::Random),
            "basic-row" => Some(PairingPolicy::BasicRow),
            "symmetric-male-first" => Some(PairingPolicy::SymmetricMaleFirst),
            "symmetric-female-first" => Some(PairingPolicy::SymmetricFemaleFirst),
            "gender-pair" => Some(PairingPolicy::GenderPair),
            "same-gender-pair" => Some(PairingPolicy::SameGenderPair),
            "gender-mix-in-group" => Some(PairingPolicy::GenderMixInGroup),
            _ => None,
        }
    }
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingPolicy::Random => write!(f, "random"),
            PairingPolicy::BasicRow => write!(f, "basic-row"),
            PairingPolicy::SymmetricMaleFirst => write!(f, "symmetric-male-first"),
            PairingPolicy::SymmetricFemaleFirst => write!(f, "symmetric-female-first"),
            PairingPolicy::GenderPair => write!(f, "gender-pair"),
            PairingPolicy::SameGenderPair => write!(f, "same-gender-pair"),
            PairingPolicy::GenderMixInGroup => write!(f, "gender-mix-in-group"),
        }
    }
}

// ==========================================
// 历史记录类型 (History Entry Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryEntryType {
    Layout,       // 座位映射快照
    StudentInput, // 学生名单快照
    Options,      // 编排选项快照
}

impl fmt::Display for HistoryEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryEntryType::Layout => write!(f, "layout"),
            HistoryEntryType::StudentInput => write!(f, "student-input"),
            HistoryEntryType::Options => write!(f, "options"),
        }
    }
}
