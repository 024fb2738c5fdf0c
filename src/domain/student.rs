// ==========================================
// 课堂座位编排系统 - 学生领域模型
// ==========================================
// 生命周期: 名单解析/录入时创建, 名单替换时销毁
// 可变字段: 仅 fixed_seat_id (固定座位)
// ==========================================

use crate::domain::types::{Gender, SeatId, StudentId};
use serde::{Deserialize, Serialize};

/// 姓名最大长度 (字符数)
pub const MAX_NAME_CHARS: usize = 20;

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,                 // 会话内唯一ID
    pub name: String,                  // 姓名 (唯一性由调用方保证)
    pub gender: Gender,                // 性别
    pub fixed_seat_id: Option<SeatId>, // 固定座位
}

impl Student {
    pub fn new(id: StudentId, name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id,
            name: name.into(),
            gender,
            fixed_seat_id: None,
        }
    }

    /// 是否固定座位
    pub fn is_fixed(&self) -> bool {
        self.fixed_seat_id.is_some()
    }
}

// ==========================================
// RosterEntry - 名单输入行
// ==========================================
// 来源: 外部 CSV/Excel 导入或手工录入表格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_seat_id: Option<SeatId>,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            fixed_seat_id: None,
        }
    }

    pub fn with_fixed_seat(mut self, seat_id: SeatId) -> Self {
        self.fixed_seat_id = Some(seat_id);
        self
    }
}

/// 姓名是否合法 (1-20 个可打印字符)
pub fn is_valid_name(name: &str) -> bool {
    let count = name.chars().count();
    count >= 1 && count <= MAX_NAME_CHARS && name.chars().all(|c| !c.is_control())
}

/// 将名单输入转换为学生列表
///
/// 编号按输入顺序从 1 开始分配; 非法姓名的行被跳过并记录告警,
/// 不中断整个名单。
pub fn build_roster(entries: &[RosterEntry]) -> Vec<Student> {
    let mut students = Vec::with_capacity(entries.len());
    let mut next_id: StudentId = 1;

    for entry in entries {
        let name = entry.name.trim();
        if !is_valid_name(name) {
            tracing::warn!(raw_name = %entry.name, "名单行姓名非法, 已跳过");
            continue;
        }
        students.push(Student {
            id: next_id,
            name: name.to_string(),
            gender: entry.gender,
            fixed_seat_id: entry.fixed_seat_id,
        });
        next_id += 1;
    }

    students
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("张三"));
        assert!(is_valid_name(&"a".repeat(20)));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(&"a".repeat(21)));
        assert!(!is_valid_name("a\tb"));
    }

    #[test]
    fn test_build_roster_assigns_sequential_ids() {
        let entries = vec![
            RosterEntry::new("张三", Gender::Male),
            RosterEntry::new("   ", Gender::Female),
            RosterEntry::new("李四", Gender::Female).with_fixed_seat(3),
        ];
        let roster = build_roster(&entries);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].id, 1);
        assert_eq!(roster[1].id, 2);
        assert_eq!(roster[1].name, "李四");
        assert_eq!(roster[1].fixed_seat_id, Some(3));
    }

    #[test]
    fn test_roster_entry_json_shape() {
        let entry: RosterEntry =
            serde_json::from_str(r#"{"name":"王五","gender":"M","fixedSeatId":7}"#).unwrap();
        assert_eq!(entry.fixed_seat_id, Some(7));
        assert_eq!(entry.gender, Gender::Male);
    }
}
