// ==========================================
// 课堂座位编排系统 - 历史约束提取
// ==========================================
// 职责: 从已确认布局中提取每个学生的上次座位与上次同桌
// 输入: 当前班级的已确认布局 (最近的在前) + 避让开关
// 输出: HistoricalConstraints
// 规则:
// 1) 每个学生只取最近一条提到他的记录 (先写入者生效)
// 2) 有 pairInfo 时直接使用; 旧记录没有 pairInfo 时按同座位号/座位号相邻推断
// 3) 缺字段的记录或行跳过, 不中断提取
// ==========================================

use crate::domain::confirmed_layout::{ConfirmedLayoutRecord, LayoutEntry};
use crate::domain::types::SeatId;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 旧记录推断同桌时允许的最大座位号差
pub const LEGACY_ADJACENCY_MAX_GAP: SeatId = 2;

// ==========================================
// ConstraintFlags - 避让开关
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintFlags {
    pub avoid_prev_seat: bool,
    pub avoid_prev_partner: bool,
}

impl ConstraintFlags {
    pub fn any(&self) -> bool {
        self.avoid_prev_seat || self.avoid_prev_partner
    }
}

// ==========================================
// HistoricalConstraints - 历史约束
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalConstraints {
    pub last_seat_by_student: HashMap<String, SeatId>,
    pub last_partner_by_student: HashMap<String, String>,
}

impl HistoricalConstraints {
    pub fn is_empty(&self) -> bool {
        self.last_seat_by_student.is_empty() && self.last_partner_by_student.is_empty()
    }

    /// 该座位是否为学生上次的座位
    pub fn is_prev_seat(&self, name: &str, seat_id: SeatId) -> bool {
        self.last_seat_by_student.get(name) == Some(&seat_id)
    }

    /// 两人是否为上次同桌 (任一方向记录即算)
    pub fn were_partners(&self, a: &str, b: &str) -> bool {
        self.last_partner_by_student.get(a).map(String::as_str) == Some(b)
            || self.last_partner_by_student.get(b).map(String::as_str) == Some(a)
    }
}

// ==========================================
// ConstraintExtractor - 历史约束提取器
// ==========================================
pub struct ConstraintExtractor {
    flags: ConstraintFlags,
}

impl ConstraintExtractor {
    pub fn new(flags: ConstraintFlags) -> Self {
        Self { flags }
    }

    /// 从已确认布局提取约束
    ///
    /// 记录按 timestamp 倒序重新排序后扫描, 调用方顺序不正确时结果仍一致。
    pub fn extract(&self, records: &[ConfirmedLayoutRecord]) -> HistoricalConstraints {
        let mut constraints = HistoricalConstraints::default();
        if !self.flags.any() {
            return constraints;
        }

        let mut ordered: Vec<&ConfirmedLayoutRecord> = records.iter().collect();
        ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let mut seat_seen: HashSet<String> = HashSet::new();
        let mut partner_seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;

        for record in ordered {
            let entries: Vec<&LayoutEntry> = record
                .layout
                .iter()
                .filter(|e| e.seat_id >= 1 && !e.student_name.trim().is_empty())
                .collect();
            if entries.is_empty() {
                tracing::warn!(record_id = %record.id, "已确认布局缺少有效座位行, 已跳过");
                skipped += 1;
                continue;
            }

            if self.flags.avoid_prev_seat {
                for entry in &entries {
                    if seat_seen.insert(entry.student_name.clone()) {
                        constraints
                            .last_seat_by_student
                            .insert(entry.student_name.clone(), entry.seat_id);
                    }
                }
            }

            if self.flags.avoid_prev_partner {
                let partners = match &record.pair_info {
                    Some(pairs) => {
                        let mut local: HashMap<String, String> = HashMap::new();
                        for pair in pairs {
                            let (a, b) = (pair.student1.trim(), pair.student2.trim());
                            if a.is_empty() || b.is_empty() || a == b {
                                continue;
                            }
                            local.entry(a.to_string()).or_insert_with(|| b.to_string());
                            local.entry(b.to_string()).or_insert_with(|| a.to_string());
                        }
                        local
                    }
                    None => infer_legacy_partners(&entries),
                };

                for entry in &entries {
                    if partner_seen.insert(entry.student_name.clone()) {
                        if let Some(partner) = partners.get(&entry.student_name) {
                            constraints
                                .last_partner_by_student
                                .insert(entry.student_name.clone(), partner.clone());
                        }
                    }
                }
            }
        }

        tracing::debug!(
            records = records.len(),
            skipped,
            seats = constraints.last_seat_by_student.len(),
            partners = constraints.last_partner_by_student.len(),
            "历史约束提取完成"
        );
        constraints
    }

    /// 从原始 JSON 记录提取约束
    ///
    /// 无法解析的记录跳过并告警, 单条损坏记录不影响其它记录。
    pub fn extract_from_json(&self, records: &[JsonValue]) -> HistoricalConstraints {
        let parsed: Vec<ConfirmedLayoutRecord> = records
            .iter()
            .filter_map(|raw| match serde_json::from_value::<ConfirmedLayoutRecord>(raw.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "已确认布局记录格式错误, 已跳过");
                    None
                }
            })
            .collect();
        self.extract(&parsed)
    }
}

/// 旧记录同桌推断 (没有 pairInfo)
///
/// 同座位号的两人互为同桌; 否则取同桌位 (2k-1, 2k), 再取座位号差不超过 2 的最近者。
/// 座位编号与实际相邻关系不一致时可能误判, 只用于兼容旧记录。
fn infer_legacy_partners(entries: &[&LayoutEntry]) -> HashMap<String, String> {
    let mut by_seat: BTreeMap<SeatId, Vec<&str>> = BTreeMap::new();
    for entry in entries {
        by_seat
            .entry(entry.seat_id)
            .or_default()
            .push(entry.student_name.as_str());
    }

    let mut partners: HashMap<String, String> = HashMap::new();
    for (seat_id, names) in &by_seat {
        if names.len() >= 2 {
            partners.entry(names[0].to_string()).or_insert_with(|| names[1].to_string());
            partners.entry(names[1].to_string()).or_insert_with(|| names[0].to_string());
            continue;
        }

        // 只接受单人座位作为推断的同桌
        let sole = |seat: Option<SeatId>| {
            seat.and_then(|id| by_seat.get(&id))
                .filter(|n| n.len() == 1)
                .map(|n| n[0])
        };

        let desk_mate = if seat_id % 2 == 1 {
            seat_id.checked_add(1)
        } else {
            seat_id.checked_sub(1)
        };
        let neighbour = sole(desk_mate).or_else(|| {
            (1..=LEGACY_ADJACENCY_MAX_GAP).find_map(|gap| {
                sole(seat_id.checked_sub(gap)).or_else(|| sole(seat_id.checked_add(gap)))
            })
        });

        if let Some(partner) = neighbour {
            partners
                .entry(names[0].to_string())
                .or_insert_with(|| partner.to_string());
        }
    }

    tracing::debug!(pairs = partners.len(), "旧记录按座位号推断同桌");
    partners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::confirmed_layout::PairInfo;
    use crate::domain::types::Gender;

    fn entry(seat_id: SeatId, name: &str) -> LayoutEntry {
        LayoutEntry {
            seat_id,
            student_name: name.to_string(),
            gender: Gender::Male,
        }
    }

    fn record(id: &str, timestamp: i64, layout: Vec<LayoutEntry>, pairs: Option<Vec<(&str, &str)>>) -> ConfirmedLayoutRecord {
        ConfirmedLayoutRecord {
            id: id.to_string(),
            date: "2026-01-01 08:00".to_string(),
            timestamp,
            layout,
            pair_info: pairs.map(|ps| {
                ps.into_iter()
                    .map(|(a, b)| PairInfo {
                        student1: a.to_string(),
                        student2: b.to_string(),
                    })
                    .collect()
            }),
        }
    }

    fn both() -> ConstraintFlags {
        ConstraintFlags {
            avoid_prev_seat: true,
            avoid_prev_partner: true,
        }
    }

    #[test]
    fn test_most_recent_record_wins() {
        let older = record("r1", 100, vec![entry(1, "甲"), entry(2, "乙")], Some(vec![("甲", "乙")]));
        let newer = record("r2", 200, vec![entry(5, "甲"), entry(6, "丙")], Some(vec![("甲", "丙")]));

        // 调用方顺序错误也按时间倒序处理
        let constraints = ConstraintExtractor::new(both()).extract(&[older, newer]);

        assert_eq!(constraints.last_seat_by_student["甲"], 5);
        assert_eq!(constraints.last_seat_by_student["乙"], 2);
        assert_eq!(constraints.last_partner_by_student["甲"], "丙");
        assert_eq!(constraints.last_partner_by_student["乙"], "甲");
        assert!(constraints.were_partners("丙", "甲"));
    }

    #[test]
    fn test_recent_mention_without_partner_blocks_older_partner() {
        let older = record("r1", 100, vec![entry(1, "甲"), entry(2, "乙")], Some(vec![("甲", "乙")]));
        let newer = record("r2", 200, vec![entry(9, "甲")], Some(vec![]));

        let constraints = ConstraintExtractor::new(both()).extract(&[newer, older]);
        assert!(!constraints.last_partner_by_student.contains_key("甲"));
        assert_eq!(constraints.last_partner_by_student["乙"], "甲");
    }

    #[test]
    fn test_disabled_flags_yield_empty_maps() {
        let r = record("r1", 100, vec![entry(1, "甲"), entry(2, "乙")], Some(vec![("甲", "乙")]));

        let none = ConstraintExtractor::new(ConstraintFlags::default()).extract(&[r.clone()]);
        assert!(none.is_empty());

        let seat_only = ConstraintExtractor::new(ConstraintFlags {
            avoid_prev_seat: true,
            avoid_prev_partner: false,
        })
        .extract(&[r]);
        assert_eq!(seat_only.last_seat_by_student.len(), 2);
        assert!(seat_only.last_partner_by_student.is_empty());
    }

    #[test]
    fn test_legacy_record_infers_desk_mates() {
        let legacy = record(
            "old",
            100,
            vec![entry(1, "甲"), entry(2, "乙"), entry(3, "丙"), entry(4, "丁"), entry(7, "戊")],
            None,
        );
        let constraints = ConstraintExtractor::new(both()).extract(&[legacy]);

        assert_eq!(constraints.last_partner_by_student["甲"], "乙");
        assert_eq!(constraints.last_partner_by_student["丙"], "丁");
        assert_eq!(constraints.last_partner_by_student["丁"], "丙");
        // 7 号的同桌位 8 号为空, 5/6/9 号也无人
        assert!(!constraints.last_partner_by_student.contains_key("戊"));
    }

    #[test]
    fn test_legacy_same_seat_co_occupancy() {
        let legacy = record("old", 100, vec![entry(3, "甲"), entry(3, "乙")], None);
        let constraints = ConstraintExtractor::new(both()).extract(&[legacy]);
        assert!(constraints.were_partners("甲", "乙"));
    }

    #[test]
    fn test_legacy_shared_seat_does_not_hide_other_neighbour() {
        // 2 号座位两人同座, 4 号的同桌位 3 号为空; 差 2 的 6 号仍可作为推断同桌
        let legacy = record(
            "old",
            100,
            vec![entry(2, "乙"), entry(2, "丙"), entry(4, "甲"), entry(6, "丁")],
            None,
        );
        let constraints = ConstraintExtractor::new(both()).extract(&[legacy]);

        assert_eq!(constraints.last_partner_by_student["甲"], "丁");
        assert!(constraints.were_partners("乙", "丙"));
    }

    #[test]
    fn test_legacy_extreme_seat_ids_do_not_overflow() {
        let legacy = record(
            "old",
            100,
            vec![entry(SeatId::MAX, "甲"), entry(SeatId::MAX - 1, "乙"), entry(1, "丙")],
            None,
        );
        let constraints = ConstraintExtractor::new(both()).extract(&[legacy]);

        assert_eq!(constraints.last_seat_by_student["甲"], SeatId::MAX);
        assert_eq!(constraints.last_partner_by_student["甲"], "乙");
        assert!(!constraints.last_partner_by_student.contains_key("丙"));
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let good = serde_json::to_value(record("ok", 100, vec![entry(4, "甲")], None)).unwrap();
        let raw = vec![
            serde_json::json!({"id": "bad", "timestamp": 300}),
            serde_json::json!("not a record"),
            good,
        ];

        let constraints = ConstraintExtractor::new(both()).extract_from_json(&raw);
        assert_eq!(constraints.last_seat_by_student["甲"], 4);

        let blank = record("blank", 500, vec![entry(0, "乙"), entry(2, " ")], None);
        let constraints = ConstraintExtractor::new(both()).extract(&[blank]);
        assert!(constraints.is_empty());
    }
}
