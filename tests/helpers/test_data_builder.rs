// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{TimeZone, Utc};
use seat_arrange::domain::confirmed_layout::{ConfirmedLayoutRecord, LayoutEntry, PairInfo};
use seat_arrange::domain::student::{build_roster, RosterEntry, Student};
use seat_arrange::domain::types::{Gender, SeatId};

// ==========================================
// 名单构建器
// ==========================================

pub struct RosterBuilder {
    entries: Vec<RosterEntry>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// 追加 count 名男生 (姓名: 男生1, 男生2 ...)
    pub fn males(mut self, count: usize) -> Self {
        let start = self.count_of(Gender::Male);
        self.entries.extend(
            (start + 1..=start + count).map(|i| RosterEntry::new(format!("男生{}", i), Gender::Male)),
        );
        self
    }

    /// 追加 count 名女生 (姓名: 女生1, 女生2 ...)
    pub fn females(mut self, count: usize) -> Self {
        let start = self.count_of(Gender::Female);
        self.entries.extend(
            (start + 1..=start + count)
                .map(|i| RosterEntry::new(format!("女生{}", i), Gender::Female)),
        );
        self
    }

    pub fn student(mut self, name: &str, gender: Gender) -> Self {
        self.entries.push(RosterEntry::new(name, gender));
        self
    }

    pub fn fixed(mut self, name: &str, gender: Gender, seat_id: SeatId) -> Self {
        self.entries
            .push(RosterEntry::new(name, gender).with_fixed_seat(seat_id));
        self
    }

    pub fn entries(self) -> Vec<RosterEntry> {
        self.entries
    }

    pub fn students(self) -> Vec<Student> {
        build_roster(&self.entries)
    }

    fn count_of(&self, gender: Gender) -> usize {
        self.entries.iter().filter(|e| e.gender == gender).count()
    }
}

// ==========================================
// 已确认布局构建器
// ==========================================

pub struct ConfirmedRecordBuilder {
    layout: Vec<LayoutEntry>,
    pair_info: Option<Vec<PairInfo>>,
    minutes: i64,
}

impl ConfirmedRecordBuilder {
    /// minutes: 相对固定基准时间的分钟数, 决定记录先后
    pub fn new(minutes: i64) -> Self {
        Self {
            layout: Vec::new(),
            pair_info: None,
            minutes,
        }
    }

    pub fn seat(mut self, seat_id: SeatId, name: &str, gender: Gender) -> Self {
        self.layout.push(LayoutEntry {
            seat_id,
            student_name: name.to_string(),
            gender,
        });
        self
    }

    pub fn pair(mut self, a: &str, b: &str) -> Self {
        self.pair_info.get_or_insert_with(Vec::new).push(PairInfo {
            student1: a.to_string(),
            student2: b.to_string(),
        });
        self
    }

    pub fn build(self) -> ConfirmedLayoutRecord {
        let base = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
        ConfirmedLayoutRecord::new(
            base + chrono::Duration::minutes(self.minutes),
            self.layout,
            self.pair_info,
        )
    }
}
