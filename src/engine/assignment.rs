// ==========================================
// 课堂座位编排系统 - 座位分配引擎
// ==========================================
// 职责: 学生 + 座位单元 + 固定座位 + 历史约束 → 座位映射
// 规则:
// 1) 男女分池, 各自随机洗牌; 另有一份全体洗牌顺序供"不限"位置使用
// 2) 固定座位学生直接落位, 不参与洗牌池
// 3) 同桌/小组单元先于单人座处理
// 4) 按洗牌顺序取第一个满足约束的候选; 找不到时依次放宽:
//    (a) 保留性别, 忽略历史约束 (b) 改用异性池 (c) 无条件取剩余第一人
// 5) 贪心结束后做一次交换修复, 消除仍可消除的历史约束冲突
// 红线: 约束放宽不是错误; 输入问题以原因码返回, 不中断编排
// ==========================================

use crate::domain::assignment::{AssignmentNotice, AssignmentResult, RealizedPlacements};
use crate::domain::confirmed_layout::{ConfirmedLayoutRecord, LayoutEntry, PairInfo};
use crate::domain::student::Student;
use crate::domain::types::{Gender, GenderTag, SeatId, StudentId};
use crate::engine::constraint::{ConstraintFlags, HistoricalConstraints};
use crate::engine::fixed_seat::FixedSeatRegistry;
use crate::engine::pairing::SeatSlot;
use crate::engine::topology::LayoutTopology;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::instrument;

/// 交换修复的最大轮数
const MAX_REPAIR_PASSES: usize = 3;

// ==========================================
// AssignmentEngine - 座位分配引擎
// ==========================================
pub struct AssignmentEngine {
    flags: ConstraintFlags,
}

/// 单次编排的工作状态
struct Workspace<'a> {
    students: &'a [Student],
    slots: Vec<&'a SeatSlot>,
    slot_of_seat: HashMap<SeatId, usize>,
    constraints: &'a HistoricalConstraints,
    flags: ConstraintFlags,
    placed: BTreeMap<SeatId, usize>,
    used: Vec<bool>,
    pinned: HashSet<SeatId>,
}

impl AssignmentEngine {
    pub fn new(flags: ConstraintFlags) -> Self {
        Self { flags }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行座位分配
    ///
    /// # 参数
    /// - `students`: 学生名单
    /// - `slots`: 编排策略给出的座位单元 (只包含可用座位)
    /// - `fixed_seats`: 固定座位登记表
    /// - `constraints`: 历史约束 (未启用时为空)
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// 座位映射 + 未分配座位 + 未入座学生 + 原因码
    #[instrument(skip_all, fields(
        students = students.len(),
        slots = slots.len(),
        fixed = fixed_seats.len()
    ))]
    pub fn assign<R: Rng + ?Sized>(
        &self,
        students: &[Student],
        slots: &[SeatSlot],
        fixed_seats: &FixedSeatRegistry,
        constraints: &HistoricalConstraints,
        rng: &mut R,
    ) -> AssignmentResult {
        let mut result = AssignmentResult::default();
        let seat_total: usize = slots.iter().map(|s| s.seat_ids.len()).sum();

        if students.is_empty() {
            result.notices.push(AssignmentNotice::EmptyRoster);
        }
        if seat_total == 0 {
            result.notices.push(AssignmentNotice::NoSeats);
            result.unassigned_students = students.iter().map(|s| s.id).collect();
            tracing::warn!("没有可用座位, 编排结果为空");
            return result;
        }
        if students.is_empty() {
            result.unassigned_seats = sorted_seat_ids(slots);
            return result;
        }

        // 1. 男女分池并洗牌; 全体洗牌顺序用于"不限"位置
        let mut male_pool: Vec<usize> = Vec::new();
        let mut female_pool: Vec<usize> = Vec::new();
        for (idx, student) in students.iter().enumerate() {
            match student.gender {
                Gender::Male => male_pool.push(idx),
                Gender::Female => female_pool.push(idx),
            }
        }
        male_pool.shuffle(rng);
        female_pool.shuffle(rng);
        let mut any_order: Vec<usize> = (0..students.len()).collect();
        any_order.shuffle(rng);

        // 2. 同桌/小组单元优先 (稳定排序保持策略给出的顺序)
        let mut ordered: Vec<&SeatSlot> = slots.iter().collect();
        ordered.sort_by_key(|slot| !slot.is_paired());

        let slot_of_seat = ordered
            .iter()
            .enumerate()
            .flat_map(|(i, slot)| slot.seat_ids.iter().map(move |id| (*id, i)))
            .collect();

        let mut ws = Workspace {
            students,
            slots: ordered,
            slot_of_seat,
            constraints,
            flags: self.flags,
            placed: BTreeMap::new(),
            used: vec![false; students.len()],
            pinned: HashSet::new(),
        };

        // 3. 固定座位学生直接落位
        ws.place_fixed(fixed_seats, &mut result.notices);

        // 4. 逐个单元逐个位置贪心填充
        let mut unassigned_seats = Vec::new();
        for slot_idx in 0..ws.slots.len() {
            let slot = ws.slots[slot_idx];
            for (pos, seat_id) in slot.seat_ids.iter().enumerate() {
                if ws.placed.contains_key(seat_id) {
                    continue;
                }
                let tag = slot.genders.get(pos).copied().unwrap_or(GenderTag::Any);
                match ws.pick(*seat_id, tag, &male_pool, &female_pool, &any_order) {
                    Some(idx) => {
                        ws.placed.insert(*seat_id, idx);
                        ws.used[idx] = true;
                    }
                    None => unassigned_seats.push(*seat_id),
                }
            }
        }

        // 5. 交换修复
        let repaired = ws.repair();
        if repaired > 0 {
            tracing::debug!(repaired, "交换修复消除历史约束冲突");
        }

        // 6. 汇总结果
        let empty_after_repair: Vec<SeatId> = sorted_seat_ids(slots)
            .into_iter()
            .filter(|id| !ws.placed.contains_key(id))
            .collect();
        result.unassigned_seats = empty_after_repair;
        result.unassigned_students = students
            .iter()
            .enumerate()
            .filter(|(idx, _)| !ws.used[*idx])
            .map(|(_, s)| s.id)
            .collect();

        if !result.unassigned_students.is_empty() {
            result.notices.push(AssignmentNotice::MoreStudentsThanSeats {
                unseated: result.unassigned_students.len(),
            });
        }

        let (seat_violations, partner_violations) = ws.count_violations();
        if seat_violations > 0 {
            result
                .notices
                .push(AssignmentNotice::PrevSeatRelaxed { count: seat_violations });
        }
        if partner_violations > 0 {
            result
                .notices
                .push(AssignmentNotice::PrevPartnerRelaxed { count: partner_violations });
        }
        let gender_fallbacks = ws.count_gender_mismatches();
        if gender_fallbacks > 0 {
            result
                .notices
                .push(AssignmentNotice::GenderFallback { count: gender_fallbacks });
        }

        result.mapping = ws
            .placed
            .iter()
            .map(|(seat, idx)| (*seat, students[*idx].id))
            .collect();

        tracing::info!(
            assigned = result.mapping.len(),
            unassigned_seats = result.unassigned_seats.len(),
            unassigned_students = result.unassigned_students.len(),
            greedy_empty = unassigned_seats.len(),
            notices = result.notices.len(),
            "座位分配完成"
        );
        result
    }

    // ==========================================
    // 实际落位 (下次编排的约束种子)
    // ==========================================

    /// 汇总实际落位: 每个学生的座位与同桌
    ///
    /// 同桌取自同一 PairSlot 中相邻的两个已入座学生; 小组内按座位顺序两两相邻配对。
    pub fn realize(
        mapping: &BTreeMap<SeatId, StudentId>,
        topology: &LayoutTopology,
        students: &[Student],
    ) -> RealizedPlacements {
        let by_id: HashMap<StudentId, &Student> = students.iter().map(|s| (s.id, s)).collect();
        let mut realized = RealizedPlacements::default();

        for (seat_id, student_id) in mapping {
            if let Some(student) = by_id.get(student_id) {
                realized
                    .seat_by_student
                    .insert(student.name.clone(), *seat_id);
            }
        }

        for slot in topology.pair_slots() {
            let names: Vec<&str> = slot
                .seat_ids
                .iter()
                .filter_map(|seat| mapping.get(seat))
                .filter_map(|sid| by_id.get(sid))
                .map(|s| s.name.as_str())
                .collect();

            for pair in names.windows(2) {
                realized.pairs.push(PairInfo {
                    student1: pair[0].to_string(),
                    student2: pair[1].to_string(),
                });
                realized
                    .partner_by_student
                    .entry(pair[0].to_string())
                    .or_insert_with(|| pair[1].to_string());
                realized
                    .partner_by_student
                    .entry(pair[1].to_string())
                    .or_insert_with(|| pair[0].to_string());
            }
        }

        realized
    }

    /// 将座位映射转换为已确认布局记录 (总是写入 pairInfo)
    pub fn to_confirmed_record(
        mapping: &BTreeMap<SeatId, StudentId>,
        topology: &LayoutTopology,
        students: &[Student],
        confirmed_at: DateTime<Utc>,
    ) -> ConfirmedLayoutRecord {
        let by_id: HashMap<StudentId, &Student> = students.iter().map(|s| (s.id, s)).collect();
        let layout = mapping
            .iter()
            .filter_map(|(seat_id, sid)| {
                by_id.get(sid).map(|s| LayoutEntry {
                    seat_id: *seat_id,
                    student_name: s.name.clone(),
                    gender: s.gender,
                })
            })
            .collect();
        let realized = Self::realize(mapping, topology, students);
        ConfirmedLayoutRecord::new(confirmed_at, layout, Some(realized.pairs))
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new(ConstraintFlags::default())
    }
}

// ==========================================
// Workspace 内部实现
// ==========================================
impl<'a> Workspace<'a> {
    /// 固定座位落位
    ///
    /// - 座位不存在/不可用 → 学生回到洗牌池
    /// - 座位未登记为固定座位 → 学生回到洗牌池
    /// - 同一座位被多人固定 → 后者覆盖, 被挤出的学生回到洗牌池
    /// - 登记为固定但无人认领的座位 → 作为普通座位参与编排
    fn place_fixed(&mut self, registry: &FixedSeatRegistry, notices: &mut Vec<AssignmentNotice>) {
        let students = self.students;
        for (idx, student) in students.iter().enumerate() {
            let Some(seat_id) = student.fixed_seat_id else {
                continue;
            };
            if !self.slot_of_seat.contains_key(&seat_id) {
                notices.push(AssignmentNotice::FixedSeatUnavailable {
                    student_name: student.name.clone(),
                    seat_id,
                });
                continue;
            }
            if !registry.contains(seat_id) {
                notices.push(AssignmentNotice::FixedSeatNotRegistered {
                    student_name: student.name.clone(),
                    seat_id,
                });
                continue;
            }
            if let Some(prev) = self.placed.insert(seat_id, idx) {
                self.used[prev] = false;
                notices.push(AssignmentNotice::FixedSeatConflict {
                    seat_id,
                    displaced: students[prev].name.clone(),
                });
            }
            self.used[idx] = true;
            self.pinned.insert(seat_id);
        }

        for seat_id in registry.all() {
            if self.slot_of_seat.contains_key(&seat_id) && !self.pinned.contains(&seat_id) {
                notices.push(AssignmentNotice::UnclaimedFixedSeat { seat_id });
            }
        }
    }

    /// 按放宽阶梯为座位挑选学生
    fn pick(
        &self,
        seat_id: SeatId,
        tag: GenderTag,
        male_pool: &[usize],
        female_pool: &[usize],
        any_order: &[usize],
    ) -> Option<usize> {
        let free = |idx: &&usize| !self.used[**idx];
        let clean = |idx: &&usize| !self.used[**idx] && !self.violates(**idx, seat_id);

        match tag.gender() {
            Some(gender) => {
                let (own, other) = match gender {
                    Gender::Male => (male_pool, female_pool),
                    Gender::Female => (female_pool, male_pool),
                };
                own.iter()
                    .find(clean)
                    .or_else(|| own.iter().find(free))
                    .or_else(|| other.iter().find(clean))
                    .or_else(|| other.iter().find(free))
                    .copied()
            }
            None => any_order
                .iter()
                .find(clean)
                .or_else(|| any_order.iter().find(free))
                .copied(),
        }
    }

    /// 学生坐在该座位是否违反历史约束 (按当前同单元已入座者判断)
    fn violates(&self, idx: usize, seat_id: SeatId) -> bool {
        self.violates_seat(idx, seat_id) || self.violates_partner(idx, seat_id)
    }

    fn violates_seat(&self, idx: usize, seat_id: SeatId) -> bool {
        self.flags.avoid_prev_seat
            && self
                .constraints
                .is_prev_seat(&self.students[idx].name, seat_id)
    }

    fn violates_partner(&self, idx: usize, seat_id: SeatId) -> bool {
        if !self.flags.avoid_prev_partner {
            return false;
        }
        let Some(slot_idx) = self.slot_of_seat.get(&seat_id) else {
            return false;
        };
        let name = &self.students[idx].name;
        self.slots[*slot_idx]
            .seat_ids
            .iter()
            .filter(|other| **other != seat_id)
            .filter_map(|other| self.placed.get(other))
            .filter(|other_idx| **other_idx != idx)
            .any(|other_idx| {
                self.constraints
                    .were_partners(name, &self.students[*other_idx].name)
            })
    }

    fn tag_of(&self, seat_id: SeatId) -> GenderTag {
        self.slot_of_seat
            .get(&seat_id)
            .and_then(|i| self.slots[*i].tag_of(seat_id))
            .unwrap_or(GenderTag::Any)
    }

    fn fits_gender(&self, idx: usize, seat_id: SeatId) -> bool {
        match self.tag_of(seat_id).gender() {
            Some(g) => self.students[idx].gender == g,
            None => true,
        }
    }

    /// 交换修复
    ///
    /// 对仍违反约束的非固定学生, 寻找另一个非固定座位 (有人则交换, 空座则移入),
    /// 要求交换后双方都不违反约束且性别匹配不变差。优先同性交换。
    ///
    /// # 返回
    /// 成功修复的次数
    fn repair(&mut self) -> usize {
        if !self.flags.avoid_prev_seat && !self.flags.avoid_prev_partner {
            return 0;
        }

        let mut repaired = 0;
        for _ in 0..MAX_REPAIR_PASSES {
            let mut changed = false;
            let seats: Vec<SeatId> = self.placed.keys().copied().collect();

            for seat_a in seats {
                if self.pinned.contains(&seat_a) {
                    continue;
                }
                let Some(&idx_a) = self.placed.get(&seat_a) else {
                    continue;
                };
                if !self.violates(idx_a, seat_a) {
                    continue;
                }
                if let Some(seat_b) = self.find_swap(seat_a, idx_a) {
                    self.swap(seat_a, seat_b);
                    repaired += 1;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }
        repaired
    }

    fn find_swap(&mut self, seat_a: SeatId, idx_a: usize) -> Option<SeatId> {
        let gender_a = self.students[idx_a].gender;
        let mut candidates: Vec<SeatId> = self
            .slot_of_seat
            .keys()
            .copied()
            .filter(|s| *s != seat_a && !self.pinned.contains(s))
            .collect();
        candidates.sort_unstable();
        // 同性优先, 空座其次, 异性最后
        candidates.sort_by_key(|s| match self.placed.get(s) {
            Some(idx) if self.students[*idx].gender == gender_a => 0,
            None => 1,
            Some(_) => 2,
        });

        for seat_b in candidates {
            let idx_b = self.placed.get(&seat_b).copied();
            let fit_before = usize::from(self.fits_gender(idx_a, seat_a))
                + idx_b.map_or(0, |b| usize::from(self.fits_gender(b, seat_b)));
            let fit_after = usize::from(self.fits_gender(idx_a, seat_b))
                + idx_b.map_or(0, |b| usize::from(self.fits_gender(b, seat_a)));
            if fit_after < fit_before {
                continue;
            }

            self.swap(seat_a, seat_b);
            let ok = !self.violates(idx_a, seat_b)
                && idx_b.map_or(true, |b| !self.violates(b, seat_a));
            self.swap(seat_a, seat_b);

            if ok {
                return Some(seat_b);
            }
        }
        None
    }

    /// 交换两个座位的学生 (任一方可以为空)
    fn swap(&mut self, seat_a: SeatId, seat_b: SeatId) {
        let a = self.placed.remove(&seat_a);
        let b = self.placed.remove(&seat_b);
        if let Some(idx) = a {
            self.placed.insert(seat_b, idx);
        }
        if let Some(idx) = b {
            self.placed.insert(seat_a, idx);
        }
    }

    /// (上次座位冲突数, 上次同桌冲突数)
    fn count_violations(&self) -> (usize, usize) {
        let mut seat = 0;
        let mut partner = 0;
        for (seat_id, idx) in &self.placed {
            if self.pinned.contains(seat_id) {
                continue;
            }
            if self.violates_seat(*idx, *seat_id) {
                seat += 1;
            }
            if self.violates_partner(*idx, *seat_id) {
                partner += 1;
            }
        }
        (seat, partner)
    }

    fn count_gender_mismatches(&self) -> usize {
        self.placed
            .iter()
            .filter(|(seat_id, idx)| {
                !self.pinned.contains(*seat_id) && !self.fits_gender(**idx, **seat_id)
            })
            .count()
    }
}

fn sorted_seat_ids(slots: &[SeatSlot]) -> Vec<SeatId> {
    let mut ids: Vec<SeatId> = slots.iter().flat_map(|s| s.seat_ids.iter().copied()).collect();
    ids.sort_unstable();
    ids
}
