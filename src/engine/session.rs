// ==========================================
// 课堂座位编排系统 - 编排会话
// ==========================================
// 职责: 持有一个班级的名单、座位拓扑、固定座位登记表、当前座位表与历史栈
// 规则:
// 1) 每个会改变座位表的操作 (编排/交换/移动/停用座位/固定座位变化) 恰好压入一条 layout 快照
// 2) 替换名单压入 student-input 快照, 修改选项压入 options 快照
// 3) 每条快照都是完整会话状态 (名单 + 选项 + 座位表), 最早条目被淘汰后仍可独立恢复
// 4) 撤销/重做后按游标处的快照重建状态
// 红线: 单写者, 不做任何 I/O; 已确认布局由调用方读写
// ==========================================

use crate::config::arrange_options::{ArrangeOptions, OptionsError};
use crate::domain::assignment::{AssignmentResult, RealizedPlacements};
use crate::domain::confirmed_layout::ConfirmedLayoutRecord;
use crate::domain::history::HistoryEntry;
use crate::domain::seat::Seat;
use crate::domain::student::{build_roster, RosterEntry, Student};
use crate::domain::types::{Gender, HistoryEntryType, SeatId, StudentId};
use crate::engine::assignment::AssignmentEngine;
use crate::engine::constraint::ConstraintExtractor;
use crate::engine::fixed_seat::FixedSeatRegistry;
use crate::engine::history::{HistoryError, LayoutHistory};
use crate::engine::pairing::{PairingStrategy, SeatSlot};
use crate::engine::topology::LayoutTopology;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::instrument;

// ==========================================
// SessionError - 会话操作错误
// ==========================================
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("座位不存在: {0}")]
    UnknownSeat(SeatId),

    #[error("学生不存在: {0}")]
    UnknownStudent(StudentId),

    #[error("固定座位不能手动调整: {0}")]
    SeatFixed(SeatId),

    #[error("座位已停用: {0}")]
    SeatInactive(SeatId),

    #[error("当前没有可确认的座位表")]
    NothingToConfirm,

    #[error("编排选项不合法: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("历史快照序列化失败: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

// ==========================================
// 历史快照内容
// ==========================================

/// 会话快照: 名单 (含学生固定座位) + 选项 + 座位表 + 固定座位 + 停用座位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub students: Vec<Student>,
    pub options: ArrangeOptions,
    pub mapping: BTreeMap<SeatId, StudentId>,
    pub fixed_seats: Vec<SeatId>,
    pub inactive_seats: Vec<SeatId>,
}

// ==========================================
// SeatingSession - 编排会话
// ==========================================
pub struct SeatingSession {
    class_id: String,
    students: Vec<Student>,
    options: ArrangeOptions,
    topology: LayoutTopology,
    registry: FixedSeatRegistry,
    inactive: BTreeSet<SeatId>,
    mapping: BTreeMap<SeatId, StudentId>,
    history: LayoutHistory,
    last_result: Option<AssignmentResult>,
    rng: StdRng,
}

impl SeatingSession {
    /// 创建会话 (空名单), 并压入初始快照
    ///
    /// # 参数
    /// - `class_id`: 班级ID
    /// - `options`: 初始编排选项 (会先校验)
    pub fn new(class_id: impl Into<String>, options: ArrangeOptions) -> SessionResult<Self> {
        options.validate()?;

        let topology = build_topology(&options, 0);
        let mut session = Self {
            class_id: class_id.into(),
            students: Vec::new(),
            rng: make_rng(options.seed),
            options,
            topology,
            registry: FixedSeatRegistry::new(),
            inactive: BTreeSet::new(),
            mapping: BTreeMap::new(),
            history: LayoutHistory::new(),
            last_result: None,
        };
        session.push_layout()?;
        Ok(session)
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn options(&self) -> &ArrangeOptions {
        &self.options
    }

    pub fn topology(&self) -> &LayoutTopology {
        &self.topology
    }

    pub fn registry(&self) -> &FixedSeatRegistry {
        &self.registry
    }

    /// 当前座位表 (座位 → 学生)
    pub fn mapping(&self) -> &BTreeMap<SeatId, StudentId> {
        &self.mapping
    }

    pub fn history(&self) -> &LayoutHistory {
        &self.history
    }

    /// 最近一次编排的完整结果 (撤销/重做后清空)
    pub fn last_result(&self) -> Option<&AssignmentResult> {
        self.last_result.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn student(&self, student_id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn seat_of(&self, student_id: StudentId) -> Option<SeatId> {
        self.mapping
            .iter()
            .find(|(_, sid)| **sid == student_id)
            .map(|(seat, _)| *seat)
    }

    /// 当前未入座的学生
    pub fn unseated_students(&self) -> Vec<StudentId> {
        let seated: BTreeSet<StudentId> = self.mapping.values().copied().collect();
        self.students
            .iter()
            .map(|s| s.id)
            .filter(|id| !seated.contains(id))
            .collect()
    }

    /// 座位实体 (is_fixed 与登记表一致)
    pub fn seats(&self) -> Vec<Seat> {
        let names: HashMap<StudentId, &str> =
            self.students.iter().map(|s| (s.id, s.name.as_str())).collect();

        self.topology
            .seats()
            .into_iter()
            .map(|mut seat| {
                seat.is_fixed = self.registry.contains(seat.id);
                seat.is_active = !self.inactive.contains(&seat.id);
                if let Some(sid) = self.mapping.get(&seat.id) {
                    seat.student_id = Some(*sid);
                    seat.student_name = names.get(sid).map(|n| n.to_string());
                }
                seat
            })
            .collect()
    }

    /// 当前座位表的实际落位
    pub fn realized(&self) -> RealizedPlacements {
        AssignmentEngine::realize(&self.mapping, &self.topology, &self.students)
    }

    // ==========================================
    // 名单与选项
    // ==========================================

    /// 替换名单
    ///
    /// 座位表清空, 固定座位登记表按名单中的固定座位重建。
    ///
    /// # 返回
    /// 有效学生人数
    pub fn replace_roster(&mut self, entries: &[RosterEntry]) -> SessionResult<usize> {
        self.students = build_roster(entries);
        self.rebuild_topology();
        self.mapping.clear();
        self.registry = registry_from_students(&self.students);
        self.last_result = None;

        self.push_snapshot(HistoryEntryType::StudentInput)?;

        tracing::info!(
            class_id = %self.class_id,
            input = entries.len(),
            students = self.students.len(),
            "名单已替换"
        );
        Ok(self.students.len())
    }

    /// 修改编排选项
    ///
    /// 布局/分区/座位数变化时重建座位拓扑, 仍存在的座位保留原学生。
    pub fn set_options(&mut self, options: ArrangeOptions) -> SessionResult<()> {
        options.validate()?;

        if options.seed != self.options.seed {
            self.rng = make_rng(options.seed);
        }
        let reshape = options.reshapes(&self.options);
        self.options = options;
        if reshape {
            self.rebuild_topology();
        }

        self.push_snapshot(HistoryEntryType::Options)?;
        Ok(())
    }

    // ==========================================
    // 编排
    // ==========================================

    /// 执行一次完整编排并压入 layout 快照
    ///
    /// # 参数
    /// - `confirmed`: 该班级的已确认布局 (避让开关关闭时不读取)
    #[instrument(skip(self, confirmed), fields(class_id = %self.class_id, confirmed = confirmed.len()))]
    pub fn arrange(&mut self, confirmed: &[ConfirmedLayoutRecord]) -> SessionResult<AssignmentResult> {
        let flags = self.options.constraint_flags();
        let constraints = ConstraintExtractor::new(flags).extract(confirmed);
        let slots = self.active_slots();

        let result = AssignmentEngine::new(flags).assign(
            &self.students,
            &slots,
            &self.registry,
            &constraints,
            &mut self.rng,
        );

        self.mapping = result.mapping.clone();
        self.last_result = Some(result.clone());
        self.push_layout()?;
        Ok(result)
    }

    /// 编排策略给出的座位单元, 去掉停用座位
    fn active_slots(&self) -> Vec<SeatSlot> {
        let males = self
            .students
            .iter()
            .filter(|s| s.gender == Gender::Male)
            .count();
        let females = self.students.len() - males;

        PairingStrategy::new(self.options.policy)
            .build_slots(&self.topology, males, females)
            .into_iter()
            .filter_map(|slot| {
                let (seat_ids, genders): (Vec<_>, Vec<_>) = slot
                    .seat_ids
                    .into_iter()
                    .zip(slot.genders)
                    .filter(|(id, _)| !self.inactive.contains(id))
                    .unzip();
                if seat_ids.is_empty() {
                    None
                } else {
                    Some(SeatSlot { seat_ids, genders })
                }
            })
            .collect()
    }

    // ==========================================
    // 手动调整
    // ==========================================

    /// 交换两个座位上的学生 (任一方可以为空座)
    ///
    /// # 返回
    /// - Ok(true): 已交换并入栈
    /// - Ok(false): 没有变化 (同一座位或两个空座)
    pub fn swap_seats(&mut self, seat_a: SeatId, seat_b: SeatId) -> SessionResult<bool> {
        self.ensure_movable(seat_a)?;
        self.ensure_movable(seat_b)?;
        if seat_a == seat_b {
            return Ok(false);
        }

        let a = self.mapping.remove(&seat_a);
        let b = self.mapping.remove(&seat_b);
        if a.is_none() && b.is_none() {
            return Ok(false);
        }
        if let Some(sid) = a {
            self.mapping.insert(seat_b, sid);
        }
        if let Some(sid) = b {
            self.mapping.insert(seat_a, sid);
        }

        self.push_layout()?;
        Ok(true)
    }

    /// 把学生移到指定座位
    ///
    /// 目标座位有人时与其交换; 移动的学生原本未入座时, 目标座位上的学生变为未入座。
    pub fn move_student(&mut self, student_id: StudentId, to_seat: SeatId) -> SessionResult<bool> {
        if self.student(student_id).is_none() {
            return Err(SessionError::UnknownStudent(student_id));
        }
        self.ensure_movable(to_seat)?;

        let from_seat = self.seat_of(student_id);
        if from_seat == Some(to_seat) {
            return Ok(false);
        }

        match from_seat {
            Some(from) => {
                if self.registry.contains(from) {
                    return Err(SessionError::SeatFixed(from));
                }
                self.mapping.remove(&from);
                if let Some(displaced) = self.mapping.insert(to_seat, student_id) {
                    self.mapping.insert(from, displaced);
                }
            }
            None => {
                self.mapping.insert(to_seat, student_id);
            }
        }

        self.push_layout()?;
        Ok(true)
    }

    /// 启用/停用座位; 停用时座位上的学生变为未入座
    pub fn set_seat_active(&mut self, seat_id: SeatId, active: bool) -> SessionResult<bool> {
        if !self.topology.contains(seat_id) {
            return Err(SessionError::UnknownSeat(seat_id));
        }

        let changed = if active {
            self.inactive.remove(&seat_id)
        } else {
            self.inactive.insert(seat_id)
        };
        if !changed {
            return Ok(false);
        }
        if !active {
            self.mapping.remove(&seat_id);
        }

        self.push_layout()?;
        Ok(true)
    }

    // ==========================================
    // 固定座位
    // ==========================================

    /// 把学生固定到座位并压入 layout 快照
    ///
    /// 学生原来的固定座位被释放; 其他固定到该座位的学生被取消固定。
    pub fn pin_seat(&mut self, seat_id: SeatId, student_id: StudentId) -> SessionResult<()> {
        if !self.topology.contains(seat_id) {
            return Err(SessionError::UnknownSeat(seat_id));
        }
        let idx = self
            .students
            .iter()
            .position(|s| s.id == student_id)
            .ok_or(SessionError::UnknownStudent(student_id))?;
        if self.students[idx].fixed_seat_id == Some(seat_id) && self.registry.contains(seat_id) {
            return Ok(());
        }

        if let Some(old) = self.students[idx].fixed_seat_id {
            if old != seat_id {
                self.registry.remove(old);
            }
        }
        for student in self.students.iter_mut() {
            if student.id != student_id && student.fixed_seat_id == Some(seat_id) {
                student.fixed_seat_id = None;
            }
        }

        self.students[idx].fixed_seat_id = Some(seat_id);
        self.registry.add(seat_id);
        tracing::debug!(seat_id, student_id, "座位已固定");
        self.push_layout()
    }

    /// 取消座位固定, 有变化时压入 layout 快照
    ///
    /// # 返回
    /// 座位原来是否为固定座位
    pub fn unpin_seat(&mut self, seat_id: SeatId) -> SessionResult<bool> {
        let mut changed = self.registry.contains(seat_id);
        self.registry.remove(seat_id);
        for student in self.students.iter_mut() {
            if student.fixed_seat_id == Some(seat_id) {
                student.fixed_seat_id = None;
                changed = true;
            }
        }
        if changed {
            self.push_layout()?;
        }
        Ok(changed)
    }

    /// 切换座位固定状态
    ///
    /// 固定时绑定座位上的当前学生; 空座只登记为固定座位。
    ///
    /// # 返回
    /// 切换后是否为固定座位
    pub fn toggle_pin(&mut self, seat_id: SeatId) -> SessionResult<bool> {
        if !self.topology.contains(seat_id) {
            return Err(SessionError::UnknownSeat(seat_id));
        }
        if self.registry.contains(seat_id) {
            self.unpin_seat(seat_id)?;
            return Ok(false);
        }
        match self.mapping.get(&seat_id).copied() {
            Some(student_id) => self.pin_seat(seat_id, student_id)?,
            None => {
                self.registry.add(seat_id);
                self.push_layout()?;
            }
        }
        Ok(true)
    }

    // ==========================================
    // 撤销/重做
    // ==========================================

    /// 撤销
    ///
    /// # 返回
    /// 游标当前指向的快照类型
    pub fn undo(&mut self) -> SessionResult<HistoryEntryType> {
        let entry_type = self.history.undo()?.entry_type;
        self.restore()?;
        Ok(entry_type)
    }

    /// 重做
    pub fn redo(&mut self) -> SessionResult<HistoryEntryType> {
        let entry_type = self.history.redo()?.entry_type;
        self.restore()?;
        Ok(entry_type)
    }

    /// 按游标处的快照重建会话状态
    fn restore(&mut self) -> SessionResult<()> {
        let snapshot = match self.history.current() {
            Some(entry) => serde_json::from_value::<SessionSnapshot>(entry.payload.clone())?,
            None => return Ok(()),
        };

        if snapshot.options.seed != self.options.seed {
            self.rng = make_rng(snapshot.options.seed);
        }
        self.students = snapshot.students;
        self.options = snapshot.options;
        self.topology = build_topology(&self.options, self.students.len());
        self.last_result = None;

        let topology = &self.topology;
        self.inactive = snapshot
            .inactive_seats
            .into_iter()
            .filter(|id| topology.contains(*id))
            .collect();
        let inactive = &self.inactive;
        self.mapping = snapshot
            .mapping
            .into_iter()
            .filter(|(seat, _)| topology.contains(*seat) && !inactive.contains(seat))
            .collect();
        self.registry = snapshot.fixed_seats.into_iter().collect();

        tracing::debug!(
            cursor = self.history.cursor(),
            students = self.students.len(),
            seated = self.mapping.len(),
            "已按历史快照恢复"
        );
        Ok(())
    }

    // ==========================================
    // 确认
    // ==========================================

    /// 将当前座位表转换为已确认布局记录
    ///
    /// 会话不保存记录, 由调用方写入 ConfirmedLayoutStore。
    pub fn confirm(&self, confirmed_at: DateTime<Utc>) -> SessionResult<ConfirmedLayoutRecord> {
        if self.mapping.is_empty() {
            return Err(SessionError::NothingToConfirm);
        }
        Ok(AssignmentEngine::to_confirmed_record(
            &self.mapping,
            &self.topology,
            &self.students,
            confirmed_at,
        ))
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn ensure_movable(&self, seat_id: SeatId) -> SessionResult<()> {
        if !self.topology.contains(seat_id) {
            return Err(SessionError::UnknownSeat(seat_id));
        }
        if self.inactive.contains(&seat_id) {
            return Err(SessionError::SeatInactive(seat_id));
        }
        if self.registry.contains(seat_id) {
            return Err(SessionError::SeatFixed(seat_id));
        }
        Ok(())
    }

    fn rebuild_topology(&mut self) {
        self.topology = build_topology(&self.options, self.students.len());
        let topology = &self.topology;
        self.mapping.retain(|seat, _| topology.contains(*seat));
        self.inactive.retain(|seat| topology.contains(*seat));
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            students: self.students.clone(),
            options: self.options.clone(),
            mapping: self.mapping.clone(),
            fixed_seats: self.registry.all().into_iter().collect(),
            inactive_seats: self.inactive.iter().copied().collect(),
        }
    }

    fn push_layout(&mut self) -> SessionResult<()> {
        self.push_snapshot(HistoryEntryType::Layout)
    }

    fn push_snapshot(&mut self, entry_type: HistoryEntryType) -> SessionResult<()> {
        let value = serde_json::to_value(self.snapshot())?;
        self.history.push(HistoryEntry::new(entry_type, value));
        Ok(())
    }
}

fn build_topology(options: &ArrangeOptions, roster_len: usize) -> LayoutTopology {
    LayoutTopology::build(
        options.layout,
        options.partition_count,
        options.effective_seat_count(roster_len),
    )
}

fn registry_from_students(students: &[Student]) -> FixedSeatRegistry {
    students.iter().filter_map(|s| s.fixed_seat_id).collect()
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests;
