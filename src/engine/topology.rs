// ==========================================
// 课堂座位编排系统 - 座位拓扑构建
// ==========================================
// 职责: 按布局类型和分区数生成座位编号、逻辑坐标与同桌/小组单元
// 规则:
// 1) 座位单元 (单人座/同桌/小组) 在分区间尽量均分, 前面的分区多分一个
// 2) 座位号按 分区 → 排 → 单元内位置 顺序从 1 连续编号
// 3) 末尾不完整单元: >= 2 个座位仍为 PairSlot, 只剩 1 个座位时为单人座
// ==========================================

use crate::domain::seat::{PairSlot, Seat, SeatCell};
use crate::domain::types::{LayoutKind, SeatId};
use std::collections::HashMap;

// ==========================================
// LayoutTopology - 座位拓扑
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTopology {
    layout: LayoutKind,
    partition_count: u32,
    cells: Vec<SeatCell>,
    pair_slots: Vec<PairSlot>,
    single_seats: Vec<SeatId>,
    slot_index: HashMap<SeatId, usize>,
}

impl LayoutTopology {
    /// 生成座位拓扑
    ///
    /// # 参数
    /// - `layout`: 布局类型
    /// - `partition_count`: 分区数 (0 按 1 处理)
    /// - `seat_count`: 座位总数
    pub fn build(layout: LayoutKind, partition_count: u32, seat_count: usize) -> Self {
        let partitions = partition_count.max(1);
        let unit_size = layout.unit_size().max(1);
        let unit_count = seat_count.div_ceil(unit_size);

        let base = unit_count / partitions as usize;
        let extra = unit_count % partitions as usize;

        let mut cells = Vec::with_capacity(seat_count);
        let mut pair_slots = Vec::new();
        let mut single_seats = Vec::new();
        let mut next_id: SeatId = 1;
        let mut remaining = seat_count;

        for p in 1..=partitions {
            let units_here = base + usize::from((p as usize) <= extra);
            for r in 1..=units_here as u32 {
                let seats_in_unit = unit_size.min(remaining);
                let mut unit_ids = Vec::with_capacity(seats_in_unit);
                for c in 1..=seats_in_unit as u32 {
                    cells.push(SeatCell {
                        seat_id: next_id,
                        partition: p,
                        row: r,
                        column: c,
                    });
                    unit_ids.push(next_id);
                    next_id += 1;
                }
                remaining -= seats_in_unit;

                if unit_ids.len() >= 2 {
                    pair_slots.push(PairSlot::new(unit_ids));
                } else {
                    single_seats.extend(unit_ids);
                }
            }
        }

        let slot_index = pair_slots
            .iter()
            .enumerate()
            .flat_map(|(i, slot)| slot.seat_ids.iter().map(move |id| (*id, i)))
            .collect();

        Self {
            layout,
            partition_count: partitions,
            cells,
            pair_slots,
            single_seats,
            slot_index,
        }
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn partition_count(&self) -> u32 {
        self.partition_count
    }

    /// 全部座位坐标 (按座位号升序)
    pub fn cells(&self) -> &[SeatCell] {
        &self.cells
    }

    pub fn pair_slots(&self) -> &[PairSlot] {
        &self.pair_slots
    }

    /// 不属于任何 PairSlot 的座位
    pub fn single_seats(&self) -> &[SeatId] {
        &self.single_seats
    }

    pub fn seat_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, seat_id: SeatId) -> bool {
        seat_id >= 1 && (seat_id as usize) <= self.cells.len()
    }

    pub fn cell(&self, seat_id: SeatId) -> Option<&SeatCell> {
        if self.contains(seat_id) {
            self.cells.get(seat_id as usize - 1)
        } else {
            None
        }
    }

    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.cells.iter().map(|c| c.seat_id)
    }

    /// 座位所属的 PairSlot
    pub fn pair_slot_of(&self, seat_id: SeatId) -> Option<&PairSlot> {
        self.slot_index.get(&seat_id).map(|i| &self.pair_slots[*i])
    }

    /// 各分区座位数 (下标 0 为第 1 分区)
    pub fn partition_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.partition_count as usize];
        for cell in &self.cells {
            sizes[cell.partition as usize - 1] += 1;
        }
        sizes
    }

    /// 生成空座位实体
    pub fn seats(&self) -> Vec<Seat> {
        self.seat_ids().map(Seat::new).collect()
    }
}
