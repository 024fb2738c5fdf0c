// ==========================================
// 课堂座位编排系统 - 编排策略 (Pairing Strategy)
// ==========================================
// 职责: 根据布局拓扑和性别策略, 生成有序的座位单元及每个位置的性别要求
// 输入: LayoutTopology + 男女人数
// 输出: Vec<SeatSlot> (同桌/小组单元在前, 单人座在后)
// 红线: 只给出性别要求, 不挑选具体学生
// ==========================================

use crate::domain::types::{Gender, GenderTag, PairingPolicy, SeatId};
use crate::engine::topology::LayoutTopology;
use serde::{Deserialize, Serialize};

// ==========================================
// SeatSlot - 需要一起填充的座位单元
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSlot {
    pub seat_ids: Vec<SeatId>,
    pub genders: Vec<GenderTag>,
}

impl SeatSlot {
    fn uniform(seat_ids: Vec<SeatId>, tag: GenderTag) -> Self {
        let genders = vec![tag; seat_ids.len()];
        Self { seat_ids, genders }
    }

    /// 是否为同桌/小组单元
    pub fn is_paired(&self) -> bool {
        self.seat_ids.len() >= 2
    }

    pub fn tag_of(&self, seat_id: SeatId) -> Option<GenderTag> {
        self.seat_ids
            .iter()
            .position(|id| *id == seat_id)
            .map(|i| self.genders[i])
    }
}

// ==========================================
// PairingStrategy - 编排策略
// ==========================================
pub struct PairingStrategy {
    policy: PairingPolicy,
}

impl PairingStrategy {
    pub fn new(policy: PairingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PairingPolicy {
        self.policy
    }

    /// 生成座位单元
    ///
    /// 策略与布局不匹配时按随机处理; 男女人数与座位要求不一致时,
    /// 从末尾开始把多出的要求改给另一性别 (或不限), 保证座位不会因性别要求而空出。
    ///
    /// # 参数
    /// - `topology`: 座位拓扑
    /// - `male_count` / `female_count`: 名单中男女人数
    pub fn build_slots(
        &self,
        topology: &LayoutTopology,
        male_count: usize,
        female_count: usize,
    ) -> Vec<SeatSlot> {
        let policy = if self.policy.supports(topology.layout()) {
            self.policy
        } else {
            tracing::warn!(
                policy = %self.policy,
                layout = %topology.layout(),
                "编排策略与布局不匹配, 按随机编排处理"
            );
            PairingPolicy::Random
        };

        let mut slots = match policy {
            PairingPolicy::Random => Self::random_slots(topology),
            PairingPolicy::BasicRow => Self::basic_row_slots(topology),
            PairingPolicy::SymmetricMaleFirst => {
                Self::symmetric_slots(topology, Gender::Male, male_count)
            }
            PairingPolicy::SymmetricFemaleFirst => {
                Self::symmetric_slots(topology, Gender::Female, female_count)
            }
            PairingPolicy::GenderPair => {
                Self::gender_pair_slots(topology, male_count, female_count)
            }
            PairingPolicy::SameGenderPair => Self::same_gender_pair_slots(topology),
            PairingPolicy::GenderMixInGroup => Self::group_mix_slots(topology, male_count),
        };

        if policy != PairingPolicy::Random {
            rebalance(&mut slots, male_count, female_count);
        }
        slots
    }

    // ==========================================
    // 各策略实现
    // ==========================================

    fn random_slots(topology: &LayoutTopology) -> Vec<SeatSlot> {
        topology
            .pair_slots()
            .iter()
            .map(|slot| SeatSlot::uniform(slot.seat_ids.clone(), GenderTag::Any))
            .chain(
                topology
                    .single_seats()
                    .iter()
                    .map(|id| SeatSlot::uniform(vec![*id], GenderTag::Any)),
            )
            .collect()
    }

    /// 基础行列: 奇数分区奇数排为男, 偶数排为女; 偶数分区相反
    fn basic_row_slots(topology: &LayoutTopology) -> Vec<SeatSlot> {
        topology
            .cells()
            .iter()
            .map(|cell| SeatSlot::uniform(vec![cell.seat_id], parity_tag(cell.partition, cell.row)))
            .collect()
    }

    /// 对称: 按分区顺序先排满一种性别, 剩余座位给另一性别
    fn symmetric_slots(topology: &LayoutTopology, first: Gender, first_count: usize) -> Vec<SeatSlot> {
        topology
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let gender = if i < first_count { first } else { first.opposite() };
                SeatSlot::uniform(vec![cell.seat_id], gender.into())
            })
            .collect()
    }

    /// 男女同桌: 依次一男一女, 某一性别用完后剩余同性两两同桌,
    /// 奇数剩余的最后一人优先放在单人座
    fn gender_pair_slots(topology: &LayoutTopology, male_count: usize, female_count: usize) -> Vec<SeatSlot> {
        let mut mixed = male_count.min(female_count);
        let surplus_gender: GenderTag = if male_count >= female_count {
            GenderTag::Male
        } else {
            GenderTag::Female
        };
        let mut surplus = male_count.abs_diff(female_count);
        let reserve_single = surplus % 2 == 1 && !topology.single_seats().is_empty();
        if reserve_single {
            surplus -= 1;
        }

        let mut slots = Vec::with_capacity(topology.pair_slots().len() + topology.single_seats().len());
        for slot in topology.pair_slots() {
            let mut genders = vec![GenderTag::Any; slot.len()];
            if mixed > 0 {
                genders[0] = GenderTag::Male;
                genders[1] = GenderTag::Female;
                mixed -= 1;
            } else if surplus >= 2 {
                genders[0] = surplus_gender;
                genders[1] = surplus_gender;
                surplus -= 2;
            } else if surplus == 1 {
                genders[0] = surplus_gender;
                surplus = 0;
            }
            slots.push(SeatSlot {
                seat_ids: slot.seat_ids.clone(),
                genders,
            });
        }

        for (i, seat_id) in topology.single_seats().iter().enumerate() {
            let tag = if reserve_single && i == 0 {
                surplus_gender
            } else {
                GenderTag::Any
            };
            slots.push(SeatSlot::uniform(vec![*seat_id], tag));
        }
        slots
    }

    /// 同性同桌: 按 分区+排 的奇偶交替男桌/女桌, 相邻排性别块交替
    fn same_gender_pair_slots(topology: &LayoutTopology) -> Vec<SeatSlot> {
        let tag_of = |seat_id: SeatId| {
            topology
                .cell(seat_id)
                .map(|cell| parity_tag(cell.partition, cell.row))
                .unwrap_or(GenderTag::Any)
        };

        topology
            .pair_slots()
            .iter()
            .map(|slot| SeatSlot::uniform(slot.seat_ids.clone(), tag_of(slot.seat_ids[0])))
            .chain(
                topology
                    .single_seats()
                    .iter()
                    .map(|id| SeatSlot::uniform(vec![*id], tag_of(*id))),
            )
            .collect()
    }

    /// 小组男女混合: 男生按整数除法尽量均分到各组, 其余位置给女生, 组内交替排列
    fn group_mix_slots(topology: &LayoutTopology, male_count: usize) -> Vec<SeatSlot> {
        let groups = topology.pair_slots();
        let group_count = groups.len();
        let mut slots = Vec::with_capacity(group_count + topology.single_seats().len());

        if group_count > 0 {
            let base = male_count / group_count;
            let extra = male_count % group_count;
            for (i, group) in groups.iter().enumerate() {
                let males = (base + usize::from(i < extra)).min(group.len());
                let females = group.len() - males;
                slots.push(SeatSlot {
                    seat_ids: group.seat_ids.clone(),
                    genders: interleave(males, females),
                });
            }
        }

        slots.extend(
            topology
                .single_seats()
                .iter()
                .map(|id| SeatSlot::uniform(vec![*id], GenderTag::Any)),
        );
        slots
    }
}

/// 奇偶规则: (分区 + 排) 为偶数时为男, 否则为女 (均从 1 开始)
fn parity_tag(partition: u32, row: u32) -> GenderTag {
    if (partition + row) % 2 == 0 {
        GenderTag::Male
    } else {
        GenderTag::Female
    }
}

/// 组内男女交替排列, 人数多的性别先坐
fn interleave(males: usize, females: usize) -> Vec<GenderTag> {
    let (first, mut n_first, second, mut n_second) = if males >= females {
        (GenderTag::Male, males, GenderTag::Female, females)
    } else {
        (GenderTag::Female, females, GenderTag::Male, males)
    };

    let mut tags = Vec::with_capacity(males + females);
    for j in 0..males + females {
        if (j % 2 == 0 && n_first > 0) || n_second == 0 {
            tags.push(first);
            n_first -= 1;
        } else {
            tags.push(second);
            n_second -= 1;
        }
    }
    tags
}

/// 性别要求与实际人数对齐
///
/// 从末尾开始, 把超出人数的性别要求改给仍有余量的另一性别, 都没有余量时改为不限。
fn rebalance(slots: &mut [SeatSlot], male_count: usize, female_count: usize) {
    let count = |tag: GenderTag| {
        slots
            .iter()
            .flat_map(|s| s.genders.iter())
            .filter(|t| **t == tag)
            .count()
    };
    let tagged_male = count(GenderTag::Male);
    let tagged_female = count(GenderTag::Female);

    let mut excess_male = tagged_male.saturating_sub(male_count);
    let mut excess_female = tagged_female.saturating_sub(female_count);
    if excess_male == 0 && excess_female == 0 {
        return;
    }
    let mut spare_male = male_count.saturating_sub(tagged_male);
    let mut spare_female = female_count.saturating_sub(tagged_female);

    for slot in slots.iter_mut().rev() {
        for tag in slot.genders.iter_mut().rev() {
            match *tag {
                GenderTag::Male if excess_male > 0 => {
                    excess_male -= 1;
                    *tag = if spare_female > 0 {
                        spare_female -= 1;
                        GenderTag::Female
                    } else {
                        GenderTag::Any
                    };
                }
                GenderTag::Female if excess_female > 0 => {
                    excess_female -= 1;
                    *tag = if spare_male > 0 {
                        spare_male -= 1;
                        GenderTag::Male
                    } else {
                        GenderTag::Any
                    };
                }
                _ => {}
            }
        }
    }
}
