// ==========================================
// 布局历史 (撤销/重做) 集成测试
// ==========================================
// 测试范围:
// 1. LayoutHistory: 分支丢弃 / 容量上限 / 边界错误
// 2. SeatingSession: 名单、选项、编排、手动调整混合操作后的逐步撤销与重做
// ==========================================

mod helpers;

use helpers::test_data_builder::RosterBuilder;
use seat_arrange::config::ArrangeOptions;
use seat_arrange::domain::history::HistoryEntry;
use seat_arrange::domain::types::{HistoryEntryType, LayoutKind, PairingPolicy};
use seat_arrange::engine::{HistoryError, LayoutHistory, SeatingSession, MAX_HISTORY_ENTRIES};
use serde_json::json;

fn layout_entry(n: usize) -> HistoryEntry {
    HistoryEntry::new(HistoryEntryType::Layout, json!({ "n": n }))
}

// ==========================================
// LayoutHistory
// ==========================================

#[test]
fn test_history_branch_is_discarded_after_undo() {
    println!("\n=== 测试：撤销后新操作丢弃重做分支 ===");

    let mut history = LayoutHistory::new();
    for n in 0..4 {
        history.push(layout_entry(n));
    }
    history.undo().unwrap();
    history.undo().unwrap();
    assert!(history.can_redo());

    history.push(layout_entry(99));
    assert!(!history.can_redo());
    assert_eq!(history.len(), 3);
    assert_eq!(history.current().unwrap().payload, json!({ "n": 99 }));
    assert_eq!(history.redo().unwrap_err(), HistoryError::NothingToRedo);
}

#[test]
fn test_history_capacity_keeps_newest_entries() {
    println!("\n=== 测试：历史超过上限时丢弃最早记录 ===");

    let mut history = LayoutHistory::new();
    for n in 0..MAX_HISTORY_ENTRIES + 20 {
        history.push(layout_entry(n));
    }
    assert_eq!(history.len(), MAX_HISTORY_ENTRIES);

    let mut undone = 0;
    while history.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, MAX_HISTORY_ENTRIES - 1);
    assert_eq!(history.current().unwrap().payload, json!({ "n": 20 }));
    assert_eq!(history.undo().unwrap_err(), HistoryError::NothingToUndo);
}

// ==========================================
// SeatingSession
// ==========================================

#[test]
fn test_session_mixed_operations_undo_redo() {
    println!("\n=== 测试：混合操作逐步撤销/重做 ===");

    let options = ArrangeOptions {
        seed: Some(5),
        ..Default::default()
    };
    let mut session = SeatingSession::new("class-7", options.clone()).unwrap();

    // 1. 导入名单
    session
        .replace_roster(&RosterBuilder::new().males(4).females(4).entries())
        .unwrap();
    // 2. 编排
    session.arrange(&[]).unwrap();
    let first = session.mapping().clone();
    // 3. 交换
    session.swap_seats(1, 8).unwrap();
    let swapped = session.mapping().clone();
    // 4. 改为同桌布局
    let pair = ArrangeOptions {
        layout: LayoutKind::PairUniform,
        policy: PairingPolicy::GenderPair,
        partition_count: 3,
        ..options.clone()
    };
    session.set_options(pair.clone()).unwrap();
    // 5. 再次编排
    session.arrange(&[]).unwrap();
    let second = session.mapping().clone();

    println!("→ 逐步撤销");
    assert_eq!(session.undo().unwrap(), HistoryEntryType::Options);
    assert_eq!(session.options(), &pair);
    assert_eq!(session.mapping(), &swapped);
    assert_eq!(session.undo().unwrap(), HistoryEntryType::Layout);
    assert_eq!(session.options(), &options);
    assert_eq!(session.mapping(), &swapped);
    assert_eq!(session.undo().unwrap(), HistoryEntryType::Layout);
    assert_eq!(session.mapping(), &first);
    assert_eq!(session.undo().unwrap(), HistoryEntryType::StudentInput);
    assert!(session.mapping().is_empty());
    assert_eq!(session.students().len(), 8);
    assert_eq!(session.undo().unwrap(), HistoryEntryType::Layout);
    assert!(session.students().is_empty());
    assert!(!session.can_undo());

    println!("→ 全部重做");
    while session.can_redo() {
        session.redo().unwrap();
    }
    assert_eq!(session.mapping(), &second);
    assert_eq!(session.options(), &pair);
    assert_eq!(session.students().len(), 8);
    println!("✓ 撤销/重做后状态与操作前一致");
}
