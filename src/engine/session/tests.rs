use super::*;
use crate::domain::types::{LayoutKind, PairingPolicy};
use crate::engine::history::MAX_HISTORY_ENTRIES;

// ==========================================
// 测试辅助函数
// ==========================================

fn entries(males: usize, females: usize) -> Vec<RosterEntry> {
    let mut list: Vec<RosterEntry> = (1..=males)
        .map(|i| RosterEntry::new(format!("男生{}", i), Gender::Male))
        .collect();
    list.extend((1..=females).map(|i| RosterEntry::new(format!("女生{}", i), Gender::Female)));
    list
}

fn seeded_options() -> ArrangeOptions {
    ArrangeOptions {
        seed: Some(11),
        ..Default::default()
    }
}

fn arranged_session(males: usize, females: usize) -> SeatingSession {
    let mut session = SeatingSession::new("class-1", seeded_options()).unwrap();
    session.replace_roster(&entries(males, females)).unwrap();
    session.arrange(&[]).unwrap();
    session
}

// ==========================================
// 编排与历史
// ==========================================

#[test]
fn test_new_session_has_initial_snapshot() {
    let session = SeatingSession::new("class-1", seeded_options()).unwrap();
    assert_eq!(session.history().len(), 1);
    assert!(!session.can_undo());
    assert!(session.mapping().is_empty());
}

#[test]
fn test_invalid_initial_options_rejected() {
    let options = ArrangeOptions {
        partition_count: 9,
        ..Default::default()
    };
    assert!(matches!(
        SeatingSession::new("class-1", options),
        Err(SessionError::InvalidOptions(_))
    ));
}

#[test]
fn test_oversized_seat_count_rejected() {
    let options = ArrangeOptions {
        seat_count: Some(usize::MAX),
        ..Default::default()
    };
    assert!(matches!(
        SeatingSession::new("class-1", options),
        Err(SessionError::InvalidOptions(OptionsError::SeatCountOutOfRange { .. }))
    ));
}

#[test]
fn test_arrange_undo_redo() {
    let mut session = arranged_session(4, 4);
    assert_eq!(session.history().len(), 3);
    let arranged = session.mapping().clone();
    assert_eq!(arranged.len(), 8);

    assert_eq!(session.undo().unwrap(), HistoryEntryType::StudentInput);
    assert!(session.mapping().is_empty());
    assert_eq!(session.students().len(), 8);

    assert_eq!(session.redo().unwrap(), HistoryEntryType::Layout);
    assert_eq!(session.mapping(), &arranged);
    assert!(matches!(
        session.redo(),
        Err(SessionError::History(HistoryError::NothingToRedo))
    ));
}

#[test]
fn test_undo_at_start_reports_error() {
    let mut session = SeatingSession::new("class-1", seeded_options()).unwrap();
    assert!(matches!(
        session.undo(),
        Err(SessionError::History(HistoryError::NothingToUndo))
    ));
}

#[test]
fn test_undo_after_history_eviction_keeps_roster_and_options() {
    let options = ArrangeOptions {
        layout: LayoutKind::PairUniform,
        policy: PairingPolicy::GenderPair,
        partition_count: 3,
        ..seeded_options()
    };
    let mut session = SeatingSession::new("class-1", options.clone()).unwrap();
    session.replace_roster(&entries(3, 3)).unwrap();

    for _ in 0..MAX_HISTORY_ENTRIES + 1 {
        session.arrange(&[]).unwrap();
    }
    assert_eq!(session.history().len(), MAX_HISTORY_ENTRIES);
    assert!(session.history().latest_of(HistoryEntryType::StudentInput).is_none());

    session.undo().unwrap();
    assert_eq!(session.students().len(), 6);
    assert_eq!(session.options(), &options);
    assert_eq!(session.mapping().len(), 6);
    assert_eq!(session.topology().pair_slots().len(), 3);
}

#[test]
fn test_undo_roster_replacement_restores_previous_layout() {
    let mut session = arranged_session(3, 3);
    let first_mapping = session.mapping().clone();

    session.replace_roster(&entries(1, 1)).unwrap();
    assert_eq!(session.students().len(), 2);
    assert!(session.mapping().is_empty());

    session.undo().unwrap();
    assert_eq!(session.students().len(), 6);
    assert_eq!(session.mapping(), &first_mapping);
    assert_eq!(session.topology().seat_count(), 6);
}

// ==========================================
// 手动调整
// ==========================================

#[test]
fn test_swap_seats_pushes_and_undoes() {
    let mut session = arranged_session(4, 4);
    let before = session.mapping().clone();

    assert!(session.swap_seats(1, 2).unwrap());
    assert_eq!(session.mapping().get(&1), before.get(&2));
    assert_eq!(session.mapping().get(&2), before.get(&1));
    assert_eq!(session.history().len(), 4);

    session.undo().unwrap();
    assert_eq!(session.mapping(), &before);

    assert!(!session.swap_seats(3, 3).unwrap());
    assert!(matches!(session.swap_seats(1, 99), Err(SessionError::UnknownSeat(99))));
}

#[test]
fn test_move_student_to_empty_and_occupied_seat() {
    let mut session = SeatingSession::new(
        "class-1",
        ArrangeOptions {
            seat_count: Some(10),
            ..seeded_options()
        },
    )
    .unwrap();
    session.replace_roster(&entries(4, 4)).unwrap();
    session.arrange(&[]).unwrap();

    let empty_seat = session
        .seats()
        .iter()
        .find(|s| !s.is_occupied())
        .map(|s| s.id)
        .unwrap();
    let old_seat = session.seat_of(1).unwrap();

    assert!(session.move_student(1, empty_seat).unwrap());
    assert_eq!(session.seat_of(1), Some(empty_seat));
    assert!(session.mapping().get(&old_seat).is_none());

    let other_seat = session.seat_of(2).unwrap();
    assert!(session.move_student(1, other_seat).unwrap());
    assert_eq!(session.seat_of(1), Some(other_seat));
    assert_eq!(session.seat_of(2), Some(empty_seat));

    assert!(matches!(
        session.move_student(99, 1),
        Err(SessionError::UnknownStudent(99))
    ));
}

#[test]
fn test_deactivated_seat_is_emptied_and_skipped() {
    let mut session = SeatingSession::new(
        "class-1",
        ArrangeOptions {
            seat_count: Some(9),
            ..seeded_options()
        },
    )
    .unwrap();
    session.replace_roster(&entries(4, 4)).unwrap();
    session.arrange(&[]).unwrap();

    let occupied = *session.mapping().keys().next().unwrap();
    assert!(session.set_seat_active(occupied, false).unwrap());
    assert!(session.mapping().get(&occupied).is_none());
    assert!(!session.set_seat_active(occupied, false).unwrap());

    let result = session.arrange(&[]).unwrap();
    assert!(result.student_at(occupied).is_none());
    assert_eq!(result.mapping.len(), 8);
    assert!(matches!(
        session.swap_seats(occupied, 1),
        Err(SessionError::SeatInactive(_))
    ));

    session.undo().unwrap();
    session.undo().unwrap();
    assert!(session.seats().iter().all(|s| s.is_active));
}

// ==========================================
// 固定座位
// ==========================================

#[test]
fn test_pin_seat_keeps_registry_and_student_in_sync() {
    let mut session = arranged_session(4, 4);

    session.pin_seat(3, 1).unwrap();
    assert!(session.registry().contains(3));
    assert_eq!(session.student(1).unwrap().fixed_seat_id, Some(3));
    assert!(session.seats().iter().all(|s| s.is_fixed == session.registry().contains(s.id)));

    assert!(matches!(session.swap_seats(3, 4), Err(SessionError::SeatFixed(3))));

    let result = session.arrange(&[]).unwrap();
    assert_eq!(result.student_at(3), Some(1));

    // 改固定到另一座位, 原座位释放
    session.pin_seat(5, 1).unwrap();
    assert!(!session.registry().contains(3));
    assert!(session.registry().contains(5));

    assert!(session.unpin_seat(5).unwrap());
    assert!(session.student(1).unwrap().fixed_seat_id.is_none());
    assert!(session.registry().is_empty());
}

#[test]
fn test_toggle_pin_binds_current_occupant() {
    let mut session = arranged_session(2, 2);
    let occupant = *session.mapping().get(&2).unwrap();

    assert!(session.toggle_pin(2).unwrap());
    assert_eq!(session.student(occupant).unwrap().fixed_seat_id, Some(2));

    assert!(!session.toggle_pin(2).unwrap());
    assert!(session.student(occupant).unwrap().fixed_seat_id.is_none());
    assert!(!session.registry().contains(2));
}

#[test]
fn test_pin_changes_are_undoable() {
    let mut session = arranged_session(3, 3);
    let len = session.history().len();

    session.pin_seat(1, 2).unwrap();
    assert_eq!(session.history().len(), len + 1);
    // 重复固定到同一座位不入栈
    session.pin_seat(1, 2).unwrap();
    assert_eq!(session.history().len(), len + 1);

    session.arrange(&[]).unwrap();
    assert!(session.unpin_seat(1).unwrap());
    assert!(!session.unpin_seat(1).unwrap());
    session.swap_seats(1, 2).unwrap();

    session.undo().unwrap();
    assert!(!session.registry().contains(1));
    assert!(session.student(2).unwrap().fixed_seat_id.is_none());

    session.undo().unwrap();
    assert!(session.registry().contains(1));
    assert_eq!(session.student(2).unwrap().fixed_seat_id, Some(1));
}

#[test]
fn test_toggle_pin_survives_undo_redo() {
    let mut session = arranged_session(3, 3);
    session.arrange(&[]).unwrap();
    let occupant = *session.mapping().get(&1).unwrap();

    assert!(session.toggle_pin(1).unwrap());
    session.undo().unwrap();
    assert!(!session.registry().contains(1));

    session.redo().unwrap();
    assert!(session.registry().contains(1));
    assert_eq!(session.student(occupant).unwrap().fixed_seat_id, Some(1));
    assert!(session.seats().iter().all(|s| s.is_fixed == session.registry().contains(s.id)));
}

// ==========================================
// 选项
// ==========================================

#[test]
fn test_set_options_validates_and_undoes() {
    let mut session = arranged_session(4, 4);
    let len = session.history().len();

    let invalid = ArrangeOptions {
        layout: LayoutKind::PairUniform,
        policy: PairingPolicy::BasicRow,
        partition_count: 3,
        ..seeded_options()
    };
    assert!(matches!(
        session.set_options(invalid),
        Err(SessionError::InvalidOptions(_))
    ));
    assert_eq!(session.history().len(), len);

    let pair = ArrangeOptions {
        layout: LayoutKind::PairUniform,
        policy: PairingPolicy::GenderPair,
        partition_count: 3,
        ..seeded_options()
    };
    session.set_options(pair.clone()).unwrap();
    assert_eq!(session.options(), &pair);
    assert_eq!(session.topology().pair_slots().len(), 4);

    assert_eq!(session.undo().unwrap(), HistoryEntryType::Layout);
    assert_eq!(session.options(), &seeded_options());
    assert!(session.topology().pair_slots().is_empty());
}

// ==========================================
// 确认与历史避让
// ==========================================

#[test]
fn test_confirm_requires_layout() {
    let session = SeatingSession::new("class-1", seeded_options()).unwrap();
    assert!(matches!(
        session.confirm(Utc::now()),
        Err(SessionError::NothingToConfirm)
    ));
}

#[test]
fn test_confirm_pair_layout_records_partners() {
    let mut session = SeatingSession::new(
        "class-1",
        ArrangeOptions {
            layout: LayoutKind::PairUniform,
            policy: PairingPolicy::GenderPair,
            partition_count: 3,
            ..seeded_options()
        },
    )
    .unwrap();
    session.replace_roster(&entries(3, 3)).unwrap();
    session.arrange(&[]).unwrap();

    let record = session.confirm(Utc::now()).unwrap();
    assert_eq!(record.layout.len(), 6);
    assert_eq!(record.pair_info.as_ref().unwrap().len(), 3);
    assert_eq!(session.realized().partner_by_student.len(), 6);
}

#[test]
fn test_second_arrange_avoids_confirmed_seats() {
    let mut session = SeatingSession::new(
        "class-1",
        ArrangeOptions {
            avoid_prev_seat: true,
            ..seeded_options()
        },
    )
    .unwrap();
    session.replace_roster(&entries(5, 5)).unwrap();
    session.arrange(&[]).unwrap();
    let record = session.confirm(Utc::now()).unwrap();
    let previous = session.mapping().clone();

    let result = session.arrange(&[record]).unwrap();
    for (seat, student) in &result.mapping {
        assert_ne!(previous.get(seat), Some(student));
    }
    assert!(!result.has_notice("PREV_SEAT_RELAXED"));
}
