#![forbid(unsafe_code)]
mod common;

use common::teacher;
use cover_my_class::{AbsenceStatus, SubstitutionEngine};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_reports_never_double_book_a_substitute() {
    let engine = SubstitutionEngine::default();
    let absent: Vec<_> = (0..10)
        .map(|i| teacher(&engine, &format!("busy{i}"), &[(2, 3, "Class")]))
        .collect();
    let free: BTreeSet<_> = (0..6)
        .map(|i| teacher(&engine, &format!("free{i}"), &[]))
        .collect();

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = absent
            .iter()
            .map(|id| {
                let engine = &engine;
                scope.spawn(move || engine.report_absence(*id, 2, 3, "Class").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let assigned: Vec<_> = outcomes
        .iter()
        .filter(|o| o.status == AbsenceStatus::Assigned)
        .filter_map(|o| o.substitute)
        .collect();
    let distinct: BTreeSet<_> = assigned.iter().copied().collect();

    assert_eq!(assigned.len(), 6);
    assert_eq!(distinct, free);
    assert_eq!(
        outcomes.iter().filter(|o| o.status == AbsenceStatus::Unfilled).count(),
        4
    );
    assert_eq!(engine.list_all_substitutions().count(), 6);
    assert!(engine.detect_conflicts().is_empty());
}

#[test]
fn concurrent_duplicates_create_a_single_event() {
    let engine = Arc::new(SubstitutionEngine::default());
    let t1 = teacher(&engine, "t1", &[(5, 7, "Sport-12B")]);
    teacher(&engine, "t2", &[]);
    teacher(&engine, "t3", &[]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.report_absence(t1, 5, 7, "Sport-12B").unwrap())
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(outcomes.iter().all(|o| *o == outcomes[0]));
    assert_eq!(outcomes[0].status, AbsenceStatus::Assigned);
    assert_eq!(engine.absences().len(), 1);
    assert_eq!(engine.list_all_substitutions().count(), 1);
}

#[test]
fn reports_on_different_slots_proceed_in_parallel() {
    let engine = SubstitutionEngine::default();
    let cover = teacher(&engine, "cover", &[]);
    // chaque absent enseigne en P1 toute la semaine : seul `cover` est libre
    let first_periods: Vec<(usize, usize, &str)> = (0..6).map(|d| (d, 0, "Class")).collect();
    let absent: Vec<_> = (0..6u8)
        .map(|day| (day, teacher(&engine, &format!("t{day}"), &first_periods)))
        .collect();

    thread::scope(|scope| {
        for (day, id) in &absent {
            let engine = &engine;
            scope.spawn(move || engine.report_absence(*id, *day, 0, "Class").unwrap());
        }
    });

    assert_eq!(engine.list_substitutions_for(cover).count(), 6);
    assert!(engine.detect_conflicts().is_empty());
}
