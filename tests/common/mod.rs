#![allow(dead_code)]
use cover_my_class::{SubstitutionEngine, TeacherId, DAYS, PERIODS};

/// Semaine libre sauf les cours donnés `(jour, période, classe)`.
pub fn week(classes: &[(usize, usize, &str)]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![String::new(); PERIODS]; DAYS];
    for (day, period, class) in classes {
        rows[*day][*period] = class.to_string();
    }
    rows
}

pub fn teacher(engine: &SubstitutionEngine, name: &str, classes: &[(usize, usize, &str)]) -> TeacherId {
    let id = engine.add_teacher(name, "secret").unwrap();
    engine.set_timetable(id, week(classes)).unwrap();
    id
}
