use super::{Conflict, ConflictKind, SubstitutionEngine};
use crate::model::{Slot, SubstitutionAssignment, TeacherId};
use std::collections::BTreeMap;

/// Audit de l'invariant d'occupation : au plus un rôle par enseignant et par créneau.
pub(super) fn detect_conflicts(engine: &SubstitutionEngine) -> Vec<Conflict> {
    let mut out = Vec::new();
    let timetable = engine.timetables.read();
    let assignments = engine.ledger.all_assignments();

    let mut by_teacher_slot: BTreeMap<(TeacherId, Slot), Vec<&SubstitutionAssignment>> =
        BTreeMap::new();
    for a in &assignments {
        by_teacher_slot.entry((a.substitute, a.slot)).or_default().push(a);
    }

    for ((teacher, slot), held) in by_teacher_slot {
        if timetable.is_free(teacher, slot) == Some(false) {
            out.push(Conflict {
                teacher,
                day: slot.day(),
                period: slot.period(),
                kind: ConflictKind::TeachingOverlap,
            });
        }
        if held.len() > 1 {
            out.push(Conflict {
                teacher,
                day: slot.day(),
                period: slot.period(),
                kind: ConflictKind::DoubleAssignment,
            });
        }
    }

    out
}
