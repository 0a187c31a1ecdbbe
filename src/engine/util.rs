use super::EngineError;
use crate::ledger::SubstitutionLedger;
use crate::model::{TeacherId, Timetable};

/// Refuse une grille qui placerait un cours sur un créneau déjà couvert en remplacement.
pub(super) fn ensure_no_cover_overlap(
    ledger: &SubstitutionLedger,
    teacher: TeacherId,
    grid: &Timetable,
) -> Result<(), EngineError> {
    let ledger = ledger.read();
    match grid
        .teaching_slots()
        .find(|slot| !ledger.has_no_assignment(teacher, *slot))
    {
        Some(slot) => Err(EngineError::Validation(format!(
            "teacher {teacher} already covers a substitution on {slot}"
        ))),
        None => Ok(()),
    }
}
