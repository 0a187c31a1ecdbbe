use crate::directory::TeacherDirectory;
use crate::ledger::SubstitutionLedger;
use crate::model::{AbsenceEvent, TeacherId};
use crate::timetable::TimetableStore;
use tracing::debug;

/// Sélection optimiste d'un remplaçant ; le commit revérifie toujours.
pub struct SubstitutionMatcher<'a> {
    directory: &'a TeacherDirectory,
    timetables: &'a TimetableStore,
    ledger: &'a SubstitutionLedger,
}

impl<'a> SubstitutionMatcher<'a> {
    pub fn new(
        directory: &'a TeacherDirectory,
        timetables: &'a TimetableStore,
        ledger: &'a SubstitutionLedger,
    ) -> Self {
        Self {
            directory,
            timetables,
            ledger,
        }
    }

    /// Candidats éligibles, dans l'ordre de préférence (charge puis id croissants).
    pub fn candidates(&self, event: &AbsenceEvent, excluded: &[TeacherId]) -> Vec<TeacherId> {
        let teachers = self.directory.all_teachers();

        // même ordre de verrous que le commit : emplois du temps puis registre
        let timetable = self.timetables.read();
        let ledger = self.ledger.read();

        let mut pool: Vec<(usize, TeacherId)> = teachers
            .iter()
            .map(|t| t.id)
            .filter(|id| *id != event.teacher && !excluded.contains(id))
            .filter(|id| timetable.is_free(*id, event.slot) == Some(true))
            .filter(|id| ledger.has_no_assignment(*id, event.slot))
            .map(|id| (ledger.assignment_count(id), id))
            .collect();
        pool.sort_unstable();

        pool.into_iter().map(|(_, id)| id).collect()
    }

    pub fn select(&self, event: &AbsenceEvent, excluded: &[TeacherId]) -> Option<TeacherId> {
        let chosen = self.candidates(event, excluded).into_iter().next();
        debug!(
            absent = %event.teacher,
            slot = %event.slot,
            excluded = excluded.len(),
            chosen = ?chosen,
            "substitute selection"
        );
        chosen
    }
}
