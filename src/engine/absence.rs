use super::matcher::SubstitutionMatcher;
use super::types::{AbsenceOutcome, EngineError, EngineOptions, UnfilledReason};
use crate::directory::TeacherDirectory;
use crate::ledger::{SlotGuard, SubstitutionLedger};
use crate::model::{AbsenceEvent, AbsenceStatus, Slot, TeacherId};
use crate::timetable::TimetableStore;
use chrono::Utc;
use tracing::{info, warn};

/// Valide les déclarations d'absence contre l'emploi du temps courant.
pub struct AbsenceRegistry<'a> {
    directory: &'a TeacherDirectory,
    timetables: &'a TimetableStore,
    ledger: &'a SubstitutionLedger,
    opts: EngineOptions,
}

impl<'a> AbsenceRegistry<'a> {
    pub fn new(
        directory: &'a TeacherDirectory,
        timetables: &'a TimetableStore,
        ledger: &'a SubstitutionLedger,
        opts: EngineOptions,
    ) -> Self {
        Self {
            directory,
            timetables,
            ledger,
            opts,
        }
    }

    pub fn report_absence(
        &self,
        teacher: TeacherId,
        day: u8,
        period: u8,
        class_name: &str,
    ) -> Result<AbsenceOutcome, EngineError> {
        let slot = Slot::new(day, period).ok_or(EngineError::InvalidSlot { day, period })?;
        if !self.directory.contains(teacher) {
            return Err(EngineError::NotFound(format!("teacher {teacher}")));
        }

        // select + vérification + écriture forment une seule section critique par créneau
        let guard = self.ledger.lock_slot(slot);

        match self.timetables.occupant_class(teacher, slot)? {
            None => return Err(EngineError::CannotSubstituteFreePeriod { day, period }),
            Some(found) if found != class_name => {
                return Err(EngineError::StaleRequest {
                    expected: class_name.to_string(),
                    found,
                })
            }
            Some(_) => {}
        }

        if let Some(existing) = self.ledger.open_absence(teacher, slot) {
            info!(absence = %existing.id, teacher = %teacher, %slot, "duplicate absence report replayed");
            return Ok(self.outcome_of(&existing));
        }

        let event = AbsenceEvent::pending(teacher, slot, class_name.to_string(), Utc::now());
        let matcher = SubstitutionMatcher::new(self.directory, self.timetables, self.ledger);

        // un nouvel événement n'est écrit que si la situation a changé depuis le dernier `Unfilled`
        if let Some(latest) = self.ledger.latest_absence(teacher, slot) {
            if latest.status == AbsenceStatus::Unfilled && matcher.select(&event, &[]).is_none() {
                info!(absence = %latest.id, teacher = %teacher, %slot, "unfilled absence replayed");
                return Ok(self.outcome_of(&latest));
            }
        }

        Ok(self.settle(&guard, &event, |event, excluded| {
            matcher.select(event, excluded)
        }))
    }

    /// Boucle sélection + commit, bornée par `EngineOptions::commit_attempts`.
    ///
    /// Un candidat refusé au commit est exclu des tentatives suivantes.
    fn settle<S>(
        &self,
        guard: &SlotGuard<'_>,
        event: &AbsenceEvent,
        mut select: S,
    ) -> AbsenceOutcome
    where
        S: FnMut(&AbsenceEvent, &[TeacherId]) -> Option<TeacherId>,
    {
        let mut excluded: Vec<TeacherId> = Vec::new();
        let mut reason = UnfilledReason::NoCandidateAvailable;

        for attempt in 1..=self.opts.commit_attempts() {
            let Some(candidate) = select(event, &excluded) else {
                reason = UnfilledReason::NoCandidateAvailable;
                break;
            };
            match self
                .ledger
                .commit_assignment(guard, self.timetables, event, candidate, Utc::now())
            {
                Ok(assignment) => {
                    info!(
                        absence = %event.id,
                        absent = %event.teacher,
                        substitute = %assignment.substitute,
                        slot = %event.slot,
                        class = %event.class_name,
                        "substitute assigned"
                    );
                    return AbsenceOutcome {
                        absence_id: event.id,
                        status: AbsenceStatus::Assigned,
                        substitute: Some(assignment.substitute),
                        reason: None,
                    };
                }
                Err(conflict) => {
                    warn!(absence = %event.id, candidate = %candidate, attempt, %conflict, "commit conflict, retrying");
                    excluded.push(candidate);
                    reason = UnfilledReason::CommitConflicts;
                }
            }
        }

        let unfilled = self.ledger.record_unfilled(guard, event, reason);
        warn!(absence = %unfilled.id, absent = %event.teacher, slot = %event.slot, reason = reason.label(), "absence left unfilled");
        self.outcome_of(&unfilled)
    }

    fn outcome_of(&self, event: &AbsenceEvent) -> AbsenceOutcome {
        let substitute = match event.status {
            AbsenceStatus::Assigned => self
                .ledger
                .assignment_for_absence(event.id)
                .map(|a| a.substitute),
            _ => None,
        };
        AbsenceOutcome {
            absence_id: event.id,
            status: event.status,
            substitute,
            reason: event.unfilled_reason,
        }
    }
}
