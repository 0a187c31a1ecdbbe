use crate::model::{
    AbsenceEvent, AbsenceId, AbsenceStatus, AssignmentId, Slot, SubstitutionAssignment, TeacherId,
    UnfilledReason, DAYS, PERIODS,
};
use crate::timetable::TimetableStore;
use chrono::{DateTime, Utc};
use std::slice;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use thiserror::Error;

/// Raison d'un refus au moment du commit ; aucune écriture n'a eu lieu.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitConflict {
    #[error("slot guard does not cover {0}")]
    WrongSlot(Slot),
    #[error("absence event is not pending")]
    NotPending,
    #[error("substitute is the absent teacher")]
    SameTeacher,
    #[error("substitute {0} is teaching or has no timetable")]
    NotFree(TeacherId),
    #[error("substitute {0} already covers this slot")]
    AlreadyCovering(TeacherId),
    #[error("absence already resolved for this slot")]
    AlreadyResolved,
}

/// Section critique d'un créneau (jour, période).
pub struct SlotGuard<'a> {
    slot: Slot,
    _lock: MutexGuard<'a, ()>,
}

impl SlotGuard<'_> {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    absences: Vec<AbsenceEvent>,
    // copy-on-write : les séquences renvoyées restent valides sans verrou
    assignments: Arc<Vec<SubstitutionAssignment>>,
}

impl LedgerState {
    fn has_no_assignment(&self, teacher: TeacherId, slot: Slot) -> bool {
        !self
            .assignments
            .iter()
            .any(|a| a.substitute == teacher && a.slot == slot)
    }

    fn open_absence(&self, teacher: TeacherId, slot: Slot) -> Option<&AbsenceEvent> {
        self.absences.iter().rev().find(|e| {
            e.teacher == teacher
                && e.slot == slot
                && matches!(e.status, AbsenceStatus::Pending | AbsenceStatus::Assigned)
        })
    }

    fn latest_absence(&self, teacher: TeacherId, slot: Slot) -> Option<&AbsenceEvent> {
        self.absences
            .iter()
            .rev()
            .find(|e| e.teacher == teacher && e.slot == slot)
    }
}

/// Vue cohérente du registre en lecture.
pub struct LedgerView<'a> {
    state: RwLockReadGuard<'a, LedgerState>,
}

impl LedgerView<'_> {
    pub fn has_no_assignment(&self, teacher: TeacherId, slot: Slot) -> bool {
        self.state.has_no_assignment(teacher, slot)
    }

    pub fn assignment_count(&self, teacher: TeacherId) -> usize {
        self.state
            .assignments
            .iter()
            .filter(|a| a.substitute == teacher)
            .count()
    }
}

/// Registre des remplacements : source de vérité des engagements.
#[derive(Debug)]
pub struct SubstitutionLedger {
    slots: Vec<Mutex<()>>,
    state: RwLock<LedgerState>,
}

impl Default for SubstitutionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstitutionLedger {
    pub fn new() -> Self {
        Self {
            slots: (0..DAYS * PERIODS).map(|_| Mutex::new(())).collect(),
            state: RwLock::new(LedgerState::default()),
        }
    }

    pub(crate) fn restore(
        &self,
        absences: Vec<AbsenceEvent>,
        assignments: Vec<SubstitutionAssignment>,
    ) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.absences = absences;
        state.assignments = Arc::new(assignments);
    }

    /// Bloque le créneau ; les commits sur d'autres créneaux restent concurrents.
    pub fn lock_slot(&self, slot: Slot) -> SlotGuard<'_> {
        let lock = self.slots[slot.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        SlotGuard { slot, _lock: lock }
    }

    pub fn read(&self) -> LedgerView<'_> {
        LedgerView {
            state: self.state.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn has_no_assignment(&self, teacher: TeacherId, slot: Slot) -> bool {
        self.read().has_no_assignment(teacher, slot)
    }

    /// Absence Pending/Assigned déjà enregistrée pour (enseignant, créneau).
    pub fn open_absence(&self, teacher: TeacherId, slot: Slot) -> Option<AbsenceEvent> {
        self.read().state.open_absence(teacher, slot).cloned()
    }

    /// Dernier événement enregistré pour (enseignant, créneau), quel que soit son état.
    pub fn latest_absence(&self, teacher: TeacherId, slot: Slot) -> Option<AbsenceEvent> {
        self.read().state.latest_absence(teacher, slot).cloned()
    }

    pub fn assignment_for_absence(&self, absence: AbsenceId) -> Option<SubstitutionAssignment> {
        self.read()
            .state
            .assignments
            .iter()
            .find(|a| a.absence == absence)
            .cloned()
    }

    /// Revérifie puis écrit l'affectation et l'absence `Assigned` en une seule étape.
    pub fn commit_assignment(
        &self,
        guard: &SlotGuard<'_>,
        timetables: &TimetableStore,
        event: &AbsenceEvent,
        substitute: TeacherId,
        now: DateTime<Utc>,
    ) -> Result<SubstitutionAssignment, CommitConflict> {
        if guard.slot != event.slot {
            return Err(CommitConflict::WrongSlot(event.slot));
        }
        if event.status != AbsenceStatus::Pending {
            return Err(CommitConflict::NotPending);
        }
        if substitute == event.teacher {
            return Err(CommitConflict::SameTeacher);
        }

        // ordre des verrous : créneau → emplois du temps → registre
        let timetable = timetables.read();
        if timetable.is_free(substitute, event.slot) != Some(true) {
            return Err(CommitConflict::NotFree(substitute));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.has_no_assignment(substitute, event.slot) {
            return Err(CommitConflict::AlreadyCovering(substitute));
        }
        if state.open_absence(event.teacher, event.slot).is_some() {
            return Err(CommitConflict::AlreadyResolved);
        }

        let assignment = SubstitutionAssignment {
            id: AssignmentId::random(),
            absence: event.id,
            substitute,
            slot: event.slot,
            class_name: event.class_name.clone(),
            created_at: now,
        };
        Arc::make_mut(&mut state.assignments).push(assignment.clone());
        state
            .absences
            .push(event.with_status(AbsenceStatus::Assigned));
        Ok(assignment)
    }

    /// Enregistre l'absence comme non pourvue (état terminal).
    pub fn record_unfilled(
        &self,
        guard: &SlotGuard<'_>,
        event: &AbsenceEvent,
        reason: UnfilledReason,
    ) -> AbsenceEvent {
        debug_assert_eq!(guard.slot, event.slot);
        let mut unfilled = event.with_status(AbsenceStatus::Unfilled);
        unfilled.unfilled_reason = Some(reason);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.absences.push(unfilled.clone());
        unfilled
    }

    pub fn absences(&self) -> Vec<AbsenceEvent> {
        self.read().state.absences.clone()
    }

    pub fn assignments_for(&self, teacher: TeacherId) -> Assignments {
        Assignments {
            items: Arc::clone(&self.read().state.assignments),
            teacher: Some(teacher),
        }
    }

    pub fn all_assignments(&self) -> Assignments {
        Assignments {
            items: Arc::clone(&self.read().state.assignments),
            teacher: None,
        }
    }
}

/// Séquence paresseuse et rejouable d'affectations (instantané du registre).
#[derive(Debug, Clone)]
pub struct Assignments {
    items: Arc<Vec<SubstitutionAssignment>>,
    teacher: Option<TeacherId>,
}

impl Assignments {
    pub fn iter(&self) -> AssignmentsIter<'_> {
        AssignmentsIter {
            inner: self.items.iter(),
            teacher: self.teacher,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a SubstitutionAssignment;
    type IntoIter = AssignmentsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct AssignmentsIter<'a> {
    inner: slice::Iter<'a, SubstitutionAssignment>,
    teacher: Option<TeacherId>,
}

impl<'a> Iterator for AssignmentsIter<'a> {
    type Item = &'a SubstitutionAssignment;

    fn next(&mut self) -> Option<Self::Item> {
        let teacher = self.teacher;
        self.inner
            .find(|a| teacher.map_or(true, |t| a.substitute == t))
    }
}
