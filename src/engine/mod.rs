mod absence;
mod conflicts;
mod matcher;
mod types;
mod util;

pub use absence::AbsenceRegistry;
pub use matcher::SubstitutionMatcher;
pub use types::{
    AbsenceOutcome, Conflict, ConflictKind, EngineError, EngineOptions, UnfilledReason,
};

use crate::directory::{CredentialStore, TeacherDirectory};
use crate::ledger::{Assignments, SubstitutionLedger};
use crate::model::{AbsenceEvent, SchoolSnapshot, Teacher, TeacherId, Timetable};
use crate::timetable::TimetableStore;
use tracing::info;

/// Moteur de remplacement : possède les stores et expose le contrat public.
///
/// `Send + Sync` : partageable entre threads (`Arc<SubstitutionEngine>`).
pub struct SubstitutionEngine {
    directory: TeacherDirectory,
    timetables: TimetableStore,
    ledger: SubstitutionLedger,
    opts: EngineOptions,
}

impl Default for SubstitutionEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl SubstitutionEngine {
    pub fn new(opts: EngineOptions) -> Self {
        Self::with_directory(TeacherDirectory::new(), opts)
    }

    pub fn with_credentials(credentials: Box<dyn CredentialStore>, opts: EngineOptions) -> Self {
        Self::with_directory(TeacherDirectory::with_credentials(credentials), opts)
    }

    fn with_directory(directory: TeacherDirectory, opts: EngineOptions) -> Self {
        Self {
            directory,
            timetables: TimetableStore::new(),
            ledger: SubstitutionLedger::new(),
            opts,
        }
    }

    /// Recharge un état persisté.
    pub fn from_snapshot(snapshot: SchoolSnapshot, opts: EngineOptions) -> Self {
        let engine = Self::new(opts);
        // un identifiant cité par l'historique ne doit pas être réattribué
        let next_id = snapshot
            .next_teacher_id
            .max(snapshot.highest_teacher_id() + 1);
        engine.directory.restore(snapshot.teachers, next_id);
        engine.timetables.restore(snapshot.timetables);
        engine.ledger.restore(snapshot.absences, snapshot.assignments);
        engine
    }

    pub fn snapshot(&self) -> SchoolSnapshot {
        SchoolSnapshot {
            teachers: self.directory.all_teachers(),
            timetables: self.timetables.snapshot(),
            absences: self.ledger.absences(),
            assignments: self.ledger.all_assignments().iter().cloned().collect(),
            next_teacher_id: self.directory.next_id().get(),
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.opts
    }

    pub fn directory(&self) -> &TeacherDirectory {
        &self.directory
    }
    pub fn timetables(&self) -> &TimetableStore {
        &self.timetables
    }
    pub fn ledger(&self) -> &SubstitutionLedger {
        &self.ledger
    }

    pub fn matcher(&self) -> SubstitutionMatcher<'_> {
        SubstitutionMatcher::new(&self.directory, &self.timetables, &self.ledger)
    }

    pub fn registry(&self) -> AbsenceRegistry<'_> {
        AbsenceRegistry::new(&self.directory, &self.timetables, &self.ledger, self.opts)
    }

    /// Déclare une absence et tente d'assigner un remplaçant.
    pub fn report_absence(
        &self,
        teacher: TeacherId,
        day: u8,
        period: u8,
        class_name: &str,
    ) -> Result<AbsenceOutcome, EngineError> {
        self.registry().report_absence(teacher, day, period, class_name)
    }

    pub fn get_timetable(&self, teacher: TeacherId) -> Result<Timetable, EngineError> {
        self.timetables.get(teacher)
    }

    /// Remplace la semaine entière d'un enseignant connu.
    pub fn set_timetable<R, C>(&self, teacher: TeacherId, rows: R) -> Result<(), EngineError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        if !self.directory.contains(teacher) {
            return Err(EngineError::NotFound(format!("teacher {teacher}")));
        }
        let grid = Timetable::from_rows(rows).map_err(EngineError::Validation)?;
        self.timetables.replace_checked(teacher, grid, |grid| {
            util::ensure_no_cover_overlap(&self.ledger, teacher, grid)
        })?;
        info!(teacher = %teacher, "timetable replaced");
        Ok(())
    }

    pub fn list_substitutions_for(&self, teacher: TeacherId) -> Assignments {
        self.ledger.assignments_for(teacher)
    }

    pub fn list_all_substitutions(&self) -> Assignments {
        self.ledger.all_assignments()
    }

    pub fn absences(&self) -> Vec<AbsenceEvent> {
        self.ledger.absences()
    }

    pub fn add_teacher(&self, username: &str, password: &str) -> Result<TeacherId, EngineError> {
        let id = self.directory.add_teacher(username, password)?;
        info!(teacher = %id, username, "teacher added");
        Ok(id)
    }

    /// Retire l'enseignant et son emploi du temps ; l'historique des remplacements reste.
    ///
    /// La grille part en premier : dès qu'elle n'existe plus, `commit_assignment`
    /// refuse l'enseignant, même si un matcher l'avait déjà retenu.
    pub fn remove_teacher(&self, teacher: TeacherId) -> Result<Teacher, EngineError> {
        if !self.directory.contains(teacher) {
            return Err(EngineError::NotFound(format!("teacher {teacher}")));
        }
        let grid = self.timetables.remove(teacher);
        let removed = match self.directory.remove_teacher(teacher) {
            Ok(removed) => removed,
            Err(err) => {
                if let Some(grid) = grid {
                    self.timetables.restore_one(teacher, grid);
                }
                return Err(err);
            }
        };
        info!(teacher = %teacher, "teacher removed");
        Ok(removed)
    }

    pub fn list_teachers(&self) -> Vec<Teacher> {
        self.directory.all_teachers()
    }

    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        conflicts::detect_conflicts(self)
    }
}
