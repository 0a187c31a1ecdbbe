#![forbid(unsafe_code)]
//! Cover My Class — moteur d'assignation de remplaçants pour les emplois du temps scolaires.
//!
//! - Grille hebdomadaire fixe 6 jours × 8 périodes par enseignant.
//! - Sélection déterministe : charge de remplacement puis identifiant croissants.
//! - Commit revérifié dans une section critique par créneau (pas de double réservation).
//! - Stockage fichier (JSON) et import/export CSV en dehors du cœur.

pub mod directory;
pub mod engine;
pub mod io;
pub mod ledger;
pub mod model;
pub mod storage;
pub mod timetable;

pub use directory::{CredentialStore, DiscardCredentials, TeacherDirectory};
pub use engine::{
    AbsenceOutcome, AbsenceRegistry, Conflict, ConflictKind, EngineError, EngineOptions,
    SubstitutionEngine, SubstitutionMatcher, UnfilledReason,
};
pub use ledger::{Assignments, CommitConflict, SubstitutionLedger};
pub use model::{
    AbsenceEvent, AbsenceId, AbsenceStatus, AssignmentId, SchoolSnapshot, Slot,
    SubstitutionAssignment, Teacher, TeacherId, Timetable, DAYS, PERIODS,
};
pub use storage::{JsonStorage, Storage};
pub use timetable::TimetableStore;
