pub use crate::model::UnfilledReason;
use crate::model::{AbsenceId, AbsenceStatus, TeacherId};
use serde::Serialize;
use thiserror::Error;

/// Options du moteur de remplacement
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Tentatives de commit (sélection + vérification) avant de déclarer `Unfilled`.
    pub max_commit_attempts: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_commit_attempts: 3,
        }
    }
}

impl EngineOptions {
    /// Nombre effectif de tentatives : au moins une.
    pub fn commit_attempts(self) -> u32 {
        self.max_commit_attempts.max(1)
    }
}

/// Résultat terminal d'une déclaration d'absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsenceOutcome {
    pub absence_id: AbsenceId,
    pub status: AbsenceStatus,
    pub substitute: Option<TeacherId>,
    pub reason: Option<UnfilledReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    TeachingOverlap,
    DoubleAssignment,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub teacher: TeacherId,
    pub day: u8,
    pub period: u8,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid slot: day {day} period {period} (expected day 0-5, period 0-7)")]
    InvalidSlot { day: u8, period: u8 },
    #[error("stale request: slot holds {found:?}, client expected {expected:?}")]
    StaleRequest { expected: String, found: String },
    #[error("cannot substitute a free period (day {day} period {period})")]
    CannotSubstituteFreePeriod { day: u8, period: u8 },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("teacher already exists: {0}")]
    DuplicateTeacher(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
