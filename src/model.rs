use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Nombre de jours ouvrés dans la grille (lundi → samedi).
pub const DAYS: usize = 6;
/// Nombre de périodes par jour.
pub const PERIODS: usize = 8;

/// Identifiant fort pour Teacher (attribué par ordre croissant)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeacherId(u32);

impl TeacherId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Enseignant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub username: String,
    pub display_name: String,
}

/// Créneau (jour, période), indices à partir de zéro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Slot {
    day: u8,
    period: u8,
}

impl Slot {
    /// Retourne `None` si le créneau sort de la grille 6×8.
    pub fn new(day: u8, period: u8) -> Option<Self> {
        if usize::from(day) < DAYS && usize::from(period) < PERIODS {
            Some(Self { day, period })
        } else {
            None
        }
    }

    pub fn day(self) -> u8 {
        self.day
    }
    pub fn period(self) -> u8 {
        self.period
    }

    /// Position linéaire dans `[0, DAYS * PERIODS)`.
    pub fn index(self) -> usize {
        usize::from(self.day) * PERIODS + usize::from(self.period)
    }

    /// Tous les créneaux de la semaine, dans l'ordre jour puis période.
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..DAYS as u8).flat_map(|day| (0..PERIODS as u8).map(move |period| Slot { day, period }))
    }
}

impl TryFrom<(u8, u8)> for Slot {
    type Error = String;

    fn try_from((day, period): (u8, u8)) -> Result<Self, Self::Error> {
        Slot::new(day, period).ok_or_else(|| format!("slot out of grid: ({day}, {period})"))
    }
}

impl From<Slot> for (u8, u8) {
    fn from(slot: Slot) -> Self {
        (slot.day, slot.period)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} period {}", self.day, self.period)
    }
}

/// Emploi du temps hebdomadaire d'un enseignant : grille fixe 6×8.
///
/// Une cellule vide (après trim) ou valant `free` (casse ignorée) est libre.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timetable {
    cells: [[String; PERIODS]; DAYS],
}

impl Timetable {
    /// Construit une grille depuis des lignes brutes ; `Err` décrit le défaut de forme.
    pub fn from_rows<R, C>(rows: R) -> Result<Self, String>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut grid = Self::default();
        let mut day = 0usize;
        for row in rows {
            if day >= DAYS {
                return Err(format!("expected {DAYS} days, got more"));
            }
            let mut period = 0usize;
            for cell in row {
                if period >= PERIODS {
                    return Err(format!("day {day}: expected {PERIODS} periods, got more"));
                }
                grid.cells[day][period] = cell.as_ref().trim().to_string();
                period += 1;
            }
            if period != PERIODS {
                return Err(format!("day {day}: expected {PERIODS} periods, got {period}"));
            }
            day += 1;
        }
        if day != DAYS {
            return Err(format!("expected {DAYS} days, got {day}"));
        }
        Ok(grid)
    }

    pub fn cell(&self, slot: Slot) -> &str {
        &self.cells[usize::from(slot.day)][usize::from(slot.period)]
    }

    pub fn is_free(&self, slot: Slot) -> bool {
        is_free_marker(self.cell(slot))
    }

    /// Classe enseignée sur ce créneau, `None` si libre.
    pub fn occupant(&self, slot: Slot) -> Option<&str> {
        let cell = self.cell(slot);
        (!is_free_marker(cell)).then_some(cell)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String; PERIODS]> {
        self.cells.iter()
    }

    pub fn teaching_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::all().filter(move |slot| !self.is_free(*slot))
    }
}

fn is_free_marker(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("free")
}

/// Identifiant fort pour AbsenceEvent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbsenceId(Uuid);

impl AbsenceId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AbsenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifiant fort pour SubstitutionAssignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceStatus {
    Pending,
    Assigned,
    Unfilled,
}

impl AbsenceStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, AbsenceStatus::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            AbsenceStatus::Pending => "pending",
            AbsenceStatus::Assigned => "assigned",
            AbsenceStatus::Unfilled => "unfilled",
        }
    }
}

/// Pourquoi une absence reste sans remplaçant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnfilledReason {
    NoCandidateAvailable,
    CommitConflicts,
}

impl UnfilledReason {
    pub fn label(self) -> &'static str {
        match self {
            UnfilledReason::NoCandidateAvailable => "no candidate available",
            UnfilledReason::CommitConflicts => "candidates taken by concurrent commits",
        }
    }
}

/// Absence déclarée pour un créneau précis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceEvent {
    pub id: AbsenceId,
    pub teacher: TeacherId,
    pub slot: Slot,
    pub class_name: String,
    pub reported_at: DateTime<Utc>,
    pub status: AbsenceStatus,
    /// Renseigné uniquement pour `Unfilled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfilled_reason: Option<UnfilledReason>,
}

impl AbsenceEvent {
    pub fn pending(teacher: TeacherId, slot: Slot, class_name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: AbsenceId::random(),
            teacher,
            slot,
            class_name,
            reported_at: now,
            status: AbsenceStatus::Pending,
            unfilled_reason: None,
        }
    }

    /// Copie dans un état terminal ; un événement terminal n'est jamais modifié.
    pub(crate) fn with_status(&self, status: AbsenceStatus) -> Self {
        debug_assert!(!self.status.is_terminal());
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Remplacement engagé (immuable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionAssignment {
    pub id: AssignmentId,
    pub absence: AbsenceId,
    pub substitute: TeacherId,
    pub slot: Slot,
    pub class_name: String,
    pub created_at: DateTime<Utc>,
}

/// État complet de l'établissement, tel que persisté.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolSnapshot {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub timetables: Vec<(TeacherId, Timetable)>,
    #[serde(default)]
    pub absences: Vec<AbsenceEvent>,
    #[serde(default)]
    pub assignments: Vec<SubstitutionAssignment>,
    /// Prochain identifiant d'enseignant ; jamais réattribué après un retrait.
    #[serde(default)]
    pub next_teacher_id: u32,
}

impl SchoolSnapshot {
    /// Plus grand identifiant cité n'importe où dans l'état (0 si aucun).
    pub fn highest_teacher_id(&self) -> u32 {
        let teachers = self.teachers.iter().map(|t| t.id);
        let grids = self.timetables.iter().map(|(id, _)| *id);
        let absent = self.absences.iter().map(|e| e.teacher);
        let substitutes = self.assignments.iter().map(|a| a.substitute);
        teachers
            .chain(grids)
            .chain(absent)
            .chain(substitutes)
            .map(TeacherId::get)
            .max()
            .unwrap_or(0)
    }
}
