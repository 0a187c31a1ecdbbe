use crate::engine::EngineError;
use crate::model::{Slot, TeacherId, Timetable};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// Emplois du temps hebdomadaires ; source de vérité de la charge d'enseignement.
#[derive(Debug, Default)]
pub struct TimetableStore {
    grids: RwLock<BTreeMap<TeacherId, Timetable>>,
}

/// Vue en lecture verrouillée ; tant qu'elle vit, aucun `set` ne peut s'intercaler.
pub struct TimetableView<'a> {
    grids: RwLockReadGuard<'a, BTreeMap<TeacherId, Timetable>>,
}

impl TimetableView<'_> {
    /// `None` si l'enseignant n'a pas d'emploi du temps.
    pub fn is_free(&self, teacher: TeacherId, slot: Slot) -> Option<bool> {
        self.grids.get(&teacher).map(|grid| grid.is_free(slot))
    }
}

impl TimetableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restore(&self, timetables: Vec<(TeacherId, Timetable)>) {
        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        *grids = timetables.into_iter().collect();
    }

    pub(crate) fn snapshot(&self) -> Vec<(TeacherId, Timetable)> {
        self.read()
            .grids
            .iter()
            .map(|(id, grid)| (*id, grid.clone()))
            .collect()
    }

    pub fn read(&self) -> TimetableView<'_> {
        TimetableView {
            grids: self.grids.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub fn get(&self, teacher: TeacherId) -> Result<Timetable, EngineError> {
        self.read()
            .grids
            .get(&teacher)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("timetable for teacher {teacher}")))
    }

    /// Remplace toute la semaine sans consulter le registre (tests unitaires).
    ///
    /// Le chemin public est `SubstitutionEngine::set_timetable`, qui refuse une
    /// grille chevauchant un remplacement déjà assuré.
    #[cfg(test)]
    pub(crate) fn set<R, C>(&self, teacher: TeacherId, rows: R) -> Result<(), EngineError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let grid = Timetable::from_rows(rows).map_err(EngineError::Validation)?;
        self.replace_checked(teacher, grid, |_| Ok(()))
    }

    /// Remplace la grille si `check` l'accepte ; `check` s'exécute sous le verrou d'écriture.
    pub(crate) fn replace_checked<F>(
        &self,
        teacher: TeacherId,
        grid: Timetable,
        check: F,
    ) -> Result<(), EngineError>
    where
        F: FnOnce(&Timetable) -> Result<(), EngineError>,
    {
        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        check(&grid)?;
        grids.insert(teacher, grid);
        Ok(())
    }

    pub(crate) fn remove(&self, teacher: TeacherId) -> Option<Timetable> {
        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        grids.remove(&teacher)
    }

    /// Réinsère une grille retirée, sauf si une autre a été posée entre-temps.
    pub(crate) fn restore_one(&self, teacher: TeacherId, grid: Timetable) {
        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        grids.entry(teacher).or_insert(grid);
    }

    pub fn is_free(&self, teacher: TeacherId, slot: Slot) -> Result<bool, EngineError> {
        self.read()
            .is_free(teacher, slot)
            .ok_or_else(|| EngineError::NotFound(format!("timetable for teacher {teacher}")))
    }

    pub fn occupant_class(
        &self,
        teacher: TeacherId,
        slot: Slot,
    ) -> Result<Option<String>, EngineError> {
        let view = self.read();
        let grid = view
            .grids
            .get(&teacher)
            .ok_or_else(|| EngineError::NotFound(format!("timetable for teacher {teacher}")))?;
        Ok(grid.occupant(slot).map(str::to_owned))
    }
}
