use crate::engine::EngineError;
use crate::model::{Teacher, TeacherId};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Reçoit les mots de passe à la création d'un compte (hachage/stockage hors moteur).
pub trait CredentialStore: Send + Sync {
    fn store(&self, teacher: TeacherId, username: &str, password: &str) -> anyhow::Result<()>;
    fn forget(&self, teacher: TeacherId) -> anyhow::Result<()>;
}

/// Ne conserve rien : l'authentification est gérée ailleurs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardCredentials;

impl CredentialStore for DiscardCredentials {
    fn store(&self, _teacher: TeacherId, _username: &str, _password: &str) -> anyhow::Result<()> {
        Ok(())
    }
    fn forget(&self, _teacher: TeacherId) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    teachers: BTreeMap<TeacherId, Teacher>,
    next_id: u32,
}

/// Annuaire des enseignants ; univers des candidats pour le matcher.
pub struct TeacherDirectory {
    state: RwLock<DirectoryState>,
    credentials: Box<dyn CredentialStore>,
}

impl Default for TeacherDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TeacherDirectory {
    pub fn new() -> Self {
        Self::with_credentials(Box::new(DiscardCredentials))
    }

    pub fn with_credentials(credentials: Box<dyn CredentialStore>) -> Self {
        Self {
            state: RwLock::new(DirectoryState {
                teachers: BTreeMap::new(),
                next_id: 1,
            }),
            credentials,
        }
    }

    /// `next_id` ne descend jamais sous un identifiant déjà attribué.
    pub(crate) fn restore(&self, teachers: Vec<Teacher>, next_id: u32) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let max = teachers.iter().map(|t| t.id.get()).max().unwrap_or(0);
        state.teachers = teachers.into_iter().map(|t| (t.id, t)).collect();
        state.next_id = next_id.max(max + 1);
    }

    /// Identifiant que recevra le prochain enseignant ajouté.
    pub fn next_id(&self) -> TeacherId {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        TeacherId::new(state.next_id)
    }

    /// Tous les enseignants, par identifiant croissant.
    pub fn all_teachers(&self) -> Vec<Teacher> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.teachers.values().cloned().collect()
    }

    pub fn get(&self, id: TeacherId) -> Option<Teacher> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.teachers.get(&id).cloned()
    }

    pub fn contains(&self, id: TeacherId) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.teachers.contains_key(&id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<Teacher> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.teachers.values().find(|t| t.username == username).cloned()
    }

    pub fn add_teacher(&self, username: &str, password: &str) -> Result<TeacherId, EngineError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::Validation("username cannot be empty".into()));
        }
        if password.is_empty() {
            return Err(EngineError::Validation("password cannot be empty".into()));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.teachers.values().any(|t| t.username == username) {
            return Err(EngineError::DuplicateTeacher(username.to_string()));
        }
        let id = TeacherId::new(state.next_id);
        self.credentials.store(id, username, password)?;
        state.next_id += 1;
        state.teachers.insert(
            id,
            Teacher {
                id,
                username: username.to_string(),
                display_name: username.to_string(),
            },
        );
        Ok(id)
    }

    pub fn remove_teacher(&self, id: TeacherId) -> Result<Teacher, EngineError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.teachers.contains_key(&id) {
            return Err(EngineError::NotFound(format!("teacher {id}")));
        }
        self.credentials.forget(id)?;
        state
            .teachers
            .remove(&id)
            .ok_or_else(|| EngineError::NotFound(format!("teacher {id}")))
    }
}
