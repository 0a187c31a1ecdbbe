use crate::model::SchoolSnapshot;
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge l'état de l'établissement depuis un support.
    fn load(&self) -> anyhow::Result<SchoolSnapshot>;
    /// Sauvegarde de manière atomique.
    fn save(&self, snapshot: &SchoolSnapshot) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Comme `load`, mais un fichier absent donne un état vide.
    pub fn load_or_default(&self) -> anyhow::Result<SchoolSnapshot> {
        match fs::metadata(&self.path) {
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(SchoolSnapshot::default()),
            _ => self.load(),
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<SchoolSnapshot> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let snapshot: SchoolSnapshot =
            serde_json::from_slice(&data).with_context(|| "parsing school state")?;
        Ok(snapshot)
    }

    fn save(&self, snapshot: &SchoolSnapshot) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
