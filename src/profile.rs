//! Last-used board and list names.

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Default file used by [`JsonProfileStore`]
pub const DEFAULT_PROFILE_FILE: &str = "profile.json";

/// Board and list a card was last created in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "board-name")]
    pub board_name: String,
    #[serde(rename = "list-name")]
    pub list_name: String,
}

/// Persistence for the last-used [`Profile`].
pub trait ProfileStore: Send + Sync {
    /// Load the stored profile, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<Profile>>;

    fn save(&self, profile: &Profile) -> Result<()>;

    /// Fill absent names from the stored profile
    fn fill(&self, board_name: Option<String>, list_name: Option<String>) -> Result<Profile> {
        if let (Some(board_name), Some(list_name)) = (&board_name, &list_name) {
            return Ok(Profile {
                board_name: board_name.clone(),
                list_name: list_name.clone(),
            });
        }

        let stored = self.load()?.ok_or(BoardError::ProfileMissing)?;
        Ok(Profile {
            board_name: board_name.unwrap_or(stored.board_name),
            list_name: list_name.unwrap_or(stored.list_name),
        })
    }
}

/// Profile kept as a small JSON file
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonProfileStore { path: path.into() }
    }
}

impl Default for JsonProfileStore {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_FILE)
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self) -> Result<Option<Profile>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, profile: &Profile) -> Result<()> {
        std::fs::write(&self.path, serde_json::to_string(profile)?)?;
        Ok(())
    }
}
