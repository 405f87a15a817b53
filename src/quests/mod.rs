//! Quest definitions and the external quest source.
//!
//! Quests are loaded once at startup from a JSON file so organizers can
//! customize a hunt without recompiling. A quest's identity is its position
//! in the loaded sequence; the order must never change after load because
//! the progress bitfield records completion by index, not by name or flag.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trackable challenge, unlocked by scanning a code that matches its flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Secret string a scanned code must equal exactly for completion.
    pub flag: String,
}

/// Quest source unreachable or malformed. Fatal to startup; no retry.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read quest file {path}: {source}")]
    Unreachable {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse quest file {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },
}

/// Collaborator that supplies the ordered quest sequence at startup.
pub trait QuestSource {
    fn fetch(&self) -> Result<Vec<Quest>, LoadError>;
}

/// Quest list stored as a JSON array on disk.
pub struct JsonQuestFile {
    path: PathBuf,
}

impl JsonQuestFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl QuestSource for JsonQuestFile {
    fn fetch(&self) -> Result<Vec<Quest>, LoadError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| LoadError::Unreachable {
                path: self.path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&contents).map_err(|source| LoadError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Starter quest list written by `stamprally init`.
pub fn starter_quests() -> Vec<Quest> {
    vec![
        Quest {
            name: "The Hidden Fountain".to_string(),
            description: "Find the courtyard fountain and scan the plaque beside it.".to_string(),
            flag: "RALLY-FOUNTAIN-01".to_string(),
        },
        Quest {
            name: "Reading Room Cipher".to_string(),
            description: "The code hides between the atlases on the top shelf.".to_string(),
            flag: "RALLY-LIBRARY-02".to_string(),
        },
        Quest {
            name: "Rooftop Lookout".to_string(),
            description: "Scan the marker fixed to the railing facing east.".to_string(),
            flag: "RALLY-ROOFTOP-03".to_string(),
        },
    ]
}

/// Write `quests` to `path` as pretty-printed JSON.
pub fn write_quest_file<P: AsRef<Path>>(path: P, quests: &[Quest]) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(quests)?;
    std::fs::write(path, json)
}
