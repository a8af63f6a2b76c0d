use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{ClientError, ClientResult};

pub const SESSION_FILE: &str = "session.json";

/// Durable home of the bearer token
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: Option<&str>) -> ClientResult<()>;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    token: Option<String>,
    saved_at: DateTime<Utc>,
}

/// `session.json` in the CLI config directory, shared by every process of the user
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let file: SessionFile = serde_json::from_str(&content)
            .map_err(|e| ClientError::storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: Option<&str>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = SessionFile {
            token: token.map(str::to_string),
            saved_at: Utc::now(),
        };

        // Write-then-rename so a concurrent reader never sees a torn file
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Process-local storage; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.to_string()))),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> ClientResult<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| ClientError::storage("memory storage poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, token: Option<&str>) -> ClientResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ClientError::storage("memory storage poisoned"))?;
        *slot = token.map(str::to_string);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
