//! Session persistence between CLI invocations

use anyhow::{Context, Result};
use directories::ProjectDirs;
use folio_sdk::Session;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session.json";

/// JSON file holding the last issued token pair
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store in the platform config dir (e.g. `~/.config/folio/session.json`)
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "folio", "folio")
            .context("Could not determine a config directory")?;
        Ok(Self::at(dirs.config_dir().join(SESSION_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        // A corrupt file just means "logged out"
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Write the session, or remove the file when there is none
    pub fn save(&self, session: Option<&Session>) -> Result<()> {
        match session {
            Some(session) => {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                let json = serde_json::to_string_pretty(session)?;
                write_private(&self.path, json.as_bytes())
                    .with_context(|| format!("Failed to write {}", self.path.display()))
            }
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => {
                    Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
                }
            },
        }
    }
}

/// Write a file readable only by its owner (mode 0600 on unix)
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten files left by older versions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)
}
