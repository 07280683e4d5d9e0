//! Persisted session state: the bearer token and the cached admin profile.
//!
//! The store owns exactly two keys under a data directory, mirroring the
//! console's two browser-storage slots. Reads and writes are synchronous,
//! last write wins.
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const TOKEN_KEY: &str = "admin_token";
const USER_KEY: &str = "admin_user.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt session payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed session store. Cheap to clone; every handle reads the same
/// two keys.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Binds the store to `dir`, creating it if missing.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_KEY)
    }

    /// Persists both keys. Each key is replaced atomically.
    pub fn store(&self, token: &str, user: &Value) -> Result<(), SessionError> {
        write_atomic(&self.token_path(), token.as_bytes())?;
        write_atomic(&self.user_path(), &serde_json::to_vec_pretty(user)?)?;
        Ok(())
    }

    /// The persisted bearer token, if any. Blank files count as absent.
    pub fn token(&self) -> Option<String> {
        let raw = fs::read_to_string(self.token_path()).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// The cached admin profile, if one is persisted and parseable.
    pub fn user(&self) -> Option<Value> {
        let raw = fs::read(self.user_path()).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    /// A session counts as authenticated iff a token is persisted. A cached
    /// profile alone never authenticates.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Removes both keys. No network side effects.
    pub fn clear(&self) {
        let _ = fs::remove_file(self.token_path());
        let _ = fs::remove_file(self.user_path());
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
