//! Persisted client session: the bearer token plus the cached user, kept in a
//! small JSON key/value file so a restarted client stays signed in.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::rest::dto::UserDto;
use crate::contract::model::User;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Session cache backed by a file. Reads are lock-free; writes are
/// serialized and replace the file atomically.
pub struct FileSessionStore {
    path: PathBuf,
    current: ArcSwapOption<Session>,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open the store and rehydrate any saved session. A saved user that
    /// cannot be decoded invalidates the whole session.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let store = Self {
            path: path.into(),
            current: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        };

        match read_entries(&store.path)? {
            Some(entries) => match decode_session(&entries) {
                Ok(session) => {
                    debug!(path = %store.path.display(), "Restored saved session");
                    store.current.store(session.map(Arc::new));
                }
                Err(e) => {
                    warn!(path = %store.path.display(), "Discarding unreadable session: {e:#}");
                    store.clear()?;
                }
            },
            None => debug!(path = %store.path.display(), "No saved session"),
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }

    pub fn token(&self) -> Option<String> {
        self.current.load().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.load().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the session, on disk first and then in memory.
    pub fn store(&self, session: Session) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock();
        let user = serde_json::to_string(&UserDto::from(session.user.clone()))?;
        let entries = BTreeMap::from([
            (TOKEN_KEY.to_string(), session.token.clone()),
            (USER_KEY.to_string(), user),
        ]);
        write_entries(&self.path, &entries)?;
        self.current.store(Some(Arc::new(session)));
        Ok(())
    }

    /// Refresh the cached user while keeping the token. No-op when signed out.
    pub fn update_user(&self, user: User) -> anyhow::Result<()> {
        let Some(token) = self.token() else {
            return Ok(());
        };
        self.store(Session { user, token })
    }

    /// Forget the session. Memory is cleared even if the file cannot be removed.
    pub fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock();
        self.current.store(None);
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

fn read_entries(path: &Path) -> anyhow::Result<Option<BTreeMap<String, serde_json::Value>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    // A file that is not a JSON object is treated like a corrupt user entry
    Ok(Some(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), "Session file is not valid JSON: {e}");
        BTreeMap::from([(USER_KEY.to_string(), serde_json::Value::Null)])
    })))
}

fn decode_session(
    entries: &BTreeMap<String, serde_json::Value>,
) -> anyhow::Result<Option<Session>> {
    let token = entries.get(TOKEN_KEY).and_then(|v| v.as_str());
    let user = match entries.get(USER_KEY) {
        None => None,
        Some(serde_json::Value::String(raw)) => {
            let dto: UserDto = serde_json::from_str(raw).context("decoding saved user")?;
            Some(User::from(dto))
        }
        Some(other) => anyhow::bail!("saved user has unexpected shape: {other}"),
    };

    Ok(match (token, user) {
        (Some(token), Some(user)) => Some(Session {
            user,
            token: token.to_string(),
        }),
        _ => None,
    })
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(entries)?)
        .with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
