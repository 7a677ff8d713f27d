//! Logged-in user context
//!
//! The session surrounding the address widget is an explicit capability:
//! callers hold an [`AuthContext`] and read the current user or log in/out
//! through it. Every change is written through a [`SessionStore`], the
//! narrow persistence collaborator.
//! Session file location: ~/.local/share/geopick/session.json

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

const APP_DIR_NAME: &str = "geopick";
const SESSION_FILE_NAME: &str = "session.json";

/// The logged-in customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub mail: String,
    pub first_name: String,
    pub last_name: String,
    pub person_id: String,
}

/// Persistence for the current user, called on every transition
pub trait SessionStore {
    /// Last saved user, if any
    fn load(&self) -> Result<Option<User>>;

    /// Save the user, or remove the record when `None`
    fn save(&self, user: Option<&User>) -> Result<()>;
}

/// JSON file store in the XDG data directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at the default data path
    pub fn open() -> Result<Self> {
        let path = dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME).join(SESSION_FILE_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))?;
        Ok(Self { path })
    }

    /// Store at a specific path (for testing)
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::Session(format!("Failed to read session file: {}", e))
        })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Session(format!("Failed to parse session file: {}", e)))
    }

    fn save(&self, user: Option<&User>) -> Result<()> {
        let Some(user) = user else {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Session(format!("Failed to create session directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(user)?;
        fs::write(&self.path, content).map_err(|e| {
            Error::Session(format!("Failed to write session file: {}", e))
        })?;

        Ok(())
    }
}

/// Current-user capability passed to whoever needs it
#[derive(Debug)]
pub struct AuthContext<S: SessionStore> {
    user: Option<User>,
    store: S,
}

impl<S: SessionStore> AuthContext<S> {
    /// Restore the last saved user from the store
    pub fn restore(store: S) -> Result<Self> {
        let user = store.load()?;
        Ok(Self { user, store })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn login(&mut self, user: User) -> Result<()> {
        info!(person_id = %user.person_id, "login");
        self.store.save(Some(&user))?;
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = &self.user {
            info!(person_id = %user.person_id, "logout");
        }
        self.store.save(None)?;
        self.user = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn alice() -> User {
        User {
            mail: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Martin".to_string(),
            person_id: "42".to_string(),
        }
    }

    fn temp_store() -> (FileSessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::at(temp_dir.path().join("session.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_empty_store_restores_logged_out() {
        let (store, _temp) = temp_store();
        let auth = AuthContext::restore(store).unwrap();
        assert!(!auth.is_logged_in());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_login_persists_user() {
        let (store, _temp) = temp_store();
        let path = store.path().clone();

        let mut auth = AuthContext::restore(store).unwrap();
        auth.login(alice()).unwrap();
        assert_eq!(auth.current_user(), Some(&alice()));

        let restored = AuthContext::restore(FileSessionStore::at(path)).unwrap();
        assert_eq!(restored.current_user(), Some(&alice()));
    }

    #[test]
    fn test_logout_removes_record() {
        let (store, _temp) = temp_store();
        let path = store.path().clone();

        let mut auth = AuthContext::restore(store).unwrap();
        auth.login(alice()).unwrap();
        auth.logout().unwrap();

        assert!(!auth.is_logged_in());
        assert!(!path.exists());
    }

    #[test]
    fn test_logout_when_logged_out() {
        let (store, _temp) = temp_store();
        let mut auth = AuthContext::restore(store).unwrap();
        assert!(auth.logout().is_ok());
    }

    #[test]
    fn test_user_json_uses_camel_case() {
        let json = serde_json::to_string(&alice()).unwrap();
        assert!(json.contains("\"firstName\""));
        assert!(json.contains("\"personId\""));
    }

    #[test]
    fn test_corrupt_session_file() {
        let (store, _temp) = temp_store();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(AuthContext::restore(store), Err(Error::Session(_))));
    }
}
