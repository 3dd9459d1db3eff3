use crate::errors::{ConfigError, Result};
use gpubot_core::Credentials;
use ini::Ini;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of the per-user sections in the store file.
const USER_SECTION_PREFIX: &str = "user.";

/// INI-backed store of per-user credentials.
///
/// One `[user.<id>]` section per chat user, holding the username and the
/// password digest. Loaded in bulk at startup, rewritten on credential
/// change.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Open the store at the default location (`~/.gpubot/users.ini`).
    pub fn new() -> Result<Self> {
        let home = home::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
        Ok(Self::at_path(home.join(".gpubot").join("users.ini")))
    }

    /// Open the store at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored entry. A missing file is an empty store.
    pub fn load_all(&self) -> Result<HashMap<i64, Credentials>> {
        if !self.path.exists() {
            debug!("Store file {} does not exist yet", self.path.display());
            return Ok(HashMap::new());
        }

        let data =
            Ini::load_from_file(&self.path).map_err(|e| ConfigError::IniError(e.to_string()))?;

        let mut users = HashMap::new();
        for (section, properties) in data.iter() {
            let Some(id) = section
                .and_then(|s| s.strip_prefix(USER_SECTION_PREFIX))
                .and_then(|s| s.parse::<i64>().ok())
            else {
                continue;
            };
            users.insert(
                id,
                Credentials {
                    username: properties.get("username").unwrap_or_default().to_string(),
                    password: properties.get("password").unwrap_or_default().to_string(),
                },
            );
        }
        debug!("Loaded {} users from {}", users.len(), self.path.display());
        Ok(users)
    }

    /// Persist one user's credentials, creating the file if needed.
    pub fn save(&self, user_id: i64, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::DirectoryCreationFailed(e.to_string()))?;
            }
        }

        let mut data = if self.path.exists() {
            Ini::load_from_file(&self.path).map_err(|e| ConfigError::IniError(e.to_string()))?
        } else {
            Ini::new()
        };

        let section = format!("{}{}", USER_SECTION_PREFIX, user_id);
        data.with_section(Some(section))
            .set("username", &credentials.username)
            .set("password", &credentials.password);
        data.write_to_file(&self.path)
            .map_err(|e| ConfigError::IniError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = UserStore::at_path(dir.path().join("users.ini"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = UserStore::at_path(dir.path().join("users.ini"));

        let creds = Credentials {
            username: "18900000000".to_string(),
            password: "206c80413b9a96c1312cc346b7d2517b84463edd".to_string(),
        };
        store.save(42, &creds).unwrap();
        store
            .save(
                7,
                &Credentials {
                    username: "other".to_string(),
                    password: String::new(),
                },
            )
            .unwrap();

        let users = store.load_all().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[&42], creds);
        assert_eq!(users[&7].username, "other");
    }

    #[test]
    fn save_overwrites_existing_entry() {
        let dir = tempdir().unwrap();
        let store = UserStore::at_path(dir.path().join("users.ini"));

        let mut creds = Credentials {
            username: "first".to_string(),
            password: "digest-a".to_string(),
        };
        store.save(1, &creds).unwrap();
        creds.username = "second".to_string();
        store.save(1, &creds).unwrap();

        let users = store.load_all().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[&1].username, "second");
    }
}
