//! Persistent token store
//!
//! Holds the `access_token`/`refresh_token` pair under the application
//! directory. The access token is rewritten whenever the session client
//! refreshes it, so a later run can reuse the session without logging in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Stored bearer token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    /// Short-lived access token (JWT)
    pub access_token: String,

    /// Long-lived refresh token
    pub refresh_token: String,
}

/// File-backed store for the token pair
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store rooted at an explicit file path
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location under `~/.herma/`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;
        Ok(Self::at(home.join(".herma").join("credentials.yaml")))
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the stored token pair, if any
    pub fn load(&self) -> Result<Option<StoredTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let tokens: StoredTokens = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(Some(tokens))
    }

    /// Persist the token pair, creating the parent directory if needed
    pub fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(tokens).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(&self.path, contents)?;

        // Tokens are secrets, keep the file private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Replace only the access token, keeping the refresh token as stored
    pub fn update_access_token(&self, access_token: &str) -> Result<()> {
        let mut tokens = self.load()?.ok_or(ConfigError::MissingTokens)?;
        tokens.access_token = access_token.to_string();
        self.save(&tokens)
    }

    /// Remove the stored pair (logout)
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.yaml"));
        (dir, store)
    }

    #[test]
    fn test_load_empty_store() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, store) = temp_store();
        store
            .save(&StoredTokens {
                access_token: "access-abc".to_string(),
                refresh_token: "refresh-xyz".to_string(),
            })
            .unwrap();

        let tokens = store.load().unwrap().expect("tokens should be stored");
        assert_eq!(tokens.access_token, "access-abc");
        assert_eq!(tokens.refresh_token, "refresh-xyz");
    }

    #[test]
    fn test_update_access_token_keeps_refresh_token() {
        let (_dir, store) = temp_store();
        store
            .save(&StoredTokens {
                access_token: "old".to_string(),
                refresh_token: "refresh-xyz".to_string(),
            })
            .unwrap();

        store.update_access_token("new").unwrap();

        let tokens = store.load().unwrap().unwrap();
        assert_eq!(tokens.access_token, "new");
        assert_eq!(tokens.refresh_token, "refresh-xyz");
    }

    #[test]
    fn test_update_access_token_without_store_fails() {
        let (_dir, store) = temp_store();
        let err = store.update_access_token("new").unwrap_err();
        assert!(err.to_string().contains("herma login"));
    }

    #[test]
    fn test_clear() {
        let (_dir, store) = temp_store();
        store
            .save(&StoredTokens {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            })
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        store
            .save(&StoredTokens {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            })
            .unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
