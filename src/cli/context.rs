//! Command execution context
//!
//! Loads configuration, restores the persisted session, and refreshes an
//! expired access token once before any command talks to the API.

use std::sync::Arc;

use crate::client::SessionClient;
use crate::config::Config;
use crate::error::{ApiError, ConfigError, Result};
use crate::store::TokenStore;

/// Shared state for authenticated commands
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Session client with a usable access token
    pub session: Arc<SessionClient>,
}

impl CommandContext {
    /// Build a context for a command that needs an authenticated session.
    ///
    /// If the stored access token has expired, one refresh is attempted; a
    /// rejected refresh surfaces as an unauthorized error telling the user to
    /// log in again, while a connect failure keeps its own error kind.
    pub async fn new(config_path: Option<&str>) -> Result<Self> {
        let config = Config::load_at(config_path)?;

        let store = resolve_store()?;
        let tokens = store.load()?.ok_or(ConfigError::MissingTokens)?;

        let session = Arc::new(SessionClient::new(
            config.euphrosyne.url.clone(),
            tokens,
            store,
        )?);

        if !session.ensure_fresh().await? {
            return Err(ApiError::Unauthorized.into());
        }

        Ok(Self { config, session })
    }
}

/// Token store location: `HERMA_CREDENTIALS` override or `~/.herma/`
pub fn resolve_store() -> Result<TokenStore> {
    match std::env::var_os("HERMA_CREDENTIALS") {
        Some(path) => Ok(TokenStore::at(path.into())),
        None => TokenStore::default_location(),
    }
}
