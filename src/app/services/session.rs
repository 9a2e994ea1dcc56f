use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::app::infrastructure::credential_store::CredentialStore;
use crate::app::infrastructure::error::{AppError, Result};

/// Identity claims read from the token payload. The signature is not checked;
/// these are for display only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserClaims {
    #[serde(default, alias = "_id", alias = "userId")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
}

/// Holds the current bearer credential.
///
/// The context never resets anything else on logout; the owner of the
/// registry and edit session tears those down (see `AppState::logout`).
#[derive(Debug, Default)]
pub struct SessionContext {
    token: Option<String>,
    store: Option<CredentialStore>,
}

impl SessionContext {
    /// Context without durable storage
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Context backed by `store`, starting from whatever token it holds.
    pub fn restore(store: CredentialStore) -> Self {
        let token = store.load();
        if token.is_some() {
            log::debug!("Restored credential from {}", store.path().display());
        }
        Self {
            token,
            store: Some(store),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Token for a remote call, or `NotAuthenticated` so no call is made.
    pub fn require_token(&self) -> Result<&str> {
        self.token().ok_or(AppError::NotAuthenticated)
    }

    pub fn login(&mut self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if let Some(store) = &self.store {
            store.save(&token)?;
        }
        self.token = Some(token);
        Ok(())
    }

    /// Forget the token in memory first. If the stored copy cannot be removed
    /// the error is returned and the file is left behind for the next start.
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                log::warn!(
                    "Stored credential at {} could not be removed: {}",
                    store.path().display(),
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Decode the JWT payload of the current token.
    pub fn user(&self) -> Option<UserClaims> {
        let payload = self.token.as_deref()?.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}
