//! Authentication state for one client process.
//!
//! A `Session` is created explicitly at startup with [`Session::hydrate`],
//! handed to the API client and to anything that checks permissions, and
//! cleared on logout or when the server answers 401.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::policy::Policy;
use crate::utils::errors::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Where the auth state survives between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<AuthState>>;
    fn save(&self, state: &AuthState) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<Option<AuthState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, state: &AuthState) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Keeps state only for the life of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<AuthState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AuthState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<Option<AuthState>> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, state: &AuthState) -> ClientResult<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads the `exp` claim without checking the signature; the server remains
/// the authority on whether the token is valid.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// True when the token carries an `exp` claim that has passed. Tokens that
/// are not JWTs, or have no expiry, are left for the server to judge.
pub fn token_expired(token: &str) -> bool {
    match token_expiry(token) {
        Some(exp) => exp <= Utc::now().timestamp(),
        None => false,
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<Option<AuthState>>>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("user", &self.user().map(|u| u.email))
            .finish()
    }
}

impl Session {
    /// Empty session over `store`; nothing is read from it.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(None)),
            store: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::new())
    }

    /// Restore the persisted state. Expired or unreadable state is discarded
    /// and the session starts logged out.
    pub fn hydrate(store: impl SessionStore + 'static) -> ClientResult<Self> {
        let session = Self::new(store);

        let restored = match session.store.load() {
            Ok(state) => state,
            Err(ClientError::Serialization(e)) => {
                log::warn!("Discarding unreadable session: {}", e);
                session.store.clear()?;
                None
            }
            Err(e) => return Err(e),
        };

        match restored {
            Some(state) if token_expired(&state.token) => {
                log::info!("Stored token has expired, starting logged out");
                session.store.clear()?;
            }
            Some(state) => {
                log::info!(
                    "Session restored for {}",
                    state
                        .user
                        .as_ref()
                        .map(|u| u.email.as_str())
                        .unwrap_or("unknown user")
                );
                *session.write() = Some(state);
            }
            None => log::debug!("No stored session"),
        }

        Ok(session)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthState>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthState>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn login(&self, token: String, user: User) -> ClientResult<()> {
        let state = AuthState {
            token,
            user: Some(user),
        };
        self.store.save(&state)?;
        *self.write() = Some(state);
        Ok(())
    }

    /// Replace the cached profile, e.g. after `GET /api/me`.
    pub fn set_user(&self, user: User) -> ClientResult<()> {
        let updated = {
            let mut guard = self.write();
            match guard.as_mut() {
                Some(state) => {
                    state.user = Some(user);
                    state.clone()
                }
                None => {
                    return Err(ClientError::Unauthorized(
                        "Not logged in".to_string(),
                    ))
                }
            }
        };
        self.store.save(&updated)
    }

    pub fn logout(&self) -> ClientResult<()> {
        *self.write() = None;
        self.store.clear()
    }

    /// Drop the state after the server rejected the token. Store failures are
    /// logged, the in-memory state is cleared regardless.
    pub fn invalidate(&self) {
        *self.write() = None;
        if let Err(e) = self.store.clear() {
            log::error!("Failed to clear stored session: {}", e);
        }
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().and_then(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Permission checks bound to the current user.
    pub fn policy(&self) -> Policy {
        Policy::new(self.user())
    }
}
