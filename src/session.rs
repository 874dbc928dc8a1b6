//! In-memory auth session with lazy hydration from the credential store.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized --initialize()--> Hydrated --login()--> Active
//!       |                            |                    |
//!       +---------login()------------+                    |
//!       +---------------------logout() / idle expiry------+--> LoggedOut
//! ```
//!
//! `initialize()` runs under the write lock, so a reader racing with
//! hydration waits for it to finish instead of observing a half-loaded
//! session. All updates are last-write-wins.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::error::StorageError;
use crate::storage::{self, CredentialStore, KEY_NAME, KEY_ROLE, KEY_TOKEN, KEY_USER_ID};

/// Inactivity window after which [`SessionStore::expire_if_idle`] logs out.
pub const INACTIVITY_TIMEOUT_MINUTES: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Nothing has been read from storage yet.
    Uninitialized,
    /// Loaded from storage; may or may not carry a token.
    Hydrated,
    /// Token came from an explicit login in this process.
    Active,
    LoggedOut,
}

/// Identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub role: String,
    pub name: String,
    pub id: i64,
}

/// Read-only copy of the session, safe to hand to UI code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub has_token: bool,
    pub role: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<i64>,
}

impl SessionSnapshot {
    pub fn is_initialized(&self) -> bool {
        self.phase != SessionPhase::Uninitialized
    }
}

struct SessionState {
    phase: SessionPhase,
    token: Option<String>,
    role: Option<String>,
    name: Option<String>,
    user_id: Option<i64>,
    last_activity: DateTime<Utc>,
}

impl SessionState {
    fn empty(phase: SessionPhase) -> Self {
        Self {
            phase,
            token: None,
            role: None,
            name: None,
            user_id: None,
            last_activity: Utc::now(),
        }
    }

    fn clear(&mut self) {
        if let Some(token) = self.token.as_mut() {
            token.zeroize();
        }
        *self = Self::empty(SessionPhase::LoggedOut);
    }
}

/// Process-wide holder of the current bearer token.
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Arc<dyn CredentialStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::empty(SessionPhase::Uninitialized)),
            storage,
        }
    }

    pub fn storage(&self) -> &dyn CredentialStore {
        self.storage.as_ref()
    }

    // A poisoned lock only means another thread panicked mid-update; the
    // session data itself is still usable.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// In-memory token, without touching storage.
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Token persisted in the credential store.
    pub fn stored_token(&self) -> Option<String> {
        self.storage.get(KEY_TOKEN).filter(|t| !t.trim().is_empty())
    }

    pub fn is_initialized(&self) -> bool {
        self.read().phase != SessionPhase::Uninitialized
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read();
        SessionSnapshot {
            phase: state.phase,
            has_token: state.token.is_some(),
            role: state.role.clone(),
            name: state.name.clone(),
            user_id: state.user_id,
        }
    }

    /// Load the session from the credential store. When nothing is
    /// persisted the in-memory fields are left as they are; either way the
    /// session ends up initialized.
    pub fn initialize(&self) {
        let mut state = self.write();
        let token = self.stored_token();
        if token.is_some() {
            state.token = token;
            state.role = self.storage.get(KEY_ROLE);
            state.name = self.storage.get(KEY_NAME);
            state.user_id = self
                .storage
                .get(KEY_USER_ID)
                .and_then(|v| v.trim().parse::<i64>().ok());
            state.last_activity = Utc::now();
            debug!(user_id = ?state.user_id, "session hydrated from storage");
        } else {
            debug!("no persisted session found");
        }
        state.phase = SessionPhase::Hydrated;
    }

    /// Token to attach to an outgoing request.
    ///
    /// Prefers the in-memory token; otherwise falls back to the persisted
    /// one. When the fallback finds a token while the session has never been
    /// hydrated, the session is hydrated first and the in-memory token is
    /// used, so requests issued right after startup are not sent
    /// unauthenticated.
    pub fn resolve_token(&self) -> Option<String> {
        if let Some(token) = self.token() {
            return Some(token);
        }

        let fallback = self.stored_token();
        if fallback.is_some() && !self.is_initialized() {
            self.initialize();
            return self.token();
        }
        fallback
    }

    /// Record a successful login in memory and in the credential store.
    ///
    /// If any key cannot be written the whole session is cleared, so a
    /// partial write never leaves a usable token behind.
    pub fn login(&self, session: LoginSession) -> Result<(), StorageError> {
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "failed to persist session, discarding it");
            self.logout();
            return Err(e);
        }

        let mut state = self.write();
        state.phase = SessionPhase::Active;
        state.token = Some(session.token);
        state.role = Some(session.role);
        state.name = Some(session.name);
        state.user_id = Some(session.id);
        state.last_activity = Utc::now();
        info!(user_id = session.id, "session started");
        Ok(())
    }

    fn persist(&self, session: &LoginSession) -> Result<(), StorageError> {
        self.storage.set(KEY_TOKEN, &session.token)?;
        self.storage.set(KEY_ROLE, &session.role)?;
        self.storage.set(KEY_NAME, &session.name)?;
        self.storage.set(KEY_USER_ID, &session.id.to_string())
    }

    /// Clear the session in memory and in the credential store.
    ///
    /// The in-memory session is cleared even when the store cannot be
    /// updated; the storage failure is logged.
    pub fn logout(&self) {
        self.write().clear();
        if let Err(e) = storage::clear_session(self.storage.as_ref()) {
            warn!(error = %e, "failed to clear persisted session");
        }
        info!("session logged out");
    }

    /// Refresh the inactivity timer.
    pub fn touch(&self) {
        self.write().last_activity = Utc::now();
    }

    /// Log out if the session holds a token and has been idle for longer
    /// than [`INACTIVITY_TIMEOUT_MINUTES`]. Returns `true` when it did.
    pub fn expire_if_idle(&self, now: DateTime<Utc>) -> bool {
        let idle = {
            let state = self.read();
            state.token.is_some()
                && now - state.last_activity > Duration::minutes(INACTIVITY_TIMEOUT_MINUTES)
        };
        if idle {
            info!("session idle for too long");
            self.logout();
        }
        idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::FailingStore;
    use crate::storage::MemoryStore;

    fn store_with(entries: &[(&str, &str)]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (k, v) in entries {
            store.set(k, v).unwrap();
        }
        store
    }

    fn sample_login() -> LoginSession {
        LoginSession {
            token: "tok-1".into(),
            role: "admin".into(),
            name: "Ana".into(),
            id: 3,
        }
    }

    #[test]
    fn starts_uninitialized_without_token() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(!session.is_initialized());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn initialize_hydrates_all_fields() {
        let storage = store_with(&[
            (KEY_TOKEN, "persisted"),
            (KEY_ROLE, "cajero"),
            (KEY_NAME, "Luis"),
            (KEY_USER_ID, "12"),
        ]);
        let session = SessionStore::new(storage);
        session.initialize();

        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::Hydrated);
        assert!(snap.has_token);
        assert_eq!(snap.role.as_deref(), Some("cajero"));
        assert_eq!(snap.name.as_deref(), Some("Luis"));
        assert_eq!(snap.user_id, Some(12));
        assert_eq!(session.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn initialize_without_persisted_token_still_marks_initialized() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.initialize();
        assert!(session.is_initialized());
        assert_eq!(session.token(), None);
    }

    #[test]
    fn resolve_token_hydrates_uninitialized_session() {
        let storage = store_with(&[(KEY_TOKEN, "persisted"), (KEY_USER_ID, "4")]);
        let session = SessionStore::new(storage);

        assert_eq!(session.resolve_token().as_deref(), Some("persisted"));
        assert_eq!(session.phase(), SessionPhase::Hydrated);
        assert_eq!(session.snapshot().user_id, Some(4));
    }

    #[test]
    fn resolve_token_uses_fallback_when_already_initialized() {
        let storage = store_with(&[]);
        let session = SessionStore::new(storage.clone());
        session.initialize();
        // Written by another process after hydration.
        storage.set(KEY_TOKEN, "late").unwrap();

        assert_eq!(session.resolve_token().as_deref(), Some("late"));
        assert_eq!(session.token(), None);
    }

    #[test]
    fn resolve_token_none_when_nothing_anywhere() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(session.resolve_token(), None);
        assert!(!session.is_initialized());
    }

    #[test]
    fn login_persists_and_activates() {
        let storage = store_with(&[]);
        let session = SessionStore::new(storage.clone());
        session.login(sample_login()).unwrap();

        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.token().as_deref(), Some("tok-1"));
        assert_eq!(storage.get(KEY_TOKEN).as_deref(), Some("tok-1"));
        assert_eq!(storage.get(KEY_USER_ID).as_deref(), Some("3"));
    }

    #[test]
    fn failed_login_write_leaves_no_token_behind() {
        let storage = Arc::new(FailingStore {
            fail_set: Some(KEY_ROLE),
            ..Default::default()
        });
        let session = SessionStore::new(storage.clone());

        let err = session.login(sample_login()).unwrap_err();
        assert!(matches!(err, StorageError::Write { ref key, .. } if key == KEY_ROLE));

        assert_eq!(storage.get(KEY_TOKEN), None);
        assert_eq!(session.stored_token(), None);
        assert_eq!(session.resolve_token(), None);
        assert_ne!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let storage = store_with(&[]);
        let session = SessionStore::new(storage.clone());
        session.login(sample_login()).unwrap();
        session.logout();

        let snap = session.snapshot();
        assert_eq!(snap.phase, SessionPhase::LoggedOut);
        assert!(snap.is_initialized());
        assert!(!snap.has_token);
        assert_eq!(snap.user_id, None);
        assert_eq!(storage.get(KEY_TOKEN), None);
        assert_eq!(storage.get(KEY_ROLE), None);
    }

    #[test]
    fn idle_session_expires_after_timeout() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.login(sample_login()).unwrap();

        let soon = Utc::now() + Duration::minutes(10);
        assert!(!session.expire_if_idle(soon));
        assert!(session.token().is_some());

        let later = Utc::now() + Duration::minutes(INACTIVITY_TIMEOUT_MINUTES + 1);
        assert!(session.expire_if_idle(later));
        assert_eq!(session.phase(), SessionPhase::LoggedOut);
    }

    #[test]
    fn idle_check_is_noop_without_token() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.initialize();
        let later = Utc::now() + Duration::days(1);
        assert!(!session.expire_if_idle(later));
        assert_eq!(session.phase(), SessionPhase::Hydrated);
    }
}
