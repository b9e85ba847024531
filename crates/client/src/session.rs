//! Process-wide authentication state.
//!
//! [`SessionStore`] is the single source of truth for whether the client is
//! logged in. It is a cheap, cloneable handle: the [`ApiClient`](crate::ApiClient)
//! holds one clone to read the access token, callers hold others. All
//! clones observe the same state.
//!
//! Only [`SessionStore::set_tokens`] and [`SessionStore::clear_auth`] write to
//! the durable [`TokenStorage`]; every other component reads session state
//! through the store's accessors.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use taskdeck_core::models::user::User;

use crate::storage::{StorageError, TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A user record was offered while no access token is held.
    #[error("Cannot set a current user without an authenticated session")]
    NotAuthenticated,

    /// Durable token storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Snapshot of the client-held authentication state.
///
/// Invariant: `current_user` is `Some` only while `access_token` is `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub current_user: Option<User>,
}

impl Session {
    /// Authenticated iff an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Shared handle to the session state and its durable token storage.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.is_authenticated())
            .field("user_id", &session.current_user.as_ref().map(|u| u.id))
            .finish()
    }
}

impl SessionStore {
    /// Create an empty (unauthenticated) session over `storage`.
    ///
    /// Call [`init_auth`](Self::init_auth) to pick up tokens persisted by a
    /// previous run.
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        Self::with_storage(Arc::new(storage))
    }

    /// Create an empty session over an already shared storage backend.
    pub fn with_storage(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            storage,
        }
    }

    // ---- accessors ----

    /// Whether an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// The current access token, if authenticated.
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    /// The current refresh token, if authenticated.
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    /// The current user, once fetched.
    pub fn current_user(&self) -> Option<User> {
        self.read().current_user.clone()
    }

    /// A copy of the full session state.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    // ---- mutations ----

    /// Set the current user.
    ///
    /// `Some(user)` requires an authenticated session and fails with
    /// [`SessionError::NotAuthenticated`] otherwise. `None` drops the
    /// in-memory session (user and tokens) without touching durable
    /// storage, so the next [`init_auth`](Self::init_auth) restores it.
    pub fn set_user(&self, user: Option<User>) -> Result<(), SessionError> {
        let mut session = self.write();
        match user {
            Some(user) => {
                if !session.is_authenticated() {
                    return Err(SessionError::NotAuthenticated);
                }
                tracing::debug!(user_id = user.id, "Current user set");
                session.current_user = Some(user);
            }
            None => {
                *session = Session::default();
            }
        }
        Ok(())
    }

    /// Persist a freshly issued token pair and mark the session
    /// authenticated. Any previously loaded user is discarded, since the
    /// new tokens may belong to someone else.
    ///
    /// The in-memory state only changes once both tokens are persisted. If
    /// the refresh token cannot be written, the previously stored access
    /// token is put back so storage never holds half a pair.
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), SessionError> {
        let previous_access = self.storage.get(ACCESS_TOKEN_KEY)?;
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        if let Err(e) = self.storage.set(REFRESH_TOKEN_KEY, refresh) {
            self.restore_access(previous_access.as_deref());
            return Err(e.into());
        }

        let mut session = self.write();
        session.access_token = Some(access.to_string());
        session.refresh_token = Some(refresh.to_string());
        session.current_user = None;
        tracing::info!("Session tokens stored");
        Ok(())
    }

    /// Remove both tokens from durable storage and reset the session.
    ///
    /// Idempotent. A storage failure is logged but never prevents the
    /// in-memory session from being cleared.
    pub fn clear_auth(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove token from storage");
            }
        }

        let mut session = self.write();
        if session.is_authenticated() {
            tracing::info!("Session cleared");
        }
        *session = Session::default();
    }

    /// Load tokens persisted by a previous run.
    ///
    /// The session becomes authenticated iff an access token is stored; the
    /// current user stays `None` until fetched separately. Unreadable
    /// storage is logged and treated as empty. Returns the resulting
    /// authentication flag.
    pub fn init_auth(&self) -> bool {
        let read = |key: &str| match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read token from storage");
                None
            }
        };
        let access_token = read(ACCESS_TOKEN_KEY);
        let refresh_token = access_token.as_ref().and_then(|_| read(REFRESH_TOKEN_KEY));

        let mut session = self.write();
        *session = Session {
            access_token,
            refresh_token,
            current_user: None,
        };
        let authenticated = session.is_authenticated();
        tracing::debug!(authenticated, "Session initialised from storage");
        authenticated
    }

    // ---- private helpers ----

    fn restore_access(&self, previous: Option<&str>) {
        let restored = match previous {
            Some(token) => self.storage.set(ACCESS_TOKEN_KEY, token),
            None => self.storage.remove(ACCESS_TOKEN_KEY),
        };
        if let Err(e) = restored {
            tracing::warn!(error = %e, "Failed to roll back access token after partial write");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
