//! Session store: the bearer token and the current user.
//!
//! One `SessionStore` is created at startup and handed to everything that
//! needs it. State changes only through the typed setters; subscribers are
//! notified through a watch channel so screens can reload when the token or
//! user identity changes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::errors::ClientError;
use crate::models::{CurrentUser, RecordId};
use crate::storage::KeyValueStore;

/// Storage key holding the JSON-encoded bearer token.
pub const TOKEN_KEY: &str = "currentToken";

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub current_user: Option<CurrentUser>,
}

impl Session {
    /// Token, ignoring blank values.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Identity used to decide whether dependants must re-evaluate.
    pub fn identity(&self) -> (Option<String>, Option<RecordId>) {
        (
            self.token().map(str::to_string),
            self.current_user.as_ref().map(|user| user.id.clone()),
        )
    }
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Restore the persisted token. The user is fetched later from the backend.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Result<Self, ClientError> {
        let access_token = match storage.get(TOKEN_KEY)? {
            Some(raw) => match serde_json::from_str::<Option<String>>(&raw) {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!("Discarding unreadable persisted token: {}", e);
                    storage.remove(TOKEN_KEY)?;
                    None
                }
            },
            None => None,
        };

        if access_token.is_some() {
            tracing::debug!("Restored persisted session token");
        }

        let (state, _) = watch::channel(Session {
            access_token,
            current_user: None,
        });
        Ok(Self {
            state: Arc::new(state),
            storage,
        })
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().token().is_some()
    }

    /// Set or clear the token and persist the change.
    pub fn set_access_token(&self, token: Option<String>) -> Result<(), ClientError> {
        let token = token.filter(|t| !t.trim().is_empty());
        match &token {
            Some(token) => self
                .storage
                .set(TOKEN_KEY, &serde_json::to_string(token)?)?,
            None => self.storage.remove(TOKEN_KEY)?,
        }
        self.state.send_if_modified(|session| {
            if session.access_token == token {
                return false;
            }
            session.access_token = token;
            true
        });
        Ok(())
    }

    pub fn set_current_user(&self, user: Option<CurrentUser>) {
        self.state.send_if_modified(|session| {
            if session.current_user == user {
                return false;
            }
            session.current_user = user;
            true
        });
    }

    /// Tear the session down: token and user are both dropped.
    ///
    /// The in-memory state is always cleared; a storage failure is logged.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::error!("Failed to remove persisted token: {}", e);
        }
        self.state.send_if_modified(|session| {
            if *session == Session::default() {
                return false;
            }
            *session = Session::default();
            true
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("authenticated", &session.token().is_some())
            .field("user", &session.current_user.as_ref().map(|u| &u.id))
            .finish()
    }
}
