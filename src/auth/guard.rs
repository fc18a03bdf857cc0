//! Route guard for the admin and member areas.
//!
//! A protected location renders only once the backend has confirmed the
//! bearer token and the cached user holds the required role. Every failure
//! (no token, rejected token, wrong role, network error) ends in the same
//! redirect to the login screen, carrying the location that was asked for.

use async_trait::async_trait;

use super::LOGIN_ROUTE;
use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::{CurrentUser, RecordId};
use crate::session::Session;

/// Privilege a protected area requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any valid session.
    Member,
    /// A valid session whose user is an administrator.
    Admin,
}

impl Access {
    pub fn permits(&self, user: Option<&CurrentUser>) -> bool {
        match self {
            Access::Member => true,
            Access::Admin => user.is_some_and(|u| u.role.can_administer()),
        }
    }
}

/// Backend check of a bearer token.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<bool, ClientError>;
}

#[async_trait]
impl SessionVerifier for ApiClient {
    async fn verify(&self, token: &str) -> Result<bool, ClientError> {
        self.check_authenticated(token).await
    }
}

/// Where an unauthorized visitor is sent. `from` lives only as long as this
/// value; it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub to: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Verification in flight; render a placeholder.
    Loading,
    /// Render the protected content.
    Authorized,
    /// Redirect to login.
    Unauthorized(LoginRedirect),
}

type Identity = (Option<String>, Option<RecordId>);

#[derive(Debug, Clone)]
pub struct RouteGuard {
    access: Access,
    location: String,
    state: GuardState,
    evaluated_for: Option<Identity>,
}

impl RouteGuard {
    pub fn new(access: Access, location: impl Into<String>) -> Self {
        Self {
            access,
            location: location.into(),
            state: GuardState::Loading,
            evaluated_for: None,
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// True until evaluated for the current token and user identity.
    pub fn needs_evaluation(&self, session: &Session) -> bool {
        self.evaluated_for.as_ref() != Some(&session.identity())
    }

    /// Resolve the guard for `session`. A result already computed for the
    /// same token and user is reused without another backend call.
    pub async fn evaluate<V>(&mut self, session: &Session, verifier: &V) -> &GuardState
    where
        V: SessionVerifier + ?Sized,
    {
        if !self.needs_evaluation(session) {
            return &self.state;
        }
        let identity = session.identity();

        let Some(token) = session.token() else {
            tracing::debug!(location = %self.location, "No session token, redirecting to login");
            self.state = self.unauthorized();
            self.evaluated_for = Some(identity);
            return &self.state;
        };

        self.state = GuardState::Loading;
        let authenticated = match verifier.verify(token).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                tracing::debug!(location = %self.location, "Session check failed: {}", e);
                false
            }
        };

        self.state = if authenticated && self.access.permits(session.current_user.as_ref()) {
            GuardState::Authorized
        } else {
            tracing::debug!(
                location = %self.location,
                access = ?self.access,
                authenticated,
                "Access denied"
            );
            self.unauthorized()
        };
        self.evaluated_for = Some(identity);
        &self.state
    }

    fn unauthorized(&self) -> GuardState {
        GuardState::Unauthorized(LoginRedirect {
            to: LOGIN_ROUTE.to_string(),
            from: self.location.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeVerifier {
        result: Result<bool, ClientError>,
        calls: AtomicUsize,
    }

    impl FakeVerifier {
        fn answering(result: Result<bool, ClientError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionVerifier for FakeVerifier {
        async fn verify(&self, _token: &str) -> Result<bool, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn session(token: Option<&str>, role: Option<Role>) -> Session {
        Session {
            access_token: token.map(str::to_string),
            current_user: role.map(|role| CurrentUser {
                id: RecordId::from(1),
                name: "Ada".to_string(),
                email: "ada@lab.fr".to_string(),
                role,
            }),
        }
    }

    fn redirect_from(location: &str) -> GuardState {
        GuardState::Unauthorized(LoginRedirect {
            to: LOGIN_ROUTE.to_string(),
            from: location.to_string(),
        })
    }

    #[tokio::test]
    async fn test_no_token_redirects_without_network_call() {
        let verifier = FakeVerifier::answering(Ok(true));
        let mut guard = RouteGuard::new(Access::Member, "/member/articles");

        let state = guard.evaluate(&session(None, None), &verifier).await.clone();

        assert_eq!(state, redirect_from("/member/articles"));
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_admin_route_with_admin_role() {
        let verifier = FakeVerifier::answering(Ok(true));
        let mut guard = RouteGuard::new(Access::Admin, "/admin");

        let state = guard
            .evaluate(&session(Some("t"), Some(Role::Admin)), &verifier)
            .await;
        assert_eq!(state, &GuardState::Authorized);
    }

    #[tokio::test]
    async fn test_admin_route_with_member_role() {
        let verifier = FakeVerifier::answering(Ok(true));
        let mut guard = RouteGuard::new(Access::Admin, "/admin/users");

        let state = guard
            .evaluate(&session(Some("t"), Some(Role::Member)), &verifier)
            .await;
        assert_eq!(state, &redirect_from("/admin/users"));
    }

    #[tokio::test]
    async fn test_member_route_needs_only_a_valid_token() {
        let verifier = FakeVerifier::answering(Ok(true));
        let mut guard = RouteGuard::new(Access::Member, "/member");

        let state = guard.evaluate(&session(Some("t"), None), &verifier).await;
        assert_eq!(state, &GuardState::Authorized);
    }

    #[tokio::test]
    async fn test_network_error_is_unauthorized_and_not_retried() {
        let verifier =
            FakeVerifier::answering(Err(ClientError::Transport("connection refused".to_string())));
        let mut guard = RouteGuard::new(Access::Member, "/member");
        let current = session(Some("t"), Some(Role::Member));

        guard.evaluate(&current, &verifier).await;
        guard.evaluate(&current, &verifier).await;

        assert_eq!(guard.state(), &redirect_from("/member"));
        assert_eq!(verifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_identity_change_triggers_reevaluation() {
        let verifier = FakeVerifier::answering(Ok(true));
        let mut guard = RouteGuard::new(Access::Admin, "/admin");

        guard
            .evaluate(&session(Some("old"), Some(Role::Member)), &verifier)
            .await;
        assert!(matches!(guard.state(), GuardState::Unauthorized(_)));

        let promoted = session(Some("new"), Some(Role::Admin));
        assert!(guard.needs_evaluation(&promoted));
        guard.evaluate(&promoted, &verifier).await;

        assert_eq!(guard.state(), &GuardState::Authorized);
        assert_eq!(verifier.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized() {
        let verifier = FakeVerifier::answering(Ok(false));
        let mut guard = RouteGuard::new(Access::Member, "/member");

        guard
            .evaluate(&session(Some("stale"), Some(Role::Admin)), &verifier)
            .await;
        assert_eq!(guard.state(), &redirect_from("/member"));
    }
}
