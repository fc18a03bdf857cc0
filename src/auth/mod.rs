//! Login, logout and route authorization.

mod guard;

pub use guard::*;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::{CurrentUser, LoginRequest};
use crate::notify::Toasts;

pub const LOGIN_ROUTE: &str = "/login";
pub const ADMIN_HOME: &str = "/admin";
pub const MEMBER_HOME: &str = "/member";

/// Landing location for a freshly logged-in user.
pub fn landing_route(user: &CurrentUser) -> &'static str {
    if user.role.can_administer() {
        ADMIN_HOME
    } else {
        MEMBER_HOME
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: CurrentUser,
    /// Where to navigate next: the location the guard bounced from, or the
    /// landing route for the user's role.
    pub redirect: String,
}

/// Log in with email and password.
///
/// On success the token is persisted, the current user is fetched and stored.
/// On any failure the session is left empty and an error toast is raised.
pub async fn login(
    client: &ApiClient,
    credentials: &LoginRequest,
    return_to: Option<&str>,
    toasts: &Toasts,
) -> Result<LoginOutcome, ClientError> {
    let result = try_login(client, credentials, return_to).await;
    match &result {
        Ok(outcome) => {
            tracing::info!(user = %outcome.user.id, role = outcome.user.role.as_str(), "Logged in");
            toasts.success(format!("Welcome, {}", outcome.user.name));
        }
        Err(e) => {
            client.session().clear();
            toasts.error(format!("Login failed: {}", e.message()));
        }
    }
    result
}

async fn try_login(
    client: &ApiClient,
    credentials: &LoginRequest,
    return_to: Option<&str>,
) -> Result<LoginOutcome, ClientError> {
    let request = LoginRequest {
        email: credentials.email.trim().to_string(),
        password: credentials.password.clone(),
    };
    if request.email.is_empty() {
        return Err(ClientError::field("email", "Email is required"));
    }
    if request.password.is_empty() {
        return Err(ClientError::field("password", "Password is required"));
    }

    let response = client.login(&request).await?;
    let session = client.session();
    session.set_access_token(Some(response.token))?;
    if !session.is_authenticated() {
        return Err(ClientError::Unauthorized(
            "Backend returned an empty token".to_string(),
        ));
    }

    let user = client.fetch_current_user().await?;
    session.set_current_user(Some(user.clone()));

    let redirect = return_to
        .filter(|location| !location.is_empty() && *location != LOGIN_ROUTE)
        .map(str::to_string)
        .unwrap_or_else(|| landing_route(&user).to_string());

    Ok(LoginOutcome { user, redirect })
}

/// Drop the session locally. The backend keeps no state to revoke.
pub fn logout(client: &ApiClient, toasts: &Toasts) {
    client.session().clear();
    tracing::info!("Logged out");
    toasts.info("Logged out");
}

/// Make sure the session carries the user matching its token.
///
/// Returns `None` when there is no token. A rejected token tears the session
/// down inside the client before the error is returned.
pub async fn ensure_current_user(client: &ApiClient) -> Result<Option<CurrentUser>, ClientError> {
    let session = client.session();
    if !session.is_authenticated() {
        return Ok(None);
    }
    if let Some(user) = session.current_user() {
        return Ok(Some(user));
    }

    let user = client.fetch_current_user().await?;
    session.set_current_user(Some(user.clone()));
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordId, Role};

    #[test]
    fn test_landing_route_by_role() {
        let mut user = CurrentUser {
            id: RecordId::from(1),
            name: "Ada".to_string(),
            email: String::new(),
            role: Role::Admin,
        };
        assert_eq!(landing_route(&user), ADMIN_HOME);
        user.role = Role::Member;
        assert_eq!(landing_route(&user), MEMBER_HOME);
    }
}
