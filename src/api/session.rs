//! Session endpoints: login, current user and token verification.

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{CurrentUser, LoginRequest, LoginResponse};

pub const LOGIN_PATH: &str = "/user/login";
pub const CURRENT_USER_PATH: &str = "/user";
pub const SESSION_CHECK_PATH: &str = "/checkingAuthenticated";

/// Body of the session-check endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SessionCheck {
    Bare(bool),
    Flag {
        #[serde(default)]
        authenticated: Option<bool>,
    },
}

/// Read a 2xx session-check body. An empty body or an object without the
/// flag is valid; anything unreadable is not.
fn session_is_valid(body: &str) -> bool {
    if body.trim().is_empty() {
        return true;
    }
    match serde_json::from_str::<SessionCheck>(body) {
        Ok(SessionCheck::Bare(valid)) => valid,
        Ok(SessionCheck::Flag { authenticated }) => authenticated.unwrap_or(true),
        Err(e) => {
            tracing::warn!("Unreadable session check response: {}", e);
            false
        }
    }
}

impl ApiClient {
    /// POST /user/login - Exchange credentials for a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.post_json(LOGIN_PATH, request).await
    }

    /// GET /user - Fetch the user owning the session token.
    pub async fn fetch_current_user(&self) -> Result<CurrentUser, ClientError> {
        let value: Value = self.get_json(CURRENT_USER_PATH, &[]).await?;
        // Some deployments answer `{ "user": {...} }`.
        let user = match value {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(user)?)
    }

    /// GET /checkingAuthenticated - Ask the backend whether `token` is valid.
    pub async fn check_authenticated(&self, token: &str) -> Result<bool, ClientError> {
        let body = self
            .execute(self.request_with_token(Method::GET, SESSION_CHECK_PATH, token))
            .await?;
        Ok(session_is_valid(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_check_bodies() {
        assert!(session_is_valid(""));
        assert!(session_is_valid("true"));
        assert!(session_is_valid(r#"{"authenticated":true}"#));
        assert!(session_is_valid(r#"{"message":"ok"}"#));

        assert!(!session_is_valid("false"));
        assert!(!session_is_valid(r#"{"authenticated":false}"#));
        assert!(!session_is_valid(r#"{"authenticated":"no"}"#));
        assert!(!session_is_valid("null"));
        assert!(!session_is_valid("<html>login</html>"));
    }
}
