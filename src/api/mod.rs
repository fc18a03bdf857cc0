//! REST API client.
//!
//! Wraps `reqwest` with the backend conventions: base URL joining, bearer
//! token from the session store, status-to-error mapping, and session
//! teardown whenever the backend answers 401.

mod collections;
mod session;

pub use collections::*;
pub use session::*;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ClientError;
use crate::session::SessionStore;

/// Success envelope some endpoints wrap their payload in. Only used for
/// payloads that cannot be mistaken for the envelope, such as lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ApiResponse<T> {
    pub fn into_inner(self) -> T {
        match self {
            ApiResponse::Wrapped { data } => data,
            ApiResponse::Bare(data) => data,
        }
    }
}

/// HTTP client bound to one backend and one session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("labdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request carrying the session token, if any.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match self.session.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Start a request carrying an explicit token instead of the session's.
    fn request_with_token(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http.request(method, self.url(path)).bearer_auth(token)
    }

    /// Send and return the raw body of a successful response.
    async fn execute(&self, req: RequestBuilder) -> Result<String, ClientError> {
        let req = req.build()?;
        let method = req.method().clone();
        let url = req.url().clone();
        tracing::debug!(%method, %url, "Sending request");

        let resp = self.http.execute(req).await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let err = ClientError::from_status(status, &body);
        if err.is_auth_failure() {
            tracing::warn!(%method, %url, "Backend rejected the session, clearing it");
            self.session.clear();
        } else {
            tracing::debug!(%method, %url, status = status.as_u16(), "Request failed");
        }
        Err(err)
    }

    async fn execute_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let body = self.execute(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        self.execute_json(self.request(Method::GET, path).query(query))
            .await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.execute_json(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.execute_json(self.request(Method::PUT, path).json(body))
            .await
    }

    /// POST with no meaningful response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::POST, path)).await.map(|_| ())
    }

    pub async fn delete_path(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, path)).await.map(|_| ())
    }
}
