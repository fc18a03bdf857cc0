//! Labdesk
//!
//! Client for the laboratory content-management REST backend: session
//! handling, route authorization, and the list/search/paginate/bulk-action
//! screens shared by every entity collection.

pub mod api;
pub mod auth;
pub mod config;
pub mod entities;
pub mod errors;
pub mod forms;
pub mod listing;
pub mod models;
pub mod notify;
pub mod session;
pub mod storage;
pub mod validation;

pub use api::ApiClient;
pub use config::Config;
pub use errors::ClientError;
pub use session::SessionStore;
