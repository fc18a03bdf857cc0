//! Data models shared by the labdesk client.
//!
//! Records coming back from collection endpoints stay opaque JSON objects;
//! only the session user and publication helpers are strongly typed.

mod publication;
mod record;
mod user;

pub use publication::*;
pub use record::*;
pub use user::*;
