//! Authenticated REST client for the taskdeck project-management backend.
//!
//! Exposes the transport ([`ApiClient`]), the session state it reads
//! credentials from ([`SessionStore`]), one resource module per backend
//! entity family, and an explicit query cache with mutation-driven
//! invalidation. Integration tests and the CLI binary both build on these.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod resources;
pub mod session;
pub mod storage;

pub use cache::{Mutation, QueryCache, QueryKey};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use request::ApiRequest;
pub use session::{Session, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
