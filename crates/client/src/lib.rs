//! Assetdesk API client
//!
//! An HTTP client for the Assetdesk asset management backend that attaches the
//! session's bearer token to every call and transparently recovers from an
//! expired access token: the first 401 of a request triggers one refresh
//! through the server-set refresh cookie, then the request is replayed once.
//! When the refresh itself is rejected, the token is cleared and subscribers
//! receive [`SessionEvent::Unauthenticated`].

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod retry;
pub mod session;
pub mod store;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::ClientConfig;
pub use error::ClientError;
pub use request::{ApiResponse, RequestDescriptor};
pub use session::{AuthSession, SessionEvent};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

pub type Result<T> = std::result::Result<T, ClientError>;
