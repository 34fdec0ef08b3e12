//! Synchronous client core for a metadata catalog service.
//!
//! # Overview
//! Registers, searches and deletes data assets over an authenticated REST
//! API. The crate never opens a socket itself: requests are plain data handed
//! to a caller-supplied `Transport`, which keeps every path testable without a
//! network.
//!
//! # Design
//! - `CatalogClient` is stateless; it splits each operation into `build_*`
//!   and `parse_*`.
//! - `Credentials` caches the bearer token from a `TokenProvider` and is
//!   passed explicitly; there is no global token.
//! - `executor::execute` attaches the token and follows redirects up to a
//!   fixed number of hops.
//! - `CatalogSession` composes the three for callers that just want results.

pub mod auth;
pub mod client;
pub mod error;
pub mod executor;
pub mod http;
pub mod session;
pub mod types;

pub use auth::{AccessToken, Credentials, StaticTokenProvider, TokenProvider, TokenRequest};
pub use client::{CatalogClient, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CATALOG};
pub use error::ApiError;
pub use executor::{execute, next_hop, Hop, Transport, DEFAULT_MAX_REDIRECTS};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::CatalogSession;
pub use types::TableAsset;
