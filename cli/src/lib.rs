//! Sample client for a metadata catalog service.
//!
//! Wires `catalog-core` to a blocking ureq transport, an OAuth2
//! client-credentials token provider, and command-line configuration, and
//! runs the register / search / delete walkthrough.

pub mod config;
pub mod demo;
pub mod token;
pub mod transport;

pub use config::{AuthMode, Cli, ConfigError};
pub use demo::{DemoReport, NoPause, Pause, StdinPause};
pub use token::ClientCredentialsProvider;
pub use transport::UreqTransport;
