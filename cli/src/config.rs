//! Command-line and environment configuration.

use std::path::PathBuf;

use catalog_core::{TokenRequest, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_CATALOG, DEFAULT_MAX_REDIRECTS};
use clap::{ArgAction, Parser};
use thiserror::Error;

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
/// Placeholder redirect URI for native clients without a callback endpoint.
pub const DEFAULT_REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";
pub const DEFAULT_OUTPUT: &str = "searchJson.txt";

#[derive(Debug, Parser)]
#[command(name = "catalog-sample")]
#[command(about = "Register, search and delete a data asset in a metadata catalog", long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Catalog API root
    #[arg(long, env = "CATALOG_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Catalog name; `DefaultCatalog` is resolved by the service
    #[arg(long, env = "CATALOG_NAME", default_value = DEFAULT_CATALOG)]
    pub catalog: String,

    #[arg(long, env = "CATALOG_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Redirect hops to follow before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Where the raw search results are written
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Run every step without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Pre-acquired bearer token; skips the token endpoint
    #[arg(long, env = "CATALOG_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Directory tenant used to acquire and label the token
    #[arg(long, env = "CATALOG_TENANT", default_value = "common")]
    pub tenant: String,

    #[arg(long, env = "CATALOG_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "CATALOG_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth2 authority; the token endpoint is `{authority}/{tenant}/oauth2/token`
    #[arg(long, env = "CATALOG_AUTHORITY", default_value = DEFAULT_AUTHORITY)]
    pub authority: String,

    /// Resource the token is requested for
    #[arg(long, env = "CATALOG_RESOURCE", default_value = DEFAULT_BASE_URL)]
    pub resource: String,

    #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
    pub redirect_uri: String,
}

/// How the bearer token is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    Static { token: String },
    ClientCredentials { client_id: String, client_secret: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("either --access-token or both --client-id and --client-secret are required")]
    MissingCredentials,
}

impl Cli {
    pub fn auth_mode(&self) -> Result<AuthMode, ConfigError> {
        if let Some(token) = &self.access_token {
            return Ok(AuthMode::Static { token: token.clone() });
        }
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok(AuthMode::ClientCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    pub fn token_request(&self) -> TokenRequest {
        TokenRequest {
            resource: self.resource.clone(),
            client_id: self.client_id.clone().unwrap_or_default(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_public_service() {
        let cli = Cli::try_parse_from(["catalog-sample", "--access-token", "t"]).unwrap();
        assert_eq!(cli.catalog, "DefaultCatalog");
        assert_eq!(cli.api_version, "2016-03-30");
        assert_eq!(cli.max_redirects, 10);
        assert_eq!(cli.output, PathBuf::from("searchJson.txt"));
        assert!(!cli.no_pause);
    }

    #[test]
    fn access_token_wins_over_client_credentials() {
        let cli = Cli::try_parse_from([
            "catalog-sample",
            "--access-token",
            "abc",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
        ])
        .unwrap();
        assert_eq!(cli.auth_mode().unwrap(), AuthMode::Static { token: "abc".to_string() });
    }

    #[test]
    fn client_credentials_need_both_halves() {
        let cli = Cli::try_parse_from(["catalog-sample", "--client-id", "id"]).unwrap();
        assert_eq!(cli.auth_mode().unwrap_err(), ConfigError::MissingCredentials);

        let cli = Cli::try_parse_from(["catalog-sample", "--client-id", "id", "--client-secret", "s"]).unwrap();
        assert!(matches!(cli.auth_mode().unwrap(), AuthMode::ClientCredentials { .. }));
    }

    #[test]
    fn token_request_carries_resource_and_client() {
        let cli = Cli::try_parse_from(["catalog-sample", "--client-id", "id", "--resource", "https://res"]).unwrap();
        let req = cli.token_request();
        assert_eq!(req.resource, "https://res");
        assert_eq!(req.client_id, "id");
        assert_eq!(req.redirect_uri, DEFAULT_REDIRECT_URI);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["catalog-sample", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
