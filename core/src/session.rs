//! Register, search and delete against a live transport.
//!
//! `CatalogSession` ties a `CatalogClient` to a `Transport` and the
//! `Credentials` used to authorize every request. Each operation builds its
//! request, runs it through `executor::execute`, and parses the final
//! response.

use tracing::{info, instrument};

use crate::auth::{Credentials, TokenProvider};
use crate::client::CatalogClient;
use crate::error::ApiError;
use crate::executor::{execute, Transport, DEFAULT_MAX_REDIRECTS};
use crate::types::TableAsset;

#[derive(Debug)]
pub struct CatalogSession<T, P> {
    client: CatalogClient,
    transport: T,
    credentials: Credentials<P>,
    max_redirects: usize,
}

impl<T: Transport, P: TokenProvider> CatalogSession<T, P> {
    pub fn new(client: CatalogClient, transport: T, credentials: Credentials<P>) -> Self {
        Self {
            client,
            transport,
            credentials,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Register `asset` and return the identifier from the `Location` header.
    #[instrument(skip_all, fields(name = %asset.name))]
    pub fn register_asset(&mut self, asset: &TableAsset) -> Result<String, ApiError> {
        let request = self.client.build_register_asset(asset)?;
        let response = execute(&mut self.transport, &mut self.credentials, request, self.max_redirects)?;
        let location = self.client.parse_register_asset(response)?;
        info!(%location, "registered data asset");
        Ok(location)
    }

    /// Search the catalog and return the raw JSON results.
    #[instrument(skip(self))]
    pub fn search(&mut self, search_terms: &str) -> Result<String, ApiError> {
        let request = self.client.build_search(search_terms)?;
        let response = execute(&mut self.transport, &mut self.credentials, request, self.max_redirects)?;
        let body = self.client.parse_search(response)?;
        info!(bytes = body.len(), "search completed");
        Ok(body)
    }

    /// Delete the asset identified by `asset` and return the response status.
    #[instrument(skip(self))]
    pub fn delete_asset(&mut self, asset: &str) -> Result<u16, ApiError> {
        let request = self.client.build_delete_asset(asset)?;
        let response = execute(&mut self.transport, &mut self.credentials, request, self.max_redirects)?;
        let status = self.client.parse_delete_asset(response)?;
        info!(status, "deleted data asset");
        Ok(status)
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials_mut(&mut self) -> &mut Credentials<P> {
        &mut self.credentials
    }
}
