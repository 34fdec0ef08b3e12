//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only the service address, catalog name and API
//! version. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes the final
//! `HttpResponse`. Sending, authentication and redirects happen in between,
//! outside this type.

use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::TableAsset;

pub const DEFAULT_BASE_URL: &str = "https://api.azuredatacatalog.com";
pub const DEFAULT_API_VERSION: &str = "2016-03-30";
/// Alias the service resolves, by redirect, to the caller's own catalog.
pub const DEFAULT_CATALOG: &str = "DefaultCatalog";
/// Page size requested by `build_search`.
pub const SEARCH_COUNT: u32 = 10;

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    catalog: String,
    api_version: String,
}

impl CatalogClient {
    pub fn new(base_url: &str, catalog: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog: catalog.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    /// `POST {base}/catalogs/{catalog}/views/tables`.
    pub fn build_register_asset(&self, asset: &TableAsset) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(asset).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let url = self.endpoint(&["views", "tables"], &[])?;
        Ok(HttpRequest::new(HttpMethod::Post, url).with_json_body(body))
    }

    /// `GET {base}/catalogs/{catalog}/search/search?searchTerms=..&count=10`.
    pub fn build_search(&self, search_terms: &str) -> Result<HttpRequest, ApiError> {
        let count = SEARCH_COUNT.to_string();
        let url = self.endpoint(
            &["search", "search"],
            &[("searchTerms", search_terms), ("count", &count)],
        )?;
        Ok(HttpRequest::new(HttpMethod::Get, url))
    }

    /// `DELETE {asset}`. `asset` is the value returned by `parse_register_asset`:
    /// either an absolute resource URL, or an identifier such as
    /// `tables/abc123` relative to the catalog's `views` collection.
    pub fn build_delete_asset(&self, asset: &str) -> Result<HttpRequest, ApiError> {
        let url = match Url::parse(asset) {
            Ok(mut url) if url.has_host() => {
                if !url.query_pairs().any(|(k, _)| k == "api-version") {
                    url.query_pairs_mut().append_pair("api-version", &self.api_version);
                }
                url.to_string()
            }
            _ => {
                let mut segments = vec!["views"];
                segments.extend(asset.trim_matches('/').split('/').filter(|s| !s.is_empty()));
                self.endpoint(&segments, &[])?
            }
        };
        Ok(HttpRequest::new(HttpMethod::Delete, url))
    }

    /// The created asset's identifier, exactly as sent in `Location`.
    pub fn parse_register_asset(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, &[200, 201])?;
        response
            .header("location")
            .map(str::to_string)
            .ok_or(ApiError::MissingHeader("location"))
    }

    /// The raw JSON search results.
    pub fn parse_search(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, &[200])?;
        Ok(response.body)
    }

    /// The status code the service answered the delete with.
    pub fn parse_delete_asset(&self, response: HttpResponse) -> Result<u16, ApiError> {
        check_status(&response, &[200, 204])?;
        Ok(response.status)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("catalogs")
            .push(&self.catalog)
            .extend(segments);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api-version", &self.api_version);
        }
        Ok(url.to_string())
    }
}

/// Map unexpected status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
