//! Bearer tokens and the credential cache.
//!
//! # Design
//! Acquiring a token is delegated to a `TokenProvider`. `Credentials` owns the
//! provider and the last token it returned; it is passed explicitly to
//! whatever needs a token instead of living in a global. The provider is
//! consulted again only when the cached token is missing, expired, or has been
//! invalidated by the caller.

use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::error::ApiError;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Parameters identifying which token to acquire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Resource (audience) the token is issued for.
    pub resource: String,
    pub client_id: String,
    pub redirect_uri: String,
}

/// An opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub tenant_id: String,
    pub expires_at: Option<SystemTime>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tenant_id: tenant_id.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(mut self, at: SystemTime) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        match self.expires_at {
            Some(at) => now + EXPIRY_SKEW >= at,
            None => false,
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens.
pub trait TokenProvider {
    fn acquire_token(&mut self, request: &TokenRequest) -> Result<AccessToken, ApiError>;
}

impl<P: TokenProvider + ?Sized> TokenProvider for Box<P> {
    fn acquire_token(&mut self, request: &TokenRequest) -> Result<AccessToken, ApiError> {
        (**self).acquire_token(request)
    }
}

/// Provider for a token obtained out of band.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn acquire_token(&mut self, _request: &TokenRequest) -> Result<AccessToken, ApiError> {
        Ok(self.token.clone())
    }
}

/// Token cache in front of a `TokenProvider`.
#[derive(Debug)]
pub struct Credentials<P> {
    provider: P,
    request: TokenRequest,
    cached: Option<AccessToken>,
}

impl<P: TokenProvider> Credentials<P> {
    pub fn new(provider: P, request: TokenRequest) -> Self {
        Self {
            provider,
            request,
            cached: None,
        }
    }

    /// Current token, acquiring one if none is cached or the cached one has
    /// expired.
    pub fn token(&mut self) -> Result<AccessToken, ApiError> {
        self.token_at(SystemTime::now())
    }

    pub fn token_at(&mut self, now: SystemTime) -> Result<AccessToken, ApiError> {
        if let Some(token) = &self.cached {
            if !token.is_expired_at(now) {
                return Ok(token.clone());
            }
            debug!(tenant = %token.tenant_id, "cached token expired");
        }
        debug!(resource = %self.request.resource, "acquiring token");
        let token = self.provider.acquire_token(&self.request)?;
        self.cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next call goes to the provider.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingProvider {
        calls: usize,
        lifetime: Option<Duration>,
    }

    impl TokenProvider for CountingProvider {
        fn acquire_token(&mut self, request: &TokenRequest) -> Result<AccessToken, ApiError> {
            self.calls += 1;
            assert_eq!(request.resource, "https://catalog.test");
            let token = AccessToken::new(format!("token-{}", self.calls), "tenant");
            Ok(match self.lifetime {
                Some(d) => token.expiring_at(SystemTime::UNIX_EPOCH + d),
                None => token,
            })
        }
    }

    struct FailingProvider;

    impl TokenProvider for FailingProvider {
        fn acquire_token(&mut self, _request: &TokenRequest) -> Result<AccessToken, ApiError> {
            Err(ApiError::Token("consent required".to_string()))
        }
    }

    fn request() -> TokenRequest {
        TokenRequest {
            resource: "https://catalog.test".to_string(),
            client_id: "client".to_string(),
            redirect_uri: "https://login.live.com/oauth20_desktop.srf".to_string(),
        }
    }

    #[test]
    fn provider_is_called_once() {
        let mut creds = Credentials::new(CountingProvider::default(), request());
        let first = creds.token().unwrap();
        let second = creds.token().unwrap();
        let third = creds.token().unwrap();
        assert_eq!(first.value, "token-1");
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(creds.provider().calls, 1);
    }

    #[test]
    fn invalidate_forces_refresh() {
        let mut creds = Credentials::new(CountingProvider::default(), request());
        creds.token().unwrap();
        creds.invalidate();
        let token = creds.token().unwrap();
        assert_eq!(token.value, "token-2");
        assert_eq!(creds.provider().calls, 2);
    }

    #[test]
    fn expired_token_is_refreshed() {
        let provider = CountingProvider {
            calls: 0,
            lifetime: Some(Duration::from_secs(3600)),
        };
        let mut creds = Credentials::new(provider, request());
        let start = SystemTime::UNIX_EPOCH;

        creds.token_at(start).unwrap();
        creds.token_at(start + Duration::from_secs(1000)).unwrap();
        assert_eq!(creds.provider().calls, 1);

        // Inside the skew window counts as expired.
        creds.token_at(start + Duration::from_secs(3600 - 30)).unwrap();
        assert_eq!(creds.provider().calls, 2);
    }

    #[test]
    fn provider_failure_is_not_cached() {
        let mut creds = Credentials::new(FailingProvider, request());
        assert!(matches!(creds.token(), Err(ApiError::Token(_))));
        assert!(matches!(creds.token(), Err(ApiError::Token(_))));
    }

    #[test]
    fn authorization_header_uses_bearer_scheme() {
        let token = AccessToken::new("abc", "tenant");
        assert_eq!(token.authorization_header(), "Bearer abc");
    }

    #[test]
    fn debug_output_redacts_value() {
        let token = AccessToken::new("super-secret", "tenant");
        let printed = format!("{token:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("tenant"));
    }

    #[test]
    fn static_provider_returns_its_token() {
        let mut creds = Credentials::new(StaticTokenProvider::new(AccessToken::new("fixed", "t")), request());
        assert_eq!(creds.token().unwrap().value, "fixed");
    }
}
