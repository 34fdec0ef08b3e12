//! Authenticated request execution with redirect following.
//!
//! # Design
//! The loop is split in two. `next_hop` is a pure function that looks at a
//! request and the response it produced and decides whether the exchange is
//! finished or which new request to send. `execute` drives that decision with
//! a `Transport`, attaching a fresh bearer token on every hop and stopping
//! after `max_redirects` hops.

use tracing::{debug, warn};

use crate::auth::{Credentials, TokenProvider};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Executes a single HTTP exchange. Implementations must not follow
/// redirects and must return non-2xx responses as data.
pub trait Transport {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Outcome of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop {
    /// Final response for the caller.
    Done(HttpResponse),
    /// The server redirected; send this request next.
    Follow(HttpRequest),
}

/// Decide what to do with `response`, which was produced by `request`.
pub fn next_hop(request: &HttpRequest, response: HttpResponse) -> Result<Hop, ApiError> {
    if !response.is_redirect() {
        return Ok(Hop::Done(response));
    }
    let location = response.header("location").ok_or(ApiError::MissingHeader("location"))?;
    Ok(Hop::Follow(request.redirect_to(location)?))
}

/// Send `request` with a bearer token and follow redirects until a final
/// response arrives.
pub fn execute<T, P>(
    transport: &mut T,
    credentials: &mut Credentials<P>,
    request: HttpRequest,
    max_redirects: usize,
) -> Result<HttpResponse, ApiError>
where
    T: Transport + ?Sized,
    P: TokenProvider,
{
    let mut current = request;
    let mut hops = 0;
    loop {
        let token = credentials.token()?;
        let authorized = current.with_header("authorization", token.authorization_header());
        debug!(
            method = current.method.as_str(),
            url = %current.url,
            hop = hops,
            content_length = authorized.content_length(),
            "sending request"
        );
        let response = transport.send(&authorized)?;
        debug!(status = response.status, "received response");

        match next_hop(&current, response)? {
            Hop::Done(response) => return Ok(response),
            Hop::Follow(next) => {
                if hops == max_redirects {
                    warn!(max = max_redirects, url = %next.url, "redirect limit reached");
                    return Err(ApiError::TooManyRedirects { max: max_redirects });
                }
                debug!(from = %current.url, to = %next.url, "following redirect");
                hops += 1;
                current = next;
            }
        }
    }
}
