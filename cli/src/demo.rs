//! The interactive register / search / delete walkthrough.
//!
//! Each step that fails is reported (message, status, server body) and yields
//! `None`; the walkthrough then carries on with the next step.

use std::io::{self, BufRead, Write};
use std::path::Path;

use catalog_core::{ApiError, CatalogSession, TableAsset, TokenProvider, Transport};
use tracing::{error, info};

pub const ORDERS_SAMPLE: &str = "OrdersSample";
pub const DELETE_SAMPLE: &str = "DeleteSample";
pub const SEARCH_TERMS: &str = "name:=OrdersSample";

/// Waits for the operator between steps.
pub trait Pause {
    fn pause(&mut self, message: &str) -> io::Result<()>;
}

/// Prints the message and blocks until a line arrives on stdin.
pub struct StdinPause;

impl Pause for StdinPause {
    fn pause(&mut self, message: &str) -> io::Result<()> {
        println!("{message}");
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Never waits.
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// What each step produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub registered: Option<String>,
    pub search_results: Option<String>,
    pub delete_candidate: Option<String>,
    pub deleted: Option<u16>,
}

/// Log a failed step and turn the result into an option.
fn settle<R>(step: &str, out: &mut dyn Write, result: Result<R, ApiError>) -> io::Result<Option<R>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            error!(step, error = %e, status = ?e.status(), body = e.body().unwrap_or_default(), "step failed");
            writeln!(out, "{step} failed: {e}")?;
            Ok(None)
        }
    }
}

pub fn run<T, P>(
    session: &mut CatalogSession<T, P>,
    pause: &mut dyn Pause,
    output: &Path,
    out: &mut dyn Write,
) -> io::Result<DemoReport>
where
    T: Transport,
    P: TokenProvider,
{
    let mut report = DemoReport::default();

    report.registered = settle("register", out, session.register_asset(&TableAsset::sample(ORDERS_SAMPLE)))?;
    if let Some(location) = &report.registered {
        writeln!(out, "Registered data asset: {location}")?;
    }
    pause.pause("Registered data asset. Press Enter to continue")?;

    report.search_results = settle("search", out, session.search(SEARCH_TERMS))?;
    if let Some(json) = &report.search_results {
        match std::fs::write(output, json) {
            Ok(()) => info!(path = %output.display(), "saved search results"),
            Err(e) => error!(path = %output.display(), error = %e, "could not save search results"),
        }
        writeln!(out, "{json}")?;
        writeln!(out)?;
    }
    pause.pause("Searched data asset. Press Enter to continue")?;

    pause.pause("Register sample data asset to delete. Press Enter to continue")?;
    report.delete_candidate = settle("register", out, session.register_asset(&TableAsset::sample(DELETE_SAMPLE)))?;

    pause.pause("Delete data asset. Press Enter to continue")?;
    if let Some(asset) = &report.delete_candidate {
        report.deleted = settle("delete", out, session.delete_asset(asset))?;
    }
    if let Some(status) = report.deleted {
        writeln!(out, "Deleted data asset: HTTP {status}")?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use catalog_core::{
        AccessToken, CatalogClient, Credentials, HttpMethod, HttpRequest, HttpResponse, StaticTokenProvider,
        TokenRequest,
    };

    use super::*;

    struct ScriptedTransport {
        responses: VecDeque<HttpResponse>,
        sent: Vec<HttpRequest>,
    }

    impl Transport for ScriptedTransport {
        fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.push(request.clone());
            self.responses
                .pop_front()
                .ok_or_else(|| ApiError::Transport("connection reset".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingPause {
        messages: Vec<String>,
    }

    impl Pause for CountingPause {
        fn pause(&mut self, message: &str) -> io::Result<()> {
            self.messages.push(message.to_string());
            Ok(())
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: body.to_string(),
        }
    }

    fn session(responses: Vec<HttpResponse>) -> CatalogSession<ScriptedTransport, StaticTokenProvider> {
        let transport = ScriptedTransport {
            responses: responses.into(),
            sent: Vec::new(),
        };
        let credentials = Credentials::new(
            StaticTokenProvider::new(AccessToken::new("tok", "tenant")),
            TokenRequest {
                resource: "https://catalog.test".to_string(),
                client_id: "client".to_string(),
                redirect_uri: "urn:test".to_string(),
            },
        );
        CatalogSession::new(CatalogClient::new("http://svc", "contoso"), transport, credentials)
    }

    #[test]
    fn happy_path_runs_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("searchJson.txt");
        let search_body = r#"{"results":[{"id":"tables/abc123"}]}"#;
        let mut s = session(vec![
            response(201, &[("Location", "tables/abc123")], ""),
            response(200, &[], search_body),
            response(201, &[("Location", "tables/def456")], ""),
            response(204, &[], ""),
        ]);
        let mut pause = CountingPause::default();
        let mut out = Vec::new();

        let report = run(&mut s, &mut pause, &output, &mut out).unwrap();

        assert_eq!(report.registered.as_deref(), Some("tables/abc123"));
        assert_eq!(report.search_results.as_deref(), Some(search_body));
        assert_eq!(report.delete_candidate.as_deref(), Some("tables/def456"));
        assert_eq!(report.deleted, Some(204));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), search_body);
        assert_eq!(pause.messages.len(), 4);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(search_body));
        assert!(printed.contains("Deleted data asset: HTTP 204"));

        let delete = &s.transport().sent[3];
        assert_eq!(delete.method, HttpMethod::Delete);
        assert!(delete.url.contains("/views/tables/def456"));
    }

    #[test]
    fn failures_become_none_and_the_walkthrough_continues() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("searchJson.txt");
        let mut s = session(vec![
            response(400, &[], r#"{"error":{"code":"InvalidPayload"}}"#),
            response(500, &[], ""),
            response(201, &[("Location", "tables/def456")], ""),
            response(404, &[], ""),
        ]);
        let mut out = Vec::new();

        let report = run(&mut s, &mut NoPause, &output, &mut out).unwrap();

        assert_eq!(report.registered, None);
        assert_eq!(report.search_results, None);
        assert_eq!(report.delete_candidate.as_deref(), Some("tables/def456"));
        assert_eq!(report.deleted, None);
        assert!(!output.exists());

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("register failed: HTTP 400"));
        assert!(printed.contains("search failed: HTTP 500"));
        assert!(printed.contains("delete failed: resource not found"));
    }

    #[test]
    fn delete_is_skipped_without_a_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(Vec::new());
        let mut out = Vec::new();
        let report = run(&mut s, &mut NoPause, &dir.path().join("out.txt"), &mut out).unwrap();
        assert_eq!(report, DemoReport::default());
        // register, search, register: the delete is never sent.
        assert_eq!(s.transport().sent.len(), 3);
    }
}
