//! The whole walkthrough against the live mock server.
//!
//! Tokens come from the mock's client-credentials endpoint and the session
//! starts on `DefaultCatalog`, so the run covers token caching, redirects and
//! the search output file in one go.

use std::sync::Arc;

use catalog_cli::{demo, ClientCredentialsProvider, NoPause, UreqTransport};
use catalog_core::{AccessToken, CatalogClient, CatalogSession, Credentials, StaticTokenProvider, TokenRequest};
use mock_server::MockCatalog;

fn start_server(db: Arc<MockCatalog>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn token_request(base_url: &str) -> TokenRequest {
    TokenRequest {
        resource: base_url.to_string(),
        client_id: "sample-client".to_string(),
        redirect_uri: "https://login.live.com/oauth20_desktop.srf".to_string(),
    }
}

#[test]
fn walkthrough_against_mock_service() {
    let db = Arc::new(MockCatalog::default());
    let base_url = start_server(db.clone());
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("searchJson.txt");

    let provider = ClientCredentialsProvider::new(&base_url, "tenant-a", "sample-secret");
    let credentials = Credentials::new(provider, token_request(&base_url));
    let mut session = CatalogSession::new(
        CatalogClient::new(&base_url, "DefaultCatalog"),
        UreqTransport::new(),
        credentials,
    );

    let mut out = Vec::new();
    let report = demo::run(&mut session, &mut NoPause, &output, &mut out).unwrap();

    let registered = report.registered.expect("register step failed");
    assert!(registered.starts_with("tables/"));

    let json = report.search_results.expect("search step failed");
    assert_eq!(std::fs::read_to_string(&output).unwrap(), json);
    let results: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(results["totalResults"], 1);
    assert_eq!(results["results"][0]["content"]["name"], "OrdersSample");

    let candidate = report.delete_candidate.expect("second register failed");
    assert_ne!(candidate, registered);
    assert_eq!(report.deleted, Some(204));

    // OrdersSample is left behind; DeleteSample is gone.
    let remaining = stored_assets(&db);
    assert_eq!(remaining, 1);

    // Four operations, each redirected once; one token for the whole run.
    assert_eq!(db.requests(), 8);
    assert_eq!(db.redirects(), 4);
    assert_eq!(db.tokens_issued(), 1);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains(&json));
    assert!(printed.contains("Deleted data asset: HTTP 204"));
}

#[test]
fn rejected_token_leaves_every_step_empty() {
    let db = Arc::new(MockCatalog::default());
    let base_url = start_server(db.clone());
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("searchJson.txt");

    let credentials = Credentials::new(
        StaticTokenProvider::new(AccessToken::new("", "tenant-a")),
        token_request(&base_url),
    );
    let mut session = CatalogSession::new(CatalogClient::new(&base_url, "contoso"), UreqTransport::new(), credentials);

    let mut out = Vec::new();
    let report = demo::run(&mut session, &mut NoPause, &output, &mut out).unwrap();

    assert_eq!(report, demo::DemoReport::default());
    assert!(!output.exists());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("register failed: HTTP 401"));
    assert!(printed.contains("search failed: HTTP 401"));
}

#[test]
fn bad_client_secret_is_reported_per_step() {
    let base_url = start_server(Arc::new(MockCatalog::default()));
    let dir = tempfile::tempdir().unwrap();

    let provider = ClientCredentialsProvider::new(&base_url, "tenant-a", "");
    let credentials = Credentials::new(provider, token_request(&base_url));
    let mut session = CatalogSession::new(CatalogClient::new(&base_url, "contoso"), UreqTransport::new(), credentials);

    let mut out = Vec::new();
    let report = demo::run(&mut session, &mut NoPause, &dir.path().join("out.txt"), &mut out).unwrap();

    assert_eq!(report, demo::DemoReport::default());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("token acquisition failed: HTTP 401"));
}

/// Count stored assets from outside the server runtime.
fn stored_assets(db: &MockCatalog) -> usize {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(db.asset_count())
}
