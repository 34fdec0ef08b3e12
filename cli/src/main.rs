//! catalog-sample: register, search and delete a data asset.

use std::io;

use catalog_cli::{demo, AuthMode, Cli, ClientCredentialsProvider, NoPause, Pause, StdinPause, UreqTransport};
use catalog_core::{AccessToken, CatalogClient, CatalogSession, Credentials, StaticTokenProvider, TokenProvider};
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("catalog_core={level},catalog_cli={level},catalog_sample={level}"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let provider: Box<dyn TokenProvider> = match cli.auth_mode()? {
        AuthMode::Static { token } => Box::new(StaticTokenProvider::new(AccessToken::new(token, &cli.tenant))),
        AuthMode::ClientCredentials { client_secret, .. } => {
            Box::new(ClientCredentialsProvider::new(&cli.authority, &cli.tenant, &client_secret))
        }
    };
    let credentials = Credentials::new(provider, cli.token_request());
    let client = CatalogClient::new(&cli.base_url, &cli.catalog).with_api_version(&cli.api_version);
    let mut session =
        CatalogSession::new(client, UreqTransport::new(), credentials).with_max_redirects(cli.max_redirects);

    let mut pause: Box<dyn Pause> = if cli.no_pause { Box::new(NoPause) } else { Box::new(StdinPause) };
    let report = demo::run(&mut session, pause.as_mut(), &cli.output, &mut io::stdout().lock())?;
    tracing::info!(?report, "walkthrough finished");
    Ok(())
}
