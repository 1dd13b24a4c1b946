use checkout_ledger::api;
use checkout_ledger::chain::SharedChain;
use checkout_ledger::config::ServerConfig;
use checkout_ledger::error::LedgerError;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "checkout-ledger",
    version,
    about = "Append-only, hash-linked ledger of book checkouts"
)]
struct Cli {
    /// Listen address
    #[arg(long, env = "LEDGER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(long, env = "LEDGER_PORT", default_value = "8080")]
    port: u16,

    /// tracing filter directive (e.g. "debug" or "checkout_ledger=trace")
    #[arg(long = "log", env = "LEDGER_LOG", default_value = "info")]
    log_filter: String,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            log_filter: cli.log_filter,
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from(Cli::parse());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(config).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), LedgerError> {
    let chain = SharedChain::new()?;
    for block in chain.snapshot() {
        debug!(
            position = block.position,
            prev_hash = %block.prev_hash,
            hash = %block.hash,
            "{}",
            serde_json::to_string_pretty(&block)?
        );
    }

    let app = api::create_router(chain);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
