//! Roost server - main entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roost_crypto::{EncryptionEngine, MasterKey};
use roost_keyring::{ApiKeyService, KeyringConfig};
use roost_server::{router, AppState};
use roost_storage_sqlite::SqliteKeyStore;

#[derive(Parser)]
#[command(name = "roost-server")]
#[command(about = "Roost - encrypted platform credential service")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "127.0.0.1:8300", env = "ROOST_BIND_ADDRESS")]
    bind: String,

    /// Data directory for the key database
    #[arg(long, default_value = "data", env = "ROOST_DATA_DIR")]
    data_dir: PathBuf,

    /// Master encryption key
    #[arg(long, env = "ROOST_MASTER_KEY", hide_env_values = true)]
    master_key: String,

    /// Maximum number of keys per platform
    #[arg(long, env = "ROOST_MAX_KEYS_PER_PLATFORM")]
    max_keys_per_platform: Option<usize>,

    /// Default expiration for new keys, in days
    #[arg(long, env = "ROOST_DEFAULT_EXPIRATION_DAYS")]
    default_expiration_days: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Roost server...");
    tracing::info!("Bind address: {}", cli.bind);
    tracing::info!("Data directory: {}", cli.data_dir.display());

    let master_key = MasterKey::new(cli.master_key)?;
    let store = SqliteKeyStore::open(&cli.data_dir).await?;
    let engine = EncryptionEngine::new(master_key);

    let config = KeyringConfig {
        max_keys_per_platform: cli.max_keys_per_platform,
        default_expiration_days: cli.default_expiration_days,
        ..KeyringConfig::default()
    };
    let keyring = Arc::new(ApiKeyService::with_config(Arc::new(store), engine, config));

    let app = router(AppState::new(keyring));

    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    tracing::info!("Roost server listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
