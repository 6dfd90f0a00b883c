//! gemini-relay binary: JSON-lines events on stdin, replies on stdout.

use std::sync::Arc;
use thiserror::Error;
use tokio::io::{self, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gemini_relay::adapters::ai::{CredentialPool, CredentialPoolError, CredentialRotatingClient};
use gemini_relay::adapters::gemini::GeminiBackend;
use gemini_relay::adapters::i18n::{CatalogError, JsonCatalog};
use gemini_relay::adapters::messaging::StdioMessenger;
use gemini_relay::adapters::persona::load_persona;
use gemini_relay::adapters::sqlite::SqliteHistoryStore;
use gemini_relay::application::{run_event_loop, Dispatcher, DispatcherConfig};
use gemini_relay::config::{AppConfig, ConfigError, LogFormat, LoggingConfig, ValidationError};
use gemini_relay::ports::{BackendError, HistoryError};

/// Failures that stop the process with a non-zero exit.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("history store unavailable: {0}")]
    History(#[from] HistoryError),

    #[error("credential pool: {0}")]
    Credentials(#[from] CredentialPoolError),

    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),

    #[error("message catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("stdin: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing(logging: &LoggingConfig, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("gemini-relay: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    let format = config.logging.format()?;
    init_tracing(&config.logging, format);
    config.validate()?;

    let history = Arc::new(
        SqliteHistoryStore::connect(&config.database.url, config.database.max_connections).await?,
    );

    let backend = Arc::new(GeminiBackend::new(config.ai.gemini())?);
    let pool = CredentialPool::new(config.ai.credentials())?;
    let client = Arc::new(CredentialRotatingClient::new(backend, pool));
    let info = client.backend_info();
    info!(
        backend = %info.name,
        chat_model = %info.chat_model,
        vision_model = %info.vision_model,
        credentials = client.pool_size(),
        "Generation client ready"
    );

    let persona = load_persona(config.persona.enabled, config.persona.file()).await;
    let messenger =
        Arc::new(StdioMessenger::new(io::stdout()).with_media_dir(config.messaging.media_dir.clone()));

    let dispatcher = Arc::new(Dispatcher::new(
        client,
        history,
        messenger,
        Arc::new(JsonCatalog::embedded()?),
        DispatcherConfig {
            persona,
            send_timeout: config.messaging.send_timeout(),
            store: config.store.store_info(),
        },
    ));

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let result = run_event_loop(BufReader::new(io::stdin()), dispatcher, shutdown).await;

    info!("Stopped");
    result?;
    Ok(())
}
