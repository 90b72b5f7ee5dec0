use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookpicks::{
    api,
    config::{Config, GeneratorBackend},
    enrichment::{self, KeywordWorker, OutboxRelay},
    generator::{LocalGenerator, OpenAiGenerator, TextGenerator},
    lookup::{AuthorLookup, DisabledLookup, GoogleBooksLookup},
    service::BookService,
    storage::Database,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "bookpicks starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize database
    let db = Database::open(&config.server.data_dir)?;
    info!("Database opened at: {}", config.server.data_dir);

    // Text generator backend
    let generator: Arc<dyn TextGenerator> = match config.generator.backend {
        GeneratorBackend::Local => {
            info!("Using local text generator");
            Arc::new(LocalGenerator::new())
        }
        GeneratorBackend::OpenAi => {
            let api_key = config
                .generator
                .openai_api_key
                .as_deref()
                .unwrap_or_default();
            let generator = OpenAiGenerator::new(
                api_key,
                &config.generator.openai_base_url,
                &config.generator.openai_model,
                config.generator_timeout(),
            )?;
            info!(model = %config.generator.openai_model, "Using OpenAI text generator");
            Arc::new(generator)
        }
    };

    // Title to author lookup
    let lookup: Arc<dyn AuthorLookup> = if config.lookup.enabled {
        Arc::new(GoogleBooksLookup::new(
            &config.lookup.url,
            config.lookup_timeout(),
        )?)
    } else {
        info!("Author lookup disabled");
        Arc::new(DisabledLookup)
    };

    // Enrichment queue and the aggregate service
    let (queue, receiver) = enrichment::channel(config.enrichment.queue_capacity);
    let service = Arc::new(BookService::new(
        db.clone(),
        Arc::new(queue),
        Arc::clone(&generator),
        lookup,
        config.service_config(),
    ));

    // Start enrichment background tasks
    let worker = KeywordWorker::new(Arc::clone(&service), Arc::clone(&generator), receiver);
    let relay = OutboxRelay::new(Arc::clone(&service), config.relay_interval());
    let background = vec![tokio::spawn(worker.run()), tokio::spawn(relay.run())];

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        service,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: abort background tasks. Unrelayed messages stay in the outbox.
    info!("Shutting down background tasks");
    for handle in background {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
