use std::{error::Error, future::Future, sync::Arc};

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use config::AppConfig;
use cqrs::NotifyOrderCommandHandler;
use dotenv::dotenv;
use notifier::WebhookDispatcher;
use state::AppState;
use tokio::signal;
use tracing::{event, Level};

mod clock;
mod config;
mod cqrs;
mod domain;
mod dtos;
mod errors;
mod normalize;
mod notifier;
mod render;
mod routes;
mod state;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = AppConfig::from_env()?;

    let subscriber = tracing_subscriber::
    fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .with_ansi(false)
    .json()
    .with_file(true)
    .with_line_number(true)
    .with_current_span(true);

    match &config.log_path {
        Some(path) => subscriber.with_writer(std::fs::File::create(path)?).init(),
        None => subscriber.init(),
    }

    if config.primary_webhook_url.is_none() {
        event!(Level::WARN, "DISCORD_WEBHOOK_URL is not set, every order delivery will fail");
    }

    let dispatcher = Arc::new(WebhookDispatcher::from_config(&config)?);
    event!(Level::INFO, "delivering orders to {} webhook target(s)", dispatcher.targets().len());
    let notify_order_command_handler = Arc::new(NotifyOrderCommandHandler::new(dispatcher));

    let state = Arc::new(AppState {
        notify_order_command_handler: notify_order_command_handler,
        max_body_bytes: config.max_body_bytes,
    });

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    event!(Level::INFO, "Starting server on {}", config.bind_address());

    let app = routes::api_routes(state)
        .route("/metrics", get(|| async move {metrics_handle.render()}))

        .layer(prometheus_layer);

    axum::serve(listener, routes::with_layers(app, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            event!(Level::WARN, "could not install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                event!(Level::WARN, "could not install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = first_signal(ctrl_c, terminate).await;
    event!(Level::INFO, "received {}, shutting down", received);
}

/// Resolves with the name of whichever shutdown signal arrives first.
async fn first_signal<C, T>(ctrl_c: C, terminate: T) -> &'static str
where
    C: Future<Output = ()>,
    T: Future<Output = ()>,
{
    tokio::select! {
        () = ctrl_c => "Ctrl+C",
        () = terminate => "SIGTERM",
    }
}
