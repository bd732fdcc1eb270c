use std::sync::Arc;

use anyhow::{Context, Result};
use request_outbox::{OutboxConfig, ReqwestForwarder, RequestOutbox, Sweeper, web};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = OutboxConfig::from_env().context("failed to load configuration")?;
    let forwarder = Arc::new(ReqwestForwarder::new().context("failed to build forward client")?);
    let outbox = Arc::new(RequestOutbox::new(config.clone(), forwarder));

    Sweeper::new(outbox.store(), config.ttl).spawn();

    let app = web::router(Arc::clone(&outbox));
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    info!(port = config.port, "listening");
    info!(
        capture = %format!("{}/capture?targetUrl=original-url", config.callback),
        "capturing requests"
    );
    info!(
        ttl_secs = config.ttl.as_secs(),
        callback = %config.callback,
        forward_headers = ?config.forward_headers,
        "configuration"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("request_outbox=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => error!(error = %err, "unable to install terminate handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
