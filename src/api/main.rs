use anyhow::Context;
use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use bpmn_modeler::config::AppConfig;
use bpmn_modeler::middleware::{
    create_cors_layer, create_rate_limiter, init_tracing, rate_limit_middleware,
};
use bpmn_modeler::routes::{AppState, create_api_router};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    init_tracing(config.log_json)
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {}", e))?;
    info!("Application starting...");

    let app_state = AppState::from_config(&config)
        .await
        .context("Failed to open document store")?;

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1", create_api_router());

    // Static frontend, with index.html for client-side routes
    if config.frontend_dir.exists() {
        info!("Serving frontend from: {:?}", config.frontend_dir);
        app = app.fallback_service(
            ServeDir::new(&config.frontend_dir)
                .append_index_html_on_directories(true)
                .precompressed_gzip()
                .precompressed_br(),
        );
    } else {
        warn!(
            "Frontend directory not found: {:?}. Frontend will not be served.",
            config.frontend_dir
        );
        app = app.fallback(not_found);
    }

    let limiter = create_rate_limiter(config.rate_limit_per_minute);
    let app = app.with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&config.cors_origins))
            .layer(from_fn_with_state(limiter, rate_limit_middleware)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bpmn-modeler-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": format!("No route for {}", uri.path()),
            "status": StatusCode::NOT_FOUND.as_u16(),
        })),
    )
}

// SIGINT (Ctrl+C) or SIGTERM (container stop)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
