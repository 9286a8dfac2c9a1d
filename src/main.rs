use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tourbook::config::AppConfig;
use tourbook::db;
use tourbook::handlers;
use tourbook::services::sensitive::{DisabledSensitiveStore, SensitiveStore, SqliteSensitiveStore};
use tourbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let sensitive: Box<dyn SensitiveStore> = if config.sensitive_records {
        tracing::warn!("sensitive-record store enabled: raw billing payloads are stored in clear text");
        Box::new(SqliteSensitiveStore::new(Arc::clone(&db)))
    } else {
        tracing::info!("sensitive-record store disabled");
        Box::new(DisabledSensitiveStore)
    };

    let state = Arc::new(AppState {
        db: Arc::clone(&db),
        config: config.clone(),
        sensitive,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/activities", get(handlers::catalog::list_activities))
        .route("/api/activities/:slug", get(handlers::catalog::get_activity))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route("/api/admin/activities", get(handlers::admin::get_activities))
        .route("/api/admin/activities", post(handlers::admin::create_activity))
        .route(
            "/api/admin/activities/:id",
            post(handlers::admin::update_activity),
        )
        .route(
            "/api/admin/activities/:id/delete",
            post(handlers::admin::delete_activity),
        )
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/confirm",
            post(handlers::admin::confirm_booking),
        )
        .route(
            "/api/admin/bookings/:id/cancel",
            post(handlers::admin::cancel_booking),
        )
        .route("/api/admin/customers", get(handlers::admin::get_customers))
        .route("/api/dev/seed", post(handlers::dev::seed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The listener has drained; release the store before exiting.
    if let Ok(conn) = db.lock() {
        let _ = conn.execute_batch("PRAGMA optimize;");
    }
    tracing::info!("database connection released");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
