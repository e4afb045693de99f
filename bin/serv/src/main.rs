use axum::routing::get;
use qz_api::{config::ApiConfig, state::ApiState};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    qz_api::tracing::init_tracing(config.env);

    // Connect and migrate
    let pool = qz_db::create_pool(&config.database_url, 10).await?;
    qz_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let metrics_handle = qz_api::metrics::init_metrics()?;

    let state = ApiState::new(&config, pool);

    // Create the application router
    let app = qz_api::router::router()
        .with_state(state)
        .route(
            "/metrics",
            get(qz_api::metrics::metrics_handler).with_state(metrics_handle),
        )
        .layer(axum::middleware::from_fn(qz_api::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive());

    // Start the server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
