use sea_orm::Database;
use tracing::info;

use hapa_api::config::ApiConfig;
use hapa_api::router::build_router;
use hapa_api::state::AppState;
use hapa_core::config::Config;
use hapa_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = ApiConfig::from_env();
    config.validate().expect("invalid configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState::from_config(&config, db);
    let router = build_router(state, &config.cors_origins);

    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(sms_provider = %config.sms_provider, "api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
