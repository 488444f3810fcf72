mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use crate::db::{accountdb::AccountExt, db::DBClient};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};

use service::{
    auth_service::AuthService,
    mission_service::MissionService,
    notification_service::NotificationService,
    payment_service::PaymentService,
    rating_service::RatingService,
    subscription_service::SubscriptionService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub auth_service: Arc<AuthService>,
    pub mission_service: Arc<MissionService>,
    pub payment_service: Arc<PaymentService>,
    pub rating_service: Arc<RatingService>,
    pub notification_service: Arc<NotificationService>,
    pub subscription_service: Arc<SubscriptionService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(db_client_arc.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_client_arc.clone(),
            config.jwt_secret.clone(),
            config.jwt_maxage,
        ));

        let mission_service = Arc::new(MissionService::new(
            db_client_arc.clone(),
            notification_service.clone(),
            config.platform_fee_rate.clone(),
            config.payment_provider.clone(),
        ));

        let payment_service = Arc::new(PaymentService::new(
            db_client_arc.clone(),
            notification_service.clone(),
        ));

        let rating_service = Arc::new(RatingService::new(db_client_arc.clone()));
        let subscription_service = Arc::new(SubscriptionService::new(db_client_arc.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            auth_service,
            mission_service,
            payment_service,
            rating_service,
            notification_service,
            subscription_service,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::init()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    tracing::info!("connected to the database");

    let db_client = DBClient::new(pool);
    db_client
        .migrate()
        .await
        .context("failed to apply database migrations")?;

    match db_client.delete_expired_sessions().await {
        Ok(removed) if removed > 0 => tracing::info!("removed {} expired sessions", removed),
        Ok(_) => {}
        Err(e) => tracing::warn!("could not purge expired sessions: {}", e),
    }

    let allowed_origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!("server is running on http://localhost:{}", config.port);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
