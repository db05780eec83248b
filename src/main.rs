//! Tourdesk billing sync server entrypoint.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tourdesk::adapters::http::{billing_router, BillingAppState};
use tourdesk::adapters::postgres::{
    PostgresCatalogRepository, PostgresProfileRepository, PostgresSubscriptionRepository,
};
use tourdesk::adapters::stripe::{StripeConfig, StripeGatewayAdapter};
use tourdesk::application::handlers::billing::{
    GetTrialWindowHandler, OwnerResolver, ProcessWebhookHandler, ProjectSubscriptionHandler,
    SweepSubscriptionsHandler, SyncAllSubscriptionsHandler, SyncUserSubscriptionHandler,
};
use tourdesk::config::AppConfig;
use tourdesk::domain::billing::StripeWebhookVerifier;
use tourdesk::ports::{CatalogRepository, ProfileRepository, StripeGateway, SubscriptionRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "starting tourdesk billing sync"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running pending database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let subscriptions: Arc<dyn SubscriptionRepository> =
        Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let profiles: Arc<dyn ProfileRepository> =
        Arc::new(PostgresProfileRepository::new(pool.clone()));
    let catalog: Arc<dyn CatalogRepository> = Arc::new(PostgresCatalogRepository::new(pool));

    let gateway: Arc<dyn StripeGateway> = Arc::new(StripeGatewayAdapter::new(StripeConfig::new(
        config.payment.stripe_api_key.clone(),
    )));

    let project = Arc::new(ProjectSubscriptionHandler::new(
        Arc::clone(&subscriptions),
        Arc::clone(&profiles),
        OwnerResolver::new(Arc::clone(&gateway)),
    ));

    let state = BillingAppState {
        webhook_handler: Arc::new(ProcessWebhookHandler::new(
            StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone()),
            Arc::clone(&project),
            Arc::clone(&catalog),
            Arc::clone(&gateway),
            config.payment.require_livemode,
        )),
        sweep_handler: Arc::new(SweepSubscriptionsHandler::new(
            Arc::clone(&gateway),
            Arc::clone(&project),
            config.sync.sweep_page_size,
        )),
        sync_user_handler: Arc::new(SyncUserSubscriptionHandler::new(
            Arc::clone(&subscriptions),
            Arc::clone(&profiles),
            Arc::clone(&gateway),
            Arc::clone(&project),
        )),
        sync_all_handler: Arc::new(SyncAllSubscriptionsHandler::new(
            Arc::clone(&profiles),
            Arc::clone(&gateway),
            Arc::clone(&project),
        )),
        trial_handler: Arc::new(GetTrialWindowHandler::new(Arc::clone(&subscriptions))),
        cron_secret: SecretString::new(config.sync.cron_secret.clone()),
    };

    let cors = build_cors_layer(&config);

    let app = Router::new()
        .nest("/api", billing_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr()?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
