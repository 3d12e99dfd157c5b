use artist_payouts::{ Config, Result };
use artist_payouts::api::{ self, AppState };
use artist_payouts::db::{ LedgerRepository, LedgerStore };
use artist_payouts::dispatcher::NotificationDispatcher;
use artist_payouts::providers::{ EmailFunctionNotifier, Notifier };
use artist_payouts::services::{ ArtistService, CreditService, WithdrawalService };
use axum::{ Router, routing::{ get, patch, post } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "artist_payouts=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting artist-payouts on {}", config.server_addr());

    // Initialize database connection
    let db = sea_orm::Database::connect(&config.database_url).await?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await?;

    tracing::info!("Migrations completed successfully");

    let store: Arc<dyn LedgerStore> = Arc::new(LedgerRepository::new(db));

    // Notification worker
    let notifier: Arc<dyn Notifier> = Arc::new(
        EmailFunctionNotifier::new(
            config.email_function_url.clone(),
            config.email_function_key.clone()
        )?
    );
    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        notifier,
        config.notification_poll_interval,
        config.notification_batch_size,
        config.notification_max_attempts
    );
    tokio::spawn(dispatcher.start());

    tracing::info!(
        "Notification dispatcher started (every {:?}, batch {})",
        config.notification_poll_interval,
        config.notification_batch_size
    );

    // Initialize services
    let app_state = AppState::new(
        Arc::new(WithdrawalService::new(store.clone())),
        Arc::new(CreditService::new(store.clone())),
        Arc::new(ArtistService::new(store))
    );

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/artists/{id}/balance", get(api::artist::get_balance))
        .route("/api/artists/{id}/activity", get(api::artist::get_activity))
        .route(
            "/api/artists/{id}/withdrawals",
            get(api::withdrawal::list_withdrawals).post(api::withdrawal::submit_withdrawal)
        )
        .route("/api/artists/{id}/withdrawals/preview", get(api::withdrawal::preview_withdrawal))
        .route("/api/withdrawals/{id}", get(api::withdrawal::get_withdrawal))
        .route(
            "/api/artists/{id}/credit-transactions",
            get(api::credit::list_credit_transactions)
        )
        .route(
            "/api/admin/withdrawals/{id}/status",
            patch(api::withdrawal::update_withdrawal_status)
        )
        .route("/api/admin/artists/{id}/credits", post(api::credit::add_credit))
        .route("/api/admin/artists/{id}/credits/deduct", post(api::credit::deduct_credit))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.server_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| artist_payouts::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| artist_payouts::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
