use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rosterbot::api::router;
use rosterbot::export::CsvRosterCodec;
use rosterbot::gateway::{GatewayConfig, TelegramDelivery};
use rosterbot::services::{CleanupScheduler, RosterService};
use rosterbot::state::AppState;
use rosterbot::store::SqliteRosterStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rosterbot=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://rosterbot.db".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway = GatewayConfig::new_from_env()?;
    let export_dir = std::env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string());
    let retention_days: u64 = std::env::var("EXPORT_RETENTION_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(7);
    let cleanup_interval: u64 = std::env::var("CLEANUP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    let store = Arc::new(SqliteRosterStore::new(pool.clone()));
    let codec = Arc::new(CsvRosterCodec::new(&export_dir));
    let delivery = Arc::new(TelegramDelivery::new(&gateway)?);
    let roster = Arc::new(RosterService::new(
        store,
        codec,
        delivery,
        gateway.admin_chat_id,
    ));

    tokio::spawn(CleanupScheduler::new(&export_dir, retention_days, cleanup_interval).start());

    let state = AppState {
        db: pool.clone(),
        roster,
    };

    let app = router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
