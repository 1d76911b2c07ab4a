use std::net::SocketAddr;
use std::sync::Arc;

use skylane_api::{app, AppState};
use skylane_store::{
    DbClient, PostgresAllocator, PostgresCatalog, PostgresDirectory, PostgresLedger,
    PostgresQueries, RedisAdminSessions, RedisClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skylane_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let redis = Arc::new(
        RedisClient::new(&config.redis.url)
            .await
            .expect("Failed to connect to Redis"),
    );

    let directory = Arc::new(PostgresDirectory::new(db.pool.clone()));
    directory
        .seed_admin(&config.seed.admin_username, &config.seed.admin_password)
        .await
        .expect("Failed to seed administrator account");

    let app_state = AppState {
        catalog: Arc::new(PostgresCatalog::new(db.pool.clone(), redis.clone())),
        ledger: Arc::new(PostgresLedger::new(db.pool.clone())),
        allocator: Arc::new(PostgresAllocator::new(db.pool.clone(), redis.clone())),
        queries: Arc::new(PostgresQueries::new(db.pool.clone())),
        directory,
        sessions: Arc::new(RedisAdminSessions::new(
            redis.clone(),
            config.auth.admin_session_ttl_seconds,
        )),
        redis,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
