pub mod allocator;
pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod flight_repo;
pub mod query_repo;
pub mod redis_repo;
pub mod user_repo;

pub use allocator::PostgresAllocator;
pub use booking_repo::PostgresLedger;
pub use database::DbClient;
pub use flight_repo::PostgresCatalog;
pub use query_repo::PostgresQueries;
pub use redis_repo::{RedisAdminSessions, RedisClient};
pub use user_repo::PostgresDirectory;
