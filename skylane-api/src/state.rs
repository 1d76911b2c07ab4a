use std::sync::Arc;

use skylane_core::identity::{AdminSessions, CredentialStore};
use skylane_core::repository::{BookingLedger, BookingQueries, FlightCatalog, SeatAllocator};
use skylane_store::RedisClient;

/// Injected storage handles. Production wires the Postgres/Redis backends
/// from skylane-store; tests wire the in-process engines.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn FlightCatalog>,
    pub ledger: Arc<dyn BookingLedger>,
    pub allocator: Arc<dyn SeatAllocator>,
    pub queries: Arc<dyn BookingQueries>,
    pub directory: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn AdminSessions>,
    pub redis: Arc<RedisClient>,
}
