pub mod booking;
pub mod flight;
pub mod identity;
pub mod query;
pub mod repository;
pub mod user;

pub use booking::{AllocationError, Booking, LedgerError};
pub use flight::{CatalogError, Flight, NewFlight};
pub use user::User;
