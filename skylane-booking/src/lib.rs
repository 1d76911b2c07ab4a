pub mod allocator;
pub mod ledger;
pub mod query;

pub use allocator::MemoryAllocator;
pub use ledger::MemoryLedger;
pub use query::MemoryQueries;
