//! Persistence: repository ports and their adapters.

#[cfg(feature = "database")]
pub mod infrastructure;
pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "database")]
pub use postgres::PostgresDatabase;
