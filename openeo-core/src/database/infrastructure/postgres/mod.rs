//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::jobs::PostgresJobsRepository;
pub use repositories::process_graphs::PostgresProcessGraphsRepository;
pub use repositories::udps::PostgresUdpsRepository;
pub use repositories::users::PostgresUsersRepository;
