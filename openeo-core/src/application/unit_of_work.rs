use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::InMemoryStore;
use crate::database::ports::{
    jobs::JobsRepository, process_graphs::ProcessGraphsRepository,
    udps::UdpsRepository, users::UsersRepository,
};
#[cfg(feature = "database")]
use crate::database::postgres::PostgresDatabase;

/// Aggregates the repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub users: Arc<dyn UsersRepository>,
    pub jobs: Arc<dyn JobsRepository>,
    pub process_graphs: Arc<dyn ProcessGraphsRepository>,
    pub udps: Arc<dyn UdpsRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("jobs", &type_name_of_val(self.jobs.as_ref()))
            .field(
                "process_graphs",
                &type_name_of_val(self.process_graphs.as_ref()),
            )
            .field("udps", &type_name_of_val(self.udps.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    #[cfg(feature = "database")]
    pub fn postgres(db: &PostgresDatabase) -> Self {
        Self {
            users: Arc::new(db.users_repository()),
            jobs: Arc::new(db.jobs_repository()),
            process_graphs: Arc::new(db.process_graphs_repository()),
            udps: Arc::new(db.udps_repository()),
        }
    }

    /// Every port backed by the same in-process store.
    pub fn in_memory() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    pub fn from_store(store: InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            jobs: Arc::new(store.clone()),
            process_graphs: Arc::new(store.clone()),
            udps: Arc::new(store),
        }
    }
}
