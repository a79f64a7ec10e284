pub mod classes;
pub mod dto;
pub mod journal;
pub mod request;
pub mod response;
mod router;
pub mod validation;

pub use classes::ClassRosterHandler;
pub use journal::JournalHandler;
pub use request::HandlerRequest;
pub use response::{ApiError, HandlerResponse};
pub use router::{AppState, create_router};

use crate::config::DatabaseConfig;
use crate::store::SqliteStore;

/// Opens the per-request connection. Dropping the store closes it.
fn connect(database: &DatabaseConfig) -> Result<SqliteStore, ApiError> {
    SqliteStore::connect(database).map_err(|e| {
        tracing::error!("Failed to open database: {e}");
        ApiError::internal("Internal server error")
    })
}
