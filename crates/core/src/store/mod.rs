//! Persistence for users, image task rows and per-task statistics.
//!
//! One repository trait per aggregate, implemented once on SQLite and
//! injected into the worker and the orchestrator so both share identical
//! query semantics.

mod sqlite;
mod traits;
mod types;

pub use sqlite::{SqliteTaskStore, SqliteUserStore};
pub use traits::{TaskStore, UserStore};
pub use types::{
    ImageStatistics, ImageTask, NewImageStatistics, NewImageTask, NewUser, User,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}
