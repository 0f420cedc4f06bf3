//! Object storage for original and derived image artifacts.
//!
//! Two backends behind one trait, selected explicitly by configuration:
//! an in-process memory store and a network-backed HTTP client. There is
//! no availability probe and no silent substitution between them.

mod http;
mod memory;
mod traits;

pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;
pub use traits::ObjectStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
