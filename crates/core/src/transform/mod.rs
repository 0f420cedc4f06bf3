//! Pure image transformations.
//!
//! The engine maps an in-memory image to at most one derived image per
//! transformation kind. It performs no I/O; persisting originals and
//! derivatives is the worker's job.

mod engine;
mod kind;

pub use engine::{apply, decode, encode, format_extension};
pub use kind::TransformKind;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Unrecognized image format")]
    UnknownFormat,
}
