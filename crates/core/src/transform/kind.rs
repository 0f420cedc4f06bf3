use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The transformations a client can request for an upload.
///
/// `Original` is a pass-through marker: the original artifact is always
/// persisted unconditionally, so `Original` never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Original,
    Rotated,
    Gray,
    Scaled,
}

impl TransformKind {
    /// Storage key suffix for artifacts produced by this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            TransformKind::Original => "original",
            TransformKind::Rotated => "rotated",
            TransformKind::Gray => "gray",
            TransformKind::Scaled => "scaled",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TransformKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(TransformKind::Original),
            "rotated" => Ok(TransformKind::Rotated),
            "gray" => Ok(TransformKind::Gray),
            "scaled" => Ok(TransformKind::Scaled),
            _ => Err(()),
        }
    }
}
