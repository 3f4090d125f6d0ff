//! Error types for data that must be valid before the simulation starts
//!
//! Nothing inside a tick returns an error; malformed input is rejected (or
//! defaulted) while loading.

use thiserror::Error;

/// Level data that cannot be simulated
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse level JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("obstacle {id} has non-finite geometry")]
    NonFiniteGeometry { id: u64 },

    #[error("obstacle {id} has negative size {width}x{height}")]
    NegativeSize { id: u64, width: f32, height: f32 },

    #[error("obstacle {id} has rotation {rotation}, expected 0, 90, 180 or 270")]
    InvalidRotation { id: u64, rotation: u16 },

    #[error("duplicate obstacle id {0}")]
    DuplicateId(u64),

    #[error("level length {0} is not a finite number")]
    NonFiniteLength(f32),
}

/// Physics tuning that cannot be simulated
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tuning field `{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}
