//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through `TickInput::dt`
//! - Cooldowns run on simulated time, never the wall clock
//! - Stable iteration order (by obstacle ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod floor;
pub mod geometry;
pub mod input;
pub mod obstacle;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use behavior::{Effect, resolve};
pub use floor::{Floor, FloorSource, resolve_floor};
pub use geometry::{Aabb, hitbox_overlap, rotated_bounds};
pub use input::{InputDevice, InputEdgeTracker, TickInput};
pub use obstacle::{Obstacle, ObstacleKind, Rotation, TriggerState};
pub use snapshot::Snapshot;
pub use state::{Actor, DeathCause, GameEvent, Gravity, MovementMode, SimState, progress_score};
pub use tick::tick;
