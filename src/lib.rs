//! Cube Dash - side-scrolling obstacle-course simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actor physics, obstacle behaviors, floor resolution)
//! - `level`: Level data loading, validation and practice-level generation
//! - `session`: Attempt lifecycle, outcome callbacks and frame scheduling
//! - `tuning`: Data-driven physics constants

pub mod error;
pub mod level;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, TuningError};
pub use level::{Level, LevelData, Theme};
pub use session::{FrameHandle, FrameScheduler, GameLoop, NullSink, OutcomeNotifier, RenderSink, Session};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Milliseconds of simulated time per logical tick (60 Hz)
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    /// Largest `dt` (in logical ticks) a single step may integrate
    pub const MAX_DELTA: f32 = 2.0;

    /// Play field height (screen space, y grows downward)
    pub const FIELD_HEIGHT: f32 = 450.0;
    /// Top edge of the ground plane
    pub const GROUND_Y: f32 = 350.0;
    /// Editor grid cell size
    pub const GRID_SIZE: f32 = 30.0;

    /// Actor defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const START_X: f32 = 100.0;
    /// Camera trails the actor by this many pixels
    pub const CAMERA_LEAD: f32 = 100.0;

    /// Per-tick physics
    pub const GRAVITY: f32 = 1.1;
    pub const JUMP_IMPULSE: f32 = 12.2;
    pub const BASE_SPEED: f32 = 5.8;
    pub const MAX_JUMPS: u8 = 2;
    /// Spin while airborne (degrees per tick)
    pub const AIR_SPIN: f32 = 6.0;

    /// One-shot obstacle impulses
    pub const BOUNCER_IMPULSE: f32 = 16.0;
    pub const ORB_IMPULSE: f32 = 11.0;
    /// Refractory window of bouncers and orbs (simulated milliseconds)
    pub const TRIGGER_COOLDOWN_MS: f32 = 300.0;

    /// Wave mode
    pub const WAVE_MAX_SPEED: f32 = 6.5;
    pub const WAVE_SMOOTHING: f32 = 0.35;
    pub const WAVE_CEILING_CELLS: f32 = 9.0;
    pub const WAVE_TILT: f32 = 45.0;

    /// Speed zone multipliers
    pub const SLOW_MULTIPLIER: f32 = 0.7;
    pub const FAST_MULTIPLIER: f32 = 1.25;

    /// Forgiveness margins
    pub const HITBOX_TOLERANCE: f32 = 6.0;
    pub const REST_TOLERANCE: f32 = 5.0;
    pub const SNAP_TOLERANCE: f32 = 15.0;
    pub const GAP_INSET: f32 = 5.0;
    /// Obstacles further than this from the actor are not collision-tested
    pub const CULL_WINDOW: f32 = 100.0;
    /// Distance past the field edge that counts as a fall
    pub const FALL_MARGIN: f32 = 50.0;
    /// Nudge applied on takeoff so the actor does not re-ground the same tick
    pub const TAKEOFF_NUDGE: f32 = 2.0;

    /// Level length fallback when authored as zero
    pub const MIN_LEVEL_EXTENT: f32 = 1000.0;
    pub const LEVEL_TAIL: f32 = 500.0;
}
