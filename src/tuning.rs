//! Physics tuning
//!
//! Every constant the stepper reads lives here so levels can be replayed with
//! alternative physics. Defaults come from [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Environment variable that points at a tuning JSON file
pub const TUNING_ENV_VAR: &str = "CUBE_DASH_TUNING";

/// Data-driven physics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_height: f32,
    pub ground_y: f32,
    pub grid_size: f32,

    // === Actor ===
    pub player_size: f32,
    pub start_x: f32,
    pub base_speed: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub max_jumps: u8,
    pub air_spin: f32,

    // === Obstacles ===
    pub bouncer_impulse: f32,
    pub orb_impulse: f32,
    pub trigger_cooldown_ms: f32,
    pub slow_multiplier: f32,
    pub fast_multiplier: f32,

    // === Wave mode ===
    pub wave_max_speed: f32,
    pub wave_smoothing: f32,
    pub wave_ceiling_cells: f32,

    // === Forgiveness ===
    pub hitbox_tolerance: f32,
    pub rest_tolerance: f32,
    pub snap_tolerance: f32,
    pub gap_inset: f32,
    pub cull_window: f32,
    pub fall_margin: f32,

    /// Largest `dt` accepted per tick (logical ticks)
    pub max_delta: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_height: FIELD_HEIGHT,
            ground_y: GROUND_Y,
            grid_size: GRID_SIZE,

            player_size: PLAYER_SIZE,
            start_x: START_X,
            base_speed: BASE_SPEED,
            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            max_jumps: MAX_JUMPS,
            air_spin: AIR_SPIN,

            bouncer_impulse: BOUNCER_IMPULSE,
            orb_impulse: ORB_IMPULSE,
            trigger_cooldown_ms: TRIGGER_COOLDOWN_MS,
            slow_multiplier: SLOW_MULTIPLIER,
            fast_multiplier: FAST_MULTIPLIER,

            wave_max_speed: WAVE_MAX_SPEED,
            wave_smoothing: WAVE_SMOOTHING,
            wave_ceiling_cells: WAVE_CEILING_CELLS,

            hitbox_tolerance: HITBOX_TOLERANCE,
            rest_tolerance: REST_TOLERANCE,
            snap_tolerance: SNAP_TOLERANCE,
            gap_inset: GAP_INSET,
            cull_window: CULL_WINDOW,
            fall_margin: FALL_MARGIN,

            max_delta: MAX_DELTA,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Load from `CUBE_DASH_TUNING` if set, otherwise defaults.
    ///
    /// A file that is set but unreadable or invalid is an error rather than a
    /// silent fallback.
    pub fn from_env() -> Result<Self, TuningError> {
        match std::env::var(TUNING_ENV_VAR) {
            Ok(path) => Self::load(path),
            Err(_) => {
                log::info!("Using default tuning");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the stepper cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("base_speed", self.base_speed),
            ("player_size", self.player_size),
            ("max_delta", self.max_delta),
            ("field_height", self.field_height),
            ("slow_multiplier", self.slow_multiplier),
            ("fast_multiplier", self.fast_multiplier),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        Ok(())
    }

    /// Default floor height (actor's top edge) when resting on the ground plane
    #[inline]
    pub fn ground_floor(&self) -> f32 {
        self.ground_y - self.player_size
    }

    /// Highest point the wave may reach before hitting its implicit ceiling
    #[inline]
    pub fn wave_ceiling(&self) -> f32 {
        self.ground_y - self.wave_ceiling_cells * self.grid_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.9, "max_jumps": 1 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.9);
        assert_eq!(tuning.max_jumps, 1);
        assert_eq!(tuning.base_speed, BASE_SPEED);
        assert_eq!(tuning.player_size, PLAYER_SIZE);
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let err = Tuning::from_json(r#"{ "base_speed": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::NotPositive {
                field: "base_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ gravity: "),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_derived_heights() {
        let tuning = Tuning::default();
        assert_eq!(tuning.ground_floor(), GROUND_Y - PLAYER_SIZE);
        assert_eq!(tuning.wave_ceiling(), GROUND_Y - 270.0);
    }
}
