//! Read-only view of a running attempt for renderers

use serde::{Deserialize, Serialize};

use super::obstacle::TriggerState;
use super::state::{Gravity, MovementMode, SimState};
use crate::consts::CAMERA_LEAD;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub mode: MovementMode,
    pub gravity: Gravity,
    /// False once the life ended, whether by death or by finishing
    pub alive: bool,
    pub has_won: bool,
    /// Progress percentage (0-100)
    pub score: u8,
    /// 1-based attempt number
    pub attempt: u32,
    /// Left edge of the camera; trails the actor
    pub camera_x: f32,
    /// Parallel to the level's obstacle list
    pub triggers: Vec<TriggerState>,
}

impl Snapshot {
    pub fn capture(state: &SimState, attempt: u32) -> Self {
        let actor = &state.actor;
        Self {
            x: actor.pos.x,
            y: actor.pos.y,
            rotation: actor.rotation,
            mode: actor.mode,
            gravity: actor.gravity,
            alive: actor.alive,
            has_won: actor.has_won,
            score: state.score,
            attempt,
            camera_x: actor.pos.x - CAMERA_LEAD,
            triggers: state.triggers.clone(),
        }
    }

    /// Serialize for a JS or network renderer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
