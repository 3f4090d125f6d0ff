//! Simulation state and core types
//!
//! Everything the stepper mutates lives in one owned [`SimState`]. The level
//! is borrowed read-only; per-obstacle trigger state sits here, indexed like
//! the level's obstacle list.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use super::obstacle::{ObstacleKind, TriggerState};
use crate::level::Level;
use crate::tuning::Tuning;

/// Direction gravity pulls the actor (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gravity {
    /// Pulls toward the ground (+y)
    #[default]
    Normal,
    /// Pulls toward the top of the field (-y)
    Inverted,
}

impl Gravity {
    /// +1.0 for normal gravity, -1.0 when inverted
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Gravity::Normal => 1.0,
            Gravity::Inverted => -1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Gravity::Normal => Gravity::Inverted,
            Gravity::Inverted => Gravity::Normal,
        }
    }
}

/// How vertical motion is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Gravity-integrated jumping cube
    #[default]
    Cube,
    /// Direct-controlled diagonal flight
    Wave,
}

/// What ended a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Lethal contact with an obstacle
    Obstacle { id: u64, kind: ObstacleKind },
    /// Touched the top of the play field
    Ceiling,
    /// Wave flew above its implicit ceiling
    WaveCeiling,
    /// Left the field in the direction of gravity
    Fell,
}

/// Events raised by a tick, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Life ended (at most once per life)
    Died { cause: DeathCause },
    /// Crossed the level end (at most once per life)
    Won,
    /// Progress percentage changed
    Progress { score: u8 },
    /// Actor left the surface or double-jumped
    Jumped { airborne: bool },
    /// A bouncer or orb applied its effect
    TriggerFired { obstacle_id: u64, kind: ObstacleKind },
    GravityChanged { gravity: Gravity },
    ModeChanged { mode: MovementMode },
    SpeedChanged { multiplier: f32 },
}

/// The player-controlled cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner of the hitbox
    pub pos: Vec2,
    /// Vertical velocity (pixels per tick, +y is down)
    pub dy: f32,
    /// Cosmetic rotation in degrees
    pub rotation: f32,
    pub grounded: bool,
    pub gravity: Gravity,
    pub mode: MovementMode,
    /// Remaining jumps before landing (double-jump budget)
    pub jumps_available: u8,
    /// Set by speed zones, always > 0
    pub speed_multiplier: f32,
    /// Monotonic true -> false within a life; cleared by dying and by finishing
    pub alive: bool,
    /// Monotonic false -> true within a life
    pub has_won: bool,
}

impl Actor {
    /// Fresh actor standing on the ground at the start position
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.start_x, tuning.ground_floor()),
            dy: 0.0,
            rotation: 0.0,
            grounded: true,
            gravity: Gravity::Normal,
            mode: MovementMode::Cube,
            jumps_available: tuning.max_jumps,
            speed_multiplier: 1.0,
            alive: true,
            has_won: false,
        }
    }

    /// Still being simulated (neither dead nor finished)
    #[inline]
    pub fn is_running(&self) -> bool {
        self.alive && !self.has_won
    }

    pub fn hitbox(&self, size: f32) -> Aabb {
        Aabb::square(self.pos, size)
    }
}

/// Progress percentage: `clamp(0, 100, floor(100 * x / length))`
pub fn progress_score(x: f32, length: f32) -> u8 {
    (100.0 * x / length).floor().clamp(0.0, 100.0) as u8
}

/// Complete simulation state for one attempt (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub actor: Actor,
    /// One entry per level obstacle, same order as `Level::obstacles`
    pub triggers: Vec<TriggerState>,
    /// Last reported progress (0-100)
    pub score: u8,
    /// Ticks simulated this attempt
    pub time_ticks: u64,
    pub tuning: Tuning,
}

impl SimState {
    /// Create the state for a new attempt at `level`
    pub fn new(level: &Level, tuning: Tuning) -> Self {
        let actor = Actor::spawn(&tuning);
        let score = progress_score(actor.pos.x, level.length);
        Self {
            actor,
            triggers: vec![TriggerState::Idle; level.obstacles.len()],
            score,
            time_ticks: 0,
            tuning,
        }
    }

    /// Discard the current life and start over on the same level
    pub fn reset(&mut self, level: &Level) {
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::new(level, tuning);
    }

    /// End the life. A no-op if it already ended.
    pub fn kill(&mut self, cause: DeathCause) -> Option<GameEvent> {
        if !self.actor.is_running() {
            return None;
        }
        self.actor.alive = false;
        debug_assert!(!self.actor.has_won, "actor both dead and won");
        log::info!(
            "Died at x={:.1} ({}%): {:?}",
            self.actor.pos.x,
            self.score,
            cause
        );
        Some(GameEvent::Died { cause })
    }

    /// Finish the level. A no-op if the life already ended.
    pub fn win(&mut self) -> Option<GameEvent> {
        if !self.actor.is_running() {
            return None;
        }
        debug_assert!(self.actor.alive && !self.actor.has_won);
        self.actor.has_won = true;
        self.actor.alive = false;
        log::info!("Level complete after {} ticks", self.time_ticks);
        Some(GameEvent::Won)
    }
}
