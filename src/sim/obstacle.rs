//! Obstacle catalog and one-shot trigger state
//!
//! Obstacle geometry is immutable once a level is loaded. The only thing that
//! changes during play is the refractory state of bouncers and orbs, which the
//! simulation keeps alongside (not inside) the level.

use serde::{Deserialize, Serialize};

/// Closed set of obstacle types, named as the level editor stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    // Solid platforms
    Block,
    HalfBlock,
    Decor,
    // Passable decoration
    PassThrough,
    FakeSpike,
    FakeSpikeDown,
    // Lethal
    Spike,
    SmallSpike,
    SpikeDown,
    SmallSpikeDown,
    // Floor removal
    FloorGap,
    // One-shot triggers
    Bouncer,
    Orb,
    GravityOrb,
    // Continuous zones
    GravityUp,
    GravityNormal,
    SlowBlock,
    NormalBlock,
    FastBlock,
    // Mode portals
    WavePortal,
    CubePortal,
}

impl ObstacleKind {
    /// Acts as a platform the actor can stand on
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            ObstacleKind::Block | ObstacleKind::HalfBlock | ObstacleKind::Decor
        )
    }

    /// Fires once per entry and then cools down
    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            ObstacleKind::Bouncer | ObstacleKind::Orb | ObstacleKind::GravityOrb
        )
    }

    /// Needs a fresh jump press to fire
    pub fn is_input_gated(&self) -> bool {
        matches!(self, ObstacleKind::Orb | ObstacleKind::GravityOrb)
    }
}

/// Authored rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parse an authored angle in degrees; only quarter turns are valid
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

/// A validated obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: Rotation,
}

impl Obstacle {
    pub fn new(id: u64, kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            width,
            height,
            rotation: Rotation::R0,
        }
    }

    pub fn rotated(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Refractory state of a bouncer or orb
///
/// `Idle -> Fired` on the tick the effect applies, `Fired -> Cooling` on the
/// following tick, `Cooling -> Idle` once the cooldown has elapsed in simulated
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TriggerState {
    #[default]
    Idle,
    Fired,
    Cooling { remaining_ms: f32 },
}

impl TriggerState {
    /// Can fire on this tick
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, TriggerState::Idle)
    }

    /// Mark as fired. Returns false (and does nothing) while refractory.
    pub fn fire(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        *self = TriggerState::Fired;
        true
    }

    /// Advance by `elapsed_ms` of simulated time
    pub fn advance(&mut self, elapsed_ms: f32, cooldown_ms: f32) {
        *self = match *self {
            TriggerState::Idle => TriggerState::Idle,
            TriggerState::Fired => TriggerState::Cooling {
                remaining_ms: cooldown_ms,
            },
            TriggerState::Cooling { remaining_ms } => {
                let remaining_ms = remaining_ms - elapsed_ms;
                if remaining_ms <= 0.0 {
                    TriggerState::Idle
                } else {
                    TriggerState::Cooling { remaining_ms }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_uses_editor_names() {
        let kind: ObstacleKind = serde_json::from_str("\"SMALL_SPIKE_DOWN\"").unwrap();
        assert_eq!(kind, ObstacleKind::SmallSpikeDown);
        assert_eq!(
            serde_json::to_string(&ObstacleKind::GravityOrb).unwrap(),
            "\"GRAVITY_ORB\""
        );
    }

    #[test]
    fn test_rotation_only_quarter_turns() {
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::R270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::R90.degrees(), 90);
    }

    #[test]
    fn test_trigger_cycle() {
        let mut state = TriggerState::default();
        assert!(state.fire());
        assert_eq!(state, TriggerState::Fired);

        // Refractory until the cooldown has fully elapsed
        assert!(!state.fire());
        state.advance(16.0, 300.0);
        assert_eq!(state, TriggerState::Cooling { remaining_ms: 300.0 });
        state.advance(200.0, 300.0);
        assert!(!state.is_ready());
        state.advance(100.0, 300.0);
        assert!(state.is_ready());
        assert!(state.fire());
    }

    #[test]
    fn test_idle_stays_idle() {
        let mut state = TriggerState::Idle;
        state.advance(1000.0, 300.0);
        assert_eq!(state, TriggerState::Idle);
    }
}
