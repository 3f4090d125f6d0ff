//! Obstacle behavior resolution
//!
//! Given an obstacle the actor overlaps, decide what it does. Every obstacle
//! kind is handled by one exhaustive match; the stepper applies the returned
//! [`Effect`].

use super::geometry::{Aabb, hitbox_overlap, rotated_bounds};
use super::obstacle::{Obstacle, ObstacleKind, TriggerState};
use super::state::{Actor, Gravity, MovementMode};
use crate::level::Level;
use crate::tuning::Tuning;

/// Outcome of touching one obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// No physical effect (decoration, floor gap, refractory trigger)
    None,
    /// Standing on a solid platform; handled by floor resolution
    Rest,
    /// Ends the life
    Lethal,
    /// One-shot vertical launch to the given velocity
    Launch { dy: f32 },
    /// One-shot gravity flip
    FlipGravity,
    /// Continuous zone: force gravity direction
    SetGravity(Gravity),
    /// Continuous zone: set the horizontal speed multiplier
    SetSpeed(f32),
    /// Portal: switch movement mode
    SetMode(MovementMode),
}

impl Effect {
    /// Fires a one-shot trigger when applied
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Effect::Launch { .. } | Effect::FlipGravity)
    }
}

/// Resolve what an overlapped obstacle does to the actor.
///
/// `bounds` is the obstacle's rotated collision box, `trigger` its current
/// refractory state and `jump_queued` whether a fresh press is pending this
/// tick.
pub fn resolve(
    obstacle: &Obstacle,
    bounds: &Aabb,
    actor: &Actor,
    trigger: TriggerState,
    jump_queued: bool,
    tuning: &Tuning,
) -> Effect {
    let against_gravity = -actor.gravity.sign();

    match obstacle.kind {
        ObstacleKind::Block | ObstacleKind::HalfBlock | ObstacleKind::Decor => {
            if is_resting_on(actor, bounds, tuning) {
                Effect::Rest
            } else {
                Effect::Lethal
            }
        }

        ObstacleKind::PassThrough | ObstacleKind::FakeSpike | ObstacleKind::FakeSpikeDown => {
            Effect::None
        }

        ObstacleKind::Spike
        | ObstacleKind::SmallSpike
        | ObstacleKind::SpikeDown
        | ObstacleKind::SmallSpikeDown => Effect::Lethal,

        // Removes the ground under its span; falling through is what kills
        ObstacleKind::FloorGap => Effect::None,

        ObstacleKind::Bouncer => {
            if trigger.is_ready() {
                Effect::Launch {
                    dy: tuning.bouncer_impulse * against_gravity,
                }
            } else {
                Effect::None
            }
        }

        ObstacleKind::Orb => {
            if trigger.is_ready() && jump_queued {
                Effect::Launch {
                    dy: tuning.orb_impulse * against_gravity,
                }
            } else {
                Effect::None
            }
        }

        ObstacleKind::GravityOrb => {
            if trigger.is_ready() && jump_queued {
                Effect::FlipGravity
            } else {
                Effect::None
            }
        }

        ObstacleKind::GravityUp => Effect::SetGravity(Gravity::Inverted),
        ObstacleKind::GravityNormal => Effect::SetGravity(Gravity::Normal),

        ObstacleKind::SlowBlock => Effect::SetSpeed(tuning.slow_multiplier),
        ObstacleKind::NormalBlock => Effect::SetSpeed(1.0),
        ObstacleKind::FastBlock => Effect::SetSpeed(tuning.fast_multiplier),

        ObstacleKind::WavePortal => Effect::SetMode(MovementMode::Wave),
        ObstacleKind::CubePortal => Effect::SetMode(MovementMode::Cube),
    }
}

/// Actor's leading edge sits on the surface facing it
fn is_resting_on(actor: &Actor, bounds: &Aabb, tuning: &Tuning) -> bool {
    let size = tuning.player_size;
    let gap = match actor.gravity {
        Gravity::Normal => (actor.pos.y + size) - bounds.top(),
        Gravity::Inverted => actor.pos.y - bounds.bottom(),
    };
    gap.abs() < tuning.rest_tolerance
}

/// Obstacles the actor overlaps this tick, in ascending id order.
///
/// Only obstacles inside the horizontal cull window are tested. Yields the
/// obstacle's index into `level.obstacles` alongside its collision box.
pub fn overlapping<'a>(
    level: &'a Level,
    actor: &Actor,
    tuning: &'a Tuning,
) -> impl Iterator<Item = (usize, &'a Obstacle, Aabb)> + 'a {
    let hitbox = actor.hitbox(tuning.player_size);
    let window_min = actor.pos.x - tuning.cull_window;
    let window_max = actor.pos.x + tuning.cull_window;

    level
        .obstacles
        .iter()
        .enumerate()
        .filter_map(move |(index, obstacle)| {
            let bounds = rotated_bounds(obstacle);
            if bounds.left() > window_max || bounds.right() < window_min {
                return None;
            }
            hitbox_overlap(&hitbox, &bounds, tuning.hitbox_tolerance)
                .then_some((index, obstacle, bounds))
        })
}

/// An input-gated orb under the actor is ready to take a fresh press
pub fn touching_ready_orb(level: &Level, actor: &Actor, triggers: &[TriggerState], tuning: &Tuning) -> bool {
    overlapping(level, actor, tuning)
        .any(|(index, obstacle, _)| obstacle.kind.is_input_gated() && triggers[index].is_ready())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;
    use glam::Vec2;

    fn actor_at(x: f32, y: f32) -> Actor {
        let mut actor = Actor::spawn(&Tuning::default());
        actor.pos = Vec2::new(x, y);
        actor
    }

    fn resolve_kind(kind: ObstacleKind, actor: &Actor, trigger: TriggerState, queued: bool) -> Effect {
        let obstacle = Obstacle::new(1, kind, 100.0, 300.0, 30.0, 30.0);
        let bounds = rotated_bounds(&obstacle);
        resolve(&obstacle, &bounds, actor, trigger, queued, &Tuning::default())
    }

    #[test]
    fn test_spikes_are_lethal_from_any_side() {
        let actor = actor_at(90.0, 290.0);
        for kind in [
            ObstacleKind::Spike,
            ObstacleKind::SmallSpike,
            ObstacleKind::SpikeDown,
            ObstacleKind::SmallSpikeDown,
        ] {
            assert_eq!(resolve_kind(kind, &actor, TriggerState::Idle, false), Effect::Lethal);
        }
    }

    #[test]
    fn test_decoration_is_harmless() {
        let actor = actor_at(100.0, 300.0);
        for kind in [
            ObstacleKind::PassThrough,
            ObstacleKind::FakeSpike,
            ObstacleKind::FakeSpikeDown,
            ObstacleKind::FloorGap,
        ] {
            assert_eq!(resolve_kind(kind, &actor, TriggerState::Idle, true), Effect::None);
        }
    }

    #[test]
    fn test_solid_rest_vs_side_hit() {
        // Bottom edge 2px above the block top: resting
        let resting = actor_at(100.0, 300.0 - 30.0 - 2.0);
        assert_eq!(
            resolve_kind(ObstacleKind::Block, &resting, TriggerState::Idle, false),
            Effect::Rest
        );

        // Running into the side
        let side = actor_at(80.0, 300.0);
        assert_eq!(
            resolve_kind(ObstacleKind::HalfBlock, &side, TriggerState::Idle, false),
            Effect::Lethal
        );
    }

    #[test]
    fn test_solid_rest_under_inverted_gravity() {
        let mut actor = actor_at(100.0, 333.0);
        actor.gravity = Gravity::Inverted;
        assert_eq!(
            resolve_kind(ObstacleKind::Decor, &actor, TriggerState::Idle, false),
            Effect::Rest
        );
    }

    #[test]
    fn test_bouncer_respects_cooldown_and_gravity() {
        let mut actor = actor_at(100.0, 300.0);
        assert_eq!(
            resolve_kind(ObstacleKind::Bouncer, &actor, TriggerState::Idle, false),
            Effect::Launch { dy: -16.0 }
        );
        assert_eq!(
            resolve_kind(ObstacleKind::Bouncer, &actor, TriggerState::Fired, false),
            Effect::None
        );

        actor.gravity = Gravity::Inverted;
        assert_eq!(
            resolve_kind(ObstacleKind::Bouncer, &actor, TriggerState::Idle, false),
            Effect::Launch { dy: 16.0 }
        );
    }

    #[test]
    fn test_orbs_need_fresh_press() {
        let actor = actor_at(100.0, 300.0);
        assert_eq!(
            resolve_kind(ObstacleKind::Orb, &actor, TriggerState::Idle, false),
            Effect::None
        );
        assert_eq!(
            resolve_kind(ObstacleKind::Orb, &actor, TriggerState::Idle, true),
            Effect::Launch { dy: -11.0 }
        );
        assert_eq!(
            resolve_kind(ObstacleKind::GravityOrb, &actor, TriggerState::Idle, true),
            Effect::FlipGravity
        );
        let cooling = TriggerState::Cooling { remaining_ms: 50.0 };
        assert_eq!(
            resolve_kind(ObstacleKind::GravityOrb, &actor, cooling, true),
            Effect::None
        );
    }

    #[test]
    fn test_zones_and_portals() {
        let actor = actor_at(100.0, 300.0);
        let idle = TriggerState::Idle;
        assert_eq!(
            resolve_kind(ObstacleKind::GravityUp, &actor, idle, false),
            Effect::SetGravity(Gravity::Inverted)
        );
        assert_eq!(
            resolve_kind(ObstacleKind::SlowBlock, &actor, idle, false),
            Effect::SetSpeed(0.7)
        );
        assert_eq!(
            resolve_kind(ObstacleKind::FastBlock, &actor, idle, false),
            Effect::SetSpeed(1.25)
        );
        assert_eq!(
            resolve_kind(ObstacleKind::WavePortal, &actor, idle, false),
            Effect::SetMode(MovementMode::Wave)
        );
    }

    #[test]
    fn test_overlapping_is_culled_and_ordered() {
        let mut data = LevelData::with_length(5000.0);
        data.push(ObstacleKind::PassThrough, 100.0, 300.0, 30.0, 30.0);
        data.push(ObstacleKind::Spike, 110.0, 300.0, 30.0, 30.0);
        data.push(ObstacleKind::Spike, 1000.0, 300.0, 30.0, 30.0);
        let level = Level::from_data(data).unwrap();
        let tuning = Tuning::default();

        let actor = actor_at(100.0, 300.0);
        let ids: Vec<u64> = overlapping(&level, &actor, &tuning)
            .map(|(_, obstacle, _)| obstacle.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
