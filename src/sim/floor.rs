//! Floor candidate resolution
//!
//! Finds the surface the actor would land on at its current horizontal span.
//! Re-evaluated every tick from the pose *before* vertical integration, so a
//! fast fall cannot skip past a platform it started above.

use serde::{Deserialize, Serialize};

use super::geometry::rotated_bounds;
use super::obstacle::ObstacleKind;
use super::state::{Actor, Gravity};
use crate::level::Level;
use crate::tuning::Tuning;

/// Where a floor candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorSource {
    Ground,
    Obstacle { id: u64 },
}

/// The supporting surface, expressed as the actor's resting `y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub y: f32,
    pub source: FloorSource,
}

impl Floor {
    /// Has the actor reached or crossed this floor in the direction of gravity?
    pub fn reached(&self, y: f32, gravity: Gravity) -> bool {
        match gravity {
            Gravity::Normal => y >= self.y,
            Gravity::Inverted => y <= self.y,
        }
    }
}

/// Resolve the floor under (or, with inverted gravity, over) the actor.
///
/// Returns `None` when nothing can catch the actor: over a floor gap with no
/// platform, below the ground after falling into a gap, or under inverted
/// gravity with no surface overhead.
pub fn resolve_floor(level: &Level, actor: &Actor, tuning: &Tuning) -> Option<Floor> {
    let size = tuning.player_size;
    let snap = tuning.snap_tolerance;
    let y = actor.pos.y;
    let hitbox = actor.hitbox(size);

    let mut best = match actor.gravity {
        Gravity::Normal => {
            let ground = tuning.ground_floor();
            let over_gap = level.obstacles.iter().any(|obstacle| {
                if obstacle.kind != ObstacleKind::FloorGap {
                    return false;
                }
                let gap = rotated_bounds(obstacle);
                hitbox.right() > gap.left() + tuning.gap_inset
                    && hitbox.left() < gap.right() - tuning.gap_inset
            });
            (!over_gap && y <= ground + snap).then_some(Floor {
                y: ground,
                source: FloorSource::Ground,
            })
        }
        // The open field above has no ground plane
        Gravity::Inverted => None,
    };

    for obstacle in level.obstacles.iter().filter(|o| o.kind.is_solid()) {
        let bounds = rotated_bounds(obstacle);
        if !hitbox.overlaps_x(&bounds) {
            continue;
        }

        let candidate = match actor.gravity {
            Gravity::Normal => {
                let surface = bounds.top() - size;
                (y <= surface + snap).then_some(surface)
            }
            Gravity::Inverted => {
                let surface = bounds.bottom();
                (y >= surface - snap).then_some(surface)
            }
        };

        let Some(surface) = candidate else {
            continue;
        };

        // Nearest against gravity wins: highest platform, lowest ceiling
        let better = match (best, actor.gravity) {
            (None, _) => true,
            (Some(current), Gravity::Normal) => surface < current.y,
            (Some(current), Gravity::Inverted) => surface > current.y,
        };
        if better {
            best = Some(Floor {
                y: surface,
                source: FloorSource::Obstacle { id: obstacle.id },
            });
        }
    }

    best
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

    fn level(obstacles: &[(ObstacleKind, f32, f32, f32, f32)]) -> Level {
        let mut data = LevelData::with_length(5000.0);
        for &(kind, x, y, w, h) in obstacles {
            data.push(kind, x, y, w, h);
        }
        Level::from_data(data).unwrap()
    }

    #[test]
    fn test_default_is_ground() {
        let tuning = Tuning::default();
        let floor = resolve_floor(&level(&[]), &actor_at(100.0, 320.0), &tuning).unwrap();
        assert_eq!(floor.y, 320.0);
        assert_eq!(floor.source, FloorSource::Ground);
    }

    #[test]
    fn test_gap_removes_ground() {
        let tuning = Tuning::default();
        let level = level(&[(ObstacleKind::FloorGap, 500.0, 350.0, 60.0, 10.0)]);
        // Inset: actor right edge must pass 505
        assert!(resolve_floor(&level, &actor_at(474.0, 320.0), &tuning).is_some());
        assert!(resolve_floor(&level, &actor_at(480.0, 320.0), &tuning).is_none());
        assert!(resolve_floor(&level, &actor_at(556.0, 320.0), &tuning).is_some());
    }

    #[test]
    fn test_fallen_actor_cannot_resnap_to_ground() {
        let tuning = Tuning::default();
        assert!(resolve_floor(&level(&[]), &actor_at(600.0, 360.0), &tuning).is_none());
    }

    #[test]
    fn test_highest_reachable_platform_wins() {
        let tuning = Tuning::default();
        let level = level(&[
            (ObstacleKind::Block, 100.0, 320.0, 30.0, 30.0),
            (ObstacleKind::Block, 100.0, 200.0, 30.0, 30.0),
            (ObstacleKind::HalfBlock, 110.0, 260.0, 30.0, 15.0),
        ]);
        // Above all three: the highest (y=200) wins
        let floor = resolve_floor(&level, &actor_at(105.0, 100.0), &tuning).unwrap();
        assert_eq!(floor.y, 170.0);
        assert_eq!(floor.source, FloorSource::Obstacle { id: 2 });

        // Between them: the high block is out of reach, the half block is next
        let floor = resolve_floor(&level, &actor_at(105.0, 220.0), &tuning).unwrap();
        assert_eq!(floor.source, FloorSource::Obstacle { id: 3 });
    }

    #[test]
    fn test_half_block_is_a_step() {
        let tuning = Tuning::default();
        let level = level(&[(ObstacleKind::HalfBlock, 120.0, 335.0, 30.0, 15.0)]);
        // Standing on the ground, a 15px step is within snap reach
        let floor = resolve_floor(&level, &actor_at(100.0, 320.0), &tuning).unwrap();
        assert_eq!(floor.y, 305.0);
    }

    #[test]
    fn test_platform_under_gap_still_catches() {
        let tuning = Tuning::default();
        let level = level(&[
            (ObstacleKind::FloorGap, 500.0, 350.0, 200.0, 10.0),
            (ObstacleKind::Block, 550.0, 300.0, 60.0, 30.0),
        ]);
        let floor = resolve_floor(&level, &actor_at(560.0, 250.0), &tuning).unwrap();
        assert_eq!(floor.y, 270.0);
    }

    #[test]
    fn test_inverted_gravity_uses_ceilings() {
        let tuning = Tuning::default();
        let level = level(&[
            (ObstacleKind::Block, 100.0, 0.0, 60.0, 60.0),
            (ObstacleKind::Block, 100.0, 0.0, 60.0, 100.0),
        ]);
        let mut actor = actor_at(110.0, 200.0);
        actor.gravity = Gravity::Inverted;
        let floor = resolve_floor(&level, &actor, &tuning).unwrap();
        // Lowest ceiling wins
        assert_eq!(floor.y, 100.0);
        assert!(floor.reached(99.0, Gravity::Inverted));

        // Open sky above: nothing to land on
        actor.pos.x = 400.0;
        assert!(resolve_floor(&level, &actor, &tuning).is_none());
    }
}
