//! Axis-aligned box geometry
//!
//! Everything the simulation collides is a rectangle in screen space
//! (y grows downward). Obstacles may be authored rotated in 90° steps; their
//! collision box is derived on demand and never written back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, Rotation};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    /// Bottom-right corner
    pub max: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Box of a square actor whose top-left corner is `pos`
    pub fn square(pos: Vec2, size: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::splat(size),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Shrink every side by `margin`.
    ///
    /// A side shorter than `2 * margin` comes out inverted (`min > max`). An
    /// inverted box still overlaps another box, but only one that strictly spans
    /// the whole inverted range on that axis.
    pub fn shrink(&self, margin: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(margin),
            max: self.max - Vec2::splat(margin),
        }
    }

    /// Strict overlap: touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    /// Whether the horizontal spans overlap (strict)
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x && self.min.x < other.max.x
    }
}

/// Collision box of an obstacle with its authored rotation applied.
///
/// Quarter turns swap width and height around the authored centre; half turns
/// leave the box unchanged.
pub fn rotated_bounds(obstacle: &Obstacle) -> Aabb {
    let authored = Aabb::new(obstacle.x, obstacle.y, obstacle.width, obstacle.height);
    match obstacle.rotation {
        Rotation::R0 | Rotation::R180 => authored,
        Rotation::R90 | Rotation::R270 => {
            let center = authored.center();
            let half = Vec2::new(obstacle.height, obstacle.width) * 0.5;
            Aabb {
                min: center - half,
                max: center + half,
            }
        }
    }
}

/// Overlap test with the forgiveness margin removed from both boxes
pub fn hitbox_overlap(actor: &Aabb, obstacle: &Aabb, tolerance: f32) -> bool {
    actor.shrink(tolerance).overlaps(&obstacle.shrink(tolerance))
}
