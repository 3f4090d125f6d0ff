//! Level data
//!
//! [`LevelData`] is the JSON document the level editor produces. It is checked
//! and normalized once into a read-only [`Level`]; the simulation never sees
//! unvalidated geometry.

use std::collections::HashSet;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_HEIGHT, GRID_SIZE, GROUND_Y, LEVEL_TAIL, MIN_LEVEL_EXTENT};
use crate::error::LevelError;
use crate::sim::obstacle::{Obstacle, ObstacleKind, Rotation};

/// Visual theme picked in the editor (not used by the physics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    NeonCyan,
    SunsetMagenta,
    ToxicGreen,
}

/// One obstacle as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ObstacleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, quarter turns only
    #[serde(default)]
    pub rotation: u16,
}

/// Raw level document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    #[serde(default)]
    pub theme: Theme,
    /// Finish line x; zero means "derive from the obstacles"
    #[serde(default)]
    pub length: f32,
}

impl LevelData {
    /// Empty level with an explicit length
    pub fn with_length(length: f32) -> Self {
        Self {
            length,
            ..Default::default()
        }
    }

    /// Append an unrotated obstacle with the next free id; returns the id
    pub fn push(&mut self, kind: ObstacleKind, x: f32, y: f32, width: f32, height: f32) -> u64 {
        let id = self.obstacles.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        self.obstacles.push(ObstacleDef {
            id,
            kind,
            x,
            y,
            width,
            height,
            rotation: 0,
        });
        id
    }

    /// Length used when none was authored: just past the furthest obstacle
    pub fn default_length(&self) -> f32 {
        let extent = self
            .obstacles
            .iter()
            .map(|o| o.x + o.width)
            .fold(MIN_LEVEL_EXTENT, f32::max);
        extent + LEVEL_TAIL
    }
}

/// A validated level, ready to simulate
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Sorted by ascending id (collision resolution order)
    pub obstacles: Vec<Obstacle>,
    /// Finish line x, always finite and positive
    pub length: f32,
    pub theme: Theme,
}

impl Level {
    /// Validate raw level data
    pub fn from_data(data: LevelData) -> Result<Self, LevelError> {
        if !data.length.is_finite() {
            return Err(LevelError::NonFiniteLength(data.length));
        }

        let mut seen = HashSet::with_capacity(data.obstacles.len());
        let mut obstacles = Vec::with_capacity(data.obstacles.len());
        for def in &data.obstacles {
            if !seen.insert(def.id) {
                return Err(LevelError::DuplicateId(def.id));
            }
            obstacles.push(validate_obstacle(def)?);
        }
        obstacles.sort_by_key(|o| o.id);

        let length = if data.length > 0.0 {
            data.length
        } else {
            let length = data.default_length();
            log::warn!(
                "Level length {} is not positive, using {} instead",
                data.length,
                length
            );
            length
        };

        Ok(Self {
            obstacles,
            length,
            theme: data.theme,
        })
    }

    /// Parse and validate a level JSON document
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let data: LevelData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Load a level JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let level = Self::from_json(&json)?;
        log::info!(
            "Loaded level {}: {} obstacles, length {}",
            path.as_ref().display(),
            level.obstacles.len(),
            level.length
        );
        Ok(level)
    }
}

fn validate_obstacle(def: &ObstacleDef) -> Result<Obstacle, LevelError> {
    let geometry = [def.x, def.y, def.width, def.height];
    if geometry.iter().any(|v| !v.is_finite()) {
        return Err(LevelError::NonFiniteGeometry { id: def.id });
    }
    if def.width < 0.0 || def.height < 0.0 {
        return Err(LevelError::NegativeSize {
            id: def.id,
            width: def.width,
            height: def.height,
        });
    }
    let rotation = Rotation::from_degrees(def.rotation).ok_or(LevelError::InvalidRotation {
        id: def.id,
        rotation: def.rotation,
    })?;

    Ok(Obstacle::new(def.id, def.kind, def.x, def.y, def.width, def.height).rotated(rotation))
}

/// Obstacle patterns the practice generator strings together
#[derive(Debug, Clone, Copy)]
enum Pattern {
    Spike,
    SpikePair,
    SmallSpike,
    Gap,
    Platform,
    Step,
    BouncerGap,
    OrbGap,
    SpeedZone,
}

const PATTERNS: [Pattern; 9] = [
    Pattern::Spike,
    Pattern::SpikePair,
    Pattern::SmallSpike,
    Pattern::Gap,
    Pattern::Platform,
    Pattern::Step,
    Pattern::BouncerGap,
    Pattern::OrbGap,
    Pattern::SpeedZone,
];

/// Generate a practice level of `sections` obstacle patterns.
///
/// The same seed always yields the same level.
pub fn generate(seed: u64, sections: u32) -> LevelData {
    let mut rng = Pcg32::seed_from_u64(seed);
    let theme = match seed % 3 {
        0 => Theme::NeonCyan,
        1 => Theme::SunsetMagenta,
        _ => Theme::ToxicGreen,
    };
    let mut data = LevelData {
        theme,
        ..Default::default()
    };

    let cell = GRID_SIZE;
    let ground = GROUND_Y;
    let gap_depth = FIELD_HEIGHT - GROUND_Y;

    // Leave a run-up before the first hazard
    let mut x = 20.0 * cell;

    for _ in 0..sections {
        let pattern = PATTERNS[rng.random_range(0..PATTERNS.len())];
        let width = match pattern {
            Pattern::Spike => {
                data.push(ObstacleKind::Spike, x, ground - cell, cell, cell);
                cell
            }
            Pattern::SpikePair => {
                data.push(ObstacleKind::Spike, x, ground - cell, cell, cell);
                data.push(ObstacleKind::Spike, x + cell, ground - cell, cell, cell);
                2.0 * cell
            }
            Pattern::SmallSpike => {
                let half = cell / 2.0;
                data.push(ObstacleKind::SmallSpike, x, ground - half, cell, half);
                cell
            }
            Pattern::Gap => {
                let width = 2.0 * cell;
                data.push(ObstacleKind::FloorGap, x, ground, width, gap_depth);
                width
            }
            Pattern::Platform => {
                let cells = rng.random_range(2..=4) as f32;
                data.push(ObstacleKind::Block, x, ground - cell, cells * cell, cell);
                cells * cell
            }
            Pattern::Step => {
                let half = cell / 2.0;
                data.push(ObstacleKind::HalfBlock, x, ground - half, cell, half);
                data.push(ObstacleKind::Block, x + cell, ground - cell, 2.0 * cell, cell);
                3.0 * cell
            }
            Pattern::BouncerGap => {
                // Full cell tall: a pad thinner than twice the hitbox tolerance is never touched
                data.push(ObstacleKind::Bouncer, x, ground - cell, cell, cell);
                data.push(ObstacleKind::FloorGap, x + cell, ground, 3.0 * cell, gap_depth);
                4.0 * cell
            }
            Pattern::OrbGap => {
                data.push(ObstacleKind::FloorGap, x, ground, 4.0 * cell, gap_depth);
                data.push(ObstacleKind::Orb, x + cell, ground - 4.0 * cell, cell, cell);
                4.0 * cell
            }
            Pattern::SpeedZone => {
                let kind = if rng.random_bool(0.5) {
                    ObstacleKind::SlowBlock
                } else {
                    ObstacleKind::FastBlock
                };
                data.push(kind, x, 0.0, cell, ground);
                cell
            }
        };

        let spacing = rng.random_range(6..=10) as f32 * cell;
        x += width + spacing;
    }

    data.length = x + LEVEL_TAIL;
    log::debug!(
        "Generated level (seed {seed}): {} obstacles, length {}",
        data.obstacles.len(),
        data.length
    );
    data
}
