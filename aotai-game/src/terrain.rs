//! Procedural ridge map and the read-only terrain oracle
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::{Position, start_column};

/// Row count the biome bands are tuned for; other heights scale proportionally.
const REFERENCE_HEIGHT: i64 = 45;
const PATH_AMPLITUDE: f64 = 3.0;
const PATH_FREQUENCY: f64 = 0.4;
const SHOULDER_DISTANCE: f64 = 3.0;
const SHOULDER_BLOCK_CHANCE: f64 = 0.7;
const CLIFF_DISTANCE: f64 = 5.0;
const BOULDER_BLOCK_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Forest,
    Meadow,
    StoneSea,
    SnowRidge,
    Peak,
}

impl Biome {
    /// Extra energy a move into this biome costs.
    #[must_use]
    pub const fn danger(self) -> i32 {
        match self {
            Self::Forest => 1,
            Self::Meadow => 2,
            Self::StoneSea => 5,
            Self::SnowRidge => 7,
            Self::Peak => 8,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forest => "Conifer Forest",
            Self::Meadow => "Alpine Meadow",
            Self::StoneSea => "Stone Sea",
            Self::SnowRidge => "Snow Ridge",
            Self::Peak => "Summit",
        }
    }

    /// Band for `row` on a map `height` rows tall.
    #[must_use]
    pub fn for_row(row: i32, height: u32) -> Self {
        let height = i64::from(height.max(1));
        let scaled = i64::from(row) * REFERENCE_HEIGHT / height;
        match scaled {
            i64::MIN..=8 => Self::Forest,
            9..=18 => Self::Meadow,
            19..=32 => Self::StoneSea,
            33..=40 => Self::SnowRidge,
            _ => Self::Peak,
        }
    }

    /// Boulder fields block cells independently of the path shoulders.
    const fn boulder_field(self) -> bool {
        matches!(self, Self::StoneSea)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileEvent {
    Landmark,
    Shelter,
    Loot,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    pub biome: Biome,
    pub blocked: bool,
    /// Reserved for fog of war.
    pub revealed: bool,
    pub event: Option<TileEvent>,
    pub x: i32,
    pub y: i32,
}

/// Named waypoint on a fixed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
    pub row: i32,
    pub name: &'static str,
    pub description: &'static str,
    /// Scripted line logged on first arrival.
    pub plot: Option<&'static str>,
}

pub const LANDMARKS: [Landmark; 6] = [
    Landmark {
        row: 2,
        name: "Tangkou Trailhead",
        description: "Where it all begins. The villagers say the weather is fine today.",
        plot: Some(
            "Village elder: This is the trailhead. Remember, don't push yourself. Come back alive.",
        ),
    },
    Landmark {
        row: 8,
        name: "Fire-Scorched Slope",
        description: "A punishing climb.",
        plot: None,
    },
    Landmark {
        row: 15,
        name: "Camp 2800",
        description: "A slightly flat spot sheltered from the wind.",
        plot: None,
    },
    Landmark {
        row: 22,
        name: "Stone Sea Core",
        description: "Giant boulders piled at random; every step is a hazard.",
        plot: Some(
            "Facing the endless Stone Sea you feel how small you are. Every step must be sure.",
        ),
    },
    Landmark {
        row: 32,
        name: "Ninth Heaven",
        description: "The wind feels strong enough to carry you off.",
        plot: None,
    },
    Landmark {
        row: 43,
        name: "Aoshan Ridge",
        description: "The final push, above the clouds.",
        plot: None,
    },
];

#[must_use]
pub fn landmark_at_row(row: i32) -> Option<&'static Landmark> {
    LANDMARKS.iter().find(|landmark| landmark.row == row)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && i64::from(position.x) < i64::from(self.width)
            && i64::from(position.y) < i64::from(self.height)
    }
}

/// Static map oracle exposing the immutable layout for a run.
pub trait TerrainOracle: Send + Sync {
    fn dimensions(&self) -> MapDimensions;
    fn tile_at(&self, position: Position) -> Option<&TileData>;

    fn contains(&self, position: Position) -> bool {
        self.dimensions().contains(position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    dimensions: MapDimensions,
    rows: Vec<Vec<TileData>>,
}

impl Grid {
    /// Build a grid from explicit rows; `rows[y][x]`.
    ///
    /// Rows shorter than the first one are rejected by returning `None`.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<TileData>>) -> Option<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let dimensions = MapDimensions::new(
            u32::try_from(width).ok()?,
            u32::try_from(rows.len()).ok()?,
        );
        Some(Self { dimensions, rows })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileData]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Square window of `size` cells centred on `center`, top row first (highest `y`).
    /// Cells outside the grid are `None`.
    #[must_use]
    pub fn viewport(&self, center: Position, size: u32) -> Vec<Vec<Option<&TileData>>> {
        let half = i32::try_from(size / 2).unwrap_or(0);
        ((center.y - half)..=(center.y + half))
            .rev()
            .map(|y| {
                ((center.x - half)..=(center.x + half))
                    .map(|x| self.tile_at(Position::new(x, y)))
                    .collect()
            })
            .collect()
    }
}

impl TerrainOracle for Grid {
    fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    fn tile_at(&self, position: Position) -> Option<&TileData> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        self.rows.get(y)?.get(x)
    }
}

fn path_center(width: u32, row: i32) -> f64 {
    f64::from(start_column(width)) + (f64::from(row) * PATH_FREQUENCY).sin() * PATH_AMPLITUDE
}

/// Generate the ridge for one run.
///
/// Biomes are banded by row; cells drifting away from a winding centre line
/// are increasingly likely to be blocked, boulder fields add their own
/// blocking, and landmark cells plus the start cell are always open.
pub fn generate<R>(width: u32, height: u32, rng: &mut R) -> Grid
where
    R: Rng + ?Sized,
{
    let width = width.max(1);
    let height = height.max(1);
    let mut rows: Vec<Vec<TileData>> = Vec::with_capacity(height as usize);
    for y in 0..i32::try_from(height).unwrap_or(i32::MAX) {
        let biome = Biome::for_row(y, height);
        let center = path_center(width, y);
        let row = (0..i32::try_from(width).unwrap_or(i32::MAX))
            .map(|x| {
                let distance = (f64::from(x) - center).abs();
                let mut blocked = distance > SHOULDER_DISTANCE && rng.gen_bool(SHOULDER_BLOCK_CHANCE);
                if distance > CLIFF_DISTANCE {
                    blocked = true;
                }
                if biome.boulder_field() && rng.gen_bool(BOULDER_BLOCK_CHANCE) {
                    blocked = true;
                }
                TileData {
                    biome,
                    blocked,
                    revealed: false,
                    event: None,
                    x,
                    y,
                }
            })
            .collect();
        rows.push(row);
    }

    let center_x = start_column(width);
    for landmark in &LANDMARKS {
        let tile = usize::try_from(landmark.row)
            .ok()
            .and_then(|y| rows.get_mut(y))
            .and_then(|row| row.get_mut(center_x as usize));
        if let Some(tile) = tile {
            tile.event = Some(TileEvent::Landmark);
            tile.blocked = false;
        }
    }
    if let Some(start) = rows.first_mut().and_then(|row| row.get_mut(center_x as usize)) {
        start.blocked = false;
    }

    let dimensions = MapDimensions::new(width, height);
    log::debug!(
        "generated {}x{} ridge with {} blocked cells",
        dimensions.width,
        dimensions.height,
        rows.iter().flatten().filter(|tile| tile.blocked).count()
    );
    Grid { dimensions, rows }
}
