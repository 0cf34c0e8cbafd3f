use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::config::GameConfig;
use crate::constants::{
    LOG_CAPACITY, LOG_ENERGY_DEPLETED, LOG_HEALTH_DEPLETED, LOG_SUMMIT_REACHED,
    LOG_WARMTH_DEPLETED, STAT_CEILING, STAT_FLOOR,
};
use crate::inventory::Inventory;
use crate::weather::Weather;

/// Grid coordinate; `y` grows toward the summit edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// The three bounded survival resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Health,
    Energy,
    Warmth,
}

impl Stat {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Energy => "energy",
            Self::Warmth => "warmth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub health: i32,
    pub energy: i32,
    pub warmth: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: STAT_CEILING,
            energy: STAT_CEILING,
            warmth: STAT_CEILING,
        }
    }
}

impl Stats {
    #[must_use]
    pub const fn new(health: i32, energy: i32, warmth: i32) -> Self {
        Self {
            health,
            energy,
            warmth,
        }
    }

    pub fn clamp(&mut self) {
        self.health = self.health.clamp(STAT_FLOOR, STAT_CEILING);
        self.energy = self.energy.clamp(STAT_FLOOR, STAT_CEILING);
        self.warmth = self.warmth.clamp(STAT_FLOOR, STAT_CEILING);
    }

    /// Add `delta` to one resource and clamp the result into bounds.
    pub fn adjust(&mut self, stat: Stat, delta: i32) {
        let slot = match stat {
            Stat::Health => &mut self.health,
            Stat::Energy => &mut self.energy,
            Stat::Warmth => &mut self.warmth,
        };
        *slot = slot.saturating_add(delta).clamp(STAT_FLOOR, STAT_CEILING);
    }

    /// First resource at or below zero, checked health, warmth, energy.
    #[must_use]
    pub const fn depleted(&self) -> Option<Stat> {
        if self.health <= 0 {
            Some(Stat::Health)
        } else if self.warmth <= 0 {
            Some(Stat::Warmth)
        } else if self.energy <= 0 {
            Some(Stat::Energy)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GamePhase {
    #[default]
    Menu,
    Shop,
    Playing,
    GameOver,
    Victory,
}

impl GamePhase {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    HealthDepleted,
    WarmthDepleted,
    EnergyDepleted,
    SummitReached,
}

impl EndReason {
    #[must_use]
    pub const fn from_depleted(stat: Stat) -> Self {
        match stat {
            Stat::Health => Self::HealthDepleted,
            Stat::Warmth => Self::WarmthDepleted,
            Stat::Energy => Self::EnergyDepleted,
        }
    }

    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::SummitReached)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::HealthDepleted => "health_depleted",
            Self::WarmthDepleted => "warmth_depleted",
            Self::EnergyDepleted => "energy_depleted",
            Self::SummitReached => "summit_reached",
        }
    }

    /// Short cause shown on the end screen.
    #[must_use]
    pub const fn cause(self) -> &'static str {
        match self {
            Self::HealthDepleted => "Fatal injuries",
            Self::WarmthDepleted => "Hypothermia",
            Self::EnergyDepleted => "Exhaustion",
            Self::SummitReached => "Crossing complete",
        }
    }

    pub(crate) const fn log_line(self) -> &'static str {
        match self {
            Self::HealthDepleted => LOG_HEALTH_DEPLETED,
            Self::WarmthDepleted => LOG_WARMTH_DEPLETED,
            Self::EnergyDepleted => LOG_ENERGY_DEPLETED,
            Self::SummitReached => LOG_SUMMIT_REACHED,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cause())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Danger,
    Success,
    Narrative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic sequence number within the run.
    pub seq: u64,
    pub turn: u32,
    pub text: String,
    pub kind: LogKind,
}

/// Player-facing journal holding the most recent entries; oldest evicted first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TurnLog {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

impl TurnLog {
    pub fn push(&mut self, turn: u32, text: impl Into<String>, kind: LogKind) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            seq: self.next_seq,
            turn,
            text: text.into(),
            kind,
        });
        self.next_seq += 1;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Up to `count` most recent entries, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(count))
    }

    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.text.contains(needle))
    }
}

/// Single source of truth for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub turn: u32,
    pub money: i64,
    pub position: Position,
    pub stats: Stats,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub weather: Weather,
    #[serde(default)]
    pub log: TurnLog,
    /// Set while a narrative oracle call is in flight.
    #[serde(default)]
    pub busy: bool,
    #[serde(default)]
    pub end_reason: Option<EndReason>,
    #[serde(default)]
    pub won: bool,
}

impl GameState {
    /// Fresh state at MENU entry.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let mut stats = config.start_stats;
        stats.clamp();
        Self {
            phase: GamePhase::Menu,
            turn: 0,
            money: config.start_money,
            position: Position::new(start_column(config.map_width), 0),
            stats,
            inventory: Inventory::default(),
            weather: config.start_weather,
            log: TurnLog::default(),
            busy: false,
            end_reason: None,
            won: false,
        }
    }

    pub fn push_log(&mut self, text: impl Into<String>, kind: LogKind) {
        self.log.push(self.turn, text, kind);
    }

    /// Player-facing reason the run ended, if it has.
    #[must_use]
    pub fn reason_text(&self) -> Option<&'static str> {
        self.end_reason.map(EndReason::cause)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Column where the walk starts and where landmarks sit.
#[must_use]
pub const fn start_column(width: u32) -> i32 {
    (width / 2) as i32
}
