//! Turn resolution: the intents a player may dispatch and what they produce.
mod kernel;
mod session;

pub use kernel::{
    MoveCost, RestResult, apply_encounter, apply_move_cost, consume_item, move_cost, rest_effect,
    terminal_check,
};
pub use session::JourneySession;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::state::{EndReason, GamePhase, Position};

/// One of the four allowed single-cell moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// `(dx, dy)` step; north climbs toward the summit edge.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, 1) => Some(Self::North),
            (0, -1) => Some(Self::South),
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    /// Keyboard mapping: `w` up the ridge, `s` down, `a`/`d` sideways.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "w" | "north" | "up" => Some(Self::North),
            "s" | "south" | "down" => Some(Self::South),
            "d" | "east" | "right" => Some(Self::East),
            "a" | "west" | "left" => Some(Self::West),
            _ => None,
        }
    }

    #[must_use]
    pub const fn step(self, from: Position) -> Position {
        let (dx, dy) = self.delta();
        from.offset(dx, dy)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an intent was ignored. Rejections never mutate turn, position or stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("not available in the current phase")]
    WrongPhase,
    #[error("waiting for the narrator")]
    Busy,
    #[error("target lies outside the map")]
    OutOfBounds,
    #[error("target cell is blocked")]
    Blocked,
    #[error("not enough money")]
    InsufficientFunds,
    #[error("gear already owned")]
    AlreadyOwned,
    #[error("none owned")]
    NotOwned,
    #[error("item cannot be used directly")]
    NotConsumable,
    #[error("no such item")]
    UnknownItem,
}

/// Result of dispatching one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// A phase transition that is not a terminal one (menu, shop, playing).
    PhaseChanged(GamePhase),
    /// A move or rest was committed and the turn counter advanced.
    Advanced { turn: u32, position: Position },
    /// The run ended on this intent.
    Ended(EndReason),
    ItemUsed { item_id: String, remaining: u32 },
    Purchased { item_id: String, money: i64 },
    Rejected(Rejection),
}

impl TurnOutcome {
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    #[must_use]
    pub const fn end_reason(&self) -> Option<EndReason> {
        match self {
            Self::Ended(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<Rejection> for TurnOutcome {
    fn from(reason: Rejection) -> Self {
        Self::Rejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_round_trip_through_deltas() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_key("W"), Some(Direction::North));
        assert_eq!(Direction::from_key("a"), Some(Direction::West));
        assert_eq!(Direction::from_key("q"), None);
        assert_eq!(Direction::North.step(Position::new(3, 3)), Position::new(3, 4));
    }

    #[test]
    fn outcome_helpers_expose_reasons() {
        let rejected = TurnOutcome::from(Rejection::Blocked);
        assert!(rejected.is_rejected());
        assert_eq!(rejected.rejection(), Some(Rejection::Blocked));
        let ended = TurnOutcome::Ended(EndReason::SummitReached);
        assert_eq!(ended.end_reason(), Some(EndReason::SummitReached));
        assert_eq!(ended.rejection(), None);
        assert_eq!(Rejection::InsufficientFunds.to_string(), "not enough money");
    }
}
