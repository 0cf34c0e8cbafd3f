//! End-of-run summary and scoring
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::GameState;
use crate::terrain::{Biome, TerrainOracle};

const VICTORY_BASE_SCORE: i64 = 1_000;
const VICTORY_TURN_PENALTY: i64 = 10;
const LOSS_TURN_SCORE: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl Grade {
    #[must_use]
    pub const fn from_score(score: i64) -> Self {
        match score {
            800.. => Self::S,
            600..=799 => Self::A,
            400..=599 => Self::B,
            _ => Self::C,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the end screen shows once a run is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub won: bool,
    pub headline: String,
    pub reason: String,
    pub turns: u32,
    pub biome: Option<Biome>,
    pub row: i32,
    pub energy_left: i32,
    pub score: i64,
    /// Only victories are graded.
    pub grade: Option<Grade>,
    /// Losses recorded so far, this one included.
    pub attempt: u32,
}

impl RunSummary {
    #[must_use]
    pub fn from_state(state: &GameState, terrain: &dyn TerrainOracle, death_count: u32) -> Self {
        let score = score(state);
        let won = state.won;
        Self {
            won,
            headline: if won {
                "Crossing complete".to_string()
            } else {
                "Lost on the ridge".to_string()
            },
            reason: state.reason_text().unwrap_or("Run abandoned").to_string(),
            turns: state.turn,
            biome: terrain.tile_at(state.position).map(|tile| tile.biome),
            row: state.position.y,
            energy_left: state.stats.energy,
            score,
            grade: won.then(|| Grade::from_score(score)),
            attempt: death_count,
        }
    }
}

/// Victories reward speed and reserves; losses still earn a little per turn survived.
#[must_use]
pub fn score(state: &GameState) -> i64 {
    let turns = i64::from(state.turn);
    if state.won {
        (VICTORY_BASE_SCORE - VICTORY_TURN_PENALTY * turns
            + i64::from(state.stats.health)
            + i64::from(state.stats.energy))
        .max(0)
    } else {
        LOSS_TURN_SCORE * turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EndReason, GamePhase, Position, Stats};
    use crate::terrain::generate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ended(won: bool, turn: u32, stats: Stats) -> GameState {
        let mut state = GameState::default();
        state.won = won;
        state.turn = turn;
        state.stats = stats;
        state.position = Position::new(7, 20);
        state.phase = if won {
            GamePhase::Victory
        } else {
            GamePhase::GameOver
        };
        state.end_reason = Some(if won {
            EndReason::SummitReached
        } else {
            EndReason::WarmthDepleted
        });
        state
    }

    #[test]
    fn victory_score_rewards_speed() {
        let state = ended(true, 50, Stats::new(80, 40, 30));
        assert_eq!(score(&state), 1_000 - 500 + 80 + 40);
        let slow = ended(true, 200, Stats::new(10, 10, 10));
        assert_eq!(score(&slow), 0);
    }

    #[test]
    fn grades_follow_thresholds() {
        assert_eq!(Grade::from_score(800), Grade::S);
        assert_eq!(Grade::from_score(799), Grade::A);
        assert_eq!(Grade::from_score(400), Grade::B);
        assert_eq!(Grade::from_score(0), Grade::C);
    }

    #[test]
    fn summary_reports_loss_without_grade() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let grid = generate(15, 45, &mut rng);
        let state = ended(false, 30, Stats::new(40, 20, 0));
        let summary = RunSummary::from_state(&state, &grid, 4);
        assert!(!summary.won);
        assert_eq!(summary.score, 150);
        assert_eq!(summary.grade, None);
        assert_eq!(summary.reason, "Hypothermia");
        assert_eq!(summary.biome, Some(Biome::StoneSea));
        assert_eq!(summary.attempt, 4);

        let won = RunSummary::from_state(&ended(true, 45, Stats::new(90, 90, 90)), &grid, 4);
        assert_eq!(won.score, 730);
        assert_eq!(won.grade, Some(Grade::A));
    }
}
