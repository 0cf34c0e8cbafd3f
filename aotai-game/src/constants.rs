//! Centralized balance and tuning constants for the crossing.
//!
//! Values that players may tune live in [`crate::config::GameConfig`]; the
//! numbers here define the fixed math of a turn and only change through a
//! reviewed code change.

// Stat bounds --------------------------------------------------------------
pub(crate) const STAT_FLOOR: i32 = 0;
pub(crate) const STAT_CEILING: i32 = 100;

// Move costs ---------------------------------------------------------------
pub(crate) const ASCEND_ENERGY_COST: i32 = 4;
pub(crate) const FLAT_ENERGY_COST: i32 = 2;
pub(crate) const MOVE_WARMTH_COST: i32 = 1;
pub(crate) const MIN_MOVE_ENERGY_COST: i32 = 1;
pub(crate) const HARSH_WEATHER_WARMTH_PENALTY: i32 = 3;
pub(crate) const MIN_HARSH_WEATHER_PENALTY: i32 = 1;

// Rest ---------------------------------------------------------------------
pub(crate) const REST_ENERGY_GAIN: i32 = 20;
pub(crate) const REST_HEALTH_GAIN: i32 = 10;
pub(crate) const REST_WARMTH_GAIN: i32 = 5;
pub(crate) const REST_EXPOSED_WARMTH_LOSS: i32 = 5;
pub(crate) const REST_SHELTER_RETENTION: i32 = 2;

// Encounters ---------------------------------------------------------------
pub(crate) const ENCOUNTER_DAMAGE: i32 = 15;
pub(crate) const ENCOUNTER_SUPPLY_ENERGY: i32 = 10;

// Log ----------------------------------------------------------------------
pub(crate) const LOG_CAPACITY: usize = 50;

// Player-facing log lines --------------------------------------------------
pub(crate) const LOG_JOURNEY_START: &str = "The journey begins.";
pub(crate) const LOG_OUT_OF_BOUNDS: &str = "There is no way through.";
pub(crate) const LOG_BLOCKED: &str = "The terrain blocks the path.";
pub(crate) const LOG_REST: &str = "You stop to catch your breath.";
pub(crate) const LOG_REST_EXPOSED: &str =
    "Without proper gear the blizzard won't let you rest!";
pub(crate) const LOG_SUPPLY_FOUND: &str = "You found some usable supplies (+10 energy).";
pub(crate) const LOG_HEALTH_DEPLETED: &str = "You collapse from your injuries. Game over.";
pub(crate) const LOG_WARMTH_DEPLETED: &str = "The cold swallows you. Hypothermia. Game over.";
pub(crate) const LOG_ENERGY_DEPLETED: &str = "Your strength gives out on the ridge. Game over.";
pub(crate) const LOG_SUMMIT_REACHED: &str = "You reached the Aoshan ridge. You survived!";
