//! Ao Tai Line Game Engine
//!
//! Platform-agnostic core for the Ao Tai Line survival walk: terrain, items,
//! weather and the turn resolution state machine. Narrative text and death
//! persistence are reached only through the [`NarrativeOracle`] and
//! [`DeathLedger`] traits, so front-ends decide how they are backed.

pub mod config;
pub mod constants;
pub mod inventory;
pub mod journey;
pub mod oracle;
pub mod result;
pub mod state;
pub mod store;
pub mod terrain;
pub mod weather;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use inventory::{Inventory, Passives, resolve_passives};
pub use journey::{Direction, JourneySession, Rejection, TurnOutcome};
pub use oracle::{
    Encounter, EncounterEffect, GeneratedOracle, NarrativeContext, NarrativeOracle,
    OfflineOracle, OracleError, Prompt, TextGenerator,
};
pub use result::{Grade, RunSummary};
pub use state::{
    EndReason, GamePhase, GameState, LogEntry, LogKind, Position, Stat, Stats, TurnLog,
};
pub use store::{Catalog, Item, ItemCategory, ItemEffect, PassiveKind};
pub use terrain::{
    Biome, Grid, LANDMARKS, Landmark, MapDimensions, TerrainOracle, TileData, TileEvent,
};
pub use weather::Weather;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger contents are corrupt: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Persistent tally of lost runs.
/// Platform-specific implementations should provide this
pub trait DeathLedger: Send + Sync {
    /// Current tally.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<u32, LedgerError>;

    /// Record one loss and return the new tally.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be updated.
    fn record_death(&mut self) -> Result<u32, LedgerError>;
}

/// Ledger that lives only as long as the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    deaths: u32,
}

impl MemoryLedger {
    #[must_use]
    pub const fn new(deaths: u32) -> Self {
        Self { deaths }
    }
}

impl DeathLedger for MemoryLedger {
    fn load(&self) -> Result<u32, LedgerError> {
        Ok(self.deaths)
    }

    fn record_death(&mut self) -> Result<u32, LedgerError> {
        self.deaths = self.deaths.saturating_add(1);
        Ok(self.deaths)
    }
}
