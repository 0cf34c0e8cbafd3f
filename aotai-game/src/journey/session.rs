use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::kernel::{
    MoveCost, apply_encounter, apply_move_cost, consume_item, move_cost, rest_effect,
    terminal_check,
};
use super::{Direction, Rejection, TurnOutcome};
use crate::config::{ConfigError, GameConfig};
use crate::constants::{
    LOG_BLOCKED, LOG_JOURNEY_START, LOG_OUT_OF_BOUNDS, LOG_REST, LOG_REST_EXPOSED,
    LOG_SUPPLY_FOUND,
};
use crate::inventory::{Passives, resolve_passives};
use crate::oracle::{EncounterEffect, NarrativeContext, NarrativeOracle};
use crate::state::{EndReason, GamePhase, GameState, LogKind, Position};
use crate::store::{Catalog, ItemCategory};
use crate::terrain::{self, Biome, Grid, TerrainOracle, TileData, landmark_at_row};
use crate::weather::Weather;
use crate::DeathLedger;

/// Raises the busy flag for the lifetime of the guard.
///
/// Dropping the guard lowers the flag on every exit path, including a
/// cancelled oracle future.
struct BusyGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> BusyGuard<'a> {
    fn engage(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Owns one run: the state container, its terrain and the collaborators the
/// turn engine calls out to. The intent methods are the only way to mutate it.
pub struct JourneySession {
    config: GameConfig,
    state: GameState,
    grid: Grid,
    catalog: Catalog,
    oracle: Box<dyn NarrativeOracle>,
    ledger: Box<dyn DeathLedger>,
    rng: ChaCha20Rng,
    death_count: u32,
}

impl std::fmt::Debug for JourneySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JourneySession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("death_count", &self.death_count)
            .finish_non_exhaustive()
    }
}

impl JourneySession {
    /// Start a session at the menu with an entropy-seeded random source.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        config: GameConfig,
        oracle: Box<dyn NarrativeOracle>,
        ledger: Box<dyn DeathLedger>,
    ) -> Result<Self, ConfigError> {
        Self::from_rng(config, oracle, ledger, ChaCha20Rng::from_entropy())
    }

    /// Start a session whose terrain and rolls are reproducible from `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_seed(
        config: GameConfig,
        oracle: Box<dyn NarrativeOracle>,
        ledger: Box<dyn DeathLedger>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::from_rng(config, oracle, ledger, ChaCha20Rng::seed_from_u64(seed))
    }

    fn from_rng(
        config: GameConfig,
        oracle: Box<dyn NarrativeOracle>,
        ledger: Box<dyn DeathLedger>,
        mut rng: ChaCha20Rng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = terrain::generate(config.map_width, config.map_height, &mut rng);
        let death_count = ledger.load().unwrap_or_else(|err| {
            log::warn!("death ledger unavailable, counting from zero: {err}");
            0
        });
        Ok(Self {
            state: GameState::new(&config),
            grid,
            catalog: Catalog::default_catalog().clone(),
            oracle,
            ledger,
            rng,
            death_count,
            config,
        })
    }

    /// Replace the generated terrain, e.g. with a hand-built scenario map.
    #[must_use]
    pub fn with_terrain(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }

    /// Current run state; mutated only through the intent methods.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Terrain for this run, regenerated on restart.
    #[must_use]
    pub const fn terrain(&self) -> &Grid {
        &self.grid
    }

    /// Items the outfitter sells.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validated configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Losses recorded by the ledger, including this session's.
    #[must_use]
    pub const fn death_count(&self) -> u32 {
        self.death_count
    }

    /// Gear modifiers derived from the current inventory.
    #[must_use]
    pub fn passives(&self) -> Passives {
        resolve_passives(&self.state.inventory, &self.catalog)
    }

    /// Tile under the player, if the position lies on the map.
    #[must_use]
    pub fn current_tile(&self) -> Option<&TileData> {
        self.grid.tile_at(self.state.position)
    }

    /// MENU -> SHOP.
    pub fn enter_shop(&mut self) -> TurnOutcome {
        if self.state.phase != GamePhase::Menu {
            return Rejection::WrongPhase.into();
        }
        self.transition(GamePhase::Shop)
    }

    /// SHOP -> PLAYING; the log restarts with the departure line.
    pub fn start_journey(&mut self) -> TurnOutcome {
        if self.state.phase != GamePhase::Shop {
            return Rejection::WrongPhase.into();
        }
        self.state.log.clear();
        self.state.push_log(LOG_JOURNEY_START, LogKind::Info);
        self.transition(GamePhase::Playing)
    }

    /// Terminal phase -> MENU with a fresh state and freshly generated terrain.
    pub fn restart(&mut self) -> TurnOutcome {
        if !self.state.phase.is_terminal() {
            return Rejection::WrongPhase.into();
        }
        self.state = GameState::new(&self.config);
        self.grid = terrain::generate(self.config.map_width, self.config.map_height, &mut self.rng);
        log::info!("run restarted; attempt {}", self.death_count + 1);
        TurnOutcome::PhaseChanged(GamePhase::Menu)
    }

    fn transition(&mut self, phase: GamePhase) -> TurnOutcome {
        log::info!("phase {:?} -> {:?}", self.state.phase, phase);
        self.state.phase = phase;
        TurnOutcome::PhaseChanged(phase)
    }

    fn ready_for_turn(&self) -> Result<(), Rejection> {
        if self.state.phase != GamePhase::Playing {
            return Err(Rejection::WrongPhase);
        }
        if self.state.busy {
            return Err(Rejection::Busy);
        }
        Ok(())
    }

    /// Step one cell. Out-of-bounds and blocked targets are logged and leave
    /// turn, position and stats untouched.
    pub async fn move_by(&mut self, direction: Direction) -> TurnOutcome {
        if let Err(reason) = self.ready_for_turn() {
            return reason.into();
        }
        let target = direction.step(self.state.position);
        let tile = self
            .grid
            .contains(target)
            .then(|| self.grid.tile_at(target).copied())
            .flatten();
        let Some(tile) = tile else {
            self.state.push_log(LOG_OUT_OF_BOUNDS, LogKind::Info);
            return Rejection::OutOfBounds.into();
        };
        if tile.blocked {
            self.state.push_log(LOG_BLOCKED, LogKind::Danger);
            return Rejection::Blocked.into();
        }
        let (_, dy) = direction.delta();
        self.resolve_turn(target, tile.biome, move_cost(dy, tile.biome))
            .await
    }

    /// Shared move algorithm. Each terminal check returns before the commit so
    /// a finished run can never be overwritten by the pending update.
    async fn resolve_turn(&mut self, destination: Position, biome: Biome, cost: MoveCost) -> TurnOutcome {
        let passives = self.passives();
        let goal_row = self.config.goal_row();
        let mut stats = apply_move_cost(self.state.stats, cost, passives, self.state.weather);
        if let Some(reason) = terminal_check(&stats, destination.y, goal_row) {
            return self.conclude(reason);
        }

        if self.rng.gen_bool(self.config.encounter_chance) && !self.state.busy {
            let encounter = {
                let _busy = BusyGuard::engage(&mut self.state.busy);
                self.oracle.encounter(biome).await
            };
            log::debug!("encounter in {biome}: {:?}", encounter.effect);
            let kind = match encounter.effect {
                EncounterEffect::Damage => LogKind::Danger,
                EncounterEffect::None | EncounterEffect::Item => LogKind::Info,
            };
            self.state.push_log(encounter.text, kind);
            if encounter.effect == EncounterEffect::Item {
                self.state.push_log(LOG_SUPPLY_FOUND, LogKind::Success);
            }
            stats = apply_encounter(stats, encounter.effect);
        }

        if destination.y != self.state.position.y
            && let Some(landmark) = landmark_at_row(destination.y)
        {
            self.state
                .push_log(format!("Arrived: {}", landmark.name), LogKind::Success);
            if let Some(plot) = landmark.plot {
                self.state.push_log(plot, LogKind::Narrative);
            }
            let context = NarrativeContext {
                location: landmark.name.to_string(),
                biome,
                weather: self.state.weather,
                stats,
            };
            let narrative = {
                let _busy = BusyGuard::engage(&mut self.state.busy);
                self.oracle.narrate(&context).await
            };
            self.state.push_log(narrative, LogKind::Narrative);
        }

        let mut weather = self.state.weather;
        if self.rng.gen_bool(self.config.weather_change_chance) {
            weather = Weather::sample(&mut self.rng);
            log::debug!("weather resampled: {} -> {weather}", self.state.weather);
            self.state
                .push_log(format!("The weather turns: {weather}"), LogKind::Info);
        }

        if let Some(reason) = terminal_check(&stats, destination.y, goal_row) {
            return self.conclude(reason);
        }

        self.state.position = destination;
        self.state.stats = stats;
        self.state.weather = weather;
        self.state.turn += 1;
        log::debug!(
            "turn {} committed at ({destination}) with {:?}",
            self.state.turn,
            self.state.stats
        );
        TurnOutcome::Advanced {
            turn: self.state.turn,
            position: destination,
        }
    }

    fn conclude(&mut self, reason: EndReason) -> TurnOutcome {
        let won = reason.is_victory();
        self.state.phase = if won {
            GamePhase::Victory
        } else {
            GamePhase::GameOver
        };
        self.state.won = won;
        self.state.end_reason = Some(reason);
        let kind = if won { LogKind::Success } else { LogKind::Danger };
        self.state.push_log(reason.log_line(), kind);
        if !won {
            self.death_count = match self.ledger.record_death() {
                Ok(count) => count,
                Err(err) => {
                    log::warn!("could not persist death: {err}");
                    self.death_count.saturating_add(1)
                }
            };
        }
        log::info!(
            "run ended on turn {}: {} (deaths recorded: {})",
            self.state.turn,
            reason.key(),
            self.death_count
        );
        TurnOutcome::Ended(reason)
    }

    /// Recover in place for one turn. Resting runs no terrain events and, as
    /// the game has always played, no terminal check.
    pub fn rest(&mut self) -> TurnOutcome {
        if let Err(reason) = self.ready_for_turn() {
            return reason.into();
        }
        let result = rest_effect(self.state.stats, self.passives(), self.state.weather);
        if result.exposed {
            self.state.push_log(LOG_REST_EXPOSED, LogKind::Danger);
        } else {
            self.state.push_log(LOG_REST, LogKind::Info);
        }
        self.state.stats = result.stats;
        self.state.turn += 1;
        log::debug!("rested on turn {}: {:?}", self.state.turn, self.state.stats);
        TurnOutcome::Advanced {
            turn: self.state.turn,
            position: self.state.position,
        }
    }

    /// Eat food or apply medicine. Free: no turn passes and no terminal check runs.
    pub fn use_item(&mut self, item_id: &str) -> TurnOutcome {
        if let Err(reason) = self.ready_for_turn() {
            return reason.into();
        }
        let Some(item) = self.catalog.find(item_id) else {
            return Rejection::UnknownItem.into();
        };
        if !self.state.inventory.owns(&item.id) {
            return Rejection::NotOwned.into();
        }
        let Some(stats) = consume_item(self.state.stats, item) else {
            return Rejection::NotConsumable.into();
        };
        self.state.inventory.remove_one(&item.id);
        self.state.stats = stats;
        let line = match item.category {
            ItemCategory::Food if item.warmth_bonus > 0 => {
                format!("You ate the {} and feel warm again!", item.name)
            }
            ItemCategory::Food => format!("You ate the {} and got your strength back.", item.name),
            ItemCategory::Medical | ItemCategory::Gear => {
                format!("You used the {} and dressed your wounds.", item.name)
            }
        };
        let item_id = item.id.clone();
        self.state.push_log(line, LogKind::Success);
        TurnOutcome::ItemUsed {
            remaining: self.state.inventory.count(&item_id),
            item_id,
        }
    }

    /// Buy one unit at the outfitter. Only available before departure.
    pub fn buy_item(&mut self, item_id: &str) -> TurnOutcome {
        if self.state.phase != GamePhase::Shop {
            return Rejection::WrongPhase.into();
        }
        let item = match self
            .catalog
            .check_purchase(item_id, self.state.money, &self.state.inventory)
        {
            Ok(item) => item,
            Err(reason) => return reason.into(),
        };
        self.state.money -= item.price;
        self.state.inventory.add(&item.id);
        log::debug!("bought {} for {}; {} left", item.id, item.price, self.state.money);
        TurnOutcome::Purchased {
            item_id: item.id.clone(),
            money: self.state.money,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;
    use crate::oracle::OfflineOracle;

    fn calm_config() -> GameConfig {
        GameConfig {
            encounter_chance: 0.0,
            weather_change_chance: 0.0,
            ..GameConfig::default()
        }
    }

    fn playing_session() -> JourneySession {
        let mut session = JourneySession::with_seed(
            calm_config(),
            Box::new(OfflineOracle),
            Box::new(MemoryLedger::default()),
            9,
        )
        .expect("valid config");
        session.enter_shop();
        session.start_journey();
        session
    }

    #[tokio::test]
    async fn busy_session_rejects_turns() {
        let mut session = playing_session();
        session.state.busy = true;
        assert_eq!(
            session.move_by(Direction::North).await,
            TurnOutcome::Rejected(Rejection::Busy)
        );
        assert_eq!(session.rest(), TurnOutcome::Rejected(Rejection::Busy));
        assert_eq!(session.state.turn, 0);
    }

    #[test]
    fn busy_guard_lowers_flag_on_drop() {
        let mut flag = false;
        {
            let guard = BusyGuard::engage(&mut flag);
            assert!(*guard.flag);
        }
        assert!(!flag);
    }

    #[test]
    fn phase_transitions_are_one_way() {
        let mut session = JourneySession::with_seed(
            calm_config(),
            Box::new(OfflineOracle),
            Box::new(MemoryLedger::default()),
            1,
        )
        .expect("valid config");
        assert_eq!(session.start_journey(), TurnOutcome::Rejected(Rejection::WrongPhase));
        assert_eq!(session.restart(), TurnOutcome::Rejected(Rejection::WrongPhase));
        assert_eq!(session.enter_shop(), TurnOutcome::PhaseChanged(GamePhase::Shop));
        assert_eq!(session.enter_shop(), TurnOutcome::Rejected(Rejection::WrongPhase));
        assert_eq!(
            session.start_journey(),
            TurnOutcome::PhaseChanged(GamePhase::Playing)
        );
        assert_eq!(session.state.log.len(), 1);
        assert_eq!(session.buy_item("mantou"), TurnOutcome::Rejected(Rejection::WrongPhase));
    }

    #[test]
    fn restart_rebuilds_state_after_an_ending() {
        let mut session = playing_session();
        session.conclude(EndReason::WarmthDepleted);
        assert_eq!(session.state.phase, GamePhase::GameOver);
        assert_eq!(session.death_count(), 1);
        assert_eq!(session.rest(), TurnOutcome::Rejected(Rejection::WrongPhase));
        assert_eq!(session.restart(), TurnOutcome::PhaseChanged(GamePhase::Menu));
        assert_eq!(session.state().phase, GamePhase::Menu);
        assert_eq!(session.state().turn, 0);
        assert!(session.state().end_reason.is_none());
        assert_eq!(session.death_count(), 1);
    }
}
