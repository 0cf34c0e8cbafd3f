use std::fmt;

use aotai_game::{
    Direction, ItemEffect, JourneySession, Position, Stat, TerrainOracle, Weather,
};
use clap::ValueEnum;

/// Next intent chosen by a [`PlayerPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Rest,
    Use(String),
}

/// Policy interface for automated crossings.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Items to buy at the outfitter, in order, with quantities.
    fn shopping_list(&self) -> &'static [(&'static str, u32)];

    /// Pick the next intent for a session in the playing phase.
    fn next_action(&mut self, session: &JourneySession) -> Action;
}

/// Built-in autopilot strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum AutopilotStrategy {
    /// Full kit, rests early and eats before stats run low
    Cautious,
    /// Light pack, climbs until nearly spent
    Bold,
}

impl AutopilotStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Bold => "Bold",
        }
    }

    #[must_use]
    pub fn create_policy(self) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy::default()),
            Self::Bold => Box::new(BoldPolicy::default()),
        }
    }
}

impl fmt::Display for AutopilotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const CAUTIOUS_KIT: &[(&str, u32)] = &[
    ("goretex", 1),
    ("poles", 1),
    ("beef", 2),
    ("biscuit", 3),
    ("bandaid", 2),
    ("mantou", 5),
];

const BOLD_KIT: &[(&str, u32)] = &[("poles", 1), ("mantou", 10)];

#[derive(Debug, Default)]
struct CautiousPolicy {
    route: Router,
}

#[derive(Debug, Default)]
struct BoldPolicy {
    route: Router,
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn shopping_list(&self) -> &'static [(&'static str, u32)] {
        CAUTIOUS_KIT
    }

    fn next_action(&mut self, session: &JourneySession) -> Action {
        let state = session.state();
        let stats = state.stats;
        let exposed = state.weather == Weather::Blizzard && session.passives().warmth_retention < 2;

        if stats.health < 40
            && let Some(id) = best_restore(session, Stat::Health)
        {
            return Action::Use(id);
        }
        if stats.energy < 35 {
            if let Some(id) = best_restore(session, Stat::Energy) {
                return Action::Use(id);
            }
            return Action::Rest;
        }
        if (stats.warmth < 40 || stats.health < 30) && !exposed {
            return Action::Rest;
        }
        self.route.step(session)
    }
}

impl PlayerPolicy for BoldPolicy {
    fn name(&self) -> &'static str {
        "Bold"
    }

    fn shopping_list(&self) -> &'static [(&'static str, u32)] {
        BOLD_KIT
    }

    fn next_action(&mut self, session: &JourneySession) -> Action {
        let stats = session.state().stats;
        if stats.energy < 15 {
            return best_restore(session, Stat::Energy).map_or(Action::Rest, Action::Use);
        }
        if stats.warmth < 15 {
            return Action::Rest;
        }
        self.route.step(session)
    }
}

/// Consumable in the pack restoring `stat` by the largest amount.
fn best_restore(session: &JourneySession, stat: Stat) -> Option<String> {
    let catalog = session.catalog();
    session
        .state()
        .inventory
        .iter()
        .filter_map(|(id, _)| catalog.find(id))
        .filter_map(|item| match item.effect {
            ItemEffect::DirectRestore { stat: restored, amount } if restored == stat => {
                Some((amount, item.id.clone()))
            }
            _ => None,
        })
        .max_by_key(|(amount, _)| *amount)
        .map(|(_, id)| id)
}

/// Greedy ridge router: climb when possible, otherwise sidestep toward an opening.
#[derive(Debug, Default)]
struct Router {
    sidestep: Option<Direction>,
}

impl Router {
    fn step(&mut self, session: &JourneySession) -> Action {
        let here = session.state().position;
        let terrain = session.terrain();
        let open = |at: Position| terrain.tile_at(at).is_some_and(|tile| !tile.blocked);

        if open(Direction::North.step(here)) {
            self.sidestep = None;
            return Action::Move(Direction::North);
        }

        let mut lateral = [Direction::West, Direction::East];
        if self.sidestep == Some(Direction::East) {
            lateral.reverse();
        }
        let climbable = lateral.iter().copied().find(|direction| {
            let beside = direction.step(here);
            open(beside) && open(Direction::North.step(beside))
        });
        let fallback = || {
            lateral
                .iter()
                .copied()
                .find(|direction| open(direction.step(here)))
        };
        if let Some(direction) = climbable.or_else(fallback) {
            self.sidestep = Some(direction);
            return Action::Move(direction);
        }
        if open(Direction::South.step(here)) {
            return Action::Move(Direction::South);
        }
        Action::Rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotai_game::{
        Biome, GameConfig, Grid, MemoryLedger, OfflineOracle, Stats, TileData,
    };

    fn grid(width: i32, height: i32, blocked: &[(i32, i32)]) -> Grid {
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| TileData {
                        biome: Biome::Forest,
                        blocked: blocked.contains(&(x, y)),
                        revealed: false,
                        event: None,
                        x,
                        y,
                    })
                    .collect()
            })
            .collect();
        Grid::from_rows(rows).expect("rectangular grid")
    }

    fn session(stats: Stats, blocked: &[(i32, i32)]) -> JourneySession {
        let config = GameConfig {
            map_width: 5,
            map_height: 10,
            start_stats: stats,
            encounter_chance: 0.0,
            weather_change_chance: 0.0,
            ..GameConfig::default()
        };
        let mut session = JourneySession::with_seed(
            config,
            Box::new(OfflineOracle),
            Box::new(MemoryLedger::default()),
            1,
        )
        .expect("valid config")
        .with_terrain(grid(5, 10, blocked));
        session.enter_shop();
        session
    }

    #[test]
    fn climbs_when_the_way_north_is_open() {
        let mut session = session(Stats::default(), &[]);
        session.start_journey();
        let mut router = Router::default();
        assert_eq!(router.step(&session), Action::Move(Direction::North));
    }

    #[test]
    fn sidesteps_toward_a_climbable_column() {
        // Start is (2, 0); north and the west column's next row are walled.
        let mut session = session(Stats::default(), &[(2, 1), (1, 1)]);
        session.start_journey();
        let mut router = Router::default();
        assert_eq!(router.step(&session), Action::Move(Direction::East));
        assert_eq!(router.sidestep, Some(Direction::East));
    }

    #[test]
    fn cautious_eats_the_biggest_ration_when_tired() {
        let mut session = session(Stats::new(100, 30, 100), &[]);
        session.buy_item("mantou");
        session.buy_item("beef");
        session.start_journey();
        let mut policy = AutopilotStrategy::Cautious.create_policy();
        assert_eq!(policy.next_action(&session), Action::Use("beef".to_string()));
    }

    #[test]
    fn bold_rests_when_spent_without_food() {
        let mut session = session(Stats::new(100, 10, 100), &[]);
        session.start_journey();
        let mut policy = AutopilotStrategy::Bold.create_policy();
        assert_eq!(policy.name(), "Bold");
        assert_eq!(policy.next_action(&session), Action::Rest);
    }

    #[test]
    fn kits_fit_the_default_budget() {
        let catalog = aotai_game::Catalog::default_catalog();
        for strategy in [AutopilotStrategy::Cautious, AutopilotStrategy::Bold] {
            let total: i64 = strategy
                .create_policy()
                .shopping_list()
                .iter()
                .map(|(id, qty)| catalog.find(id).expect("known item").price * i64::from(*qty))
                .sum();
            assert!(total <= GameConfig::default().start_money, "{strategy}");
        }
    }
}
