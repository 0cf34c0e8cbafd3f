//! Pure stat arithmetic shared by the session intents.
use crate::constants::{
    ASCEND_ENERGY_COST, ENCOUNTER_DAMAGE, ENCOUNTER_SUPPLY_ENERGY, FLAT_ENERGY_COST,
    HARSH_WEATHER_WARMTH_PENALTY, MIN_HARSH_WEATHER_PENALTY, MIN_MOVE_ENERGY_COST,
    MOVE_WARMTH_COST, REST_ENERGY_GAIN, REST_EXPOSED_WARMTH_LOSS, REST_HEALTH_GAIN,
    REST_SHELTER_RETENTION, REST_WARMTH_GAIN,
};
use crate::inventory::Passives;
use crate::oracle::EncounterEffect;
use crate::state::{EndReason, Stat, Stats};
use crate::store::{Item, ItemEffect};
use crate::terrain::Biome;
use crate::weather::Weather;

/// Raw cost of a move before passives and weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCost {
    pub energy: i32,
    pub warmth: i32,
}

/// Climbing costs more than traversing or descending; the destination biome adds its danger.
#[must_use]
pub const fn move_cost(dy: i32, destination: Biome) -> MoveCost {
    let base = if dy > 0 {
        ASCEND_ENERGY_COST
    } else {
        FLAT_ENERGY_COST
    };
    MoveCost {
        energy: base + destination.danger(),
        warmth: MOVE_WARMTH_COST,
    }
}

/// Apply a move's cost to a stats snapshot.
///
/// Move efficiency trims energy down to a floor of one; warmth retention trims
/// the base warmth cost to zero and the harsh-weather penalty down to one.
#[must_use]
pub fn apply_move_cost(stats: Stats, cost: MoveCost, passives: Passives, weather: Weather) -> Stats {
    let mut next = stats;
    let energy = (cost.energy - passives.move_efficiency).max(MIN_MOVE_ENERGY_COST);
    next.adjust(Stat::Energy, -energy);

    let mut warmth = (cost.warmth - passives.warmth_retention).max(0);
    if weather.is_harsh() {
        warmth += (HARSH_WEATHER_WARMTH_PENALTY - passives.warmth_retention)
            .max(MIN_HARSH_WEATHER_PENALTY);
    }
    next.adjust(Stat::Warmth, -warmth);
    next
}

/// Depletion first (health, warmth, energy), then the goal row.
#[must_use]
pub fn terminal_check(stats: &Stats, row: i32, goal_row: i32) -> Option<EndReason> {
    stats
        .depleted()
        .map(EndReason::from_depleted)
        .or_else(|| (row >= goal_row).then_some(EndReason::SummitReached))
}

#[must_use]
pub fn apply_encounter(stats: Stats, effect: EncounterEffect) -> Stats {
    let mut next = stats;
    match effect {
        EncounterEffect::None => {}
        EncounterEffect::Damage => next.adjust(Stat::Health, -ENCOUNTER_DAMAGE),
        EncounterEffect::Item => next.adjust(Stat::Energy, ENCOUNTER_SUPPLY_ENERGY),
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestResult {
    pub stats: Stats,
    /// Too little shelter to rest through a blizzard: warmth drops, health stays.
    pub exposed: bool,
}

#[must_use]
pub fn rest_effect(stats: Stats, passives: Passives, weather: Weather) -> RestResult {
    let mut next = stats;
    let exposed = weather.is_harshest() && passives.warmth_retention < REST_SHELTER_RETENTION;
    next.adjust(Stat::Energy, REST_ENERGY_GAIN);
    if exposed {
        next.adjust(Stat::Warmth, -REST_EXPOSED_WARMTH_LOSS);
    } else {
        next.adjust(Stat::Health, REST_HEALTH_GAIN);
        next.adjust(Stat::Warmth, REST_WARMTH_GAIN + passives.warmth_retention);
    }
    RestResult {
        stats: next,
        exposed,
    }
}

/// Stats after eating or applying `item`; `None` for gear.
#[must_use]
pub fn consume_item(stats: Stats, item: &Item) -> Option<Stats> {
    if !item.category.is_consumable() {
        return None;
    }
    let ItemEffect::DirectRestore { stat, amount } = item.effect else {
        return None;
    };
    let mut next = stats;
    next.adjust(stat, amount);
    if item.warmth_bonus != 0 {
        next.adjust(Stat::Warmth, item.warmth_bonus);
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Catalog;

    const NO_PASSIVES: Passives = Passives {
        move_efficiency: 0,
        warmth_retention: 0,
    };

    #[test]
    fn climbing_costs_more_than_traversing() {
        assert_eq!(move_cost(1, Biome::Forest), MoveCost { energy: 5, warmth: 1 });
        assert_eq!(move_cost(0, Biome::Forest), MoveCost { energy: 3, warmth: 1 });
        assert_eq!(move_cost(-1, Biome::Peak), MoveCost { energy: 10, warmth: 1 });
        assert_eq!(move_cost(1, Biome::SnowRidge).energy, 11);
    }

    #[test]
    fn passives_reduce_costs_to_floors() {
        let start = Stats::new(100, 100, 100);
        let cost = MoveCost { energy: 3, warmth: 1 };
        let geared = Passives {
            move_efficiency: 10,
            warmth_retention: 10,
        };
        let after = apply_move_cost(start, cost, geared, Weather::Blizzard);
        assert_eq!(after, Stats::new(100, 99, 99));

        let bare = apply_move_cost(start, cost, NO_PASSIVES, Weather::Windy);
        assert_eq!(bare, Stats::new(100, 97, 96));

        let calm = apply_move_cost(start, cost, NO_PASSIVES, Weather::Fog);
        assert_eq!(calm, Stats::new(100, 97, 99));
    }

    #[test]
    fn costs_clamp_at_zero() {
        let after = apply_move_cost(
            Stats::new(50, 2, 1),
            MoveCost { energy: 12, warmth: 1 },
            NO_PASSIVES,
            Weather::Blizzard,
        );
        assert_eq!(after, Stats::new(50, 0, 0));
    }

    #[test]
    fn terminal_check_prefers_death_over_summit() {
        assert_eq!(terminal_check(&Stats::new(50, 50, 50), 10, 43), None);
        assert_eq!(
            terminal_check(&Stats::new(50, 50, 50), 43, 43),
            Some(EndReason::SummitReached)
        );
        assert_eq!(
            terminal_check(&Stats::new(50, 0, 50), 43, 43),
            Some(EndReason::EnergyDepleted)
        );
        assert_eq!(
            terminal_check(&Stats::new(0, 0, 0), 1, 43),
            Some(EndReason::HealthDepleted)
        );
    }

    #[test]
    fn encounters_shift_the_right_stat() {
        let start = Stats::new(10, 95, 50);
        assert_eq!(apply_encounter(start, EncounterEffect::None), start);
        assert_eq!(
            apply_encounter(start, EncounterEffect::Damage),
            Stats::new(0, 95, 50)
        );
        assert_eq!(
            apply_encounter(start, EncounterEffect::Item),
            Stats::new(10, 100, 50)
        );
    }

    #[test]
    fn resting_in_a_blizzard_needs_shelter() {
        let start = Stats::new(50, 50, 50);
        let exposed = rest_effect(start, NO_PASSIVES, Weather::Blizzard);
        assert!(exposed.exposed);
        assert_eq!(exposed.stats, Stats::new(50, 70, 45));

        let sheltered = Passives {
            move_efficiency: 0,
            warmth_retention: 3,
        };
        let rested = rest_effect(start, sheltered, Weather::Blizzard);
        assert!(!rested.exposed);
        assert_eq!(rested.stats, Stats::new(60, 70, 58));

        let calm = rest_effect(Stats::new(95, 90, 99), NO_PASSIVES, Weather::Windy);
        assert_eq!(calm.stats, Stats::new(100, 100, 100));
    }

    #[test]
    fn consuming_restores_and_gear_is_refused() {
        let catalog = Catalog::default_catalog();
        let start = Stats::new(40, 30, 20);
        let hotpot = catalog.find("hotpot").expect("hotpot");
        assert_eq!(consume_item(start, hotpot), Some(Stats::new(40, 100, 35)));
        let medkit = catalog.find("medkit").expect("medkit");
        assert_eq!(consume_item(start, medkit), Some(Stats::new(90, 30, 20)));
        let poles = catalog.find("poles").expect("poles");
        assert_eq!(consume_item(start, poles), None);
    }
}
