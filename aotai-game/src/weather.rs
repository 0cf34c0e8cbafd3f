//! Weather conditions and resampling
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weather conditions on the ridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Windy,
    Blizzard,
    Fog,
}

pub const WEATHER_ORDER: [Weather; 5] = [
    Weather::Sunny,
    Weather::Cloudy,
    Weather::Windy,
    Weather::Blizzard,
    Weather::Fog,
];

impl Weather {
    /// Weather that strips extra warmth from every move.
    #[must_use]
    pub const fn is_harsh(self) -> bool {
        matches!(self, Self::Windy | Self::Blizzard)
    }

    /// The one condition in which resting without gear backfires.
    #[must_use]
    pub const fn is_harshest(self) -> bool {
        matches!(self, Self::Blizzard)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::Windy => "Windy",
            Self::Blizzard => "Blizzard",
            Self::Fog => "Fog",
        }
    }

    /// Draw a weather uniformly from the full set (the current one included).
    pub fn sample<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        WEATHER_ORDER[rng.gen_range(0..WEATHER_ORDER.len())]
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    #[test]
    fn harsh_set_is_wind_and_blizzard() {
        let harsh: Vec<_> = WEATHER_ORDER.into_iter().filter(|w| w.is_harsh()).collect();
        assert_eq!(harsh, vec![Weather::Windy, Weather::Blizzard]);
        assert!(Weather::Blizzard.is_harshest());
        assert!(!Weather::Windy.is_harshest());
    }

    #[test]
    fn sampling_reaches_every_weather() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let seen: HashSet<_> = (0..500).map(|_| Weather::sample(&mut rng)).collect();
        assert_eq!(seen.len(), WEATHER_ORDER.len());
    }
}
