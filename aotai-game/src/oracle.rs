//! Narrative and encounter text boundary.
//!
//! The engine only sees [`NarrativeOracle`], whose calls are infallible: every
//! implementation degrades to a fixed fallback instead of returning an error.
//! Network-backed oracles implement the lower-level [`TextGenerator`] and are
//! wrapped in a [`GeneratedOracle`], which owns prompt construction, response
//! validation and the fallback policy.
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::state::Stats;
use crate::terrain::Biome;
use crate::weather::Weather;

pub const FALLBACK_NARRATIVE: &str = "You press on through the wind and snow.";
pub const EMPTY_NARRATIVE: &str = "The wind howls through the valley...";
pub const FALLBACK_ENCOUNTER_TEXT: &str = "All around is silent.";

const NARRATOR_INSTRUCTION: &str = "You are the narrator of a pixel-art survival adventure set on the \
Ao Tai Line, a dangerous ridge crossing in the Qinling mountains known for harsh weather and \
its boulder-strewn Stone Seas. Reply with a single short sentence (at most 20 words) describing \
the atmosphere or a minor event. Focus on cold, wind, isolation or the beauty of the mountains. \
If the hiker's stats are low, emphasise the danger. Output only the sentence, no JSON, no markdown.";

const ENCOUNTER_INSTRUCTION: &str = "You generate random encounters for hikers on the Ao Tai Line. \
Reply with a JSON object with two fields: \"text\", a short description of at most 15 words, and \
\"effect\", one of \"NONE\", \"DAMAGE\" (minor injury) or \"ITEM\" (found supplies). \
Example: {\"text\": \"A loose rock shifts under your boot.\", \"effect\": \"DAMAGE\"}";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("oracle responded with status {0}")]
    Status(u16),
    #[error("oracle returned an empty body")]
    EmptyBody,
    #[error("malformed oracle response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("oracle response missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown encounter effect `{0}`")]
    UnknownEffect(String),
}

/// What the narrator is told about the hiker's surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeContext {
    pub location: String,
    pub biome: Biome,
    pub weather: Weather,
    pub stats: Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncounterEffect {
    #[default]
    None,
    Damage,
    Item,
}

impl EncounterEffect {
    /// Parse the wire token; anything but the three known values is rejected.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "NONE" => Some(Self::None),
            "DAMAGE" => Some(Self::Damage),
            "ITEM" => Some(Self::Item),
            _ => None,
        }
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Damage => "DAMAGE",
            Self::Item => "ITEM",
        }
    }
}

impl fmt::Display for EncounterEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub text: String,
    pub effect: EncounterEffect,
}

impl Encounter {
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_ENCOUNTER_TEXT.to_string(),
            effect: EncounterEffect::None,
        }
    }
}

/// Asynchronous narrative capability consumed by the turn engine.
#[async_trait]
pub trait NarrativeOracle: Send + Sync {
    async fn narrate(&self, context: &NarrativeContext) -> String;
    async fn encounter(&self, biome: Biome) -> Encounter;
}

/// A single chat-style completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// The caller will parse the reply as JSON.
    pub expects_json: bool,
}

/// Raw text completion backend. Implementations report failures; the wrapping
/// [`GeneratedOracle`] turns them into fallbacks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError>;
}

#[must_use]
pub fn narrative_prompt(context: &NarrativeContext) -> Prompt {
    let stats = &context.stats;
    Prompt {
        system: NARRATOR_INSTRUCTION.to_string(),
        user: format!(
            "Location: {}\nTerrain: {}\nCurrent weather: {}\nHiker status: Health {}%, Warmth {}%, Energy {}%",
            context.location,
            context.biome.label(),
            context.weather.label(),
            stats.health,
            stats.warmth,
            stats.energy
        ),
        expects_json: false,
    }
}

#[must_use]
pub fn encounter_prompt(biome: Biome) -> Prompt {
    Prompt {
        system: ENCOUNTER_INSTRUCTION.to_string(),
        user: format!(
            "The hiker is crossing the {}. Generate a random encounter or observation.",
            biome.label()
        ),
        expects_json: true,
    }
}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// Remove a surrounding markdown code fence, if any, and trim whitespace.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    fence_pattern()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |inner| inner.as_str().trim())
}

/// Parse and validate an encounter reply.
///
/// # Errors
///
/// Returns an error if the body is empty, is not a JSON object, lacks a
/// non-empty `text`, or carries an unknown `effect`.
pub fn parse_encounter(raw: &str) -> Result<Encounter, OracleError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(OracleError::EmptyBody);
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    let text = value
        .get("text")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(OracleError::MissingField("text"))?;
    let token = value
        .get("effect")
        .and_then(serde_json::Value::as_str)
        .ok_or(OracleError::MissingField("effect"))?;
    let effect = EncounterEffect::from_token(token)
        .ok_or_else(|| OracleError::UnknownEffect(token.to_string()))?;
    Ok(Encounter {
        text: text.to_string(),
        effect,
    })
}

/// Narrative text from a completion reply; an empty reply becomes [`EMPTY_NARRATIVE`].
#[must_use]
pub fn parse_narrative(raw: &str) -> String {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        EMPTY_NARRATIVE.to_string()
    } else {
        text.to_string()
    }
}

/// Adapts a fallible [`TextGenerator`] into an infallible [`NarrativeOracle`].
#[derive(Debug, Clone)]
pub struct GeneratedOracle<G> {
    generator: G,
}

impl<G: TextGenerator> GeneratedOracle<G> {
    #[must_use]
    pub const fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> NarrativeOracle for GeneratedOracle<G> {
    async fn narrate(&self, context: &NarrativeContext) -> String {
        match self.generator.complete(&narrative_prompt(context)).await {
            Ok(raw) => parse_narrative(&raw),
            Err(err) => {
                log::warn!("narrative generation failed, using fallback: {err}");
                FALLBACK_NARRATIVE.to_string()
            }
        }
    }

    async fn encounter(&self, biome: Biome) -> Encounter {
        let parsed = match self.generator.complete(&encounter_prompt(biome)).await {
            Ok(raw) => parse_encounter(&raw),
            Err(err) => Err(err),
        };
        parsed.unwrap_or_else(|err| {
            log::warn!("encounter generation failed, using fallback: {err}");
            Encounter::fallback()
        })
    }
}

/// Deterministic stand-in used offline and by the autopilot.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

impl OfflineOracle {
    const fn biome_line(biome: Biome) -> &'static str {
        match biome {
            Biome::Forest => "Fir needles muffle your steps beneath the dripping canopy.",
            Biome::Meadow => "Wind combs the alpine grass flat around you.",
            Biome::StoneSea => "Grey boulders stretch away like a frozen sea.",
            Biome::SnowRidge => "Snow crust creaks under every careful step.",
            Biome::Peak => "The ridge falls away on both sides into cloud.",
        }
    }

    const fn weather_line(weather: Weather) -> &'static str {
        match weather {
            Weather::Sunny => "Thin sunlight offers little warmth.",
            Weather::Cloudy => "Low cloud drifts across the ridge.",
            Weather::Windy => "Gusts tear at your jacket.",
            Weather::Blizzard => "Snow drives sideways and the trail vanishes.",
            Weather::Fog => "Fog swallows everything beyond arm's reach.",
        }
    }

    const fn encounter_line(biome: Biome) -> &'static str {
        match biome {
            Biome::Forest => "A golden pheasant bursts from the undergrowth and is gone.",
            Biome::Meadow => "Old cairns mark the way across the grass.",
            Biome::StoneSea => "Something rattles deep between the boulders.",
            Biome::SnowRidge => "Fresh tracks cross the snow, then vanish.",
            Biome::Peak => "A prayer flag snaps in the wind above the drop.",
        }
    }
}

#[async_trait]
impl NarrativeOracle for OfflineOracle {
    async fn narrate(&self, context: &NarrativeContext) -> String {
        format!(
            "{} {}",
            Self::biome_line(context.biome),
            Self::weather_line(context.weather)
        )
    }

    async fn encounter(&self, biome: Biome) -> Encounter {
        Encounter {
            text: Self::encounter_line(biome).to_string(),
            effect: EncounterEffect::None,
        }
    }
}
