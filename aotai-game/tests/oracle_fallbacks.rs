use std::time::Duration;

use aotai_game::oracle::{FALLBACK_ENCOUNTER_TEXT, FALLBACK_NARRATIVE};
use aotai_game::{
    Biome, Direction, Encounter, GameConfig, GamePhase, GeneratedOracle, JourneySession,
    MemoryLedger, NarrativeContext, NarrativeOracle, OracleError, Prompt, TextGenerator,
    TurnOutcome,
};
use async_trait::async_trait;

/// Generator that fails every request the way a dead network would.
struct Unreachable;

#[async_trait]
impl TextGenerator for Unreachable {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, OracleError> {
        Err(OracleError::Transport("connection refused".to_string()))
    }
}

/// Generator that answers with fenced but otherwise invalid JSON.
struct Garbled;

#[async_trait]
impl TextGenerator for Garbled {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        if prompt.expects_json {
            Ok("```json\n{\"text\": \"Wolves!\", \"effect\": \"EATEN\"}\n```".to_string())
        } else {
            Ok(String::new())
        }
    }
}

/// Oracle whose calls never resolve.
struct Stalled;

#[async_trait]
impl NarrativeOracle for Stalled {
    async fn narrate(&self, _context: &NarrativeContext) -> String {
        std::future::pending().await
    }

    async fn encounter(&self, _biome: Biome) -> Encounter {
        std::future::pending().await
    }
}

fn eventful_config() -> GameConfig {
    GameConfig {
        encounter_chance: 1.0,
        weather_change_chance: 0.0,
        ..GameConfig::default()
    }
}

fn playing(oracle: Box<dyn NarrativeOracle>) -> JourneySession {
    let mut session =
        JourneySession::with_seed(eventful_config(), oracle, Box::new(MemoryLedger::default()), 4)
            .unwrap();
    session.enter_shop();
    session.start_journey();
    session
}

#[tokio::test]
async fn network_failure_still_completes_turns_with_fallbacks() {
    let mut session = playing(Box::new(GeneratedOracle::new(Unreachable)));

    let first = session.move_by(Direction::North).await;
    assert!(matches!(first, TurnOutcome::Advanced { turn: 1, .. }));
    assert!(session.state().log.contains_text(FALLBACK_ENCOUNTER_TEXT));
    assert!(!session.state().busy);

    // The centre column at row 2 is the trailhead landmark and is always open.
    let second = session.move_by(Direction::North).await;
    assert!(matches!(second, TurnOutcome::Advanced { turn: 2, .. }));
    assert!(session.state().log.contains_text("Arrived: Tangkou Trailhead"));
    assert!(session.state().log.contains_text(FALLBACK_NARRATIVE));
    assert!(!session.state().busy);
    assert_eq!(session.state().phase, GamePhase::Playing);
}

#[tokio::test]
async fn invalid_replies_degrade_like_failures() {
    let mut session = playing(Box::new(GeneratedOracle::new(Garbled)));
    session.move_by(Direction::North).await;
    session.move_by(Direction::North).await;
    let log = &session.state().log;
    assert!(log.contains_text(FALLBACK_ENCOUNTER_TEXT));
    assert!(!log.contains_text("Wolves!"));
    assert!(log.contains_text("The wind howls through the valley..."));
    assert_eq!(session.state().turn, 2);
}

#[tokio::test]
async fn abandoned_oracle_call_releases_the_busy_flag() {
    let mut session = playing(Box::new(Stalled));
    let before = session.state().clone();

    let attempt =
        tokio::time::timeout(Duration::from_millis(20), session.move_by(Direction::North)).await;
    assert!(attempt.is_err());

    let state = session.state();
    assert!(!state.busy);
    assert_eq!(state.turn, before.turn);
    assert_eq!(state.position, before.position);
    assert_eq!(state.stats, before.stats);
    assert_eq!(session.rest(), TurnOutcome::Advanced {
        turn: 1,
        position: before.position
    });
}
