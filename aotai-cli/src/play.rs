//! Line-oriented interactive play over stdin.
use anyhow::{Context, Result};
use aotai_game::{Direction, JourneySession, TurnOutcome};
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Buy(String),
    Done,
    Move(Direction),
    Rest,
    Use(String),
    Restart,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let head = words.next()?.to_ascii_lowercase();
        let arg = words.next().map(str::to_string);
        if let Some(direction) = Direction::from_key(&head) {
            return Some(Self::Move(direction));
        }
        match (head.as_str(), arg) {
            ("start" | "shop", None) => Some(Self::Start),
            ("buy", Some(id)) => Some(Self::Buy(id)),
            ("done" | "leave" | "go", None) => Some(Self::Done),
            ("rest" | "r", None) => Some(Self::Rest),
            ("use" | "eat", Some(id)) => Some(Self::Use(id)),
            ("restart", None) => Some(Self::Restart),
            ("help" | "?", None) => Some(Self::Help),
            ("quit" | "exit" | "q", None) => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Apply one command; `None` for commands that do not reach the engine.
async fn dispatch(session: &mut JourneySession, command: Command) -> Option<TurnOutcome> {
    let outcome = match command {
        Command::Start => session.enter_shop(),
        Command::Buy(id) => session.buy_item(&id),
        Command::Done => session.start_journey(),
        Command::Move(direction) => session.move_by(direction).await,
        Command::Rest => session.rest(),
        Command::Use(id) => session.use_item(&id),
        Command::Restart => session.restart(),
        Command::Help | Command::Quit => return None,
    };
    Some(outcome)
}

/// Drive a session from `input` until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<R, W>(session: &mut JourneySession, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_screen(&mut output, &render::current_screen(session)).await?;

    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            write_screen(
                &mut output,
                &format!(
                    "{} {}",
                    "Unknown command.".yellow(),
                    render::help(session.state().phase)
                ),
            )
            .await?;
            continue;
        };
        match command {
            Command::Quit => break,
            Command::Help => {
                write_screen(&mut output, &render::help(session.state().phase)).await?;
                continue;
            }
            _ => {}
        }

        let mark = session.state().log.last().map(|entry| entry.seq);
        let Some(outcome) = dispatch(session, command).await else {
            continue;
        };
        if let TurnOutcome::Rejected(reason) = outcome {
            // Blocked moves leave a journal line that reads better than the bare reason.
            let text = session
                .state()
                .log
                .last()
                .filter(|entry| mark.is_none_or(|seen| entry.seq > seen))
                .map_or_else(|| render::rejection(reason), render::log_entry);
            write_screen(&mut output, &text).await?;
            continue;
        }
        write_screen(&mut output, &render::current_screen(session)).await?;
    }
    output.flush().await.context("failed to flush output")?;
    Ok(())
}

async fn write_screen<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{text}\n\n").as_bytes())
        .await
        .context("failed to write output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotai_game::{GameConfig, GamePhase, MemoryLedger, OfflineOracle};

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(Command::parse("W"), Some(Command::Move(Direction::North)));
        assert_eq!(Command::parse(" d "), Some(Command::Move(Direction::East)));
        assert_eq!(
            Command::parse("buy goretex"),
            Some(Command::Buy("goretex".to_string()))
        );
        assert_eq!(Command::parse("buy"), None);
        assert_eq!(Command::parse("use mantou"), Some(Command::Use("mantou".to_string())));
        assert_eq!(Command::parse("rest now"), None);
        assert_eq!(Command::parse("QUIT"), Some(Command::Quit));
        assert_eq!(Command::parse("dance"), None);
    }

    #[tokio::test]
    async fn scripted_input_plays_through_shop_and_turns() {
        colored::control::set_override(false);
        let config = GameConfig {
            encounter_chance: 0.0,
            weather_change_chance: 0.0,
            ..GameConfig::default()
        };
        let mut session = JourneySession::with_seed(
            config,
            Box::new(OfflineOracle),
            Box::new(MemoryLedger::default()),
            21,
        )
        .unwrap();
        let input: &[u8] = b"start\nbuy poles\nbuy poles\nbuy mantou\ndone\nw\nuse mantou\nrest\nfly\nquit\nrest\n";
        let mut output = Vec::new();
        run(&mut session, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Outfitter"));
        assert!(text.contains("gear already owned"));
        assert!(text.contains("Unknown command."));
        assert_eq!(session.state().phase, GamePhase::Playing);
        assert_eq!(session.state().turn, 2);
        assert_eq!(session.state().inventory.count("poles"), 1);
        assert!(!session.state().inventory.owns("mantou"));
    }
}
