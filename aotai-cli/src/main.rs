mod autopilot;
mod oracle;
mod play;
mod render;
mod storage;

use anyhow::{Context, Result};
use aotai_game::{GameConfig, JourneySession};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use autopilot::{AutopilotPlan, AutopilotStrategy, ReportFormat, ReportSink};
use oracle::OracleSettings;
use storage::FileDeathLedger;

#[derive(Debug, Parser)]
#[command(name = "aotai", version = "0.1.0")]
#[command(about = "Turn-based survival crossing of the Ao Tai Line ridge")]
struct Args {
    /// Path to a JSON run configuration (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for terrain and rolls; autopilot run i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Use the built-in narrator instead of a network model
    #[arg(long)]
    offline: bool,

    /// Chat-completion API base URL
    #[arg(long, default_value = "https://api.openai.com/v1")]
    endpoint: String,

    /// Model name sent with every narrative request
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// API key for the narrative endpoint
    #[arg(long, env = "AOTAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Seconds before a narrative request is abandoned
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Directory holding the death ledger
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Play unattended with the given strategy instead of reading stdin
    #[arg(long, value_enum)]
    autopilot: Option<AutopilotStrategy>,

    /// Number of autopilot runs
    #[arg(long, default_value_t = 10)]
    runs: usize,

    /// Turn cap per autopilot run
    #[arg(long, default_value_t = 300)]
    max_turns: u32,

    /// Output report format for autopilot runs
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the autopilot report instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    if let Some(strategy) = args.autopilot {
        return run_autopilot(&args, strategy, config).await;
    }
    run_interactive(&args, config).await
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn oracle_settings(args: &Args) -> Option<OracleSettings> {
    if args.offline {
        return None;
    }
    let Some(api_key) = args.api_key.clone() else {
        log::warn!("no API key configured; using the offline narrator");
        return None;
    };
    Some(OracleSettings {
        endpoint: args.endpoint.clone(),
        model: args.model.clone(),
        api_key: Some(api_key),
        timeout: Duration::from_secs(args.timeout_secs),
    })
}

async fn run_interactive(args: &Args, config: GameConfig) -> Result<()> {
    let oracle = oracle::build_oracle(oracle_settings(args).as_ref())?;
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(storage::default_data_dir);
    let ledger = FileDeathLedger::in_dir(&data_dir);
    log::info!("death ledger: {}", ledger.path().display());

    let mut session = match args.seed {
        Some(seed) => JourneySession::with_seed(config, oracle, Box::new(ledger), seed),
        None => JourneySession::new(config, oracle, Box::new(ledger)),
    }
    .context("failed to start session")?;

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    play::run(&mut session, input, tokio::io::stdout()).await
}

async fn run_autopilot(args: &Args, strategy: AutopilotStrategy, config: GameConfig) -> Result<()> {
    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner(strategy);
    }
    let plan = AutopilotPlan {
        strategy,
        runs: args.runs,
        max_turns: args.max_turns,
        seed: args.seed,
        config,
    };
    let start_time = Instant::now();
    let report = autopilot::run_autopilot(&plan).await?;

    ReportSink::open(args.output.as_deref())?.write_report(
        args.report,
        &report,
        start_time.elapsed(),
    )
}

fn announce_banner(strategy: AutopilotStrategy) {
    println!("{}", "🥾 Ao Tai Line Autopilot".bright_cyan().bold());
    println!("{}", "================================".cyan());
    println!("Strategy: {strategy}");
}
