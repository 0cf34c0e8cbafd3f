//! Unattended crossings driven by a [`PlayerPolicy`].
pub mod policy;
pub mod reports;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use aotai_game::{
    GameConfig, GamePhase, Grade, JourneySession, MemoryLedger, OfflineOracle, RunSummary,
    TerrainOracle, TurnOutcome,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use policy::{AutopilotStrategy, PlayerPolicy};
pub use reports::{ReportFormat, ReportSink};

/// How many automated runs to play and under which rules.
#[derive(Debug, Clone)]
pub struct AutopilotPlan {
    pub strategy: AutopilotStrategy,
    pub runs: usize,
    pub max_turns: u32,
    /// Base seed; run `i` uses `seed + i`. Entropy when absent.
    pub seed: Option<u64>,
    pub config: GameConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Death,
    /// Turn or step cap reached while still on the ridge.
    Unfinished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub index: usize,
    pub seed: u64,
    pub outcome: RunOutcome,
    pub reason: Option<String>,
    pub turns: u32,
    pub row: i32,
    pub money_spent: i64,
    pub rejections: u32,
    pub score: i64,
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotReport {
    pub strategy: String,
    pub runs: usize,
    pub victories: usize,
    pub deaths: usize,
    pub unfinished: usize,
    pub average_turns: f64,
    /// End reason text to number of runs that ended with it.
    pub reasons: BTreeMap<String, usize>,
    pub records: Vec<RunRecord>,
    pub generated_at: DateTime<Utc>,
}

impl AutopilotReport {
    fn from_records(strategy: AutopilotStrategy, records: Vec<RunRecord>) -> Self {
        let count = |outcome| records.iter().filter(|r| r.outcome == outcome).count();
        let mut reasons = BTreeMap::new();
        for reason in records.iter().filter_map(|r| r.reason.clone()) {
            *reasons.entry(reason).or_insert(0) += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let average_turns = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| f64::from(r.turns)).sum::<f64>() / records.len() as f64
        };
        Self {
            strategy: strategy.label().to_string(),
            runs: records.len(),
            victories: count(RunOutcome::Victory),
            deaths: count(RunOutcome::Death),
            unfinished: count(RunOutcome::Unfinished),
            average_turns,
            reasons,
            records,
            generated_at: Utc::now(),
        }
    }
}

/// Play every run in `plan` back to back.
///
/// # Errors
///
/// Returns an error if the plan's configuration is rejected by the engine.
pub async fn run_autopilot(plan: &AutopilotPlan) -> Result<AutopilotReport> {
    let mut records = Vec::with_capacity(plan.runs);
    for index in 0..plan.runs {
        let seed = match plan.seed {
            Some(base) => base.wrapping_add(u64::try_from(index).unwrap_or(u64::MAX)),
            None => rand::thread_rng().gen_range(0..u64::MAX),
        };
        let record = run_once(plan, index, seed).await?;
        log::info!(
            "autopilot run {} (seed {seed}): {:?} after {} turns",
            index + 1,
            record.outcome,
            record.turns
        );
        records.push(record);
    }
    Ok(AutopilotReport::from_records(plan.strategy, records))
}

async fn run_once(plan: &AutopilotPlan, index: usize, seed: u64) -> Result<RunRecord> {
    let mut session = JourneySession::with_seed(
        plan.config.clone(),
        Box::new(OfflineOracle),
        Box::new(MemoryLedger::default()),
        seed,
    )
    .context("autopilot configuration rejected")?;
    let mut policy = plan.strategy.create_policy();
    let mut rejections = 0;

    session.enter_shop();
    let budget = session.state().money;
    for (item_id, quantity) in policy.shopping_list() {
        for _ in 0..*quantity {
            if let TurnOutcome::Rejected(reason) = session.buy_item(item_id) {
                log::debug!("{}: skipped {item_id}: {reason}", policy.name());
                break;
            }
        }
    }
    let money_spent = budget - session.state().money;
    session.start_journey();

    let step_cap = plan.max_turns.saturating_mul(4);
    let mut steps = 0;
    while session.state().phase == GamePhase::Playing
        && session.state().turn < plan.max_turns
        && steps < step_cap
    {
        steps += 1;
        let outcome = match policy.next_action(&session) {
            policy::Action::Move(direction) => session.move_by(direction).await,
            policy::Action::Rest => session.rest(),
            policy::Action::Use(item_id) => session.use_item(&item_id),
        };
        if let Some(reason) = outcome.end_reason() {
            log::debug!("{}: run {} ended: {}", policy.name(), index + 1, reason.key());
        } else if outcome.is_rejected() {
            rejections += 1;
            session.rest();
        }
    }

    let state = session.state();
    let outcome = match state.phase {
        GamePhase::Victory => RunOutcome::Victory,
        GamePhase::GameOver => RunOutcome::Death,
        _ => RunOutcome::Unfinished,
    };
    let summary = RunSummary::from_state(
        state,
        session.terrain() as &dyn TerrainOracle,
        session.death_count(),
    );
    Ok(RunRecord {
        index,
        seed,
        outcome,
        reason: state.reason_text().map(str::to_string),
        turns: state.turn,
        row: state.position.y,
        money_spent,
        rejections,
        score: summary.score,
        grade: summary.grade,
    })
}
