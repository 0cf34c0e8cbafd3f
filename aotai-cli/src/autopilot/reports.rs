use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Stdout, Write, stdout};
use std::path::Path;
use std::time::Duration;

use super::{AutopilotReport, RunOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary plus one line per run
    Console,
    /// Pretty-printed JSON document
    Json,
}

/// Destination of an autopilot report: stdout, or a file named by `--output`.
pub enum ReportSink {
    Stdout(BufWriter<Stdout>),
    File(BufWriter<File>),
}

impl ReportSink {
    /// # Errors
    ///
    /// Returns an error if the output file cannot be created.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Stdout(BufWriter::new(stdout())));
        };
        let file = File::create(path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        log::info!("writing autopilot report to {}", path.display());
        Ok(Self::File(BufWriter::new(file)))
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    /// Render `report` in `format` and flush it to the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if serialising or writing the report fails.
    pub fn write_report(
        &mut self,
        format: ReportFormat,
        report: &AutopilotReport,
        elapsed: Duration,
    ) -> Result<()> {
        let out = self.writer();
        match format {
            ReportFormat::Json => generate_json_report(out, report)?,
            ReportFormat::Console => generate_console_report(out, report, elapsed)?,
        }
        out.flush().context("failed to flush autopilot report")
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &AutopilotReport,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Autopilot Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;
    writeln!(out, "Strategy: {}", report.strategy.bold())?;
    writeln!(out, "Runs: {}", report.runs)?;
    writeln!(out, "Crossed: {}", report.victories.to_string().green())?;
    writeln!(out, "Lost: {}", report.deaths.to_string().red())?;
    writeln!(out, "Unfinished: {}", report.unfinished.to_string().yellow())?;
    if report.runs > 0 {
        #[allow(clippy::cast_precision_loss)]
        let success_rate = (report.victories as f64 / report.runs as f64) * 100.0;
        writeln!(out, "Success rate: {success_rate:.1}%")?;
    }
    writeln!(out, "Average turns: {:.1}", report.average_turns)?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    if !report.reasons.is_empty() {
        writeln!(out, "{}", "Endings".bright_yellow().bold())?;
        for (reason, count) in &report.reasons {
            writeln!(out, "  {count:>4}  {reason}")?;
        }
        writeln!(out)?;
    }

    for record in &report.records {
        let status = match record.outcome {
            RunOutcome::Victory => "✅ CROSSED".green(),
            RunOutcome::Death => "❌ LOST".red(),
            RunOutcome::Unfinished => "⏸  UNFINISHED".yellow(),
        };
        writeln!(
            out,
            "{status} run {} (seed {}): {} turns, row {}, score {}{}",
            record.index + 1,
            record.seed,
            record.turns,
            record.row,
            record.score,
            record
                .grade
                .map(|grade| format!(", grade {grade}"))
                .unwrap_or_default()
        )?;
        if let Some(reason) = &record.reason {
            writeln!(out, "   {}", reason.dimmed())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &AutopilotReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
