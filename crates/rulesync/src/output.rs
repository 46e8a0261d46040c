//! Report rendering: table, JSON, YAML, plain.
//!
//! Renders a `RunReport` in the format selected by `--output`. Table
//! combines the human summary with a failure table built by `tabled`;
//! structured formats serialize the report via serde; plain emits the
//! status word alone for scripting.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use rulesync_core::{RunReport, RunStatus};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ───────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Failure table row ───────────────────────────────────────────────

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "STAGE")]
    stage: String,
    #[tabled(rename = "RULE")]
    rule: String,
    #[tabled(rename = "REASON")]
    reason: String,
}

// ── Render dispatcher ───────────────────────────────────────────────

/// Render a run report in the chosen format.
pub fn render_report(format: &OutputFormat, report: &RunReport, color: bool) -> String {
    match format {
        OutputFormat::Table => render_table(report, color),
        OutputFormat::Json => render_json_pretty(report),
        OutputFormat::JsonCompact => render_json_compact(report),
        OutputFormat::Yaml => render_yaml(report),
        OutputFormat::Plain => match report.status() {
            RunStatus::Converged => "converged".into(),
            RunStatus::Partial => "partial".into(),
        },
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ───────────────────────────────────────

fn render_table(report: &RunReport, color: bool) -> String {
    let mut out = report.summary();

    if color {
        out = match report.status() {
            RunStatus::Converged => out.replace("Converged", &"Converged".green().to_string()),
            RunStatus::Partial => out.replace("Partial", &"Partial".yellow().to_string()),
        };
    }

    if !report.failures.is_empty() {
        let rows: Vec<FailureRow> = report
            .failures
            .iter()
            .map(|f| FailureRow {
                stage: f.stage.label().to_string(),
                rule: f.name.clone(),
                reason: f.reason.clone(),
            })
            .collect();
        out.push('\n');
        out.push('\n');
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }

    out
}

fn render_json_pretty(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}

fn render_json_compact(report: &RunReport) -> String {
    serde_json::to_string(report).unwrap_or_default()
}

fn render_yaml(report: &RunReport) -> String {
    serde_yaml::to_string(report).unwrap_or_default()
}

// ── Tests ───────────────────────────────────────────────────────────
