// ── Run report ──
//
// Aggregated outcome of a reconciliation run. Serde-serializable for
// machine consumption; `summary()` renders the operator-facing text.
// Pure data, no mutation side effects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which mode the run executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Mutating run: purge then create.
    Apply,
    /// Read-only run: report what would change.
    Preview,
}

/// Overall run outcome.
///
/// Total failure (discovery/auth) never produces a report at all -- it
/// surfaces as an error from the reconciler instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every purge and create succeeded; the remote managed set is the
    /// exact image of the configuration.
    Converged,
    /// Some operations failed; safe to re-run to converge further.
    Partial,
}

/// The phase in which a rule failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Validation,
    Purge,
    Create,
}

impl FailureStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Purge => "purge",
            Self::Create => "create",
        }
    }
}

/// One failed rule with its reason. Nothing fails silently: every entry
/// here is also logged during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// Rule name (declared name for validation/create, remote name for purge).
    pub name: String,
    pub stage: FailureStage,
    pub reason: String,
}

/// Aggregated outcome of one reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub mode: RunMode,
    /// Managed rules found on the controller during Discover.
    pub discovered: usize,
    /// Rules successfully deleted (or slated for deletion in preview).
    pub purged: usize,
    /// Rules successfully created (or slated for creation in preview).
    pub created: usize,
    pub failures: Vec<RuleFailure>,
}

impl RunReport {
    pub(crate) fn new(mode: RunMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            mode,
            discovered: 0,
            purged: 0,
            created: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        name: impl Into<String>,
        stage: FailureStage,
        reason: impl ToString,
    ) {
        self.failures.push(RuleFailure {
            name: name.into(),
            stage,
            reason: reason.to_string(),
        });
    }

    /// Overall status: converged only when nothing failed.
    pub fn status(&self) -> RunStatus {
        if self.failures.is_empty() {
            RunStatus::Converged
        } else {
            RunStatus::Partial
        }
    }

    /// Failures from a single stage.
    pub fn failures_in(&self, stage: FailureStage) -> impl Iterator<Item = &RuleFailure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            RunMode::Apply => ("purged", "created"),
            RunMode::Preview => ("would purge", "would create"),
        };

        let mut lines = vec![
            format!("Run:        {} ({:?})", self.run_id, self.mode),
            format!("Discovered: {} managed rule(s)", self.discovered),
            format!("{}:     {}", capitalize(verb.0), self.purged),
            format!("{}:    {}", capitalize(verb.1), self.created),
            format!("Status:     {:?}", self.status()),
        ];

        if !self.failures.is_empty() {
            lines.push(format!("Failures:   {}", self.failures.len()));
            for f in &self.failures {
                lines.push(format!("  - [{}] {}: {}", f.stage.label(), f.name, f.reason));
            }
        }

        lines.join("\n")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
