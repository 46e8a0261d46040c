//! `rulesync plan` -- read-only preview of a reconciliation run.

use rulesync_core::{HttpRuleGateway, Reconciler, RunStatus};

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::{CliError, exit_code};
use crate::output;

pub async fn handle(
    gateway: HttpRuleGateway,
    args: PlanArgs,
    global: &GlobalOpts,
) -> Result<i32, CliError> {
    let rules = rulesync_config::load_rules_file(&args.rules)?;

    let reconciler = Reconciler::new(gateway);
    let report = reconciler.preview(&rules).await?;

    let color = output::should_color(&global.color);
    let rendered = output::render_report(&global.output, &report, color);
    output::print_output(&rendered, global.quiet);

    // A plan with validation failures still exits nonzero so CI can gate
    // on it.
    Ok(match report.status() {
        RunStatus::Converged => exit_code::SUCCESS,
        RunStatus::Partial => exit_code::PARTIAL,
    })
}
