//! `rulesync apply` -- full reconciliation run.

use rulesync_core::{HttpRuleGateway, Reconciler, RunStatus};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::{CliError, exit_code};
use crate::output;

pub async fn handle(
    gateway: HttpRuleGateway,
    args: ApplyArgs,
    global: &GlobalOpts,
) -> Result<i32, CliError> {
    let rules = rulesync_config::load_rules_file(&args.rules)?;
    tracing::info!(
        rules = rules.len(),
        file = %args.rules.display(),
        dry_run = args.dry_run,
        "loaded declared rule set"
    );

    let reconciler = Reconciler::new(gateway);
    let report = if args.dry_run {
        reconciler.preview(&rules).await?
    } else {
        reconciler.run(&rules).await?
    };

    let color = output::should_color(&global.color);
    let rendered = output::render_report(&global.output, &report, color);
    output::print_output(&rendered, global.quiet);

    Ok(match report.status() {
        RunStatus::Converged => exit_code::SUCCESS,
        RunStatus::Partial => exit_code::PARTIAL,
    })
}
