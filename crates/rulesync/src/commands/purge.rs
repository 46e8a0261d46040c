//! `rulesync purge` -- remove every managed rule.
//!
//! Implemented as a reconciliation against the empty set: everything
//! carrying the managed prefix is deleted, nothing is created.

use rulesync_core::{HttpRuleGateway, Reconciler, RunStatus};

use crate::cli::{GlobalOpts, PurgeArgs};
use crate::error::{CliError, exit_code};
use crate::output;

use super::util;

pub async fn handle(
    gateway: HttpRuleGateway,
    args: PurgeArgs,
    global: &GlobalOpts,
) -> Result<i32, CliError> {
    let reconciler = Reconciler::new(gateway);

    let report = if args.dry_run {
        reconciler.preview(&[]).await?
    } else {
        if !util::confirm("Delete ALL managed rules from the controller?", global.yes)? {
            output::print_output("Aborted.", global.quiet);
            return Ok(exit_code::SUCCESS);
        }
        reconciler.run(&[]).await?
    };

    let color = output::should_color(&global.color);
    let rendered = output::render_report(&global.output, &report, color);
    output::print_output(&rendered, global.quiet);

    Ok(match report.status() {
        RunStatus::Converged => exit_code::SUCCESS,
        RunStatus::Partial => exit_code::PARTIAL,
    })
}
