//! Command dispatch: bridges CLI args -> reconciler runs -> output.

pub mod apply;
pub mod config_cmd;
pub mod plan;
pub mod purge;
pub mod util;

use rulesync_core::HttpRuleGateway;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
///
/// Returns the process exit code for the run.
pub async fn dispatch(
    cmd: Command,
    gateway: HttpRuleGateway,
    global: &GlobalOpts,
) -> Result<i32, CliError> {
    match cmd {
        Command::Apply(args) => apply::handle(gateway, args, global).await,
        Command::Plan(args) => plan::handle(gateway, args, global).await,
        Command::Purge(args) => purge::handle(gateway, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
