mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rulesync_core::HttpRuleGateway;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        // Config commands don't need a controller connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "rulesync", &mut std::io::stdout());
            Ok(error::exit_code::SUCCESS)
        }

        // Everything else needs a connected gateway
        cmd => {
            let gateway_config = build_gateway_config(&cli.global)?;
            let gateway = HttpRuleGateway::connect(&gateway_config).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, gateway, &cli.global).await
        }
    }
}

/// Build a `GatewayConfig` from the config file, profile, and CLI overrides.
fn build_gateway_config(global: &cli::GlobalOpts) -> Result<rulesync_core::GatewayConfig, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    // If a profile exists, use it with CLI flag overrides
    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return config::resolve_profile(profile, &profile_name, global);
    }

    // No profile found -- try to build from CLI flags / env vars alone
    config::resolve_from_flags(global, &profile_name)
}
