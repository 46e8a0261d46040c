//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text, and assigns process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use rulesync_config::ConfigError;
use rulesync_core::CoreError;

/// Process exit codes.
///
/// 0 is full convergence, 10 is partial success (some rules failed but
/// the run completed), everything else is a total-failure kind.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(rulesync::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             URL: {url}\n\
             Try: rulesync plan -f rules.yaml --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(rulesync::auth_failed),
        help(
            "Verify your API key or credentials for profile '{profile}'.\n\
             Set RULESYNC_USERNAME / RULESYNC_PASSWORD, or configure the profile."
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(rulesync::no_credentials),
        help(
            "Add credentials to the profile in your config file,\n\
             or set RULESYNC_USERNAME / RULESYNC_PASSWORD / RULESYNC_API_KEY."
        )
    )]
    NoCredentials { profile: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("Controller rejected the request: {message}")]
    #[diagnostic(code(rulesync::rejected))]
    Rejected { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rulesync::validation))]
    Validation { field: String, reason: String },

    #[error("Rules file error: {message}")]
    #[diagnostic(
        code(rulesync::rules_file),
        help("Check the rules file against the documented schema.")
    )]
    RulesFile { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(rulesync::no_config),
        help(
            "Create one at: {path}\n\
             Or pass --controller plus credentials directly."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(rulesync::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rulesync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(rulesync::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    #[diagnostic(code(rulesync::internal))]
    Internal { message: String },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::RulesFile { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownSegment { .. } | ConfigError::UnknownHost { .. } => {
                CliError::RulesFile {
                    message: err.to_string(),
                }
            }
            ConfigError::Yaml(e) => CliError::RulesFile {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Internal {
                message: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
