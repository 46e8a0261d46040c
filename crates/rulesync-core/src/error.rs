// ── Core error types ──
//
// User-facing errors from rulesync-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<rulesync_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by controller: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when no safe mutation can be attempted at all --
    /// the whole run must abort rather than continue per-rule.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::ConnectionFailed { .. } | Self::Config { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rulesync_api::Error> for CoreError {
    fn from(err: rulesync_api::Error) -> Self {
        match err {
            rulesync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            rulesync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            rulesync_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            rulesync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                    }
                }
            }
            rulesync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            rulesync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            rulesync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            rulesync_api::Error::RetriesExhausted {
                attempts,
                last_error,
            } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("gave up after {attempts} attempts: {last_error}"),
            },
            rulesync_api::Error::Api { message } => CoreError::Rejected { message },
            rulesync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
