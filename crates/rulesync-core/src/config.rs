// ── Runtime connection configuration ──
//
// These types describe *how* to reach the controller. They carry
// credential data and connection tuning, but never touch disk. The CLI
// constructs a `GatewayConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the controller.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// API key sent as the `X-API-KEY` header.
    ApiKey(SecretString),
    /// Cookie-based session auth.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single controller.
///
/// Built by the CLI, passed to [`crate::HttpRuleGateway`] -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// Site to operate on (defaults to "default").
    pub site: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: std::time::Duration,
}
