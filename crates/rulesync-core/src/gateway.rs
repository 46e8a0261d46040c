// ── Remote gateway boundary ──
//
// The reconciler talks to the controller through `RuleGateway`, a narrow
// three-operation contract. The production implementation wraps
// `rulesync_api::GatewayClient`; tests substitute a mock.

use secrecy::ExposeSecret;
use tracing::debug;

use rulesync_api::{ControllerPlatform, GatewayClient, TlsMode, TransportConfig};

use crate::config::{AuthCredentials, GatewayConfig, TlsVerification};
use crate::convert::rule_to_payload;
use crate::error::CoreError;
use crate::model::ManagedRule;

/// A rule as it exists on the controller: an opaque id plus its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRule {
    pub id: String,
    pub name: String,
}

/// The three operations the reconciler needs from the remote side.
///
/// Implementations own authentication, transport security, and retry of
/// transient transport errors; the reconciler never retries.
#[allow(async_fn_in_trait)]
pub trait RuleGateway {
    /// List remote rules whose name carries `prefix`.
    async fn list_managed(&self, prefix: &str) -> Result<Vec<RemoteRule>, CoreError>;

    /// Delete a rule by its remote id.
    async fn delete_rule(&self, id: &str) -> Result<(), CoreError>;

    /// Create a rule, returning the controller's stored copy.
    async fn create_rule(&self, rule: &ManagedRule) -> Result<RemoteRule, CoreError>;
}

// ── HTTP implementation ──────────────────────────────────────────────

/// `RuleGateway` backed by the controller's legacy HTTP API.
pub struct HttpRuleGateway {
    client: GatewayClient,
}

impl HttpRuleGateway {
    /// Connect and authenticate against the controller described by
    /// `config`. With username/password auth this performs the login
    /// round-trip immediately, so auth failures surface before any
    /// reconciliation phase starts.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, CoreError> {
        let tls = match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };

        // Standalone controllers conventionally listen on :8443; UniFi OS
        // consoles serve everything on :443 behind /proxy/network.
        let platform = if config.url.port() == Some(8443) {
            ControllerPlatform::Standalone
        } else {
            ControllerPlatform::UniFiOs
        };
        debug!(?platform, url = %config.url, "connecting to controller");

        let transport = TransportConfig {
            tls,
            timeout: config.timeout,
            cookie_jar: None,
        };

        let client = match &config.auth {
            AuthCredentials::ApiKey(key) => {
                let http = transport
                    .build_client_with_api_key(key.expose_secret())
                    .map_err(CoreError::from)?;
                GatewayClient::with_client(http, config.url.clone(), config.site.clone(), platform)
            }
            AuthCredentials::Credentials { username, password } => {
                let client = GatewayClient::new(
                    config.url.clone(),
                    config.site.clone(),
                    platform,
                    &transport,
                )?;
                client.login(username, password).await?;
                client
            }
        };

        Ok(Self { client })
    }
}

impl RuleGateway for HttpRuleGateway {
    async fn list_managed(&self, prefix: &str) -> Result<Vec<RemoteRule>, CoreError> {
        let rules = self.client.list_firewall_rules().await?;
        Ok(rules
            .into_iter()
            .filter(|r| r.name.starts_with(prefix))
            .map(|r| RemoteRule {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn delete_rule(&self, id: &str) -> Result<(), CoreError> {
        self.client.delete_firewall_rule(id).await?;
        Ok(())
    }

    async fn create_rule(&self, rule: &ManagedRule) -> Result<RemoteRule, CoreError> {
        let payload = rule_to_payload(rule);
        let created = self.client.create_firewall_rule(&payload).await?;
        Ok(RemoteRule {
            id: created.id,
            name: created.name,
        })
    }
}
