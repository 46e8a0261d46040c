// ── Managed rule domain model ──
//
// Typed representation of a declared firewall rule plus its validation.
// Instances are built fresh from configuration on every run; the
// controller is the only persistent store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved name prefix marking a rule as engine-managed.
///
/// Only remote rules carrying this prefix are ever purged, and every
/// declared rule must carry it. The prefix is the sole identity link
/// between runs; remote ids are not stable.
pub const MANAGED_PREFIX: &str = "MANAGED-";

/// Direction/chain classifier for a rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
pub enum Ruleset {
    #[strum(serialize = "WAN_IN")]
    WanIn,
    #[strum(serialize = "WAN_OUT")]
    WanOut,
    #[strum(serialize = "LAN_IN")]
    LanIn,
    #[strum(serialize = "LAN_OUT")]
    LanOut,
}

/// What to do with matching traffic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleAction {
    Accept,
    Drop,
    Reject,
}

/// Transport protocol selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    #[default]
    All,
    Tcp,
    Udp,
    Icmp,
}

/// Source or destination selector.
///
/// Each part is optional; an empty selector matches everything. Segment
/// references arrive here already resolved to a controller network id --
/// name lookup is the config loader's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    /// Address or CIDR (e.g. `10.0.4.0/24`).
    pub address: Option<String>,
    /// Port spec: single (`80`), list (`80,443`), or range (`1000-2000`).
    pub port: Option<String>,
    /// Controller network id of a named segment.
    pub segment_id: Option<String>,
}

/// Coarse stateful-match filter. The four flags are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStates {
    pub established: bool,
    pub related: bool,
    pub new: bool,
    pub invalid: bool,
}

/// A declared firewall rule -- the unit of configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedRule {
    /// Rule name; must carry [`MANAGED_PREFIX`].
    pub name: String,
    pub ruleset: Ruleset,
    /// Evaluation order; lower evaluates first. Ties keep declared order.
    pub priority: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub action: RuleAction,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub source: Selector,
    #[serde(default)]
    pub destination: Selector,
    #[serde(default)]
    pub connection_states: ConnectionStates,
    #[serde(default)]
    pub logging: bool,
    /// Only meaningful when `protocol` is icmp; ignored (with a warning)
    /// otherwise.
    #[serde(default)]
    pub icmp_type: Option<String>,
}

fn default_true() -> bool {
    true
}

// ── Validation ───────────────────────────────────────────────────────

/// A rule that failed validation, with the offending field and reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl ManagedRule {
    /// Check the rule's invariants against the standard prefix.
    /// Side-effect free; must pass before the rule is ever sent to the
    /// controller.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with_prefix(MANAGED_PREFIX)
    }

    /// Check the rule's invariants against a caller-supplied managed
    /// prefix.
    pub fn validate_with_prefix(&self, prefix: &str) -> Result<(), ValidationError> {
        if !self.name.starts_with(prefix) {
            return Err(ValidationError::new(
                "name",
                format!("'{}' is missing the {prefix} prefix", self.name),
            ));
        }
        if self.name.len() == prefix.len() {
            return Err(ValidationError::new("name", "empty after prefix"));
        }
        if self.priority == 0 {
            return Err(ValidationError::new("priority", "must be a positive integer"));
        }
        if let Some(ref port) = self.source.port {
            validate_port_spec(port).map_err(|reason| ValidationError::new("source.port", reason))?;
        }
        if let Some(ref port) = self.destination.port {
            validate_port_spec(port)
                .map_err(|reason| ValidationError::new("destination.port", reason))?;
        }
        // icmp_type without protocol=icmp is tolerated: the converter
        // drops it with a warning rather than failing the rule.
        Ok(())
    }
}

/// Validate a port spec: a single port, a comma list, or an inclusive
/// range written `low-high`. Ports are 1-65535.
fn validate_port_spec(spec: &str) -> Result<(), String> {
    if spec.is_empty() {
        return Err("empty port spec".into());
    }

    for part in spec.split(',') {
        let part = part.trim();
        if let Some((low, high)) = part.split_once('-') {
            let low = parse_port(low)?;
            let high = parse_port(high)?;
            if low > high {
                return Err(format!("range {part} is inverted"));
            }
        } else {
            parse_port(part)?;
        }
    }
    Ok(())
}

fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a port number"))?;
    if port == 0 {
        return Err("port 0 is not valid".into());
    }
    Ok(port)
}

// ── Tests ────────────────────────────────────────────────────────────
