// Legacy API wire types
//
// Models for the controller's legacy JSON API. All responses are wrapped in
// the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware
// versions.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Firewall rule ────────────────────────────────────────────────────

/// Firewall rule object from `rest/firewallrule`.
///
/// The controller returns many more fields than we need; the ones the
/// reconciler cares about are modeled explicitly and everything else
/// lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallRuleResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ruleset: String,
    #[serde(default)]
    pub rule_index: serde_json::Value,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub site_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Firewall rule creation payload for `POST rest/firewallrule`.
///
/// Field names match the legacy schema exactly; `rulesync-core` builds
/// this from its domain model, so this type stays a dumb wire struct.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallRuleData {
    pub name: String,
    pub ruleset: String,
    pub rule_index: u32,
    pub action: String,
    pub enabled: bool,
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_networkconf_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dst_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dst_port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dst_networkconf_id: String,
    pub state_established: bool,
    pub state_related: bool,
    pub state_new: bool,
    pub state_invalid: bool,
    pub logging: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icmp_typename: String,
}
