//! Rules-file loading.
//!
//! The desired rule set is a YAML document: a `segments` name→ID map, an
//! optional `hosts` name→address map, and the `rules` list. Segment and
//! host references are resolved here, so the core model only ever sees
//! concrete selectors -- unresolvable names are a load error, caught
//! before the reconciler runs.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use rulesync_core::{ConnectionStates, ManagedRule, Protocol, RuleAction, Ruleset, Selector};

use crate::ConfigError;

// ── File schema ─────────────────────────────────────────────────────

/// Parsed rules file, before reference resolution.
#[derive(Debug, Deserialize)]
pub struct RulesFile {
    /// Network segment name → controller network id.
    #[serde(default)]
    pub segments: HashMap<String, String>,

    /// Special-host name → address annotation.
    #[serde(default)]
    pub hosts: HashMap<String, String>,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One declared rule as written in YAML. Selectors may reference
/// segments and hosts by name.
#[derive(Debug, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub ruleset: Ruleset,
    pub priority: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub action: RuleAction,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub source: SelectorSpec,
    #[serde(default)]
    pub destination: SelectorSpec,
    #[serde(default)]
    pub connection_states: ConnectionStates,
    #[serde(default)]
    pub logging: bool,
    #[serde(default)]
    pub icmp_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SelectorSpec {
    pub address: Option<String>,
    pub port: Option<String>,
    /// Named segment, resolved against the `segments` map.
    pub segment: Option<String>,
    /// Named host, resolved against the `hosts` map into an address.
    pub host: Option<String>,
}

fn default_true() -> bool {
    true
}

// ── Loading & resolution ────────────────────────────────────────────

/// Read and parse a rules file, resolving all segment/host references.
pub fn load_rules_file(path: &Path) -> Result<Vec<ManagedRule>, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let file: RulesFile = serde_yaml::from_str(&contents)?;
    resolve_rules(&file)
}

/// Resolve a parsed rules file into concrete `ManagedRule`s.
pub fn resolve_rules(file: &RulesFile) -> Result<Vec<ManagedRule>, ConfigError> {
    file.rules
        .iter()
        .map(|spec| {
            Ok(ManagedRule {
                name: spec.name.clone(),
                ruleset: spec.ruleset,
                priority: spec.priority,
                enabled: spec.enabled,
                action: spec.action,
                protocol: spec.protocol,
                source: resolve_selector(&spec.source, &spec.name, file)?,
                destination: resolve_selector(&spec.destination, &spec.name, file)?,
                connection_states: spec.connection_states,
                logging: spec.logging,
                icmp_type: spec.icmp_type.clone(),
            })
        })
        .collect()
}

fn resolve_selector(
    spec: &SelectorSpec,
    rule_name: &str,
    file: &RulesFile,
) -> Result<Selector, ConfigError> {
    if spec.address.is_some() && spec.host.is_some() {
        return Err(ConfigError::Validation {
            field: "selector".into(),
            reason: format!("rule '{rule_name}' sets both address and host"),
        });
    }

    let address = match &spec.host {
        Some(host) => Some(
            file.hosts
                .get(host)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownHost {
                    rule: rule_name.into(),
                    host: host.clone(),
                })?,
        ),
        None => spec.address.clone(),
    };

    let segment_id = match &spec.segment {
        Some(segment) => Some(file.segments.get(segment).cloned().ok_or_else(|| {
            ConfigError::UnknownSegment {
                rule: rule_name.into(),
                segment: segment.clone(),
            }
        })?),
        None => None,
    };

    Ok(Selector {
        address,
        port: spec.port.clone(),
        segment_id,
    })
}

// ── Tests ───────────────────────────────────────────────────────────
