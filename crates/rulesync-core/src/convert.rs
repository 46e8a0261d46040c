// ── Domain model → wire payload conversion ──

use tracing::warn;

use rulesync_api::FirewallRuleData;

use crate::model::{ManagedRule, Protocol};

/// Build the legacy API payload for a validated rule.
///
/// `priority` maps onto the controller's `rule_index`; for equal indexes
/// the controller evaluates in creation order, which is why the
/// reconciler serializes creates. An `icmp_type` on a non-icmp rule is
/// dropped here with a warning.
pub fn rule_to_payload(rule: &ManagedRule) -> FirewallRuleData {
    let icmp_typename = match (&rule.protocol, &rule.icmp_type) {
        (Protocol::Icmp, Some(t)) => t.clone(),
        (Protocol::Icmp, None) => String::new(),
        (_, Some(t)) => {
            warn!(
                rule = %rule.name,
                icmp_type = %t,
                "icmp_type set on a non-icmp rule; ignoring"
            );
            String::new()
        }
        (_, None) => String::new(),
    };

    FirewallRuleData {
        name: rule.name.clone(),
        ruleset: rule.ruleset.to_string(),
        rule_index: rule.priority,
        action: rule.action.to_string(),
        enabled: rule.enabled,
        protocol: rule.protocol.to_string(),
        src_address: rule.source.address.clone().unwrap_or_default(),
        src_port: rule.source.port.clone().unwrap_or_default(),
        src_networkconf_id: rule.source.segment_id.clone().unwrap_or_default(),
        dst_address: rule.destination.address.clone().unwrap_or_default(),
        dst_port: rule.destination.port.clone().unwrap_or_default(),
        dst_networkconf_id: rule.destination.segment_id.clone().unwrap_or_default(),
        state_established: rule.connection_states.established,
        state_related: rule.connection_states.related,
        state_new: rule.connection_states.new,
        state_invalid: rule.connection_states.invalid,
        logging: rule.logging,
        icmp_typename,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::model::{ConnectionStates, RuleAction, Ruleset, Selector};

    use super::*;

    #[test]
    fn payload_carries_wire_names() {
        let rule = ManagedRule {
            name: "MANAGED-allow-dns".into(),
            ruleset: Ruleset::LanIn,
            priority: 2100,
            enabled: true,
            action: RuleAction::Accept,
            protocol: Protocol::Udp,
            source: Selector {
                segment_id: Some("5f3cnet01".into()),
                ..Selector::default()
            },
            destination: Selector {
                address: Some("10.0.0.53".into()),
                port: Some("53".into()),
                segment_id: None,
            },
            connection_states: ConnectionStates {
                new: true,
                established: true,
                ..ConnectionStates::default()
            },
            logging: true,
            icmp_type: None,
        };

        let payload = rule_to_payload(&rule);
        assert_eq!(payload.ruleset, "LAN_IN");
        assert_eq!(payload.action, "accept");
        assert_eq!(payload.protocol, "udp");
        assert_eq!(payload.rule_index, 2100);
        assert_eq!(payload.src_networkconf_id, "5f3cnet01");
        assert_eq!(payload.dst_port, "53");
        assert!(payload.state_new && payload.state_established);
        assert!(!payload.state_invalid);
    }

    #[test]
    fn icmp_type_dropped_for_non_icmp() {
        let rule = ManagedRule {
            name: "MANAGED-web".into(),
            ruleset: Ruleset::WanIn,
            priority: 2000,
            enabled: true,
            action: RuleAction::Drop,
            protocol: Protocol::Tcp,
            source: Selector::default(),
            destination: Selector::default(),
            connection_states: ConnectionStates::default(),
            logging: false,
            icmp_type: Some("echo-request".into()),
        };

        assert_eq!(rule_to_payload(&rule).icmp_typename, "");
    }

    #[test]
    fn icmp_type_kept_for_icmp() {
        let rule = ManagedRule {
            name: "MANAGED-ping".into(),
            ruleset: Ruleset::LanIn,
            priority: 2000,
            enabled: true,
            action: RuleAction::Accept,
            protocol: Protocol::Icmp,
            source: Selector::default(),
            destination: Selector::default(),
            connection_states: ConnectionStates::default(),
            logging: false,
            icmp_type: Some("echo-request".into()),
        };

        assert_eq!(rule_to_payload(&rule).icmp_typename, "echo-request");
    }
}
