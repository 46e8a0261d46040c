// ── Reconciler ──
//
// Converges the controller's managed rule set to the declared
// configuration in three strictly ordered phases:
//
//   1. Discover -- list remote rules carrying the managed prefix. This
//      set is the only thing a run is authorized to mutate. Failure here
//      is fatal: nothing can be purged or created safely without it.
//   2. Purge -- delete every discovered rule. Deletes are independent,
//      so they run concurrently; outcomes are joined before Apply.
//      A failed delete is recorded, not fatal.
//   3. Apply -- validate every declared rule, then create the valid ones
//      in ascending priority order. Creates are serialized because the
//      controller derives evaluation order for equal indexes from call
//      order. A failed create is recorded, not fatal.
//
// Purge-then-create (rather than diff-and-patch) is deliberate: the
// controller has no atomic reordering primitive, so recreating the
// managed set from scratch is the only way the final remote ordering is
// guaranteed to match the declared priorities. Runs are idempotent at
// the logical level; a half-completed run is always safe to re-run.

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::gateway::{RemoteRule, RuleGateway};
use crate::model::{ManagedRule, MANAGED_PREFIX};
use crate::report::{FailureStage, RunMode, RunReport};

/// Drives reconciliation runs against a gateway.
pub struct Reconciler<G> {
    gateway: G,
    prefix: String,
}

impl<G: RuleGateway> Reconciler<G> {
    /// Reconciler with the standard managed-name prefix.
    pub fn new(gateway: G) -> Self {
        Self::with_prefix(gateway, MANAGED_PREFIX)
    }

    /// Reconciler with a custom prefix (the prefix declared rules must
    /// also carry, or they fail validation).
    pub fn with_prefix(gateway: G, prefix: impl Into<String>) -> Self {
        Self {
            gateway,
            prefix: prefix.into(),
        }
    }

    /// Perform a full mutating run: discover, purge, apply.
    ///
    /// Returns `Err` only when discovery (or the authentication behind
    /// it) fails -- total failure. Per-rule problems are collected into
    /// the report and downgrade the run to partial success.
    pub async fn run(&self, rules: &[ManagedRule]) -> Result<RunReport, CoreError> {
        let mut report = RunReport::new(RunMode::Apply);

        // Phase 1: Discover
        let remote = self.gateway.list_managed(&self.prefix).await?;
        report.discovered = remote.len();
        info!(discovered = remote.len(), "discovered managed rules");

        // Phase 2: Purge (concurrent; all outcomes collected before Apply)
        let outcomes = join_all(remote.iter().map(|r| async move {
            (r, self.gateway.delete_rule(&r.id).await)
        }))
        .await;

        for (rule, outcome) in outcomes {
            match outcome {
                Ok(()) => report.purged += 1,
                Err(e) => {
                    warn!(rule = %rule.name, error = %e, "purge failed");
                    report.record_failure(&rule.name, FailureStage::Purge, e);
                }
            }
        }

        // Phase 3: Apply (serial, ascending priority, ties keep input order)
        for rule in self.validate(rules, &mut report) {
            match self.gateway.create_rule(rule).await {
                Ok(created) => {
                    info!(rule = %created.name, id = %created.id, "created rule");
                    report.created += 1;
                }
                Err(e) => {
                    warn!(rule = %rule.name, error = %e, "create failed");
                    report.record_failure(&rule.name, FailureStage::Create, e);
                }
            }
        }

        Ok(report)
    }

    /// Read-only preview: discover and validate, then report what a
    /// mutating run would purge and create. Issues no deletes or creates.
    pub async fn preview(&self, rules: &[ManagedRule]) -> Result<RunReport, CoreError> {
        let mut report = RunReport::new(RunMode::Preview);

        let remote = self.gateway.list_managed(&self.prefix).await?;
        report.discovered = remote.len();
        report.purged = remote.len();
        report.created = self.validate(rules, &mut report).len();

        Ok(report)
    }

    /// Validate the declared set, recording failures, and return the
    /// valid rules stable-sorted by ascending priority.
    fn validate<'a>(
        &self,
        rules: &'a [ManagedRule],
        report: &mut RunReport,
    ) -> Vec<&'a ManagedRule> {
        let mut valid = Vec::with_capacity(rules.len());

        for rule in rules {
            match rule.validate_with_prefix(&self.prefix) {
                Ok(()) => valid.push(rule),
                Err(e) => {
                    warn!(rule = %rule.name, reason = %e, "rule failed validation");
                    report.record_failure(&rule.name, FailureStage::Validation, e);
                }
            }
        }

        // Stable sort: equal priorities keep their declared order.
        valid.sort_by_key(|r| r.priority);
        valid
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use crate::model::{ConnectionStates, Protocol, RuleAction, Ruleset, Selector};
    use crate::report::RunStatus;

    use super::*;

    // ── Mock gateway ────────────────────────────────────────────────

    #[derive(Debug, Default)]
    struct MockState {
        remote: Vec<RemoteRule>,
        calls: Vec<String>,
        fail_list: bool,
        fail_delete_ids: Vec<String>,
        fail_create_names: Vec<String>,
        next_id: u32,
    }

    #[derive(Clone, Default)]
    struct MockGateway(Arc<Mutex<MockState>>);

    impl MockGateway {
        fn with_remote(names: &[&str]) -> Self {
            let gw = Self::default();
            {
                let mut state = gw.0.lock().unwrap();
                for (i, name) in names.iter().enumerate() {
                    state.remote.push(RemoteRule {
                        id: format!("id-{i}"),
                        name: (*name).to_string(),
                    });
                }
                state.next_id = names.len() as u32;
            }
            gw
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().calls.clone()
        }

        fn remote_names(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .remote
                .iter()
                .map(|r| r.name.clone())
                .collect()
        }
    }

    impl RuleGateway for MockGateway {
        async fn list_managed(&self, prefix: &str) -> Result<Vec<RemoteRule>, CoreError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push("list".into());
            if state.fail_list {
                return Err(CoreError::AuthenticationFailed {
                    message: "bad credentials".into(),
                });
            }
            Ok(state
                .remote
                .iter()
                .filter(|r| r.name.starts_with(prefix))
                .cloned()
                .collect())
        }

        async fn delete_rule(&self, id: &str) -> Result<(), CoreError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(format!("delete {id}"));
            if state.fail_delete_ids.iter().any(|f| f == id) {
                return Err(CoreError::Rejected {
                    message: "delete refused".into(),
                });
            }
            state.remote.retain(|r| r.id != id);
            Ok(())
        }

        async fn create_rule(&self, rule: &ManagedRule) -> Result<RemoteRule, CoreError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(format!("create {}", rule.name));
            if state.fail_create_names.iter().any(|f| f == &rule.name) {
                return Err(CoreError::Rejected {
                    message: "create refused".into(),
                });
            }
            state.next_id += 1;
            let created = RemoteRule {
                id: format!("id-{}", state.next_id),
                name: rule.name.clone(),
            };
            state.remote.push(created.clone());
            Ok(created)
        }
    }

    fn rule(name: &str, priority: u32) -> ManagedRule {
        ManagedRule {
            name: name.into(),
            ruleset: Ruleset::LanIn,
            priority,
            enabled: true,
            action: RuleAction::Accept,
            protocol: Protocol::All,
            source: Selector::default(),
            destination: Selector::default(),
            connection_states: ConnectionStates::default(),
            logging: false,
            icmp_type: None,
        }
    }

    // ── Phase ordering & priority ───────────────────────────────────

    #[tokio::test]
    async fn creates_follow_ascending_priority() {
        let gw = MockGateway::default();
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![rule("MANAGED-a", 100), rule("MANAGED-b", 50)];
        let report = reconciler.run(&rules).await.unwrap();

        assert_eq!(report.status(), RunStatus::Converged);
        assert_eq!(
            gw.calls(),
            vec!["list", "create MANAGED-b", "create MANAGED-a"]
        );
    }

    #[tokio::test]
    async fn priority_ties_keep_declared_order() {
        let gw = MockGateway::default();
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![
            rule("MANAGED-first", 2000),
            rule("MANAGED-second", 2000),
            rule("MANAGED-third", 2000),
        ];
        reconciler.run(&rules).await.unwrap();

        assert_eq!(
            gw.remote_names(),
            vec!["MANAGED-first", "MANAGED-second", "MANAGED-third"]
        );
    }

    #[tokio::test]
    async fn purge_completes_before_any_create() {
        let gw = MockGateway::with_remote(&["MANAGED-old-1", "MANAGED-old-2"]);
        let reconciler = Reconciler::new(gw.clone());

        reconciler.run(&[rule("MANAGED-new", 2000)]).await.unwrap();

        let calls = gw.calls();
        let last_delete = calls.iter().rposition(|c| c.starts_with("delete")).unwrap();
        let first_create = calls.iter().position(|c| c.starts_with("create")).unwrap();
        assert!(last_delete < first_create, "calls: {calls:?}");
    }

    // ── Managed universe boundary ───────────────────────────────────

    #[tokio::test]
    async fn unprefixed_remote_rules_are_never_touched() {
        let gw = MockGateway::with_remote(&["MANAGED-ours", "operator-rule"]);
        let reconciler = Reconciler::new(gw.clone());

        let report = reconciler.run(&[]).await.unwrap();

        assert_eq!(report.discovered, 1);
        assert_eq!(report.purged, 1);
        assert_eq!(gw.remote_names(), vec!["operator-rule"]);
        assert!(!gw.calls().iter().any(|c| c == "delete id-1"));
    }

    #[tokio::test]
    async fn empty_config_purges_all_managed_rules() {
        let gw = MockGateway::with_remote(&["MANAGED-a", "MANAGED-b", "MANAGED-c"]);
        let reconciler = Reconciler::new(gw.clone());

        let report = reconciler.run(&[]).await.unwrap();

        assert_eq!(report.discovered, 3);
        assert_eq!(report.purged, 3);
        assert_eq!(report.created, 0);
        assert_eq!(report.status(), RunStatus::Converged);
        assert!(gw.remote_names().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_downgrades_to_partial_but_purge_continues() {
        let gw = MockGateway::with_remote(&["MANAGED-a", "MANAGED-b", "MANAGED-c"]);
        gw.0.lock().unwrap().fail_delete_ids.push("id-1".into());
        let reconciler = Reconciler::new(gw.clone());

        let report = reconciler.run(&[]).await.unwrap();

        assert_eq!(report.purged, 2);
        assert_eq!(report.status(), RunStatus::Partial);
        let purge_failures: Vec<_> = report.failures_in(FailureStage::Purge).collect();
        assert_eq!(purge_failures.len(), 1);
        assert_eq!(purge_failures[0].name, "MANAGED-b");
        // All three deletes were still attempted.
        assert_eq!(
            gw.calls().iter().filter(|c| c.starts_with("delete")).count(),
            3
        );
    }

    // ── Validation gating ───────────────────────────────────────────

    #[tokio::test]
    async fn invalid_rule_never_reaches_the_gateway() {
        let gw = MockGateway::default();
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![rule("unprefixed", 2000), rule("MANAGED-ok", 2001)];
        let report = reconciler.run(&rules).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.status(), RunStatus::Partial);
        let validation: Vec<_> = report.failures_in(FailureStage::Validation).collect();
        assert_eq!(validation.len(), 1);
        assert_eq!(validation[0].name, "unprefixed");
        assert!(!gw.calls().iter().any(|c| c.contains("unprefixed")));
    }

    #[tokio::test]
    async fn icmp_rule_without_type_is_created() {
        let gw = MockGateway::default();
        let reconciler = Reconciler::new(gw.clone());

        let mut ping = rule("MANAGED-ping", 2000);
        ping.protocol = Protocol::Icmp;
        ping.icmp_type = None;

        let report = reconciler.run(&[ping]).await.unwrap();
        assert_eq!(report.status(), RunStatus::Converged);
        assert_eq!(report.created, 1);
    }

    // ── Failure isolation ───────────────────────────────────────────

    #[tokio::test]
    async fn independent_create_failures_are_all_reported() {
        let gw = MockGateway::default();
        {
            let mut state = gw.0.lock().unwrap();
            state.fail_create_names.push("MANAGED-a".into());
            state.fail_create_names.push("MANAGED-b".into());
        }
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![
            rule("MANAGED-a", 10),
            rule("MANAGED-b", 20),
            rule("MANAGED-c", 30),
        ];
        let report = reconciler.run(&rules).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.status(), RunStatus::Partial);
        let create_failures: Vec<_> = report.failures_in(FailureStage::Create).collect();
        assert_eq!(create_failures.len(), 2);
        // The unrelated rule was still attempted and succeeded.
        assert_eq!(gw.remote_names(), vec!["MANAGED-c"]);
    }

    // ── Total failure ───────────────────────────────────────────────

    #[tokio::test]
    async fn discovery_failure_aborts_before_any_mutation() {
        let gw = MockGateway::default();
        gw.0.lock().unwrap().fail_list = true;
        let reconciler = Reconciler::new(gw.clone());

        let err = reconciler.run(&[rule("MANAGED-a", 10)]).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(gw.calls(), vec!["list"]);
    }

    // ── Idempotence ─────────────────────────────────────────────────

    #[tokio::test]
    async fn running_twice_converges_to_the_same_logical_state() {
        let gw = MockGateway::with_remote(&["MANAGED-stale"]);
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![
            rule("MANAGED-dns", 2010),
            rule("MANAGED-web", 2000),
            rule("MANAGED-ssh", 2020),
        ];

        let first = reconciler.run(&rules).await.unwrap();
        let names_after_first = gw.remote_names();

        let second = reconciler.run(&rules).await.unwrap();
        let names_after_second = gw.remote_names();

        assert_eq!(first.status(), RunStatus::Converged);
        assert_eq!(second.status(), RunStatus::Converged);
        // Same names in the same priority order, both times.
        assert_eq!(
            names_after_first,
            vec!["MANAGED-web", "MANAGED-dns", "MANAGED-ssh"]
        );
        assert_eq!(names_after_first, names_after_second);
    }

    // ── Preview ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn preview_reports_without_mutating() {
        let gw = MockGateway::with_remote(&["MANAGED-a", "MANAGED-b"]);
        let reconciler = Reconciler::new(gw.clone());

        let rules = vec![rule("MANAGED-new", 2000), rule("bad-name", 2001)];
        let report = reconciler.preview(&rules).await.unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.purged, 2);
        assert_eq!(report.created, 1);
        assert_eq!(report.failures_in(FailureStage::Validation).count(), 1);
        // Only the list call happened; remote state is untouched.
        assert_eq!(gw.calls(), vec!["list"]);
        assert_eq!(gw.remote_names(), vec!["MANAGED-a", "MANAGED-b"]);
    }
}
