// rulesync-core: Domain model and reconciliation engine between
// rulesync-api and consumers (CLI).

pub mod config;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod model;
pub mod reconcile;
pub mod report;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AuthCredentials, GatewayConfig, TlsVerification};
pub use error::CoreError;
pub use gateway::{HttpRuleGateway, RemoteRule, RuleGateway};
pub use model::{
    ConnectionStates, ManagedRule, Protocol, RuleAction, Ruleset, Selector, ValidationError,
    MANAGED_PREFIX,
};
pub use reconcile::Reconciler;
pub use report::{FailureStage, RuleFailure, RunMode, RunReport, RunStatus};
