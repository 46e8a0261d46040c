// rulesync-api: Async client for the UniFi controller's legacy firewall API

pub mod client;
pub mod error;
pub mod models;
pub mod rules;
pub mod transport;

pub use client::{ControllerPlatform, GatewayClient, RetryPolicy};
pub use error::Error;
pub use models::{FirewallRuleData, FirewallRuleResponse};
pub use transport::{TlsMode, TransportConfig};
