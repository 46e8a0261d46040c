// Firewall rule endpoints
//
// `rest/firewallrule` CRUD, site-scoped. Inherent methods on
// `GatewayClient`, one file per resource family.

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::{FirewallRuleData, FirewallRuleResponse};

impl GatewayClient {
    /// List all firewall rules for the site.
    ///
    /// `GET /api/s/{site}/rest/firewallrule`
    pub async fn list_firewall_rules(&self) -> Result<Vec<FirewallRuleResponse>, Error> {
        let url = self.site_url("rest/firewallrule")?;
        debug!("listing firewall rules");
        self.get(url).await
    }

    /// Create a firewall rule, returning the controller's stored copy
    /// (including its assigned `_id`).
    ///
    /// `POST /api/s/{site}/rest/firewallrule`
    pub async fn create_firewall_rule(
        &self,
        rule: &FirewallRuleData,
    ) -> Result<FirewallRuleResponse, Error> {
        let url = self.site_url("rest/firewallrule")?;
        debug!(name = %rule.name, "creating firewall rule");
        let mut created: Vec<FirewallRuleResponse> = self.post(url, rule).await?;
        created.pop().ok_or_else(|| Error::Api {
            message: "controller returned empty data for created rule".into(),
        })
    }

    /// Delete a firewall rule by its controller-assigned id.
    ///
    /// `DELETE /api/s/{site}/rest/firewallrule/{id}`
    pub async fn delete_firewall_rule(&self, id: &str) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/firewallrule/{id}"))?;
        debug!(%id, "deleting firewall rule");
        let _: Vec<serde_json::Value> = self.delete(url).await?;
        Ok(())
    }
}
