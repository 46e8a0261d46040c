// Integration tests for `GatewayClient` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rulesync_api::{
    ControllerPlatform, Error, FirewallRuleData, GatewayClient, RetryPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let client = GatewayClient::with_client(
        reqwest::Client::new(),
        server.uri().parse().unwrap(),
        "default".into(),
        ControllerPlatform::Standalone,
    );
    (server, client)
}

fn ok_envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "meta": { "rc": "ok" }, "data": data })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_firewall_rules() {
    let (server, client) = setup().await;

    let body = ok_envelope(json!([
        {
            "_id": "5f3c0001",
            "name": "MANAGED-allow-dns",
            "ruleset": "LAN_IN",
            "rule_index": 2000,
            "action": "accept",
            "enabled": true
        },
        {
            "_id": "5f3c0002",
            "name": "hand-made rule",
            "ruleset": "WAN_IN",
            "rule_index": "2001",
            "action": "drop",
            "enabled": false
        }
    ]));

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/firewallrule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let rules = client.list_firewall_rules().await.unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id, "5f3c0001");
    assert_eq!(rules[0].name, "MANAGED-allow-dns");
    assert!(rules[0].enabled);
    // rule_index arrives as either a number or a string across firmware
    assert_eq!(rules[1].rule_index, json!("2001"));
}

#[tokio::test]
async fn test_create_firewall_rule_returns_stored_copy() {
    let (server, client) = setup().await;

    let stored = ok_envelope(json!([
        {
            "_id": "5f3c9999",
            "name": "MANAGED-block-guest",
            "ruleset": "LAN_IN",
            "rule_index": 2000,
            "action": "drop",
            "enabled": true
        }
    ]));

    Mock::given(method("POST"))
        .and(path("/api/s/default/rest/firewallrule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&stored))
        .mount(&server)
        .await;

    let payload = FirewallRuleData {
        name: "MANAGED-block-guest".into(),
        ruleset: "LAN_IN".into(),
        rule_index: 2000,
        action: "drop".into(),
        enabled: true,
        protocol: "all".into(),
        ..FirewallRuleData::default()
    };

    let created = client.create_firewall_rule(&payload).await.unwrap();
    assert_eq!(created.id, "5f3c9999");
    assert_eq!(created.name, "MANAGED-block-guest");
}

#[tokio::test]
async fn test_delete_firewall_rule() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/s/default/rest/firewallrule/5f3c0001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_firewall_rule("5f3c0001").await.unwrap();
}

#[tokio::test]
async fn test_login_sends_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(
            json!({ "username": "admin", "password": "hunter2" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let password = secrecy::SecretString::from("hunter2".to_string());
    client.login("admin", &password).await.unwrap();
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_envelope_error_surfaces_as_api_error() {
    let (server, client) = setup().await;

    let body = json!({
        "meta": { "rc": "error", "msg": "api.err.InvalidPayload" },
        "data": []
    });

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/firewallrule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let err = client.list_firewall_rules().await.unwrap_err();
    match err {
        Error::Api { message } => assert_eq!(message, "api.err.InvalidPayload"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/firewallrule"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_firewall_rules().await.unwrap_err();
    assert!(err.is_auth(), "expected auth error, got {err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_bad_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let password = secrecy::SecretString::from("wrong".to_string());
    let err = client.login("admin", &password).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

// ── Retry behavior ──────────────────────────────────────────────────

#[tokio::test]
async fn test_transient_failures_retry_with_bound() {
    // Point the client at a port nothing is listening on: every attempt
    // fails with a connect error, which is transient, so the client
    // should exhaust its attempts and give up.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = GatewayClient::with_client(
        reqwest::Client::new(),
        format!("http://127.0.0.1:{port}").parse().unwrap(),
        "default".into(),
        ControllerPlatform::Standalone,
    )
    .with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    });

    let err = client.list_firewall_rules().await.unwrap_err();
    match err {
        Error::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unifi_os_path_prefix() {
    let server = MockServer::start().await;
    let client = GatewayClient::with_client(
        reqwest::Client::new(),
        server.uri().parse().unwrap(),
        "default".into(),
        ControllerPlatform::UniFiOs,
    );

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/rest/firewallrule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let rules = client.list_firewall_rules().await.unwrap();
    assert!(rules.is_empty());
}
