// Gateway HTTP client
//
// Wraps `reqwest::Client` with controller-specific URL construction,
// envelope unwrapping, platform-aware path prefixing, and bounded retry
// of transient transport failures. Endpoint methods live in `rules.rs`
// to keep this module focused on transport mechanics.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::LegacyResponse;
use crate::transport::TransportConfig;

/// Controller platform, which determines the legacy API path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS console (UDM, UDR, Cloud Key Gen2). Legacy API lives
    /// behind `/proxy/network`, auth at `/api/auth/login`.
    UniFiOs,
    /// Standalone Network Application (self-hosted, typically :8443).
    Standalone,
}

impl ControllerPlatform {
    fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UniFiOs => "/proxy/network",
            Self::Standalone => "",
        }
    }

    fn login_path(self) -> &'static str {
        match self {
            Self::UniFiOs => "api/auth/login",
            Self::Standalone => "api/login",
        }
    }
}

/// Bounded retry policy for transient transport failures.
///
/// Only errors where [`Error::is_transient`] holds are retried;
/// application-level rejections go straight to the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        // Exponential backoff: base, 2*base, 4*base, ...
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// HTTP client for the controller's legacy firewall API.
///
/// Handles the `{ data: [], meta: { rc, msg } }` envelope, site-scoped
/// URL construction, and session authentication. All methods return
/// unwrapped `data` payloads -- the envelope is stripped before the
/// caller sees it.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    platform: ControllerPlatform,
    retry: RetryPolicy,
}

impl GatewayClient {
    /// Create a new gateway client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies). The `base_url` should
    /// be the controller root (e.g. `https://192.168.1.1` for UniFi OS or
    /// `https://controller:8443` for standalone).
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client(None)?;
        Ok(Self {
            http,
            base_url,
            site,
            platform,
            retry: RetryPolicy::default(),
        })
    }

    /// Create a gateway client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client with a session cookie in
    /// its jar, or in tests.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
    ) -> Self {
        Self {
            http,
            base_url,
            site,
            platform,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The current site identifier.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with username and password, storing the session cookie in
    /// the client's jar.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.root_url(self.platform.login_path())?;
        debug!("POST {} (login)", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(Error::Authentication {
                    message: "invalid username or password".into(),
                })
            }
            s => Err(Error::Authentication {
                message: format!("login rejected with HTTP {s}"),
            }),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/{path}");
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    /// Build a site-scoped URL: `{base}{prefix}/api/s/{site}/{path}`
    ///
    /// All firewall rule endpoints are site-scoped.
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.platform.legacy_prefix();
        let full = format!("{base}{prefix}/api/s/{}/{path}", self.site);
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the legacy envelope, retrying
    /// transient failures per the retry policy.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.send_with_retry(|| {
            debug!("GET {}", url);
            self.http.get(url.clone()).send()
        })
        .await
    }

    /// Send a POST request with JSON body and unwrap the legacy envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Vec<T>, Error> {
        self.send_with_retry(|| {
            debug!("POST {}", url);
            self.http.post(url.clone()).json(body).send()
        })
        .await
    }

    /// Send a DELETE request and unwrap the legacy envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.send_with_retry(|| {
            debug!("DELETE {}", url);
            self.http.delete(url.clone()).send()
        })
        .await
    }

    /// Run a request, retrying transient transport errors with bounded
    /// exponential backoff. Non-transient errors (auth, controller
    /// rejections, parse failures) are returned immediately.
    async fn send_with_retry<T, F, Fut>(&self, mut request: F) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt - 1);
                warn!(attempt, ?delay, "retrying after transient error");
                tokio::time::sleep(delay).await;
            }

            match request().await {
                Ok(resp) => return self.parse_envelope(resp).await,
                Err(e) => {
                    let err = Error::Transport(e);
                    if !err.is_transient() {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(Error::RetriesExhausted {
            attempts: self.retry.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".into()),
        })
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success
    /// or an `Error::Api` if `meta.rc != "ok"`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: LegacyResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        match envelope.meta.rc.as_str() {
            "ok" => Ok(envelope.data),
            _ => Err(Error::Api {
                message: envelope
                    .meta
                    .msg
                    .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
            }),
        }
    }
}
