//! CLI configuration -- thin wrapper around `rulesync_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--controller, --api-key, etc.).

use std::time::Duration;

use secrecy::SecretString;

use rulesync_core::{AuthCredentials, GatewayConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use rulesync_config::{Config, Profile, config_path, load_config_or_default};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `GatewayConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<GatewayConfig, CliError> {
    // 1. Controller URL (flag > env > profile)
    let url_str = global.controller.as_deref().unwrap_or(&profile.controller);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Auth credentials (CLI flag overrides take priority)
    let auth = match profile.auth_mode.as_str() {
        "api-key" => {
            let secret = resolve_api_key_with_flag(profile, profile_name, global)?;
            AuthCredentials::ApiKey(secret)
        }
        "credentials" => {
            let (username, password) = resolve_credentials_with_flag(profile, profile_name, global)?;
            AuthCredentials::Credentials { username, password }
        }
        other => {
            return Err(CliError::Validation {
                field: "auth_mode".into(),
                reason: format!("expected 'api-key' or 'credentials', got '{other}'"),
            });
        }
    };

    // 3. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Site (flag > env > profile)
    let site = global.site.as_deref().unwrap_or(&profile.site).to_string();

    // 5. Timeout
    let timeout = Duration::from_secs(global.timeout);

    Ok(GatewayConfig {
        url,
        auth,
        site,
        tls,
        timeout,
    })
}

/// Build a `GatewayConfig` from CLI flags and env vars alone, for runs
/// without a config file.
pub fn resolve_from_flags(global: &GlobalOpts, profile_name: &str) -> Result<GatewayConfig, CliError> {
    let url_str = global
        .controller
        .as_deref()
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let auth = if let Some(ref key) = global.api_key {
        AuthCredentials::ApiKey(SecretString::from(key.clone()))
    } else if let Some(ref username) = global.username {
        let password =
            std::env::var("RULESYNC_PASSWORD").map_err(|_| CliError::NoCredentials {
                profile: profile_name.into(),
            })?;
        AuthCredentials::Credentials {
            username: username.clone(),
            password: SecretString::from(password),
        }
    } else {
        return Err(CliError::NoCredentials {
            profile: profile_name.into(),
        });
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(GatewayConfig {
        url,
        auth,
        site: global.site.clone().unwrap_or_else(|| "default".into()),
        tls,
        timeout: Duration::from_secs(global.timeout),
    })
}

/// Resolve API key with CLI flag override, then fall through to shared resolution.
fn resolve_api_key_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SecretString, CliError> {
    // CLI flag takes priority
    if let Some(ref key) = global.api_key {
        return Ok(SecretString::from(key.clone()));
    }
    Ok(rulesync_config::resolve_api_key(profile, profile_name)?)
}

/// Resolve username/password, letting `--username` override the profile.
fn resolve_credentials_with_flag(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(String, SecretString), CliError> {
    if let Some(ref username) = global.username {
        let effective = Profile {
            username: Some(username.clone()),
            ..profile.clone()
        };
        return Ok(rulesync_config::resolve_credentials(&effective, profile_name)?);
    }
    Ok(rulesync_config::resolve_credentials(profile, profile_name)?)
}
