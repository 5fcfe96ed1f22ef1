use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Local, NaiveDate};
use platform_authz::Role;
use products_hr::{DatasetSpec, seed::DEFAULT_VIEWER_ID, time_off::LeaveAllowance};

use crate::session::DEFAULT_SESSION_TTL_HOURS;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cookie_key: Key,
    pub cors_allowed_origins: Vec<String>,
    pub dataset: DatasetSpec,
    pub default_viewer: String,
    pub default_role: Role,
    pub login_delay: Duration,
    pub signup_delay: Duration,
    pub leave_allowance: LeaveAllowance,
    pub session_ttl: chrono::Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cookie_key = match std::env::var("COOKIE_SECRET_BASE64") {
            Ok(secret) => decode_cookie_key(&secret)?,
            Err(_) => {
                tracing::warn!("COOKIE_SECRET_BASE64 unset; sessions will not survive a restart");
                Key::generate()
            }
        };

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let today = match std::env::var("HR_REFERENCE_DATE") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid HR_REFERENCE_DATE {raw:?}"))?,
            Err(_) => Local::now().date_naive(),
        };
        let dataset = DatasetSpec {
            seed: env_or("HR_DATASET_SEED", 42)?,
            today,
        };

        let default_viewer =
            std::env::var("HR_DEFAULT_VIEWER").unwrap_or_else(|_| DEFAULT_VIEWER_ID.into());
        let default_role = match std::env::var("HR_DEFAULT_ROLE") {
            Ok(raw) => Role::parse(&raw).context("invalid HR_DEFAULT_ROLE")?,
            Err(_) => Role::default(),
        };

        let defaults = LeaveAllowance::default();
        Ok(Self {
            cookie_key,
            cors_allowed_origins,
            dataset,
            default_viewer,
            default_role,
            login_delay: Duration::from_millis(env_or("LOGIN_DELAY_MS", 1000)?),
            signup_delay: Duration::from_millis(env_or("SIGNUP_DELAY_MS", 1500)?),
            leave_allowance: LeaveAllowance {
                paid: env_or("PAID_LEAVE_DAYS", defaults.paid)?,
                sick: env_or("SICK_LEAVE_DAYS", defaults.sick)?,
            },
            session_ttl: chrono::Duration::hours(env_or(
                "SESSION_TTL_HOURS",
                DEFAULT_SESSION_TTL_HOURS,
            )?),
        })
    }
}

fn decode_cookie_key(secret: &str) -> Result<Key> {
    let secret_bytes = STANDARD
        .decode(secret.trim())
        .context("invalid COOKIE_SECRET_BASE64")?;
    if secret_bytes.len() < 32 {
        return Err(anyhow!(
            "COOKIE_SECRET_BASE64 must decode to at least 32 bytes"
        ));
    }
    // Key::from wants 64 bytes of key material; derive it from shorter secrets.
    if secret_bytes.len() >= 64 {
        Ok(Key::from(&secret_bytes[..64]))
    } else {
        Ok(Key::derive_from(&secret_bytes))
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl AppConfig {
    /// Fixed dataset and no artificial delays.
    pub fn for_tests() -> Self {
        Self {
            cookie_key: Key::generate(),
            cors_allowed_origins: Vec::new(),
            dataset: DatasetSpec {
                seed: 42,
                today: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            },
            default_viewer: DEFAULT_VIEWER_ID.into(),
            default_role: Role::Admin,
            login_delay: Duration::ZERO,
            signup_delay: Duration::ZERO,
            leave_allowance: LeaveAllowance::default(),
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_cookie_secrets_are_rejected() {
        let short = STANDARD.encode([7u8; 16]);
        assert!(decode_cookie_key(&short).is_err());
        assert!(decode_cookie_key("not base64!").is_err());
    }

    #[test]
    fn thirty_two_byte_secrets_are_expanded() {
        let secret = STANDARD.encode([7u8; 32]);
        let first = decode_cookie_key(&secret).unwrap();
        let second = decode_cookie_key(&secret).unwrap();
        assert_eq!(first.master(), second.master());
    }
}
