//! Process configuration loaded from the environment (and `.env`, if present).

use std::collections::HashMap;

use chrono::Duration;
use thiserror::Error;

use eventsphere_observability::LogFormat;

const DEV_JWT_SECRET: &str = "eventsphere-dev-secret-change-me";
const DEV_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `DATABASE_URL`, falling back to the legacy `DBURI`.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Reject duplicate feedback/registrations per (user, expo) with 409.
    pub unique_submissions: bool,
    pub log_format: LogFormat,
    /// Browser origins allowed to call the API with credentials (`CORS_ORIGINS`, comma separated).
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::minutes(720),
            unique_submissions: false,
            log_format: LogFormat::Json,
            cors_origins: DEV_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", e.to_string()))?,
            None => defaults.port,
        };

        let token_ttl = match get("TOKEN_TTL_MINUTES") {
            Some(raw) => {
                let minutes = raw
                    .parse::<i64>()
                    .map_err(|e| ConfigError::invalid("TOKEN_TTL_MINUTES", e.to_string()))?;
                if minutes <= 0 {
                    return Err(ConfigError::invalid("TOKEN_TTL_MINUTES", "must be greater than 0"));
                }
                Duration::minutes(minutes)
            }
            None => defaults.token_ttl,
        };

        let unique_submissions = match get("UNIQUE_SUBMISSIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid("UNIQUE_SUBMISSIONS", format!("'{raw}' is not a boolean"))
            })?,
            None => defaults.unique_submissions,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", e))?,
            None => defaults.log_format,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors_origins,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL").or_else(|| get("DBURI")),
            jwt_secret: get("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl,
            unique_submissions,
            log_format,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Credentialed CORS needs explicit origins, so `*` is refused.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut origins = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "CORS_ORIGINS",
                format!("'{origin}' is not an http(s) origin"),
            ));
        }
        origins.push(origin.trim_end_matches('/').to_string());
    }
    if origins.is_empty() {
        return Err(ConfigError::invalid("CORS_ORIGINS", "no origins listed"));
    }
    Ok(origins)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert!(cfg.uses_dev_secret());
    }

    #[test]
    fn legacy_dburi_is_honored() {
        let cfg = config(&[("DBURI", "postgres://legacy")]).unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://legacy"));

        let cfg = config(&[("DBURI", "postgres://legacy"), ("DATABASE_URL", "postgres://new")]).unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://new"));
    }

    #[test]
    fn parses_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("TOKEN_TTL_MINUTES", "30"),
            ("UNIQUE_SUBMISSIONS", "true"),
            ("LOG_FORMAT", "pretty"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.token_ttl, Duration::minutes(30));
        assert!(cfg.unique_submissions);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(!cfg.uses_dev_secret());
    }

    #[test]
    fn cors_origins_default_to_local_dev_servers() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.cors_origins.contains(&"http://localhost:5173".to_string()));
        assert_eq!(cfg.cors_origins.len(), 3);

        let cfg = config(&[("CORS_ORIGINS", " https://expo.example.com/ , http://localhost:4000,")]).unwrap();
        assert_eq!(
            cfg.cors_origins,
            vec!["https://expo.example.com".to_string(), "http://localhost:4000".to_string()]
        );

        let err = config(&[("CORS_ORIGINS", "*")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CORS_ORIGINS", .. }));
    }

    #[test]
    fn invalid_values_are_reported_by_key() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config(&[("UNIQUE_SUBMISSIONS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "UNIQUE_SUBMISSIONS", .. }));

        let err = config(&[("TOKEN_TTL_MINUTES", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TOKEN_TTL_MINUTES", .. }));
    }
}
