use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dotenvy::dotenv;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Daily report trigger
    pub cron_secret: Option<String>,

    // Push-messaging delivery
    pub push_api_url: String,
    pub push_api_token: Option<String>,
    pub push_timeout_secs: u64,

    // Attendance policy
    pub late_cutoff: NaiveTime,
    /// Offset of the wall clock that attendance timestamps are recorded in.
    pub report_offset: FixedOffset,

    // Rate limiting
    pub rate_cron_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let late_cutoff_raw = lookup("LATE_CUTOFF").unwrap_or_else(|| "08:30".to_string());
        let late_cutoff = NaiveTime::parse_from_str(late_cutoff_raw.trim(), "%H:%M").map_err(
            |_| ConfigError::Invalid {
                key: "LATE_CUTOFF",
                value: late_cutoff_raw.clone(),
            },
        )?;

        let offset_minutes: i32 = parse_or(&lookup, "REPORT_UTC_OFFSET_MINUTES", 0)?;
        // FixedOffset only accepts offsets strictly inside one day
        let report_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid {
                key: "REPORT_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            cron_secret: optional("CRON_SECRET"),

            push_api_url: required("PUSH_API_URL")?,
            push_api_token: optional("PUSH_API_TOKEN"),
            push_timeout_secs: parse_or(&lookup, "PUSH_TIMEOUT_SECS", 10)?,

            late_cutoff,
            report_offset,

            rate_cron_per_min: parse_or(&lookup, "RATE_CRON_PER_MIN", 10)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
        })
    }

    /// Calendar day "today" in the report timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.report_offset).date_naive()
    }

    /// Current wall-clock time in the report timezone.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.report_offset).naive_local()
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "mysql://localhost/hr"),
            ("JWT_SECRET", "secret"),
            ("PUSH_API_URL", "https://push.example.com/v1/messages"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.late_cutoff, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(config.push_timeout_secs, 10);
        assert_eq!(config.rate_cron_per_min, 10);
        assert_eq!(config.api_prefix, "/api");
        assert!(config.cron_secret.is_none());
        assert!(config.push_api_token.is_none());
    }

    #[test]
    fn test_missing_required() {
        let mut vars = base_env();
        vars.remove("PUSH_API_URL");
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PUSH_API_URL")));
    }

    #[test]
    fn test_blank_token_is_absent() {
        let mut vars = base_env();
        vars.insert("PUSH_API_TOKEN", "  ");
        vars.insert("CRON_SECRET", "s3cret");
        let config = load(&vars).unwrap();
        assert!(config.push_api_token.is_none());
        assert_eq!(config.cron_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_cutoff() {
        let mut vars = base_env();
        vars.insert("LATE_CUTOFF", "half past eight");
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LATE_CUTOFF", .. }));
    }

    #[test]
    fn test_report_offset() {
        let mut vars = base_env();
        vars.insert("REPORT_UTC_OFFSET_MINUTES", "420");
        let config = load(&vars).unwrap();
        assert_eq!(config.report_offset.local_minus_utc(), 420 * 60);

        vars.insert("REPORT_UTC_OFFSET_MINUTES", "1440");
        assert!(load(&vars).is_err());
    }
}
