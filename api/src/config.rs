use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{FixedOffset, NaiveTime};

use crate::domain::entities::AttendancePolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    /// Check-ins strictly after this local time are late
    pub late_cutoff: NaiveTime,
    /// Offset that defines the local working day
    pub utc_offset: FixedOffset,
    /// Requests running longer than this are cancelled
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from a variable lookup; absent variables take defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "sqlite://timecard.db?mode=rwc".to_string());

        let listen_addr = var("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("LISTEN_ADDR must be host:port")?;

        let late_cutoff = parse_cutoff(&var("LATE_CUTOFF").unwrap_or_else(|| "09:00".to_string()))?;

        let utc_offset =
            parse_offset(&var("UTC_OFFSET").unwrap_or_else(|| "+00:00".to_string()))?;

        let request_timeout = var("REQUEST_TIMEOUT_SECS")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?
            .unwrap_or(30);

        Ok(Self {
            database_url,
            listen_addr,
            late_cutoff,
            utc_offset,
            request_timeout: Duration::from_secs(request_timeout),
        })
    }

    pub fn policy(&self) -> AttendancePolicy {
        AttendancePolicy::new(self.late_cutoff, self.utc_offset)
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`
fn parse_cutoff(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("LATE_CUTOFF '{}' is not HH:MM or HH:MM:SS", value))
}

/// Accepts `Z` or `±HH:MM`
fn parse_offset(value: &str) -> anyhow::Result<FixedOffset> {
    if value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(|| anyhow!("invalid UTC offset"));
    }

    let invalid = || anyhow!("UTC_OFFSET '{}' is not ±HH:MM", value);

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
