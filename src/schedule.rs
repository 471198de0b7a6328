//! Periodic full reloads and the backend checks that schedule them.
//!
//! Two clocks are involved: the app's monotonic milliseconds for the hourly
//! reload, and local wall-clock time for the nightly reload and for
//! `last_update`, which the backend reports in local time.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::ReloadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    Hourly,
    Nightly,
    Debug,
    Server,
    Manual,
}

impl std::fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReloadReason::Hourly => "hourly",
            ReloadReason::Nightly => "nightly",
            ReloadReason::Debug => "debug mode",
            ReloadReason::Server => "server request",
            ReloadReason::Manual => "manual",
        };
        f.write_str(s)
    }
}

pub struct RefreshSchedule {
    full_reload_interval_ms: u64,
    nightly: NaiveTime,
    settle: Duration,
    last_reload_ms: u64,
    loaded_at: NaiveDateTime,
    nightly_done_on: Option<NaiveDate>,
    debug: bool,
    handled_update: Option<NaiveDateTime>,
}

impl RefreshSchedule {
    pub fn new(config: &ReloadConfig, now_ms: u64, local_now: NaiveDateTime) -> Result<Self> {
        let nightly = NaiveTime::parse_from_str(&config.nightly_reload, "%H:%M")
            .with_context(|| format!("Invalid nightly reload time: {}", config.nightly_reload))?;
        Ok(Self {
            full_reload_interval_ms: config.full_reload_interval_ms,
            nightly,
            settle: Duration::milliseconds(config.last_update_settle_ms as i64),
            last_reload_ms: now_ms,
            loaded_at: local_now,
            nightly_done_on: None,
            debug: false,
            handled_update: None,
        })
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// A full reload just ran, whatever triggered it.
    pub fn mark_reloaded(&mut self, now_ms: u64, local_now: NaiveDateTime) {
        self.last_reload_ms = now_ms;
        self.loaded_at = local_now;
    }

    pub fn hourly_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_reload_ms) >= self.full_reload_interval_ms
    }

    /// Apply a `/api/config` result. Debug mode reloads on every check; the
    /// nightly minute reloads once per day.
    pub fn on_config(&mut self, debug_on: bool, local_now: NaiveDateTime) -> Option<ReloadReason> {
        if debug_on != self.debug {
            let mode = if debug_on { "on" } else { "off" };
            tracing::info!("Backend debug mode {}", mode);
        }
        self.debug = debug_on;

        let at_nightly = local_now.hour() == self.nightly.hour()
            && local_now.minute() == self.nightly.minute();
        let today = local_now.date();
        if at_nightly && self.nightly_done_on != Some(today) {
            self.nightly_done_on = Some(today);
            return Some(ReloadReason::Nightly);
        }

        debug_on.then_some(ReloadReason::Debug)
    }

    /// Apply a `/api/last-update` result. True when the weather should be
    /// refetched now; each `last_update` value triggers at most once.
    pub fn on_last_update(&mut self, last_update: Option<NaiveDateTime>, local_now: NaiveDateTime) -> bool {
        if self.debug {
            return false;
        }
        let Some(updated) = last_update else {
            return false;
        };
        if self.handled_update == Some(updated) {
            return false;
        }

        let settled_at = updated + self.settle;
        if settled_at <= self.loaded_at {
            // The last load already fetched data at least this fresh
            self.handled_update = Some(updated);
            return false;
        }
        if local_now >= settled_at {
            self.handled_update = Some(updated);
            tracing::info!("Backend weather updated at {}, refetching", updated);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn schedule(loaded_at: NaiveDateTime) -> RefreshSchedule {
        RefreshSchedule::new(&ReloadConfig::default(), 0, loaded_at).unwrap()
    }

    #[test]
    fn test_hourly_reload() {
        let mut schedule = schedule(at(9, 0));
        assert!(!schedule.hourly_due(3_599_999));
        assert!(schedule.hourly_due(3_600_000));
        schedule.mark_reloaded(3_600_000, at(10, 0));
        assert!(!schedule.hourly_due(3_600_001));
    }

    #[test]
    fn test_nightly_reload_once_per_day() {
        let mut schedule = schedule(at(0, 0));
        assert_eq!(schedule.on_config(false, at(1, 9)), None);
        assert_eq!(schedule.on_config(false, at(1, 10)), Some(ReloadReason::Nightly));
        // Second check inside the same minute
        assert_eq!(schedule.on_config(false, at(1, 10)), None);

        let tomorrow = at(1, 10) + Duration::days(1);
        assert_eq!(schedule.on_config(false, tomorrow), Some(ReloadReason::Nightly));
    }

    #[test]
    fn test_debug_reloads_every_check() {
        let mut schedule = schedule(at(9, 0));
        assert_eq!(schedule.on_config(true, at(9, 1)), Some(ReloadReason::Debug));
        assert_eq!(schedule.on_config(true, at(9, 2)), Some(ReloadReason::Debug));
        assert!(schedule.is_debug());
        assert_eq!(schedule.on_config(false, at(9, 3)), None);
    }

    #[test]
    fn test_last_update_refetches_once_after_settling() {
        let mut schedule = schedule(at(9, 0));
        let updated = Some(at(10, 0));

        assert!(!schedule.on_last_update(updated, at(10, 4)));
        assert!(schedule.on_last_update(updated, at(10, 5)));
        // Same value on later checks does nothing
        assert!(!schedule.on_last_update(updated, at(10, 6)));
        assert!(!schedule.on_last_update(updated, at(11, 0)));

        assert!(schedule.on_last_update(Some(at(11, 0)), at(11, 5)));
    }

    #[test]
    fn test_update_older_than_load_is_ignored() {
        let mut schedule = schedule(at(9, 0));
        assert!(!schedule.on_last_update(Some(at(8, 0)), at(9, 1)));
        assert!(!schedule.on_last_update(None, at(9, 1)));
    }

    #[test]
    fn test_last_update_ignored_in_debug() {
        let mut schedule = schedule(at(9, 0));
        schedule.on_config(true, at(9, 1));
        assert!(!schedule.on_last_update(Some(at(9, 30)), at(10, 0)));
    }

    #[test]
    fn test_invalid_nightly_time() {
        let config = ReloadConfig {
            nightly_reload: "late".to_string(),
            ..Default::default()
        };
        assert!(RefreshSchedule::new(&config, 0, at(0, 0)).is_err());
    }
}
