//! Webhook pollers for `/spotify_port` and `/weather_port`.
//!
//! Each poller is serial: the next request is only scheduled once the
//! previous one has finished, so a slow backend never sees overlapping polls.

pub mod policy;

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, watch};

use crate::api::{DashboardApi, Webhook, WebhookStatus};
use crate::config::PollerConfig;
use crate::error::ApiError;
use crate::event::AppEvent;

pub use policy::PollingPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// First response; only the timestamp was recorded.
    Primed,
    Seen { refresh_needed: bool },
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    pub hook: Webhook,
    pub outcome: PollOutcome,
    pub next_interval: Duration,
    pub consecutive_failures: u32,
}

pub struct WebhookPoller {
    hook: Webhook,
    policy: PollingPolicy,
    state: PollerState,
    last_seen: Option<String>,
}

impl WebhookPoller {
    pub fn new(hook: Webhook, policy: PollingPolicy) -> Self {
        Self {
            hook,
            policy,
            state: PollerState::Idle,
            last_seen: None,
        }
    }

    pub fn hook(&self) -> Webhook {
        self.hook
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn policy(&self) -> &PollingPolicy {
        &self.policy
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.state) {
            (false, _) => self.state = PollerState::Disabled,
            (true, PollerState::Disabled) => self.state = PollerState::Idle,
            (true, _) => {}
        }
    }

    /// Enter `Polling`. Refused while disabled or already polling.
    pub fn begin(&mut self) -> bool {
        if self.state != PollerState::Idle {
            return false;
        }
        self.state = PollerState::Polling;
        true
    }

    pub fn complete(&mut self, result: Result<WebhookStatus, ApiError>) -> PollReport {
        if self.state == PollerState::Polling {
            self.state = PollerState::Idle;
        }

        let outcome = match result {
            Ok(status) => {
                self.policy.on_success();
                let primed = self.last_seen.is_none();
                self.last_seen = Some(status.timestamp);
                if primed {
                    PollOutcome::Primed
                } else {
                    if status.refresh_needed {
                        tracing::debug!("{} webhook reports refresh needed", self.hook);
                    }
                    PollOutcome::Seen {
                        refresh_needed: status.refresh_needed,
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Error polling {} webhook: {}", self.hook, e);
                self.policy.on_failure();
                PollOutcome::Failed(e)
            }
        };

        PollReport {
            hook: self.hook,
            outcome,
            next_interval: self.policy.current_interval(),
            consecutive_failures: self.policy.consecutive_failures(),
        }
    }

    pub async fn poll_once(&mut self, api: &dyn DashboardApi) -> Option<PollReport> {
        if !self.begin() {
            return None;
        }
        let result = api.webhook(self.hook).await;
        Some(self.complete(result))
    }
}

/// Delay before a poller's first request, jitter included.
pub fn first_poll_delay(config: &PollerConfig) -> Duration {
    let jitter = if config.initial_jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=config.initial_jitter_ms)
    } else {
        0
    };
    Duration::from_millis(config.initial_delay_ms + jitter)
}

/// Poll until the app goes away. Pauses while `enabled` is false and polls
/// immediately when it flips back.
pub async fn run(
    mut poller: WebhookPoller,
    api: Arc<dyn DashboardApi>,
    mut enabled: watch::Receiver<bool>,
    initial_delay: Duration,
    tx: mpsc::UnboundedSender<AppEvent>,
) {
    tracing::info!(
        "{} poller started, first poll in {}ms",
        poller.hook(),
        initial_delay.as_millis()
    );
    let mut delay = initial_delay;

    loop {
        if !*enabled.borrow_and_update() {
            poller.set_enabled(false);
            tracing::debug!("{} poller paused", poller.hook());
            if enabled.changed().await.is_err() {
                break;
            }
            if *enabled.borrow() {
                poller.set_enabled(true);
                delay = Duration::ZERO;
            }
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = enabled.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        if let Some(report) = poller.poll_once(api.as_ref()).await {
            delay = report.next_interval;
            if tx.send(AppEvent::Poll(report)).is_err() {
                break;
            }
        }
    }

    tracing::debug!("{} poller stopped", poller.hook());
}
