//! Access to the dashboard backend.
//!
//! [`DashboardApi`] is the seam between the synchronizers and the network.
//! [`HttpApi`] talks to the real backend with reqwest.

pub mod http;
pub mod models;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::ApiError;
use crate::spotify::{QueueHead, RemoteStatus};
use crate::weather::WeatherReport;

pub use http::HttpApi;
pub use models::{DashboardConfig, WebhookStatus};

/// Lightweight "has anything changed" endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Webhook {
    Spotify,
    Weather,
}

impl Webhook {
    pub fn path(&self) -> &'static str {
        match self {
            Webhook::Spotify => "/spotify_port",
            Webhook::Weather => "/weather_port",
        }
    }
}

impl std::fmt::Display for Webhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Webhook::Spotify => write!(f, "spotify"),
            Webhook::Weather => write!(f, "weather"),
        }
    }
}

/// Playback commands understood by `/api/spotify/command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlayerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerCommand::Play => "play",
            PlayerCommand::Pause => "pause",
            PlayerCommand::Next => "next",
            PlayerCommand::Previous => "previous",
        }
    }
}

impl std::str::FromStr for PlayerCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "play" => Ok(PlayerCommand::Play),
            "pause" | "stop" => Ok(PlayerCommand::Pause),
            "next" | "skip" => Ok(PlayerCommand::Next),
            "previous" | "prev" => Ok(PlayerCommand::Previous),
            _ => Err(anyhow::anyhow!("Unknown command: {}", s)),
        }
    }
}

/// Everything the dashboard reads from or sends to the backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/spotify`. `Ok(None)` when nothing is playing on any device.
    async fn playback(&self) -> Result<Option<RemoteStatus>, ApiError>;

    /// `GET /api/spotify/queue`, reduced to the first entry.
    async fn next_in_queue(&self) -> Result<Option<QueueHead>, ApiError>;

    /// `GET /api/spotify/is-favorite/{id}`.
    async fn is_favorite(&self, track_id: &str) -> Result<bool, ApiError>;

    /// `POST /api/spotify/toggle-favorite`. Returns the new favorite state.
    async fn toggle_favorite(&self, track_id: &str) -> Result<bool, ApiError>;

    /// `POST /api/spotify/command`.
    async fn send_command(&self, command: PlayerCommand) -> Result<(), ApiError>;

    /// `GET /api/spotify/auth-url`.
    async fn auth_url(&self) -> Result<String, ApiError>;

    /// `GET /spotify_port` or `GET /weather_port`.
    async fn webhook(&self, hook: Webhook) -> Result<WebhookStatus, ApiError>;

    /// `GET /api/weather`.
    async fn weather(&self) -> Result<WeatherReport, ApiError>;

    /// `GET /api/config`.
    async fn dashboard_config(&self) -> Result<DashboardConfig, ApiError>;

    /// `GET /api/last-update`. `Ok(None)` before the first weather update.
    async fn last_update(&self) -> Result<Option<NaiveDateTime>, ApiError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted backend for async tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeApi {
        pub playback_results: Mutex<VecDeque<Result<Option<RemoteStatus>, ApiError>>>,
        pub webhook_results: Mutex<VecDeque<Result<WebhookStatus, ApiError>>>,
        pub weather_result: Mutex<Option<WeatherReport>>,
        pub debug: Mutex<bool>,
        pub commands: Mutex<Vec<PlayerCommand>>,
        pub toggled: Mutex<Vec<String>>,
        pub playback_calls: Mutex<u32>,
    }

    impl FakeApi {
        pub fn push_playback(&self, result: Result<Option<RemoteStatus>, ApiError>) {
            self.playback_results.lock().unwrap().push_back(result);
        }

        pub fn push_webhook(&self, result: Result<WebhookStatus, ApiError>) {
            self.webhook_results.lock().unwrap().push_back(result);
        }

        pub fn playback_calls(&self) -> u32 {
            *self.playback_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DashboardApi for FakeApi {
        async fn playback(&self) -> Result<Option<RemoteStatus>, ApiError> {
            *self.playback_calls.lock().unwrap() += 1;
            self.playback_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }

        async fn next_in_queue(&self) -> Result<Option<QueueHead>, ApiError> {
            Ok(None)
        }

        async fn is_favorite(&self, _track_id: &str) -> Result<bool, ApiError> {
            Ok(false)
        }

        async fn toggle_favorite(&self, track_id: &str) -> Result<bool, ApiError> {
            self.toggled.lock().unwrap().push(track_id.to_string());
            Ok(true)
        }

        async fn send_command(&self, command: PlayerCommand) -> Result<(), ApiError> {
            self.commands.lock().unwrap().push(command);
            Ok(())
        }

        async fn auth_url(&self) -> Result<String, ApiError> {
            Ok("https://accounts.example/authorize".to_string())
        }

        async fn webhook(&self, hook: Webhook) -> Result<WebhookStatus, ApiError> {
            self.webhook_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::network(hook.path(), "no scripted response")))
        }

        async fn weather(&self) -> Result<WeatherReport, ApiError> {
            self.weather_result
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ApiError::network("/api/weather", "not scripted"))
        }

        async fn dashboard_config(&self) -> Result<DashboardConfig, ApiError> {
            Ok(DashboardConfig {
                debug: *self.debug.lock().unwrap(),
            })
        }

        async fn last_update(&self) -> Result<Option<NaiveDateTime>, ApiError> {
            Ok(None)
        }
    }
}
