//! Push channel: backend notifications over Socket.IO.

pub mod socketio;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected,
    Refresh,
    SpotifyUpdate,
    WeatherUpdate,
    Error(String),
    Other { name: String, payload: Option<Value> },
}

impl PushEvent {
    pub fn from_event(name: &str, payload: Option<Value>) -> Self {
        match name {
            "refresh" => PushEvent::Refresh,
            "spotify_update" => PushEvent::SpotifyUpdate,
            "weather_update" => PushEvent::WeatherUpdate,
            "error" => PushEvent::Error(
                payload
                    .as_ref()
                    .map(|p| match p {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default(),
            ),
            _ => PushEvent::Other {
                name: name.to_string(),
                payload,
            },
        }
    }
}

/// What the app should do about a push event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherAction {
    ReloadAll,
    SyncSpotify,
    SyncWeather,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "live",
            ConnectionStatus::Disconnected => "offline",
        }
    }
}

/// Maps push events to app actions and tracks the connection for the status bar.
pub struct ConnectivityWatcher {
    status: ConnectionStatus,
    disconnects: u32,
}

impl Default for ConnectivityWatcher {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            disconnects: 0,
        }
    }
}

impl ConnectivityWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects
    }

    pub fn handle(&mut self, event: &PushEvent) -> WatcherAction {
        tracing::debug!("Push event: {:?}", event);

        match event {
            PushEvent::Connected => {
                tracing::info!("Connected to push channel");
                self.status = ConnectionStatus::Connected;
                WatcherAction::Nothing
            }
            PushEvent::Disconnected => {
                tracing::info!("Disconnected from push channel");
                self.status = ConnectionStatus::Disconnected;
                self.disconnects += 1;
                WatcherAction::Nothing
            }
            PushEvent::Refresh => {
                tracing::info!("Refresh requested by server");
                WatcherAction::ReloadAll
            }
            PushEvent::SpotifyUpdate => WatcherAction::SyncSpotify,
            PushEvent::WeatherUpdate => WatcherAction::SyncWeather,
            PushEvent::Error(message) => {
                tracing::error!("Push channel error: {}", message);
                WatcherAction::Nothing
            }
            PushEvent::Other { .. } => WatcherAction::Nothing,
        }
    }
}
