//! Wire shapes of the dashboard backend and their conversion into the
//! crate's own types.

use serde::{Deserialize, Serialize};

use crate::spotify::{QueueHead, RemoteStatus};

// ── /api/spotify ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlaybackResponse {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
pub struct TrackItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub album: Option<AlbumItem>,
    #[serde(default)]
    pub artists: Vec<ArtistItem>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumItem {
    #[serde(default)]
    pub images: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
pub struct ImageItem {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ArtistItem {
    pub name: String,
}

impl TrackItem {
    fn art_url(&self) -> Option<String> {
        self.album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.clone())
    }
}

impl PlaybackResponse {
    /// `None` when the backend reports no active playback (`item: null`).
    pub fn into_status(self) -> Option<RemoteStatus> {
        let item = self.item?;
        let album_art_url = item.art_url();
        Some(RemoteStatus {
            is_playing: self.is_playing,
            track_id: item.id,
            track_name: item.name,
            album_art_url,
            progress_ms: self.progress_ms.unwrap_or(0),
            duration_ms: item.duration_ms,
            queue_head: None,
        })
    }
}

// ── /api/spotify/queue ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub queue: Vec<TrackItem>,
}

impl QueueResponse {
    pub fn into_head(self) -> Option<QueueHead> {
        let next = self.queue.into_iter().next()?;
        let art_url = next.art_url();
        Some(QueueHead {
            name: next.name,
            artists: next.artists.into_iter().map(|a| a.name).collect(),
            art_url,
        })
    }
}

// ── favorites / commands / auth ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FavoriteResponse {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteRequest<'a> {
    pub track_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Body of a 401 from any Spotify endpoint.
#[derive(Debug, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub auth_url: Option<String>,
}

// ── webhooks / config / last update ─────────────────────────────────

/// Response of `/spotify_port` and `/weather_port`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookStatus {
    #[serde(default)]
    pub refresh_needed: bool,
    pub timestamp: String,
    #[serde(default)]
    pub last_update: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigResponse {
    #[serde(rename = "DEBUG", default)]
    pub debug: Option<String>,
}

/// Parsed `/api/config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardConfig {
    pub debug: bool,
}

impl From<ConfigResponse> for DashboardConfig {
    fn from(response: ConfigResponse) -> Self {
        Self {
            debug: response
                .debug
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LastUpdateResponse {
    pub last_update: String,
}

/// Format used by `/api/last-update`.
pub const LAST_UPDATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_decodes_into_status() {
        let json = r#"{
            "is_playing": true,
            "progress_ms": 12000,
            "item": {
                "id": "A",
                "name": "Song A",
                "duration_ms": 200000,
                "album": {"images": [{"url": "https://img/big"}, {"url": "https://img/small"}]},
                "artists": [{"name": "Artist"}]
            }
        }"#;
        let status = serde_json::from_str::<PlaybackResponse>(json)
            .unwrap()
            .into_status()
            .unwrap();
        assert!(status.is_playing);
        assert_eq!(status.track_id, "A");
        assert_eq!(status.track_name, "Song A");
        assert_eq!(status.album_art_url.as_deref(), Some("https://img/big"));
        assert_eq!(status.progress_ms, 12_000);
        assert_eq!(status.duration_ms, 200_000);
    }

    #[test]
    fn test_no_active_playback() {
        let json = r#"{"is_playing": false, "error": "No active playback", "item": null}"#;
        let response: PlaybackResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_status().is_none());
    }

    #[test]
    fn test_minimal_item_without_album() {
        let json = r#"{"is_playing": true, "item": {"id": "A", "duration_ms": 200000, "name": "x"}, "progress_ms": 0}"#;
        let status = serde_json::from_str::<PlaybackResponse>(json)
            .unwrap()
            .into_status()
            .unwrap();
        assert_eq!(status.album_art_url, None);
    }

    #[test]
    fn test_queue_head() {
        let json = r#"{"queue": [
            {"id": "B", "name": "Next", "duration_ms": 1, "artists": [{"name": "X"}, {"name": "Y"}]},
            {"id": "C", "name": "Later", "duration_ms": 1}
        ]}"#;
        let head = serde_json::from_str::<QueueResponse>(json)
            .unwrap()
            .into_head()
            .unwrap();
        assert_eq!(head.name, "Next");
        assert_eq!(head.artist_line(), "X, Y");

        let empty: QueueResponse = serde_json::from_str(r#"{"queue": []}"#).unwrap();
        assert!(empty.into_head().is_none());
    }

    #[test]
    fn test_dashboard_config_debug_flag() {
        let on: ConfigResponse = serde_json::from_str(r#"{"DEBUG": "true"}"#).unwrap();
        let off: ConfigResponse = serde_json::from_str(r#"{"DEBUG": "false"}"#).unwrap();
        let missing: ConfigResponse = serde_json::from_str("{}").unwrap();
        assert!(DashboardConfig::from(on).debug);
        assert!(!DashboardConfig::from(off).debug);
        assert!(!DashboardConfig::from(missing).debug);
    }
}
