//! Results reported back to the UI loop by spawned tasks.

use chrono::NaiveDateTime;
use image::DynamicImage;

use crate::api::{DashboardConfig, PlayerCommand};
use crate::error::ApiError;
use crate::poller::PollReport;
use crate::push::PushEvent;
use crate::spotify::{QueueHead, RemoteStatus, SyncTicket};
use crate::weather::{WeatherReport, WeatherTicket};

#[derive(Debug)]
pub enum AppEvent {
    StatusFetched {
        ticket: SyncTicket,
        result: Result<Option<RemoteStatus>, ApiError>,
    },
    QueueFetched(Result<Option<QueueHead>, ApiError>),
    FavoriteChecked {
        track_id: String,
        result: Result<bool, ApiError>,
    },
    FavoriteToggled {
        track_id: String,
        result: Result<bool, ApiError>,
    },
    CommandSent {
        command: PlayerCommand,
        result: Result<(), ApiError>,
    },
    AuthUrlFetched(Result<String, ApiError>),
    WeatherFetched {
        ticket: WeatherTicket,
        result: Result<WeatherReport, ApiError>,
    },
    ConfigChecked(Result<DashboardConfig, ApiError>),
    LastUpdateChecked(Result<Option<NaiveDateTime>, ApiError>),
    AlbumArtLoaded {
        url: String,
        result: anyhow::Result<DynamicImage>,
    },
    Push(PushEvent),
    Poll(PollReport),
}
