use crate::api::Webhook;
use crate::event::AppEvent;
use crate::poller::PollOutcome;
use crate::push::{PushEvent, WatcherAction};
use crate::schedule::ReloadReason;
use crate::spotify::SyncTrigger;
use crate::surface::ElementId;
use crate::weather::WeatherTrigger;

use super::App;

impl App {
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::StatusFetched { ticket, result } => {
                let now = self.now_ms();
                let follow_ups = self.spotify.complete_sync(ticket, result, now, &mut self.surface);
                self.run_follow_ups(follow_ups);
            }
            AppEvent::QueueFetched(result) => {
                self.spotify.apply_queue(result, &mut self.surface);
                self.request_art(ElementId::NextAlbumCover);
            }
            AppEvent::FavoriteChecked { track_id, result } => {
                self.spotify.apply_favorite(&track_id, result, &mut self.surface);
            }
            AppEvent::FavoriteToggled { track_id, result } => {
                match &result {
                    Ok(true) => self.set_status_info("Added to favorites".to_string()),
                    Ok(false) => self.set_status_info("Removed from favorites".to_string()),
                    Err(e) => self.set_status_error(format!("Could not toggle favorite: {}", e)),
                }
                self.spotify.apply_favorite(&track_id, result, &mut self.surface);
                self.request_spotify_sync(SyncTrigger::AfterCommand);
            }
            AppEvent::CommandSent { command, result } => {
                match result {
                    Ok(()) => self.add_debug(format!("Command {} accepted", command.as_str())),
                    Err(e) => self.set_status_error(format!("Command {} failed: {}", command.as_str(), e)),
                }
                self.request_spotify_sync(SyncTrigger::AfterCommand);
            }
            AppEvent::AuthUrlFetched(result) => {
                self.spotify.apply_auth_url(result, &mut self.surface);
            }
            AppEvent::WeatherFetched { ticket, result } => {
                if self.weather.complete_sync(ticket, result, &mut self.surface) {
                    self.request_weather_sync(WeatherTrigger::Coalesced);
                }
            }
            AppEvent::ConfigChecked(result) => match result {
                Ok(config) => self.apply_backend_config(config.debug),
                Err(e) => self.add_debug(format!("Config check failed: {}", e)),
            },
            AppEvent::LastUpdateChecked(result) => match result {
                Ok(last_update) => self.apply_last_update(last_update),
                Err(e) => self.add_debug(format!("Last-update check failed: {}", e)),
            },
            AppEvent::AlbumArtLoaded { url, result } => {
                self.pending_art.remove(&url);
                match result {
                    Ok(image) => {
                        if let Some(cache) = self.album_art_cache.as_mut() {
                            cache.insert(url, image);
                        }
                    }
                    Err(e) => self.add_debug(format!("Album art failed: {}", e)),
                }
            }
            AppEvent::Push(event) => self.handle_push(event),
            AppEvent::Poll(report) => {
                if let PollOutcome::Failed(ref e) = report.outcome {
                    self.add_debug(format!(
                        "{} poll failed ({} in a row), next in {:?}: {}",
                        report.hook, report.consecutive_failures, report.next_interval, e
                    ));
                }
                match report.hook {
                    Webhook::Spotify => self.spotify_poll = Some(report),
                    Webhook::Weather => self.weather_poll = Some(report),
                }
            }
        }
    }

    fn handle_push(&mut self, event: PushEvent) {
        let action = self.watcher.handle(&event);
        match event {
            PushEvent::Connected => self.set_status_info("Push channel connected".to_string()),
            PushEvent::Disconnected => self.set_status_info("Push channel disconnected".to_string()),
            PushEvent::Error(ref message) => self.add_debug(format!("Push error: {}", message)),
            PushEvent::Other { ref name, .. } => self.add_debug(format!("Push event: {}", name)),
            _ => {}
        }

        match action {
            WatcherAction::ReloadAll => self.full_reload(ReloadReason::Server),
            WatcherAction::SyncSpotify => self.request_spotify_sync(SyncTrigger::Push),
            WatcherAction::SyncWeather => self.request_weather_sync(WeatherTrigger::Push),
            WatcherAction::Nothing => {}
        }
    }
}
