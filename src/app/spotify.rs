use crate::api::PlayerCommand;
use crate::event::AppEvent;
use crate::spotify::{AuthState, FollowUp, SyncTrigger, TickOutcome};
use crate::surface::ElementId;

use super::App;

impl App {
    pub fn request_spotify_sync(&mut self, trigger: SyncTrigger) {
        let Some(ticket) = self.spotify.begin_sync(trigger) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            AppEvent::StatusFetched {
                ticket,
                result: api.playback().await,
            }
        });
    }

    pub(super) fn run_spotify_timers(&mut self, now: u64) {
        if now.saturating_sub(self.timers.last_tick_ms) >= self.config.spotify.tick_interval_ms {
            self.timers.last_tick_ms = now;
            if self.spotify.tick(now, &mut self.surface) == TickOutcome::ResyncDue {
                self.request_spotify_sync(SyncTrigger::Tick);
            }
        }
        if self.spotify.retry_due(now) {
            self.add_debug("Retrying Spotify status after server error".to_string());
            self.request_spotify_sync(SyncTrigger::Retry);
        }
    }

    pub(super) fn run_follow_ups(&mut self, follow_ups: Vec<FollowUp>) {
        for follow_up in follow_ups {
            match follow_up {
                FollowUp::FetchQueue => {
                    let api = self.api.clone();
                    self.spawn_task(async move { AppEvent::QueueFetched(api.next_in_queue().await) });
                }
                FollowUp::CheckFavorite(track_id) => {
                    let api = self.api.clone();
                    self.spawn_task(async move {
                        let result = api.is_favorite(&track_id).await;
                        AppEvent::FavoriteChecked { track_id, result }
                    });
                }
                FollowUp::FetchAuthUrl => {
                    let api = self.api.clone();
                    self.spawn_task(async move { AppEvent::AuthUrlFetched(api.auth_url().await) });
                }
                FollowUp::Resync => self.request_spotify_sync(SyncTrigger::Coalesced),
            }
        }
        self.request_art(ElementId::CurrentAlbumCover);
    }

    pub fn send_command(&mut self, command: PlayerCommand) {
        self.add_debug(format!("Sending command: {}", command.as_str()));
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.send_command(command).await;
            AppEvent::CommandSent { command, result }
        });
    }

    pub fn play_pause(&mut self) {
        let command = if self.spotify.state().is_playing {
            PlayerCommand::Pause
        } else {
            PlayerCommand::Play
        };
        self.send_command(command);
    }

    pub fn toggle_favorite(&mut self) {
        let Some(track_id) = self.spotify.favorite_target() else {
            self.set_status_info("Nothing is playing".to_string());
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.toggle_favorite(&track_id).await;
            AppEvent::FavoriteToggled { track_id, result }
        });
    }

    /// Open the Spotify authorization page in the system browser.
    pub fn authenticate(&mut self) {
        match self.spotify.auth() {
            AuthState::Authenticated => {
                self.set_status_info("Spotify is already authenticated".to_string());
            }
            AuthState::NeedsAuth { auth_url: None } => {
                self.set_status_error("Authorization URL not available yet".to_string());
            }
            AuthState::NeedsAuth {
                auth_url: Some(url),
            } => {
                let url = url.clone();
                match webbrowser::open(&url) {
                    Ok(()) => {
                        tracing::info!("Opened Spotify authorization page");
                        self.set_status_info(
                            "Opened Spotify authorization in your browser".to_string(),
                        );
                    }
                    Err(e) => self.set_status_error(format!("Could not open browser: {} ({})", e, url)),
                }
            }
        }
    }

    /// Start loading the image shown in `id`, if any and not already cached.
    pub(super) fn request_art(&mut self, id: ElementId) {
        let Some(url) = self.surface.image(id).map(str::to_string) else {
            return;
        };
        let Some(cache) = self.album_art_cache.as_ref() else {
            return;
        };
        if cache.has_cached(&url) || !self.pending_art.insert(url.clone()) {
            return;
        }

        let cache_dir = cache.cache_dir().to_path_buf();
        self.spawn_task(async move {
            let result = crate::album_art::AlbumArtCache::fetch(cache_dir, url.clone()).await;
            AppEvent::AlbumArtLoaded { url, result }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::*;
    use crate::api::fake::FakeApi;
    use crate::api::PlayerCommand;
    use crate::error::ApiError;
    use crate::spotify::{RemoteStatus, SyncTrigger};
    use crate::surface::ElementId;

    fn playing(track: &str) -> RemoteStatus {
        RemoteStatus {
            is_playing: true,
            track_id: track.to_string(),
            track_name: format!("Song {track}"),
            album_art_url: None,
            progress_ms: 1000,
            duration_ms: 200_000,
            queue_head: None,
        }
    }

    #[tokio::test]
    async fn test_startup_sync_renders_track() {
        let api = Arc::new(FakeApi::default());
        api.push_playback(Ok(Some(playing("A"))));
        let mut app = app_with(api.clone());

        app.request_spotify_sync(SyncTrigger::Startup);
        pump_until(&mut app, |app| {
            app.surface.text(ElementId::CurrentTrackName) == Some("Song A")
        })
        .await;

        // Queue and favorite follow-ups land too
        pump_until(&mut app, |app| {
            app.surface.text(ElementId::NextTrackName).is_some()
                && app.spotify.state().is_favorite.is_some()
        })
        .await;
        assert_eq!(app.spotify.state().is_favorite, Some(false));
    }

    #[tokio::test]
    async fn test_command_is_followed_by_sync() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        app.send_command(PlayerCommand::Next);
        pump_until(&mut app, |_| api.playback_calls() == 1).await;
        assert_eq!(*api.commands.lock().unwrap(), vec![PlayerCommand::Next]);
    }

    #[tokio::test]
    async fn test_toggle_favorite_applies_and_resyncs() {
        let api = Arc::new(FakeApi::default());
        api.push_playback(Ok(Some(playing("A"))));
        api.push_playback(Ok(Some(playing("A"))));
        let mut app = app_with(api.clone());

        app.request_spotify_sync(SyncTrigger::Startup);
        pump_until(&mut app, |app| app.spotify.state().is_favorite.is_some()).await;

        app.toggle_favorite();
        pump_until(&mut app, |app| app.spotify.state().is_favorite == Some(true)).await;
        assert_eq!(*api.toggled.lock().unwrap(), vec!["A".to_string()]);
        pump_until(&mut app, |_| api.playback_calls() == 2).await;
    }

    #[tokio::test]
    async fn test_missing_auth_url_is_fetched() {
        let api = Arc::new(FakeApi::default());
        api.push_playback(Err(ApiError::AuthRequired {
            endpoint: "/api/spotify".into(),
            auth_url: None,
        }));
        let mut app = app_with(api.clone());

        app.request_spotify_sync(SyncTrigger::Startup);
        pump_until(&mut app, |app| app.spotify.auth_url().is_some()).await;
        assert_eq!(
            app.surface.action(ElementId::SpotifyAuth).unwrap().url,
            "https://accounts.example/authorize"
        );
    }
}
