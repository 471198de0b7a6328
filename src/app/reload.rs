use chrono::Local;

use crate::event::AppEvent;
use crate::schedule::ReloadReason;
use crate::spotify::SyncTrigger;
use crate::weather::WeatherTrigger;

use super::App;

impl App {
    pub(super) fn run_reload_timers(&mut self, now: u64) {
        if self.schedule.hourly_due(now) {
            self.full_reload(ReloadReason::Hourly);
            return;
        }

        if now.saturating_sub(self.timers.last_backend_check_ms) >= self.config.reload.check_interval_ms {
            self.timers.last_backend_check_ms = now;
            let api = self.api.clone();
            self.spawn_task(async move { AppEvent::ConfigChecked(api.dashboard_config().await) });
        }
    }

    /// Start over: forget both panels and every outstanding fetch, then sync
    /// everything again.
    pub fn full_reload(&mut self, reason: ReloadReason) {
        tracing::info!("Full reload ({})", reason);
        self.add_debug(format!("Full reload ({})", reason));

        self.spotify.reset(&mut self.surface);
        self.weather.reset(&mut self.surface);
        self.surface.clear_all();
        if let Some(cache) = self.album_art_cache.as_mut() {
            cache.clear_memory_cache();
        }
        self.pending_art.clear();

        let now = self.now_ms();
        self.schedule.mark_reloaded(now, Local::now().naive_local());
        self.timers.last_weather_ms = now;

        self.request_spotify_sync(SyncTrigger::Reload);
        self.request_weather_sync(WeatherTrigger::Reload);
    }

    pub(super) fn check_last_update(&mut self) {
        let api = self.api.clone();
        self.spawn_task(async move { AppEvent::LastUpdateChecked(api.last_update().await) });
    }

    pub(super) fn apply_backend_config(&mut self, debug: bool) {
        match self.schedule.on_config(debug, Local::now().naive_local()) {
            Some(reason) => self.full_reload(reason),
            None if !self.schedule.is_debug() => self.check_last_update(),
            None => {}
        }
    }

    pub(super) fn apply_last_update(&mut self, last_update: Option<chrono::NaiveDateTime>) {
        if self.schedule.on_last_update(last_update, Local::now().naive_local()) {
            self.request_weather_sync(WeatherTrigger::Settled);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::*;
    use crate::api::fake::FakeApi;
    use crate::event::AppEvent;
    use crate::push::PushEvent;
    use crate::spotify::{RemoteStatus, SyncTrigger};
    use crate::surface::ElementId;

    #[tokio::test]
    async fn test_refresh_push_reloads_and_drops_old_results() {
        let api = Arc::new(FakeApi::default());
        api.push_playback(Ok(Some(RemoteStatus {
            is_playing: true,
            track_id: "OLD".into(),
            track_name: "Old".into(),
            album_art_url: None,
            progress_ms: 0,
            duration_ms: 100_000,
            queue_head: None,
        })));
        let mut app = app_with(api.clone());

        // Fetched but not yet applied when the refresh arrives
        app.request_spotify_sync(SyncTrigger::Startup);
        let stale = app.next_event().await.unwrap();
        app.handle_event(AppEvent::Push(PushEvent::Refresh));
        app.handle_event(stale);
        assert_eq!(app.spotify.state().track_id, None);

        pump_until(&mut app, |app| {
            app.surface.text(ElementId::SpotifyInfo) == Some(crate::spotify::synchronizer::NOT_PLAYING)
        })
        .await;
        assert_eq!(api.playback_calls(), 2);
        assert!(app.surface.text(ElementId::CurrentTrackName).is_none());
    }

    #[tokio::test]
    async fn test_debug_config_triggers_reload() {
        let api = Arc::new(FakeApi::default());
        *api.debug.lock().unwrap() = true;
        let mut app = app_with(api.clone());

        app.handle_event(AppEvent::ConfigChecked(Ok(crate::api::DashboardConfig { debug: true })));
        pump_until(&mut app, |_| api.playback_calls() == 1).await;
        assert!(app.debug_log.iter().any(|line| line.contains("Full reload (debug mode)")));
    }
}
