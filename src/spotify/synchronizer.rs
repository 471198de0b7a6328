use super::reconcile::{reconcile, ChangeSet};
use super::state::{LocalPlaybackState, QueueHead, RemoteStatus};
use crate::config::SpotifyConfig;
use crate::error::ApiError;
use crate::flight::{Landing, SingleFlight};
use crate::surface::{Action, ElementId, Surface};

pub const NOT_PLAYING: &str = "Spotify is not playing.";
pub const NOT_AUTHENTICATED: &str = "Spotify is not authenticated";
pub const NOT_AVAILABLE: &str = "Spotify is not available";
pub const NO_NEXT_TRACK: &str = "No next track available";
pub const AUTH_LABEL: &str = "Authenticate with Spotify";

/// Elements owned by the now-playing panel.
const PANEL_ELEMENTS: [ElementId; 12] = [
    ElementId::SpotifyInfo,
    ElementId::SpotifyError,
    ElementId::SpotifyAuth,
    ElementId::CurrentAlbumCover,
    ElementId::CurrentTrackName,
    ElementId::CurrentTrackTime,
    ElementId::FavoriteIcon,
    ElementId::PlayButton,
    ElementId::PauseButton,
    ElementId::NextAlbumCover,
    ElementId::NextTrackName,
    ElementId::NextTrackArtist,
];

/// Why a sync was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Startup,
    Tick,
    Retry,
    Push,
    Focus,
    Manual,
    AfterCommand,
    Coalesced,
    Reload,
}

impl SyncTrigger {
    /// Fired by the synchronizer itself rather than by the user or the server.
    pub fn is_autonomous(self) -> bool {
        matches!(self, SyncTrigger::Tick | SyncTrigger::Retry)
    }
}

/// Handle for one in-flight status fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    seq: u64,
    pub trigger: SyncTrigger,
}

/// Secondary requests a completed sync asks the caller to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    FetchQueue,
    CheckFavorite(String),
    FetchAuthUrl,
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    NeedsAuth { auth_url: Option<String> },
}

/// What the now-playing panel is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Blank,
    Playback,
    Idle,
    Error,
    NeedsAuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Ticker is stopped.
    Idle,
    /// Progress advanced and the time text was updated.
    Advanced,
    /// Local ticking has gone on long enough; sync instead.
    ResyncDue,
}

/// Keeps the now-playing panel converged with `/api/spotify`.
pub struct StatusSynchronizer {
    settings: SpotifyConfig,
    state: LocalPlaybackState,
    panel: Panel,
    auth: AuthState,
    ticker_active: bool,
    flight: SingleFlight,
    last_queue_fetch_ms: Option<u64>,
    retry_at_ms: Option<u64>,
    server_retry_used: bool,
    consecutive_failures: u32,
}

impl StatusSynchronizer {
    pub fn new(settings: SpotifyConfig) -> Self {
        Self {
            settings,
            state: LocalPlaybackState::default(),
            panel: Panel::Blank,
            auth: AuthState::Authenticated,
            ticker_active: false,
            flight: SingleFlight::default(),
            last_queue_fetch_ms: None,
            retry_at_ms: None,
            server_retry_used: false,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> &LocalPlaybackState {
        &self.state
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn ticker_active(&self) -> bool {
        self.ticker_active
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn retry_at_ms(&self) -> Option<u64> {
        self.retry_at_ms
    }

    pub fn is_syncing(&self) -> bool {
        self.flight.is_in_flight()
    }

    // ── sync ─────────────────────────────────────────────────────────

    /// Ask for a status fetch. `None` means no fetch should be issued:
    /// either one is already running, or the trigger is autonomous and
    /// the backend wants authentication first.
    pub fn begin_sync(&mut self, trigger: SyncTrigger) -> Option<SyncTicket> {
        if trigger.is_autonomous() && matches!(self.auth, AuthState::NeedsAuth { .. }) {
            tracing::debug!("Skipping {:?} sync until Spotify is authenticated", trigger);
            return None;
        }
        let seq = self.flight.begin(!trigger.is_autonomous())?;
        Some(SyncTicket { seq, trigger })
    }

    /// Apply the result of the fetch started by `ticket`.
    pub fn complete_sync(
        &mut self,
        ticket: SyncTicket,
        result: Result<Option<RemoteStatus>, ApiError>,
        now_ms: u64,
        surface: &mut dyn Surface,
    ) -> Vec<FollowUp> {
        let resync = match self.flight.land(ticket.seq) {
            Landing::Current { resync } => resync,
            Landing::Stale => {
                tracing::debug!("Dropping superseded Spotify status ({:?})", ticket.trigger);
                return Vec::new();
            }
        };

        let mut follow_ups = match result {
            Ok(Some(status)) => self.apply_status(&status, now_ms, surface),
            Ok(None) => {
                self.apply_idle(now_ms, surface);
                Vec::new()
            }
            Err(e) => self.apply_failure(e, now_ms, surface),
        };

        if resync {
            follow_ups.push(FollowUp::Resync);
        }
        follow_ups
    }

    fn apply_status(
        &mut self,
        status: &RemoteStatus,
        now_ms: u64,
        surface: &mut dyn Surface,
    ) -> Vec<FollowUp> {
        self.auth = AuthState::Authenticated;
        self.consecutive_failures = 0;
        self.server_retry_used = false;
        self.retry_at_ms = None;

        let recovering = self.panel != Panel::Playback;
        if recovering {
            surface.clear(ElementId::SpotifyInfo);
            surface.clear(ElementId::SpotifyError);
            surface.clear(ElementId::SpotifyAuth);
            self.panel = Panel::Playback;
        }

        let mut changes = reconcile(
            &mut self.state,
            status,
            self.settings.drift_tolerance_ms,
            now_ms,
        );
        if recovering {
            changes = ChangeSet::all();
        }
        self.render_playback(changes, status, surface);
        self.ticker_active = self.state.is_playing;

        let mut follow_ups = Vec::new();
        if changes.track_changed {
            tracing::info!("Now playing: {} ({})", status.track_name, status.track_id);
            follow_ups.push(FollowUp::CheckFavorite(status.track_id.clone()));
        }
        let queue_stale = self
            .last_queue_fetch_ms
            .map(|at| now_ms.saturating_sub(at) >= self.settings.queue_refresh_ms)
            .unwrap_or(true);
        if changes.track_changed || queue_stale {
            self.last_queue_fetch_ms = Some(now_ms);
            follow_ups.push(FollowUp::FetchQueue);
        }
        follow_ups
    }

    fn render_playback(&self, changes: ChangeSet, status: &RemoteStatus, surface: &mut dyn Surface) {
        if changes.track_changed {
            surface.set_text(ElementId::CurrentTrackName, &status.track_name);
            surface.set_image(ElementId::CurrentAlbumCover, status.album_art_url.as_deref());
        }
        if changes.track_changed || changes.play_state_changed {
            surface.set_hidden(ElementId::PlayButton, self.state.is_playing);
            surface.set_hidden(ElementId::PauseButton, !self.state.is_playing);
        }
        if changes.any() {
            surface.set_text(ElementId::CurrentTrackTime, &self.state.time_text());
        }
    }

    fn apply_idle(&mut self, now_ms: u64, surface: &mut dyn Surface) {
        self.auth = AuthState::Authenticated;
        self.consecutive_failures = 0;
        self.server_retry_used = false;
        self.retry_at_ms = None;
        self.ticker_active = false;
        self.state = LocalPlaybackState {
            last_sync_at_ms: Some(now_ms),
            ..Default::default()
        };

        if self.panel != Panel::Idle {
            surface.clear(ElementId::SpotifyError);
            surface.clear(ElementId::SpotifyAuth);
            surface.set_text(ElementId::SpotifyInfo, NOT_PLAYING);
            self.hide_buttons(surface);
            self.panel = Panel::Idle;
        }
    }

    fn apply_failure(&mut self, error: ApiError, now_ms: u64, surface: &mut dyn Surface) -> Vec<FollowUp> {
        self.consecutive_failures += 1;

        match error {
            ApiError::AuthRequired { auth_url, .. } => {
                tracing::warn!("Spotify needs authentication");
                self.ticker_active = false;
                self.retry_at_ms = None;
                self.server_retry_used = false;
                self.auth = AuthState::NeedsAuth {
                    auth_url: auth_url.clone(),
                };
                self.show_error(Panel::NeedsAuth, NOT_AUTHENTICATED, surface);

                match auth_url {
                    Some(url) => {
                        Self::render_auth_action(&url, surface);
                        Vec::new()
                    }
                    None => vec![FollowUp::FetchAuthUrl],
                }
            }
            ApiError::ServerError { status, .. } if !self.server_retry_used => {
                let retry_at = now_ms + self.settings.server_retry_delay_ms;
                tracing::warn!(
                    "Spotify status returned {}, retrying in {}ms",
                    status,
                    self.settings.server_retry_delay_ms
                );
                self.server_retry_used = true;
                self.retry_at_ms = Some(retry_at);
                // Only the deferred retry may fetch until it lands
                self.ticker_active = false;
                Vec::new()
            }
            other => {
                tracing::error!("Spotify status failed: {}", other);
                self.ticker_active = false;
                self.retry_at_ms = None;
                self.server_retry_used = false;
                self.show_error(Panel::Error, NOT_AVAILABLE, surface);
                Vec::new()
            }
        }
    }

    fn show_error(&mut self, panel: Panel, message: &str, surface: &mut dyn Surface) {
        if self.panel == panel {
            return;
        }
        surface.clear(ElementId::SpotifyInfo);
        if panel != Panel::NeedsAuth {
            surface.clear(ElementId::SpotifyAuth);
        }
        surface.set_text(ElementId::SpotifyError, message);
        self.hide_buttons(surface);
        self.panel = panel;
    }

    fn hide_buttons(&self, surface: &mut dyn Surface) {
        surface.set_hidden(ElementId::PlayButton, true);
        surface.set_hidden(ElementId::PauseButton, true);
    }

    fn render_auth_action(url: &str, surface: &mut dyn Surface) {
        surface.set_action(
            ElementId::SpotifyAuth,
            Some(Action {
                label: AUTH_LABEL.to_string(),
                url: url.to_string(),
            }),
        );
    }

    /// Result of `GET /api/spotify/auth-url` after a 401 without a URL.
    pub fn apply_auth_url(&mut self, result: Result<String, ApiError>, surface: &mut dyn Surface) {
        let AuthState::NeedsAuth { auth_url } = &mut self.auth else {
            return;
        };
        match result {
            Ok(url) => {
                Self::render_auth_action(&url, surface);
                *auth_url = Some(url);
            }
            Err(e) => tracing::warn!("Could not get Spotify auth URL: {}", e),
        }
    }

    /// Authorization URL to open, if authentication is pending and the URL is known.
    pub fn auth_url(&self) -> Option<&str> {
        match &self.auth {
            AuthState::NeedsAuth { auth_url } => auth_url.as_deref(),
            AuthState::Authenticated => None,
        }
    }

    /// True once the deferred 5xx retry is due; the retry is consumed.
    pub fn retry_due(&mut self, now_ms: u64) -> bool {
        match self.retry_at_ms {
            Some(at) if now_ms >= at => {
                self.retry_at_ms = None;
                true
            }
            _ => false,
        }
    }

    // ── ticker ───────────────────────────────────────────────────────

    pub fn tick(&mut self, now_ms: u64, surface: &mut dyn Surface) -> TickOutcome {
        if !self.ticker_active {
            return TickOutcome::Idle;
        }

        self.state.progress_ms =
            (self.state.progress_ms + self.settings.tick_interval_ms).min(self.state.duration_ms);

        let since_sync = self
            .state
            .last_sync_at_ms
            .map(|at| now_ms.saturating_sub(at))
            .unwrap_or(u64::MAX);
        if since_sync >= self.settings.resync_after_ms
            || self.state.progress_ms >= self.state.duration_ms
        {
            return TickOutcome::ResyncDue;
        }

        surface.set_text(ElementId::CurrentTrackTime, &self.state.time_text());
        TickOutcome::Advanced
    }

    // ── secondary fetches ────────────────────────────────────────────

    pub fn apply_queue(&mut self, result: Result<Option<QueueHead>, ApiError>, surface: &mut dyn Surface) {
        match result {
            Ok(Some(head)) => {
                surface.set_image(ElementId::NextAlbumCover, head.art_url.as_deref());
                surface.set_text(ElementId::NextTrackName, &head.name);
                surface.set_text(ElementId::NextTrackArtist, &head.artist_line());
            }
            Ok(None) => {
                surface.set_image(ElementId::NextAlbumCover, None);
                surface.set_text(ElementId::NextTrackName, NO_NEXT_TRACK);
                surface.set_text(ElementId::NextTrackArtist, "");
            }
            Err(e) => tracing::warn!("Error fetching Spotify queue: {}", e),
        }
    }

    /// Favorite status for `track_id`, from either the check or a toggle.
    /// Ignored when the held track has moved on.
    pub fn apply_favorite(
        &mut self,
        track_id: &str,
        result: Result<bool, ApiError>,
        surface: &mut dyn Surface,
    ) {
        if self.state.track_id.as_deref() != Some(track_id) {
            tracing::debug!("Dropping favorite status for previous track {}", track_id);
            return;
        }
        match result {
            Ok(is_favorite) => {
                self.state.is_favorite = Some(is_favorite);
                surface.set_hidden(ElementId::FavoriteIcon, false);
                surface.set_class(ElementId::FavoriteIcon, "active", is_favorite);
                surface.set_class(ElementId::FavoriteIcon, "inactive", !is_favorite);
            }
            Err(e) => {
                tracing::warn!("Error checking favorite status: {}", e);
                surface.set_hidden(ElementId::FavoriteIcon, true);
            }
        }
    }

    /// Track to toggle; `None` when nothing is loaded.
    pub fn favorite_target(&self) -> Option<String> {
        self.state.track_id.clone()
    }

    // ── reload ───────────────────────────────────────────────────────

    /// Forget everything and blank the panel. Outstanding tickets go stale.
    pub fn reset(&mut self, surface: &mut dyn Surface) {
        self.flight.invalidate();
        self.state = LocalPlaybackState::default();
        self.panel = Panel::Blank;
        self.auth = AuthState::Authenticated;
        self.ticker_active = false;
        self.last_queue_fetch_ms = None;
        self.retry_at_ms = None;
        self.server_retry_used = false;
        self.consecutive_failures = 0;
        for id in PANEL_ELEMENTS {
            surface.clear(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::PlaybackResponse;
    use crate::surface::ElementStore;

    fn synchronizer() -> StatusSynchronizer {
        StatusSynchronizer::new(SpotifyConfig::default())
    }

    fn status(track: &str, progress_ms: u64, is_playing: bool) -> RemoteStatus {
        RemoteStatus {
            is_playing,
            track_id: track.to_string(),
            track_name: format!("Track {track}"),
            album_art_url: Some(format!("https://img/{track}")),
            progress_ms,
            duration_ms: 200_000,
            queue_head: None,
        }
    }

    fn sync_with(
        sync: &mut StatusSynchronizer,
        store: &mut ElementStore,
        result: Result<Option<RemoteStatus>, ApiError>,
        now_ms: u64,
    ) -> Vec<FollowUp> {
        let ticket = sync.begin_sync(SyncTrigger::Manual).unwrap();
        sync.complete_sync(ticket, result, now_ms, store)
    }

    fn unauthorized(auth_url: Option<&str>) -> ApiError {
        ApiError::AuthRequired {
            endpoint: "/api/spotify".into(),
            auth_url: auth_url.map(str::to_string),
        }
    }

    #[test]
    fn test_playing_status_renders_time_and_buttons() {
        let json = r#"{"is_playing": true, "item": {"id": "A", "name": "A", "duration_ms": 200000}, "progress_ms": 0}"#;
        let fetched = serde_json::from_str::<PlaybackResponse>(json)
            .unwrap()
            .into_status();

        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        let follow_ups = sync_with(&mut sync, &mut store, Ok(fetched), 1_000);

        assert_eq!(store.text(ElementId::CurrentTrackTime), Some("0:00 / 3:20"));
        assert!(!store.is_visible(ElementId::PlayButton));
        assert!(store.is_visible(ElementId::PauseButton));
        assert!(sync.ticker_active());
        assert!(follow_ups.contains(&FollowUp::CheckFavorite("A".into())));
        assert!(follow_ups.contains(&FollowUp::FetchQueue));
    }

    #[test]
    fn test_unchanged_status_writes_nothing() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 10_000, true))), 0);

        let name_writes = store.write_count(ElementId::CurrentTrackName);
        let total = store.total_writes();

        sync_with(&mut sync, &mut store, Ok(Some(status("A", 11_500, true))), 1_500);

        assert_eq!(store.write_count(ElementId::CurrentTrackName), name_writes);
        assert_eq!(store.write_count(ElementId::CurrentAlbumCover), 1);
        assert_eq!(store.total_writes(), total);
        assert_eq!(sync.state().last_sync_at_ms, Some(1_500));
    }

    #[test]
    fn test_progress_never_exceeds_duration() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 999_999, true))), 0);
        assert!(sync.state().progress_ms <= sync.state().duration_ms);
        assert_eq!(store.text(ElementId::CurrentTrackTime), Some("3:20 / 3:20"));
    }

    #[test]
    fn test_pause_flips_buttons_only() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 10_000, true))), 0);
        let name_writes = store.write_count(ElementId::CurrentTrackName);

        let follow_ups = sync_with(&mut sync, &mut store, Ok(Some(status("A", 10_000, false))), 1_000);

        assert!(store.is_visible(ElementId::PlayButton));
        assert!(!store.is_visible(ElementId::PauseButton));
        assert_eq!(store.write_count(ElementId::CurrentTrackName), name_writes);
        assert!(!sync.ticker_active());
        assert!(follow_ups.is_empty());
    }

    #[test]
    fn test_unauthorized_renders_single_auth_action() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();

        sync_with(&mut sync, &mut store, Err(unauthorized(Some("https://x"))), 0);
        sync_with(&mut sync, &mut store, Err(unauthorized(Some("https://x"))), 5_000);

        assert!(store
            .text(ElementId::SpotifyError)
            .unwrap()
            .contains("not authenticated"));
        let actions: Vec<_> = store.actions().collect();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].1.url, "https://x");
        assert_eq!(sync.auth_url(), Some("https://x"));
        assert_eq!(sync.panel(), Panel::NeedsAuth);
    }

    #[test]
    fn test_unauthorized_halts_autonomous_syncs() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);
        sync_with(&mut sync, &mut store, Err(unauthorized(Some("https://x"))), 1_000);

        assert_eq!(sync.tick(2_000, &mut store), TickOutcome::Idle);
        assert!(sync.begin_sync(SyncTrigger::Tick).is_none());
        assert!(sync.begin_sync(SyncTrigger::Retry).is_none());
        assert!(sync.begin_sync(SyncTrigger::Manual).is_some());
    }

    #[test]
    fn test_unauthorized_without_url_fetches_it() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        let follow_ups = sync_with(&mut sync, &mut store, Err(unauthorized(None)), 0);
        assert_eq!(follow_ups, vec![FollowUp::FetchAuthUrl]);
        assert_eq!(store.actions().count(), 0);

        sync.apply_auth_url(Ok("https://auth".into()), &mut store);
        assert_eq!(store.action(ElementId::SpotifyAuth).unwrap().url, "https://auth");
        assert_eq!(sync.auth_url(), Some("https://auth"));
    }

    #[test]
    fn test_recovery_after_auth_clears_error() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Err(unauthorized(Some("https://x"))), 0);
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 1_000);

        assert!(store.text(ElementId::SpotifyError).is_none());
        assert_eq!(store.actions().count(), 0);
        assert_eq!(sync.auth(), &AuthState::Authenticated);
        assert_eq!(store.text(ElementId::CurrentTrackName), Some("Track A"));
    }

    #[test]
    fn test_server_error_retries_once_without_flash() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        let server_error = || ApiError::ServerError {
            endpoint: "/api/spotify".into(),
            status: 502,
        };

        sync_with(&mut sync, &mut store, Err(server_error()), 1_000);
        assert!(store.text(ElementId::SpotifyError).is_none());
        assert_eq!(sync.retry_at_ms(), Some(31_000));
        assert!(!sync.retry_due(30_999));
        assert!(sync.retry_due(31_000));
        assert!(!sync.retry_due(31_001));

        let ticket = sync.begin_sync(SyncTrigger::Retry).unwrap();
        sync.complete_sync(ticket, Err(server_error()), 31_500, &mut store);
        assert_eq!(store.text(ElementId::SpotifyError), Some(NOT_AVAILABLE));
        assert_eq!(sync.retry_at_ms(), None);
    }

    #[test]
    fn test_server_error_while_playing_waits_for_retry() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);

        let ticket = sync.begin_sync(SyncTrigger::Tick).unwrap();
        let server_error = ApiError::ServerError {
            endpoint: "/api/spotify".into(),
            status: 503,
        };
        sync.complete_sync(ticket, Err(server_error), 20_000, &mut store);
        assert_eq!(sync.retry_at_ms(), Some(50_000));
        assert!(!sync.ticker_active());

        for second in 21..50u64 {
            assert_eq!(sync.tick(second * 1_000, &mut store), TickOutcome::Idle);
            assert!(!sync.retry_due(second * 1_000));
        }
        assert!(store.text(ElementId::SpotifyError).is_none());

        assert!(sync.retry_due(50_000));
        let ticket = sync.begin_sync(SyncTrigger::Retry).unwrap();
        sync.complete_sync(ticket, Ok(Some(status("A", 50_000, true))), 50_200, &mut store);
        assert!(sync.ticker_active());
        assert!(store.text(ElementId::SpotifyError).is_none());
        assert_eq!(sync.retry_at_ms(), None);
    }

    #[test]
    fn test_network_failure_shows_error_and_stops_ticker() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);
        sync_with(
            &mut sync,
            &mut store,
            Err(ApiError::network("/api/spotify", "connection refused")),
            1_000,
        );

        assert_eq!(store.text(ElementId::SpotifyError), Some(NOT_AVAILABLE));
        assert!(!sync.ticker_active());
        assert_eq!(sync.tick(2_000, &mut store), TickOutcome::Idle);
        assert_eq!(sync.consecutive_failures(), 1);
    }

    #[test]
    fn test_idle_playback() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);
        sync_with(&mut sync, &mut store, Ok(None), 1_000);

        assert_eq!(store.text(ElementId::SpotifyInfo), Some(NOT_PLAYING));
        assert!(!store.is_visible(ElementId::PlayButton));
        assert!(!store.is_visible(ElementId::PauseButton));
        assert!(!sync.ticker_active());
        assert_eq!(sync.state().track_id, None);
    }

    #[test]
    fn test_forced_sync_at_twenty_seconds() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);

        let outcomes: Vec<TickOutcome> = (1..=21u64)
            .map(|second| sync.tick(second * 1_000, &mut store))
            .collect();

        assert!(outcomes[..19].iter().all(|o| *o == TickOutcome::Advanced));
        assert_eq!(outcomes[19], TickOutcome::ResyncDue);
        assert_eq!(store.text(ElementId::CurrentTrackTime), Some("0:19 / 3:20"));
    }

    #[test]
    fn test_track_end_forces_sync() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("A", 198_500, true))), 0);

        assert_eq!(sync.tick(1_000, &mut store), TickOutcome::Advanced);
        assert_eq!(store.text(ElementId::CurrentTrackTime), Some("3:19 / 3:20"));
        assert_eq!(sync.tick(2_000, &mut store), TickOutcome::ResyncDue);
        assert_eq!(sync.state().progress_ms, 200_000);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();

        let old = sync.begin_sync(SyncTrigger::Startup).unwrap();
        sync.reset(&mut store);
        let new = sync.begin_sync(SyncTrigger::Reload).unwrap();

        let stale = sync.complete_sync(old, Ok(Some(status("OLD", 0, true))), 10, &mut store);
        assert!(stale.is_empty());
        assert_eq!(sync.state().track_id, None);

        sync.complete_sync(new, Ok(Some(status("NEW", 0, true))), 20, &mut store);
        assert_eq!(sync.state().track_id.as_deref(), Some("NEW"));
    }

    #[test]
    fn test_overlapping_requests_coalesce() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();

        let ticket = sync.begin_sync(SyncTrigger::Startup).unwrap();
        assert!(sync.begin_sync(SyncTrigger::Tick).is_none());
        let follow_ups = sync.complete_sync(ticket, Ok(Some(status("A", 0, true))), 0, &mut store);
        assert!(!follow_ups.contains(&FollowUp::Resync));

        let ticket = sync.begin_sync(SyncTrigger::Startup).unwrap();
        assert!(sync.begin_sync(SyncTrigger::Push).is_none());
        let follow_ups = sync.complete_sync(ticket, Ok(Some(status("A", 0, true))), 1, &mut store);
        assert!(follow_ups.contains(&FollowUp::Resync));
    }

    #[test]
    fn test_queue_fetch_is_rate_limited() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();

        let first = sync_with(&mut sync, &mut store, Ok(Some(status("A", 0, true))), 0);
        assert!(first.contains(&FollowUp::FetchQueue));

        let same = sync_with(&mut sync, &mut store, Ok(Some(status("A", 60_000, true))), 60_000);
        assert!(!same.contains(&FollowUp::FetchQueue));

        let later = sync_with(&mut sync, &mut store, Ok(Some(status("A", 300_000, true))), 300_000);
        assert!(later.contains(&FollowUp::FetchQueue));

        let changed = sync_with(&mut sync, &mut store, Ok(Some(status("B", 0, true))), 301_000);
        assert!(changed.contains(&FollowUp::FetchQueue));
    }

    #[test]
    fn test_queue_rendering() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync.apply_queue(
            Ok(Some(QueueHead {
                name: "Next".into(),
                artists: vec!["X".into(), "Y".into()],
                art_url: Some("https://img/next".into()),
            })),
            &mut store,
        );
        assert_eq!(store.text(ElementId::NextTrackName), Some("Next"));
        assert_eq!(store.text(ElementId::NextTrackArtist), Some("X, Y"));

        sync.apply_queue(Ok(None), &mut store);
        assert_eq!(store.text(ElementId::NextTrackName), Some(NO_NEXT_TRACK));
        assert_eq!(store.image(ElementId::NextAlbumCover), None);
    }

    #[test]
    fn test_favorite_for_previous_track_is_ignored() {
        let mut sync = synchronizer();
        let mut store = ElementStore::new();
        sync_with(&mut sync, &mut store, Ok(Some(status("B", 0, true))), 0);

        sync.apply_favorite("A", Ok(true), &mut store);
        assert_eq!(store.write_count(ElementId::FavoriteIcon), 0);

        sync.apply_favorite("B", Ok(true), &mut store);
        assert!(store.has_class(ElementId::FavoriteIcon, "active"));
        assert!(!store.has_class(ElementId::FavoriteIcon, "inactive"));
        assert_eq!(sync.state().is_favorite, Some(true));

        sync.apply_favorite("B", Err(ApiError::network("/api/spotify/is-favorite/B", "boom")), &mut store);
        assert!(!store.is_visible(ElementId::FavoriteIcon));
    }
}
