//! Change detection between held and fetched playback state.

use super::state::{LocalPlaybackState, RemoteStatus};

/// Which parts of the held state a fetched status disagrees with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub track_changed: bool,
    pub play_state_changed: bool,
    pub progress_drifted: bool,
}

impl ChangeSet {
    pub fn any(&self) -> bool {
        self.track_changed || self.play_state_changed || self.progress_drifted
    }

    /// Everything changed; used to force a full render.
    pub fn all() -> Self {
        Self {
            track_changed: true,
            play_state_changed: true,
            progress_drifted: true,
        }
    }
}

pub fn diff(held: &LocalPlaybackState, fetched: &RemoteStatus, tolerance_ms: u64) -> ChangeSet {
    ChangeSet {
        track_changed: held.track_id.as_deref() != Some(fetched.track_id.as_str()),
        play_state_changed: held.is_playing != fetched.is_playing,
        progress_drifted: held.progress_ms.abs_diff(fetched.progress_ms) > tolerance_ms,
    }
}

/// Fold a fetched status into the held state.
///
/// Fields are replaced only when something changed beyond the tolerance.
/// The sync timestamp always moves.
pub fn reconcile(
    held: &mut LocalPlaybackState,
    fetched: &RemoteStatus,
    tolerance_ms: u64,
    now_ms: u64,
) -> ChangeSet {
    let changes = diff(held, fetched, tolerance_ms);

    if changes.any() {
        if changes.track_changed {
            held.track_id = Some(fetched.track_id.clone());
            held.is_favorite = None;
        }
        held.duration_ms = fetched.duration_ms;
        held.progress_ms = fetched.progress_ms.min(fetched.duration_ms);
        held.is_playing = fetched.is_playing;
    }

    held.last_sync_at_ms = Some(now_ms);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(track: &str, progress_ms: u64, duration_ms: u64, is_playing: bool) -> RemoteStatus {
        RemoteStatus {
            is_playing,
            track_id: track.to_string(),
            track_name: format!("Track {track}"),
            album_art_url: None,
            progress_ms,
            duration_ms,
            queue_head: None,
        }
    }

    #[test]
    fn test_first_status_is_a_track_change() {
        let mut held = LocalPlaybackState::default();
        let changes = reconcile(&mut held, &status("A", 0, 200_000, true), 2000, 10);
        assert!(changes.track_changed);
        assert_eq!(held.track_id.as_deref(), Some("A"));
        assert_eq!(held.duration_ms, 200_000);
        assert!(held.is_playing);
        assert_eq!(held.last_sync_at_ms, Some(10));
    }

    #[test]
    fn test_small_drift_is_ignored() {
        let mut held = LocalPlaybackState::default();
        reconcile(&mut held, &status("A", 10_000, 200_000, true), 2000, 0);
        held.progress_ms = 12_000; // local ticking

        let changes = reconcile(&mut held, &status("A", 14_000, 200_000, true), 2000, 5000);
        assert!(!changes.any());
        assert_eq!(held.progress_ms, 12_000);
        assert_eq!(held.last_sync_at_ms, Some(5000));
    }

    #[test]
    fn test_drift_beyond_tolerance_replaces_progress() {
        let mut held = LocalPlaybackState::default();
        reconcile(&mut held, &status("A", 10_000, 200_000, true), 2000, 0);

        let changes = reconcile(&mut held, &status("A", 12_001, 200_000, true), 2000, 1);
        assert!(changes.progress_drifted);
        assert!(!changes.track_changed);
        assert_eq!(held.progress_ms, 12_001);
    }

    #[test]
    fn test_play_state_change() {
        let mut held = LocalPlaybackState::default();
        reconcile(&mut held, &status("A", 10_000, 200_000, true), 2000, 0);
        let changes = reconcile(&mut held, &status("A", 10_000, 200_000, false), 2000, 1);
        assert!(changes.play_state_changed);
        assert!(!held.is_playing);
    }

    #[test]
    fn test_progress_is_clamped_to_duration() {
        let mut held = LocalPlaybackState::default();
        reconcile(&mut held, &status("A", 250_000, 200_000, true), 2000, 0);
        assert_eq!(held.progress_ms, 200_000);
        assert!(held.progress_ms <= held.duration_ms);
    }

    #[test]
    fn test_track_change_forgets_favorite() {
        let mut held = LocalPlaybackState::default();
        reconcile(&mut held, &status("A", 0, 200_000, true), 2000, 0);
        held.is_favorite = Some(true);
        reconcile(&mut held, &status("B", 0, 180_000, true), 2000, 1);
        assert_eq!(held.is_favorite, None);
    }
}
