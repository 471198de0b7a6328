//! Now-playing panel: held playback state, change detection and the
//! synchronizer that renders it.

pub mod reconcile;
pub mod state;
pub mod synchronizer;

pub use state::{format_clock, LocalPlaybackState, QueueHead, RemoteStatus};
pub use synchronizer::{
    AuthState, FollowUp, Panel, StatusSynchronizer, SyncTicket, SyncTrigger, TickOutcome,
};
