use std::time::{Duration, Instant};

/// Transient message shown in the status bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub is_error: bool,
    pub timestamp: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.timestamp.elapsed() > lifetime
    }
}

/// Last time each periodic job ran, in app milliseconds
#[derive(Debug, Default, Clone, Copy)]
pub struct Timers {
    pub last_tick_ms: u64,
    pub last_weather_ms: u64,
    pub last_backend_check_ms: u64,
}

/// Help overlay scroll position
#[derive(Debug, Default, Clone, Copy)]
pub struct HelpState {
    pub scroll_offset: usize,
}
