pub mod state;
mod events;
mod reload;
mod spotify;
mod weather;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use crate::album_art::AlbumArtCache;
use crate::api::{DashboardApi, HttpApi, Webhook};
use crate::config::Config;
use crate::event::AppEvent;
use crate::poller::{self, PollReport, PollingPolicy, WebhookPoller};
use crate::push::{socketio, ConnectivityWatcher};
use crate::schedule::RefreshSchedule;
use crate::spotify::StatusSynchronizer;
use crate::surface::ElementStore;
use crate::ui::Theme;
use crate::weather::WeatherSynchronizer;

pub use state::{HelpState, StatusMessage, Timers};

const DEBUG_LOG_LEN: usize = 100;

pub struct App {
    pub config: Config,
    api: Arc<dyn DashboardApi>,

    // What the panels draw
    pub surface: ElementStore,
    pub spotify: StatusSynchronizer,
    pub weather: WeatherSynchronizer,
    pub watcher: ConnectivityWatcher,
    schedule: RefreshSchedule,

    pub album_art_cache: Option<AlbumArtCache>,
    pending_art: HashSet<String>,

    pub spotify_poll: Option<PollReport>,
    pub weather_poll: Option<PollReport>,

    pub theme: Theme,
    pub show_debug: bool,
    pub show_help: bool,
    pub help: HelpState,
    pub debug_log: VecDeque<String>,
    pub status_message: Option<StatusMessage>,
    pub focused: bool,

    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    pollers_enabled: watch::Sender<bool>,
    started: Instant,
    timers: Timers,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = HttpApi::new(
            &config.server.base_url,
            Duration::from_millis(config.server.request_timeout_ms),
        )?;
        Self::with_api(config, Arc::new(api))
    }

    pub fn with_api(config: Config, api: Arc<dyn DashboardApi>) -> Result<Self> {
        let mut debug_log = VecDeque::new();
        debug_log.push_back(format!("Backend: {}", config.server.base_url));

        let album_art_cache = if config.ui.show_album_art {
            match AlbumArtCache::new(20) {
                Ok(cache) => {
                    debug_log.push_back("Album art cache initialized".to_string());
                    Some(cache)
                }
                Err(e) => {
                    debug_log.push_back(format!("Album art disabled: {}", e));
                    None
                }
            }
        } else {
            None
        };

        let theme = Theme::from_preset(&config.ui.theme).unwrap_or_else(|| {
            debug_log.push_back(format!("Unknown theme '{}', using dark", config.ui.theme));
            Theme::dark()
        });

        let started = Instant::now();
        let schedule = RefreshSchedule::new(&config.reload, 0, chrono::Local::now().naive_local())?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (pollers_enabled, _) = watch::channel(true);

        Ok(Self {
            spotify: StatusSynchronizer::new(config.spotify.clone()),
            weather: WeatherSynchronizer::new(),
            watcher: ConnectivityWatcher::new(),
            surface: ElementStore::new(),
            schedule,
            album_art_cache,
            pending_art: HashSet::new(),
            spotify_poll: None,
            weather_poll: None,
            theme,
            show_debug: false,
            show_help: false,
            help: HelpState::default(),
            debug_log,
            status_message: None,
            focused: true,
            tx,
            rx,
            pollers_enabled,
            started,
            timers: Timers::default(),
            api,
            config,
        })
    }

    /// Spawn the long-lived tasks: both webhook pollers and the push client.
    pub fn start_background(&mut self) {
        let pollers = [
            (Webhook::Spotify, self.config.pollers.spotify.clone()),
            (Webhook::Weather, self.config.pollers.weather.clone()),
        ];
        for (hook, settings) in pollers {
            let poller = WebhookPoller::new(hook, PollingPolicy::from(&settings));
            tokio::spawn(poller::run(
                poller,
                self.api.clone(),
                self.pollers_enabled.subscribe(),
                poller::first_poll_delay(&settings),
                self.tx.clone(),
            ));
        }

        match socketio::socket_url(&self.config.server.base_url) {
            Ok(url) => {
                self.add_debug(format!("Push channel: {}", url));
                tokio::spawn(socketio::run(url, self.tx.clone()));
            }
            Err(e) => self.set_status_error(format!("Push channel disabled: {}", e)),
        }
    }

    /// First sync of both panels.
    pub fn start(&mut self) {
        self.request_spotify_sync(crate::spotify::SyncTrigger::Startup);
        self.request_weather_sync(crate::weather::WeatherTrigger::Startup);
        let now = self.now_ms();
        self.timers = Timers {
            last_tick_ms: now,
            last_weather_ms: now,
            last_backend_check_ms: now,
        };
    }

    /// Milliseconds since the app started.
    pub fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn add_debug(&mut self, msg: String) {
        tracing::debug!("{}", msg);
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.debug_log.push_back(format!("[{}] {}", timestamp, msg));
        while self.debug_log.len() > DEBUG_LOG_LEN {
            self.debug_log.pop_front();
        }
    }

    pub fn set_status_error(&mut self, msg: String) {
        tracing::warn!("{}", msg);
        self.status_message = Some(StatusMessage {
            message: msg.clone(),
            is_error: true,
            timestamp: Instant::now(),
        });
        self.add_debug(msg);
    }

    pub fn set_status_info(&mut self, msg: String) {
        self.status_message = Some(StatusMessage {
            message: msg,
            is_error: false,
            timestamp: Instant::now(),
        });
    }

    pub fn clear_expired_status(&mut self) {
        let lifetime = Duration::from_millis(self.config.ui.status_message_ms);
        if let Some(ref msg) = self.status_message {
            if msg.is_expired(lifetime) {
                self.status_message = None;
            }
        }
    }

    /// Terminal focus stands in for page visibility: pollers pause while
    /// unfocused and the Spotify panel resyncs on return.
    pub fn set_focus(&mut self, focused: bool) {
        if self.focused == focused {
            return;
        }
        self.focused = focused;
        self.pollers_enabled.send_replace(focused);
        self.add_debug(format!("Terminal {}", if focused { "focused" } else { "unfocused" }));
        if focused {
            self.request_spotify_sync(crate::spotify::SyncTrigger::Focus);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.config.ui.theme = self.theme.name.clone();
        match self.config.save() {
            Ok(()) => self.set_status_info(format!("Theme: {}", self.theme.name)),
            Err(e) => self.set_status_error(format!("Could not save theme: {}", e)),
        }
    }

    /// `r`: resync both panels without resetting anything.
    pub fn manual_sync(&mut self) {
        self.add_debug("Manual sync".to_string());
        self.request_spotify_sync(crate::spotify::SyncTrigger::Manual);
        self.request_weather_sync(crate::weather::WeatherTrigger::Manual);
    }

    pub fn clear_debug_log(&mut self) {
        self.debug_log.clear();
        self.set_status_info("Debug log cleared".to_string());
    }

    /// Run every job whose time has come. Called once per frame.
    pub fn update(&mut self) {
        let now = self.now_ms();
        self.run_spotify_timers(now);
        self.run_weather_timer(now);
        self.run_reload_timers(now);
        self.clear_expired_status();
    }

    /// Apply everything the background tasks have reported so far.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the next background result.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    fn spawn_task<F>(&self, task: F)
    where
        F: std::future::Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }
}
