pub mod help;
pub mod keybindings;
pub mod now_playing;
pub mod status_bar;
pub mod theme;
pub mod weather;

pub use help::{render_help_panel, HelpPanelState};
pub use keybindings::help_content_height;
pub use now_playing::{render_now_playing, NowPlayingState};
pub use status_bar::{render_status_bar, StatusBarState};
pub use theme::Theme;
pub use weather::render_weather;
