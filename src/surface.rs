//! The rendering surface the synchronizers write to.
//!
//! Elements are addressed by the fixed ids of the dashboard page. The
//! synchronizers only ever write; the terminal UI reads the store back when
//! drawing a frame. Every write is counted per element so callers can tell
//! whether a sync touched a given element at all.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    SpotifyInfo,
    SpotifyError,
    SpotifyAuth,
    CurrentAlbumCover,
    CurrentTrackName,
    CurrentTrackTime,
    FavoriteIcon,
    PlayButton,
    PauseButton,
    NextAlbumCover,
    NextTrackName,
    NextTrackArtist,
    WeatherIcon,
    WeatherTemperature,
    WeatherDescription,
    WeatherFeelsLike,
    WeatherHumidity,
    WeatherWind,
    WeatherPrecipitation,
    WeatherUpdated,
    WeatherToday,
    WeatherTomorrow,
    WeatherError,
}

impl ElementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::SpotifyInfo => "spotify-info",
            ElementId::SpotifyError => "spotify-error",
            ElementId::SpotifyAuth => "spotify-auth",
            ElementId::CurrentAlbumCover => "current-album-cover",
            ElementId::CurrentTrackName => "current-track-name",
            ElementId::CurrentTrackTime => "current-track-time",
            ElementId::FavoriteIcon => "favorite-icon",
            ElementId::PlayButton => "play-button",
            ElementId::PauseButton => "pause-button",
            ElementId::NextAlbumCover => "next-album-cover",
            ElementId::NextTrackName => "next-track-name",
            ElementId::NextTrackArtist => "next-track-artist",
            ElementId::WeatherIcon => "weather-icon",
            ElementId::WeatherTemperature => "weather-temperature",
            ElementId::WeatherDescription => "weather-description",
            ElementId::WeatherFeelsLike => "weather-feels-like",
            ElementId::WeatherHumidity => "weather-humidity",
            ElementId::WeatherWind => "weather-wind",
            ElementId::WeatherPrecipitation => "weather-precipitation",
            ElementId::WeatherUpdated => "weather-updated",
            ElementId::WeatherToday => "weather-today",
            ElementId::WeatherTomorrow => "weather-tomorrow",
            ElementId::WeatherError => "weather-error",
        }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clickable affordance attached to an element (the authenticate link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: Option<String>,
    pub image: Option<String>,
    pub hidden: bool,
    pub classes: BTreeSet<&'static str>,
    pub action: Option<Action>,
}

/// Write side of the rendering surface.
pub trait Surface {
    fn set_text(&mut self, id: ElementId, text: &str);
    fn set_image(&mut self, id: ElementId, url: Option<&str>);
    fn set_hidden(&mut self, id: ElementId, hidden: bool);
    fn set_class(&mut self, id: ElementId, class: &'static str, on: bool);
    /// An element holds at most one action; setting it again replaces it.
    fn set_action(&mut self, id: ElementId, action: Option<Action>);
    /// Remove the element entirely.
    fn clear(&mut self, id: ElementId);
}

/// In-memory surface drawn by the terminal UI.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    writes: HashMap<ElementId, u64>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, id: ElementId) -> &mut Element {
        *self.writes.entry(id).or_insert(0) += 1;
        self.elements.entry(id).or_default()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(|e| e.text.as_deref())
    }

    pub fn image(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(|e| e.image.as_deref())
    }

    /// Present and not hidden.
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.get(id).map(|e| !e.hidden).unwrap_or(false)
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).map(|e| e.classes.contains(class)).unwrap_or(false)
    }

    pub fn action(&self, id: ElementId) -> Option<&Action> {
        self.get(id).and_then(|e| e.action.as_ref())
    }

    /// All actions currently rendered, across elements.
    pub fn actions(&self) -> impl Iterator<Item = (ElementId, &Action)> {
        self.elements
            .iter()
            .filter_map(|(id, e)| e.action.as_ref().map(|a| (*id, a)))
    }

    /// Number of writes an element has received since the store was created.
    pub fn write_count(&self, id: ElementId) -> u64 {
        self.writes.get(&id).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> u64 {
        self.writes.values().sum()
    }

    /// Drop every element. Write counters survive.
    pub fn clear_all(&mut self) {
        self.elements.clear();
    }
}

impl Surface for ElementStore {
    fn set_text(&mut self, id: ElementId, text: &str) {
        self.touch(id).text = Some(text.to_string());
    }

    fn set_image(&mut self, id: ElementId, url: Option<&str>) {
        self.touch(id).image = url.map(str::to_string);
    }

    fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.touch(id).hidden = hidden;
    }

    fn set_class(&mut self, id: ElementId, class: &'static str, on: bool) {
        let element = self.touch(id);
        if on {
            element.classes.insert(class);
        } else {
            element.classes.remove(class);
        }
    }

    fn set_action(&mut self, id: ElementId, action: Option<Action>) {
        self.touch(id).action = action;
    }

    fn clear(&mut self, id: ElementId) {
        *self.writes.entry(id).or_insert(0) += 1;
        self.elements.remove(&id);
    }
}
