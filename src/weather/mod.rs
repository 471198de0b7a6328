//! Weather panel.

pub mod codes;
pub mod report;

pub use report::{CurrentConditions, DailyForecast, WeatherReport};

use crate::error::ApiError;
use crate::flight::{Landing, SingleFlight};
use crate::surface::{ElementId, Surface};

pub const NOT_AVAILABLE: &str = "Weather not available";

const PANEL_ELEMENTS: [ElementId; 11] = [
    ElementId::WeatherIcon,
    ElementId::WeatherTemperature,
    ElementId::WeatherDescription,
    ElementId::WeatherFeelsLike,
    ElementId::WeatherHumidity,
    ElementId::WeatherWind,
    ElementId::WeatherPrecipitation,
    ElementId::WeatherUpdated,
    ElementId::WeatherToday,
    ElementId::WeatherTomorrow,
    ElementId::WeatherError,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherTrigger {
    Startup,
    Interval,
    Push,
    Settled,
    Manual,
    Coalesced,
    Reload,
}

impl WeatherTrigger {
    pub fn is_autonomous(self) -> bool {
        matches!(self, WeatherTrigger::Interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherTicket {
    seq: u64,
    pub trigger: WeatherTrigger,
}

#[derive(Default)]
pub struct WeatherSynchronizer {
    flight: SingleFlight,
    shown: Option<WeatherReport>,
    failed: bool,
}

impl WeatherSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.shown.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn begin_sync(&mut self, trigger: WeatherTrigger) -> Option<WeatherTicket> {
        let seq = self.flight.begin(!trigger.is_autonomous())?;
        Some(WeatherTicket { seq, trigger })
    }

    /// Returns true when another sync was requested while this one ran.
    pub fn complete_sync(
        &mut self,
        ticket: WeatherTicket,
        result: Result<WeatherReport, ApiError>,
        surface: &mut dyn Surface,
    ) -> bool {
        let resync = match self.flight.land(ticket.seq) {
            Landing::Current { resync } => resync,
            Landing::Stale => return false,
        };

        match result {
            Ok(report) => {
                if self.failed {
                    surface.clear(ElementId::WeatherError);
                    self.failed = false;
                }
                if self.shown.as_ref() != Some(&report) {
                    render(&report, surface);
                    self.shown = Some(report);
                }
            }
            Err(e) => {
                tracing::error!("Error fetching weather: {}", e);
                if !self.failed {
                    surface.set_text(ElementId::WeatherError, NOT_AVAILABLE);
                    self.failed = true;
                }
            }
        }
        resync
    }

    pub fn reset(&mut self, surface: &mut dyn Surface) {
        self.flight.invalidate();
        self.shown = None;
        self.failed = false;
        for id in PANEL_ELEMENTS {
            surface.clear(id);
        }
    }
}

fn degrees(value: Option<f64>) -> String {
    value
        .map(|v| format!("{}°", v.round() as i64))
        .unwrap_or_else(|| "–".to_string())
}

fn render(report: &WeatherReport, surface: &mut dyn Surface) {
    let current = &report.current;
    let code = current.code();
    let is_day = current.is_day();

    match code {
        Some(code) => {
            surface.set_image(ElementId::WeatherIcon, Some(&codes::icon_name(code, is_day)));
            surface.set_text(ElementId::WeatherIcon, codes::glyph(code, is_day));
            surface.set_text(ElementId::WeatherDescription, codes::description(code));
        }
        None => {
            surface.set_image(ElementId::WeatherIcon, Some("unknown"));
            surface.set_text(ElementId::WeatherIcon, "?");
            surface.set_text(ElementId::WeatherDescription, codes::description(u8::MAX));
        }
    }

    surface.set_text(
        ElementId::WeatherTemperature,
        &format!("{}C", degrees(current.temperature_2m)),
    );
    surface.set_text(
        ElementId::WeatherFeelsLike,
        &format!("Feels like {}C", degrees(current.apparent_temperature)),
    );
    match current.relative_humidity_2m {
        Some(humidity) => surface.set_text(
            ElementId::WeatherHumidity,
            &format!("Humidity {}%", humidity.round() as i64),
        ),
        None => surface.clear(ElementId::WeatherHumidity),
    }
    match current.wind_speed_10m {
        Some(wind) => surface.set_text(ElementId::WeatherWind, &format!("Wind {:.0} km/h", wind)),
        None => surface.clear(ElementId::WeatherWind),
    }
    match current.precipitation {
        Some(precipitation) => surface.set_text(
            ElementId::WeatherPrecipitation,
            &format!("Precipitation {:.1} mm", precipitation),
        ),
        None => surface.clear(ElementId::WeatherPrecipitation),
    }
    match current.observed_at() {
        Some(at) => surface.set_text(ElementId::WeatherUpdated, &format!("Updated {at}")),
        None => surface.clear(ElementId::WeatherUpdated),
    }

    render_day(ElementId::WeatherToday, "Today", report.today(), surface);
    render_day(ElementId::WeatherTomorrow, "Tomorrow", report.tomorrow(), surface);
}

fn render_day(id: ElementId, label: &str, day: Option<&DailyForecast>, surface: &mut dyn Surface) {
    let Some(day) = day else {
        surface.clear(id);
        return;
    };

    let mut line = format!(
        "{label}: {} {} / {}",
        codes::description(day.code().unwrap_or(u8::MAX)),
        degrees(day.temperature_2m_max),
        degrees(day.temperature_2m_min),
    );
    if let Some(sum) = day.precipitation_sum {
        line.push_str(&format!(", {:.1} mm", sum));
    }
    let sunrise = day.sunrise.as_ref().and_then(report::clock_text);
    let sunset = day.sunset.as_ref().and_then(report::clock_text);
    if let (Some(rise), Some(set)) = (sunrise, sunset) {
        line.push_str(&format!(", ↑{rise} ↓{set}"));
    }
    surface.set_text(id, &line);
    let icon = day.code().map(|code| codes::icon_name(code, true));
    surface.set_image(id, icon.as_deref());
}
