//! `/api/weather` document.
//!
//! The backend forwards Open-Meteo variables through pandas, so numbers may
//! arrive as floats (`3.0` for a weather code) and timestamps as either
//! strings or epoch seconds. Everything is optional.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherReport {
    #[serde(default)]
    pub current: CurrentConditions,
    #[serde(default)]
    pub daily: Option<Vec<DailyForecast>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub weather_code: Option<f64>,
    pub is_day: Option<Value>,
    pub precipitation: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub time: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    pub temperature_2m_max: Option<f64>,
    pub temperature_2m_min: Option<f64>,
    pub weather_code: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub sunrise: Option<Value>,
    pub sunset: Option<Value>,
}

impl WeatherReport {
    pub fn today(&self) -> Option<&DailyForecast> {
        self.daily.as_ref().and_then(|d| d.first())
    }

    pub fn tomorrow(&self) -> Option<&DailyForecast> {
        self.daily.as_ref().and_then(|d| d.get(1))
    }
}

impl CurrentConditions {
    pub fn code(&self) -> Option<u8> {
        self.weather_code.and_then(weather_code)
    }

    /// Defaults to day when the backend omits the flag.
    pub fn is_day(&self) -> bool {
        match &self.is_day {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
            _ => true,
        }
    }

    pub fn observed_at(&self) -> Option<String> {
        self.time.as_ref().and_then(clock_text)
    }
}

impl DailyForecast {
    pub fn code(&self) -> Option<u8> {
        self.weather_code.and_then(weather_code)
    }
}

fn weather_code(raw: f64) -> Option<u8> {
    (raw.is_finite() && (0.0..=255.0).contains(&raw)).then(|| raw.round() as u8)
}

/// "HH:MM" from whatever shape a timestamp arrived in.
pub fn clock_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => parse_clock(s),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // pandas serializes datetimes as epoch milliseconds
            let secs = if raw.abs() > 100_000_000_000 { raw / 1000 } else { raw };
            DateTime::from_timestamp(secs, 0)
                .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        }
        _ => None,
    }
}

fn parse_clock(s: &str) -> Option<String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.format("%H:%M").to_string());
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.format("%H:%M").to_string());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|t| t.format("%H:%M").to_string())
}
