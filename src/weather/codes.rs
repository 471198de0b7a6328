//! WMO weather interpretation codes (as used by Open-Meteo).

pub fn description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Freezing fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Light rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Light snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Light rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Light snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown weather",
    }
}

fn base_icon(code: u8) -> &'static str {
    match code {
        0 => "clear-day",
        1 => "partly-cloudy-day",
        2 => "cloud-day",
        3 => "cloud",
        45 => "fog",
        48 => "fog-freezing",
        51 => "drizzle-light",
        53 => "drizzle",
        55 => "drizzle-heavy",
        56 => "freezing-drizzle",
        57 => "freezing-drizzle-heavy",
        61 => "rain-light",
        63 => "rain",
        65 => "heavy-rain",
        66 => "freezing-rain",
        67 => "freezing-rain-heavy",
        71 => "snow-light",
        73 => "snow",
        75 => "snow-heavy",
        77 => "snow-grains",
        80 => "rain-showers-light",
        81 => "rain-showers",
        82 => "rain-showers-heavy",
        85 => "snow-showers",
        86 => "snow-showers-heavy",
        95 => "thunderstorm",
        96 => "thunderstorm-hail",
        99 => "thunderstorm-hail-heavy",
        _ => "unknown",
    }
}

/// Icon name for a code; day icons switch to their night variant after dark.
pub fn icon_name(code: u8, is_day: bool) -> String {
    let base = base_icon(code);
    match base.strip_suffix("-day") {
        Some(stem) if !is_day => format!("{stem}-night"),
        _ => base.to_string(),
    }
}

/// Single-cell glyph drawn in place of the icon image.
pub fn glyph(code: u8, is_day: bool) -> &'static str {
    match code {
        0 | 1 if is_day => "☀",
        0 | 1 => "☾",
        2 => "⛅",
        3 => "☁",
        45 | 48 => "≡",
        51..=57 | 61..=67 | 80..=82 => "☂",
        71..=77 | 85 | 86 => "❄",
        95..=99 => "⚡",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(description(0), "Clear sky");
        assert_eq!(description(63), "Moderate rain");
        assert_eq!(description(99), "Thunderstorm with heavy hail");
        assert_eq!(description(42), "Unknown weather");
    }

    #[test]
    fn test_day_night_icons() {
        assert_eq!(icon_name(0, true), "clear-day");
        assert_eq!(icon_name(0, false), "clear-night");
        assert_eq!(icon_name(1, false), "partly-cloudy-night");
        // No night variant
        assert_eq!(icon_name(63, false), "rain");
        assert_eq!(icon_name(200, true), "unknown");
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(glyph(0, true), "☀");
        assert_eq!(glyph(0, false), "☾");
        assert_eq!(glyph(82, true), "☂");
        assert_eq!(glyph(123, true), "?");
    }
}
