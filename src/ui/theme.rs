use ratatui::style::{Color, Modifier, Style};

/// Colors for the dashboard panels. Values are ratatui color names, `#rrggbb`
/// or a 256-color index.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,

    /// Borders and headings
    pub accent: String,

    /// Playing state, favorite heart
    pub active: String,

    /// Info messages, authentication prompt
    pub notice: String,

    pub error: String,

    pub text: String,
    pub text_muted: String,

    /// Placeholders and hidden-state hints
    pub text_disabled: String,

    pub border: String,
    pub gauge_filled: String,
    pub gauge_empty: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            accent: "#1db954".to_string(),
            active: "#1ed760".to_string(),
            notice: "Yellow".to_string(),
            error: "LightRed".to_string(),
            text: "White".to_string(),
            text_muted: "Gray".to_string(),
            text_disabled: "DarkGray".to_string(),
            border: "#535353".to_string(),
            gauge_filled: "#1db954".to_string(),
            gauge_empty: "#282828".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            accent: "#127a37".to_string(),
            active: "#0f9d58".to_string(),
            notice: "#b36b00".to_string(),
            error: "Red".to_string(),
            text: "Black".to_string(),
            text_muted: "#555555".to_string(),
            text_disabled: "#9e9e9e".to_string(),
            border: "#b0b0b0".to_string(),
            gauge_filled: "#127a37".to_string(),
            gauge_empty: "#e0e0e0".to_string(),
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// The other preset.
    pub fn toggled(&self) -> Self {
        if self.name == "light" {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn parse_color(color_str: &str) -> Color {
        match color_str.trim() {
            "Reset" => Color::Reset,
            "Black" => Color::Black,
            "Red" => Color::Red,
            "Green" => Color::Green,
            "Yellow" => Color::Yellow,
            "Blue" => Color::Blue,
            "Magenta" => Color::Magenta,
            "Cyan" => Color::Cyan,
            "Gray" | "Grey" => Color::Gray,
            "DarkGray" | "DarkGrey" => Color::DarkGray,
            "LightRed" => Color::LightRed,
            "LightGreen" => Color::LightGreen,
            "LightYellow" => Color::LightYellow,
            "LightBlue" => Color::LightBlue,
            "LightMagenta" => Color::LightMagenta,
            "LightCyan" => Color::LightCyan,
            "White" => Color::White,
            s if s.starts_with('#') => parse_hex_color(s)
                .map(|(r, g, b)| Color::Rgb(r, g, b))
                .unwrap_or(Color::Reset),
            s => s.parse::<u8>().map(Color::Indexed).unwrap_or(Color::Reset),
        }
    }

    pub fn accent(&self) -> Color {
        Self::parse_color(&self.accent)
    }

    pub fn active(&self) -> Color {
        Self::parse_color(&self.active)
    }

    pub fn notice(&self) -> Color {
        Self::parse_color(&self.notice)
    }

    pub fn error(&self) -> Color {
        Self::parse_color(&self.error)
    }

    pub fn text(&self) -> Color {
        Self::parse_color(&self.text)
    }

    pub fn text_muted(&self) -> Color {
        Self::parse_color(&self.text_muted)
    }

    pub fn text_disabled(&self) -> Color {
        Self::parse_color(&self.text_disabled)
    }

    pub fn border(&self) -> Color {
        Self::parse_color(&self.border)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn gauge_style(&self) -> Style {
        Style::default()
            .fg(Self::parse_color(&self.gauge_filled))
            .bg(Self::parse_color(&self.gauge_empty))
    }

    /// Style for an element carrying the `active` / `inactive` classes.
    pub fn toggle_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.active())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text_muted())
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
