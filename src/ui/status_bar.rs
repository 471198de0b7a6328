use std::time::Duration;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::push::ConnectionStatus;

use super::theme::Theme;

pub struct StatusBarState<'a> {
    pub status_message: Option<(&'a str, bool)>, // (message, is_error)
    pub connection: ConnectionStatus,
    /// Current interval of each webhook poller, once it has reported.
    pub spotify_interval: Option<Duration>,
    pub weather_interval: Option<Duration>,
    pub focused: bool,
}

const KEYS: [(&str, &str); 8] = [
    ("p", "play/pause"),
    ("n/b", "next/prev"),
    ("f", "favorite"),
    ("a", "auth"),
    ("r/R", "sync/reload"),
    ("t", "theme"),
    ("?", "help"),
    ("q", "quit"),
];

pub fn render_status_bar(
    f: &mut Frame,
    state: &StatusBarState,
    area: ratatui::layout::Rect,
    theme: &Theme,
) {
    let line = if let Some((msg, is_error)) = state.status_message {
        let color = if is_error { theme.error() } else { theme.notice() };
        Line::from(vec![
            Span::styled(
                if is_error { "ERROR" } else { "INFO" },
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(": "),
            Span::styled(msg, Style::default().fg(color)),
        ])
    } else {
        let connection_color = match state.connection {
            ConnectionStatus::Connected => theme.active(),
            ConnectionStatus::Connecting => theme.notice(),
            ConnectionStatus::Disconnected => theme.error(),
        };
        let mut spans = vec![
            Span::styled(
                state.connection.label(),
                Style::default().fg(connection_color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
        ];
        if !state.focused {
            spans.push(Span::styled("paused", Style::default().fg(theme.text_disabled())));
            spans.push(Span::raw(" | "));
        }
        if let Some(polls) = poll_summary(state.spotify_interval, state.weather_interval) {
            spans.push(Span::styled(polls, Style::default().fg(theme.text_muted())));
            spans.push(Span::raw(" | "));
        }
        for (i, (key, what)) in KEYS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
            }
            spans.push(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)));
            spans.push(Span::raw(format!(": {}", what)));
        }
        Line::from(spans)
    };

    let status_bar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border())),
    );
    f.render_widget(status_bar, area);
}

fn poll_summary(spotify: Option<Duration>, weather: Option<Duration>) -> Option<String> {
    let parts: Vec<String> = [("spotify", spotify), ("weather", weather)]
        .into_iter()
        .filter_map(|(name, interval)| interval.map(|d| format!("{} {}s", name, d.as_secs())))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(format!("poll {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_summary() {
        assert_eq!(poll_summary(None, None), None);
        assert_eq!(
            poll_summary(Some(Duration::from_secs(5)), Some(Duration::from_secs(120))),
            Some("poll spotify 5s, weather 120s".to_string())
        );
        assert_eq!(
            poll_summary(None, Some(Duration::from_secs(60))),
            Some("poll weather 60s".to_string())
        );
    }
}
