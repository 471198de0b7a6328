use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::surface::{ElementId, ElementStore};

use super::theme::Theme;

const DETAIL_ELEMENTS: [ElementId; 5] = [
    ElementId::WeatherFeelsLike,
    ElementId::WeatherHumidity,
    ElementId::WeatherWind,
    ElementId::WeatherPrecipitation,
    ElementId::WeatherUpdated,
];

pub fn render_weather(f: &mut Frame, surface: &ElementStore, area: Rect, theme: &Theme) {
    let block = Block::default()
        .title(Span::styled(" Weather ", theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border()));

    let mut lines = Vec::new();

    if let Some(message) = surface.text(ElementId::WeatherError) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.error()).add_modifier(Modifier::ITALIC),
        )));
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), area);
        return;
    }

    let Some(temperature) = surface.text(ElementId::WeatherTemperature) else {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Loading…",
            Style::default().fg(theme.text_disabled()),
        )));
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), area);
        return;
    };

    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", surface.text(ElementId::WeatherIcon).unwrap_or("?")),
            Style::default().fg(theme.notice()),
        ),
        Span::styled(
            temperature.to_string(),
            Style::default().fg(theme.text()).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            surface.text(ElementId::WeatherDescription).unwrap_or("").to_string(),
            Style::default().fg(theme.text()),
        ),
    ]));
    lines.push(Line::from(""));

    for id in DETAIL_ELEMENTS {
        if let Some(text) = surface.text(id) {
            lines.push(Line::from(Span::styled(
                format!(" {}", text),
                Style::default().fg(theme.text_muted()),
            )));
        }
    }

    let days: Vec<&str> = [ElementId::WeatherToday, ElementId::WeatherTomorrow]
        .into_iter()
        .filter_map(|id| surface.text(id))
        .collect();
    if !days.is_empty() {
        lines.push(Line::from(""));
        for day in days {
            lines.push(Line::from(Span::styled(
                format!(" {}", day),
                Style::default().fg(theme.text()),
            )));
        }
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
