use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::album_art::AlbumArtCache;
use crate::surface::{ElementId, ElementStore};

use super::theme::Theme;

pub struct NowPlayingState<'a> {
    pub surface: &'a ElementStore,
    pub progress_ratio: f64,
    pub album_art_cache: Option<&'a mut AlbumArtCache>,
    pub theme: &'a Theme,
}

pub fn render_now_playing(f: &mut Frame, state: &mut NowPlayingState, area: Rect) {
    let theme = state.theme;
    let surface = state.surface;

    let block = Block::default()
        .title(Span::styled(" Spotify ", theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(message) = surface.text(ElementId::SpotifyError) {
        render_message(f, inner, message, surface, theme, true);
        return;
    }
    if let Some(message) = surface.text(ElementId::SpotifyInfo) {
        render_message(f, inner, message, surface, theme, false);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(30)])
        .split(inner);

    render_cover(f, chunks[0], state);
    render_track(f, chunks[1], state);
}

fn render_message(
    f: &mut Frame,
    area: Rect,
    message: &str,
    surface: &ElementStore,
    theme: &Theme,
    is_error: bool,
) {
    let color = if is_error { theme.error() } else { theme.text_muted() };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color).add_modifier(Modifier::ITALIC),
        )),
    ];

    if let Some(action) = surface.action(ElementId::SpotifyAuth) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("[a] ", Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD)),
            Span::styled(action.label.clone(), Style::default().fg(theme.notice())),
        ]));
        lines.push(Line::from(Span::styled(
            action.url.clone(),
            Style::default().fg(theme.text_disabled()),
        )));
    }

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_cover(f: &mut Frame, area: Rect, state: &mut NowPlayingState) {
    let mut shown = false;
    if let (Some(url), Some(cache)) = (
        state.surface.image(ElementId::CurrentAlbumCover),
        state.album_art_cache.as_deref_mut(),
    ) {
        if cache.set_current(url) {
            if let Some(protocol) = cache.get_protocol_mut() {
                use ratatui_image::StatefulImage;
                f.render_stateful_widget(StatefulImage::new(None), area, protocol);
                shown = true;
            }
        }
    }

    if !shown {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                "♪",
                Style::default()
                    .fg(state.theme.text_disabled())
                    .add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
    }
}

fn render_track(f: &mut Frame, area: Rect, state: &NowPlayingState) {
    let theme = state.theme;
    let surface = state.surface;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let (status_icon, status_style) = if surface.is_visible(ElementId::PauseButton) {
        ("▶", Style::default().fg(theme.active()).add_modifier(Modifier::BOLD))
    } else if surface.is_visible(ElementId::PlayButton) {
        ("⏸", Style::default().fg(theme.notice()).add_modifier(Modifier::BOLD))
    } else {
        (" ", Style::default())
    };

    let mut title = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled(
            surface.text(ElementId::CurrentTrackName).unwrap_or("").to_string(),
            Style::default().fg(theme.text()).add_modifier(Modifier::BOLD),
        ),
    ];
    if surface.is_visible(ElementId::FavoriteIcon) {
        let liked = surface.has_class(ElementId::FavoriteIcon, "active");
        title.push(Span::styled(
            if liked { "  ♥" } else { "  ♡" },
            theme.toggle_style(liked),
        ));
    }

    let time = surface.text(ElementId::CurrentTrackTime).unwrap_or("").to_string();
    f.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(title),
            Line::from(Span::styled(format!("   {}", time), Style::default().fg(theme.text_muted()))),
        ]),
        rows[0],
    );

    let gauge = Gauge::default()
        .gauge_style(theme.gauge_style())
        .ratio(state.progress_ratio.clamp(0.0, 1.0))
        .label("");
    f.render_widget(gauge, pad(rows[1], 3));

    let mut next = vec![Line::from(Span::styled("   Next up", theme.title_style()))];
    if let Some(name) = surface.text(ElementId::NextTrackName) {
        let mut line = vec![Span::styled(
            format!("   {}", name),
            Style::default().fg(theme.text()),
        )];
        match surface.text(ElementId::NextTrackArtist) {
            Some(artist) if !artist.is_empty() => line.push(Span::styled(
                format!("  {}", artist),
                Style::default().fg(theme.text_muted()),
            )),
            _ => {}
        }
        next.push(Line::from(line));
    }
    f.render_widget(Paragraph::new(next), rows[3]);
}

fn pad(area: Rect, horizontal: u16) -> Rect {
    Rect {
        x: area.x + horizontal.min(area.width),
        width: area.width.saturating_sub(horizontal * 2),
        ..area
    }
}
