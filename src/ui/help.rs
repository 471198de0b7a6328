use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::keybindings::KEYBINDING_CATEGORIES;
use super::theme::Theme;

pub struct HelpPanelState {
    pub scroll_offset: usize,
}

pub fn render_help_panel(f: &mut Frame, state: &HelpPanelState, area: Rect, theme: &Theme) {
    // Centered overlay, 60% wide, 80% high
    let popup_width = (area.width as f32 * 0.60) as u16;
    let popup_height = (area.height as f32 * 0.80) as u16;
    let popup_x = area.x + (area.width - popup_width) / 2;
    let popup_y = area.y + (area.height - popup_height) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled("Keybindings", theme.title_style())));
    lines.push(Line::from(""));

    for category in KEYBINDING_CATEGORIES {
        lines.push(Line::from(Span::styled(
            category.name,
            Style::default()
                .fg(theme.notice())
                .add_modifier(Modifier::BOLD),
        )));

        for binding in category.bindings {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:12}", binding.keys),
                    Style::default().fg(theme.active()),
                ),
                Span::styled(binding.description, Style::default().fg(theme.text())),
            ]));
        }
        lines.push(Line::from(""));
    }

    let visible_lines: Vec<Line> = lines.into_iter().skip(state.scroll_offset).collect();

    let help_paragraph = Paragraph::new(visible_lines)
        .block(
            Block::default()
                .title(" Help - Press any key to close (j/k to scroll) ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help_paragraph, popup_area);
}
