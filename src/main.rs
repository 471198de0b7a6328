use anyhow::Result;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{io, time::Duration};

use athena::app::App;
use athena::config::Config;
use athena::handlers::{handle_key_event, KeyAction};
use athena::logging;
use athena::ui::{
    self, render_help_panel, render_now_playing, render_status_bar, render_weather,
    HelpPanelState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init_logging()?;
    let config = Config::load()?;
    tracing::info!("Starting athena against {}", config.server.base_url);

    let mut app = App::new(config)?;
    app.add_debug(format!("Logging to {}", log_path.display()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start_background();
    app.start();

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("{:?}", err);
        eprintln!("{:?}", err);
    }

    tracing::info!("Exiting");
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        app.drain_events();
        app.update();

        terminal.draw(|f| render_ui(f, app))?;

        // Yield so spawned fetches make progress between frames
        tokio::task::yield_now().await;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => match handle_key_event(app, key) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Continue => {}
                },
                Event::FocusGained => app.set_focus(true),
                Event::FocusLost => app.set_focus(false),
                _ => {}
            }
        }
    }
}

fn render_ui(f: &mut Frame, app: &mut App) {
    // Clone theme early to avoid borrow conflicts with mutable app access
    let theme = app.theme.clone();

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Panels
    ];
    if app.show_debug {
        constraints.push(Constraint::Length(12)); // Debug panel
    }
    constraints.push(Constraint::Length(3)); // Status bar

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.area());

    let mut chunk_index = 0;

    // Header
    let header_text = format!(
        "Athena - {} - {}",
        app.config.server.base_url,
        chrono::Local::now().format("%a %d %b %H:%M")
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border())),
        );
    f.render_widget(header, main_chunks[chunk_index]);
    chunk_index += 1;

    // Spotify | Weather
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[chunk_index]);

    let progress_ratio = app.spotify.state().progress_ratio();
    let mut now_playing_state = ui::NowPlayingState {
        surface: &app.surface,
        progress_ratio,
        album_art_cache: app.album_art_cache.as_mut(),
        theme: &theme,
    };
    render_now_playing(f, &mut now_playing_state, panels[0]);
    render_weather(f, &app.surface, panels[1], &theme);
    chunk_index += 1;

    // Debug panel (only shown when enabled)
    if app.show_debug {
        let debug_text: String = app
            .debug_log
            .iter()
            .rev()
            .take(10)
            .rev()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let debug_panel = Paragraph::new(debug_text)
            .style(Style::default().fg(theme.text_muted()))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Debug Log [c: clear | d: hide]")
                    .border_style(Style::default().fg(theme.border())),
            );
        f.render_widget(debug_panel, main_chunks[chunk_index]);
        chunk_index += 1;
    }

    // Status bar
    let status_state = ui::StatusBarState {
        status_message: app
            .status_message
            .as_ref()
            .map(|m| (m.message.as_str(), m.is_error)),
        connection: app.watcher.status(),
        spotify_interval: app.spotify_poll.as_ref().map(|r| r.next_interval),
        weather_interval: app.weather_poll.as_ref().map(|r| r.next_interval),
        focused: app.focused,
    };
    render_status_bar(f, &status_state, main_chunks[chunk_index], &theme);

    // Help overlay last, so it's on top
    if app.show_help {
        let help_state = HelpPanelState {
            scroll_offset: app.help.scroll_offset,
        };
        render_help_panel(f, &help_state, f.area(), &theme);
    }
}
