use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::PlayerCommand;
use crate::app::App;
use crate::schedule::ReloadReason;
use crate::ui::help_content_height;

#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    // Windows reports releases too
    if key.kind == KeyEventKind::Release {
        return KeyAction::Continue;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    // Help panel - any key dismisses it (except j/k for scrolling)
    if app.show_help {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let max_scroll = help_content_height().saturating_sub(10);
                if app.help.scroll_offset < max_scroll {
                    app.help.scroll_offset += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.help.scroll_offset = app.help.scroll_offset.saturating_sub(1);
            }
            _ => {
                app.show_help = false;
                app.help.scroll_offset = 0;
            }
        }
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,

        KeyCode::Char('p') | KeyCode::Char(' ') => app.play_pause(),
        KeyCode::Char('n') => app.send_command(PlayerCommand::Next),
        KeyCode::Char('b') => app.send_command(PlayerCommand::Previous),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char('a') => app.authenticate(),

        KeyCode::Char('r') => app.manual_sync(),
        KeyCode::Char('R') => app.full_reload(ReloadReason::Manual),

        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('d') => app.show_debug = !app.show_debug,
        KeyCode::Char('c') => app.clear_debug_log(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }

    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::fake::FakeApi;
    use crate::app::testing::{app_with, pump_until};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = app_with(Arc::new(FakeApi::default()));
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(
            handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[tokio::test]
    async fn test_help_swallows_keys() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        handle_key_event(&mut app, press(KeyCode::Char('?')));
        assert!(app.show_help);

        handle_key_event(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.help.scroll_offset, 1);
        handle_key_event(&mut app, press(KeyCode::Char('k')));
        assert_eq!(app.help.scroll_offset, 0);

        // 'q' only closes the overlay
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Char('q'))), KeyAction::Continue);
        assert!(!app.show_help);
        assert!(api.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_next_sends_command() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        handle_key_event(&mut app, press(KeyCode::Char('n')));
        pump_until(&mut app, |_| api.playback_calls() == 1).await;
        assert_eq!(*api.commands.lock().unwrap(), vec![PlayerCommand::Next]);
    }

    #[tokio::test]
    async fn test_play_pause_follows_held_state() {
        let api = Arc::new(FakeApi::default());
        let mut app = app_with(api.clone());

        // Nothing playing yet, so the key means play
        handle_key_event(&mut app, press(KeyCode::Char(' ')));
        pump_until(&mut app, |_| api.playback_calls() == 1).await;
        assert_eq!(*api.commands.lock().unwrap(), vec![PlayerCommand::Play]);
    }

    #[tokio::test]
    async fn test_debug_toggle() {
        let mut app = app_with(Arc::new(FakeApi::default()));
        handle_key_event(&mut app, press(KeyCode::Char('d')));
        assert!(app.show_debug);
        handle_key_event(&mut app, press(KeyCode::Char('d')));
        assert!(!app.show_debug);
    }
}
