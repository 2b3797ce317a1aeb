//! Keyboard input handling for the status display.
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | `r` | Refresh the mapping now |
//! | `q` / Esc / Ctrl-C | Quit the display |

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::app::TuiApp;

/// Result of handling an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// Event was handled, continue running.
    Handled,
    /// Event was not handled (unknown key).
    NotHandled,
    /// User requested quit.
    Quit,
}

/// Handle a crossterm event.
pub fn handle_event(app: &mut TuiApp, event: Event) -> InputResult {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => {
            // Redraw against the new dimensions right away
            app.mark_dirty();
            InputResult::Handled
        }
        _ => InputResult::NotHandled,
    }
}

/// Handle a key event.
fn handle_key(app: &mut TuiApp, key: KeyEvent) -> InputResult {
    // Ctrl-C inside the display quits the session like `q`; the
    // process-level interrupt is handled separately by the orchestrator.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return InputResult::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            InputResult::Quit
        }
        KeyCode::Char('r') => {
            app.request_refresh();
            InputResult::Handled
        }
        _ => InputResult::NotHandled,
    }
}
