//! Display event loop.
//!
//! Owns the terminal: raw mode and the alternate screen are entered on
//! construction and restored by a panic hook and on Drop, so a crash
//! never leaves the shell unusable. The loop polls input frequently so
//! keys feel immediate, redraws on the configured cadence, and exits on
//! the quit key, the display timeout or process-wide cancellation.

use std::io::{self, Stdout};
use std::panic;
use std::time::Duration;

use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::app::TuiApp;
use super::input::{handle_event, InputResult};
use super::layout::{StatusLayout, MIN_HEIGHT, MIN_WIDTH};
use super::widgets::{ActivityWidget, HistoryWidget, SummaryWidget};
use crate::journal::JournalEntry;
use crate::lifecycle::StatusSnapshot;

/// How often the loop polls for key events.
pub const INPUT_POLL: Duration = Duration::from_millis(100);

/// Terminal guard and render loop for the status display.
pub struct TuiRunner {
    /// The terminal backend.
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TuiRunner {
    /// Initialize the terminal for display mode.
    ///
    /// This enables raw mode and enters an alternate screen.
    pub fn new() -> io::Result<Self> {
        // Setup panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        info!("Status display initialized");

        Ok(Self { terminal })
    }

    /// Restore the terminal to normal mode.
    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;

        info!("Status display restored");

        Ok(())
    }

    /// Run the display loop until quit, timeout or cancellation.
    pub async fn run(&mut self, mut app: TuiApp, cancel: CancellationToken) -> io::Result<()> {
        loop {
            if cancel.is_cancelled() {
                debug!("Status display observed cancellation");
                break;
            }
            if app.timed_out() {
                info!("Display timeout elapsed, requesting shutdown");
                break;
            }

            if app.take_render_due() {
                let snapshot = app.snapshot();
                let entries = app.log_tail();
                self.terminal
                    .draw(|frame| render_ui(frame, &snapshot, &entries))?;
            }

            // Poll for terminal events between redraws
            if event::poll(INPUT_POLL)? {
                let event = event::read()?;
                if handle_event(&mut app, event) == InputResult::Quit {
                    break;
                }
            }
        }

        Ok(())
    }
}

impl Drop for TuiRunner {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Render one frame, degrading to a message when the terminal is too small.
fn render_ui(frame: &mut Frame, snapshot: &StatusSnapshot, entries: &[JournalEntry]) {
    let Some(layout) = StatusLayout::compute(frame.area()) else {
        let message = Paragraph::new(format!(
            "Terminal too small: need at least {MIN_WIDTH}x{MIN_HEIGHT}"
        ))
        .style(Style::default().fg(Color::Red));
        frame.render_widget(message, frame.area());
        return;
    };

    frame.render_widget(SummaryWidget::new(snapshot), layout.summary);
    frame.render_widget(HistoryWidget::new(&snapshot.history), layout.history);
    frame.render_widget(ActivityWidget::new(entries), layout.activity);
    frame.render_widget(footer(), layout.footer);
}

/// The one-line keybinding footer.
fn footer() -> Paragraph<'static> {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let action_style = Style::default().fg(Color::White);

    let line = Line::from(vec![
        Span::styled(" r ", key_style),
        Span::styled("Refresh now ", action_style),
        Span::styled(" q ", key_style),
        Span::styled("Quit ", action_style),
    ]);

    Paragraph::new(line).style(Style::default().bg(Color::DarkGray))
}
