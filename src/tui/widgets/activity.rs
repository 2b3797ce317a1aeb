//! Activity journal panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Widget},
};

use crate::journal::{JournalEntry, Severity};

/// Panel showing the journal tail, newest entry on top.
pub struct ActivityWidget<'a> {
    entries: &'a [JournalEntry],
}

impl<'a> ActivityWidget<'a> {
    /// Create an activity widget over a journal tail.
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self { entries }
    }

    /// Get the color for a severity.
    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Info => Color::Blue,
            Severity::Warn => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }
}

impl Widget for ActivityWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let line = Line::from(vec![
                    Span::styled(
                        entry.timestamp.format("%H:%M:%S").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("{:5}", entry.severity.to_string()),
                        Style::default().fg(Self::severity_color(entry.severity)),
                    ),
                    Span::raw(" "),
                    Span::raw(entry.message.as_str()),
                ]);

                ListItem::new(line)
            })
            .collect();

        let title = format!(" Activity ({}) ", self.entries.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        List::new(items).block(block).render(area, buf);
    }
}
