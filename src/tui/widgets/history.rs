//! Recent port history panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Widget},
};

use crate::lifecycle::PortChange;

/// Panel listing the ports held so far, newest first.
pub struct HistoryWidget<'a> {
    history: &'a [PortChange],
}

impl<'a> HistoryWidget<'a> {
    /// Create a history widget over the snapshot's port history.
    pub fn new(history: &'a [PortChange]) -> Self {
        Self { history }
    }
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let items: Vec<ListItem> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, change)| {
                let port_style = if i == 0 {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };

                let line = Line::from(vec![
                    Span::styled(
                        change.at.format("%H:%M:%S").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(format!("{:5}", change.port), port_style),
                    if i == 0 {
                        Span::styled("  current", Style::default().fg(Color::Green))
                    } else {
                        Span::raw("")
                    },
                ]);

                ListItem::new(line)
            })
            .collect();

        let title = format!(" Port history ({}) ", self.history.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        List::new(items).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_history_widget_creation() {
        let history = vec![
            PortChange {
                port: 43210,
                at: Utc::now(),
            },
            PortChange {
                port: 40001,
                at: Utc::now(),
            },
        ];

        let widget = HistoryWidget::new(&history);
        assert_eq!(widget.history.len(), 2);
    }
}
