//! Lease summary panel.

use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::lifecycle::{LifecyclePhase, StatusSnapshot};
use crate::netmon::format_bps;

/// Panel showing the lifecycle phase, lease and transfer rates.
pub struct SummaryWidget<'a> {
    snapshot: &'a StatusSnapshot,
}

impl<'a> SummaryWidget<'a> {
    /// Create a summary widget over a snapshot.
    pub fn new(snapshot: &'a StatusSnapshot) -> Self {
        Self { snapshot }
    }

    /// Get the color for a lifecycle phase.
    fn phase_color(phase: LifecyclePhase) -> Color {
        match phase {
            LifecyclePhase::Initializing => Color::DarkGray,
            LifecyclePhase::Acquiring => Color::Yellow,
            LifecyclePhase::Steady => Color::Green,
            LifecyclePhase::ShuttingDown => Color::Red,
        }
    }
}

impl Widget for SummaryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let now = Utc::now();

        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::White);

        let port = match snapshot.lease.current_port {
            Some(port) => port.to_string(),
            None => format!("- (attempt {})", snapshot.acquire_attempts),
        };

        let uptime = format_elapsed(now.signed_duration_since(snapshot.started_at));
        let countdown = match snapshot.next_refresh_at {
            Some(at) if at > now => format_elapsed(at.signed_duration_since(now)),
            Some(_) => "now".to_string(),
            None => "-".to_string(),
        };

        let row = |name: &str, span: Span<'static>| {
            Line::from(vec![Span::styled(format!("{name:<12}"), label), span])
        };

        let lines = vec![
            row(
                "Status",
                Span::styled(
                    snapshot.phase.to_string(),
                    Style::default()
                        .fg(Self::phase_color(snapshot.phase))
                        .add_modifier(Modifier::BOLD),
                ),
            ),
            row(
                "Public port",
                Span::styled(
                    port,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ),
            row("Gateway", Span::styled(snapshot.gateway.clone(), value)),
            row(
                "Interface",
                Span::styled(
                    snapshot
                        .interface
                        .clone()
                        .unwrap_or_else(|| "not detected".to_string()),
                    value,
                ),
            ),
            row("Rate in", Span::styled(format_bps(snapshot.input_bps), value)),
            row(
                "Rate out",
                Span::styled(format_bps(snapshot.output_bps), value),
            ),
            row(
                "Changes",
                Span::styled(snapshot.lease.change_count.to_string(), value),
            ),
            row("Uptime", Span::styled(uptime, value)),
            row("Next check", Span::styled(countdown, value)),
        ];

        let block = Block::default()
            .title(" portkeep ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

/// `h:mm:ss` rendering of a chrono duration, clamped at zero.
fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(chrono::Duration::seconds(0)), "0:00:00");
        assert_eq!(format_elapsed(chrono::Duration::seconds(59)), "0:00:59");
        assert_eq!(format_elapsed(chrono::Duration::seconds(61)), "0:01:01");
        assert_eq!(format_elapsed(chrono::Duration::seconds(3661)), "1:01:01");
        // Clock skew never renders a negative duration
        assert_eq!(format_elapsed(chrono::Duration::seconds(-5)), "0:00:00");
    }

    #[test]
    fn test_phase_colors() {
        assert_eq!(
            SummaryWidget::phase_color(LifecyclePhase::Steady),
            Color::Green
        );
        assert_eq!(
            SummaryWidget::phase_color(LifecyclePhase::ShuttingDown),
            Color::Red
        );
    }
}
