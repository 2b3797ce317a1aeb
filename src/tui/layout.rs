//! Status display layout.
//!
//! Defines the panel arrangement:
//!
//! ```text
//! ┌───────────────────┬──────────────┐
//! │  Lease summary    │ Port history │
//! ├───────────────────┴──────────────┤
//! │             Activity             │
//! ├──────────────────────────────────┤
//! │ Footer: keybindings              │
//! └──────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Narrowest terminal the panel layout fits in.
pub const MIN_WIDTH: u16 = 40;

/// Shortest terminal the panel layout fits in.
pub const MIN_HEIGHT: u16 = 14;

/// Layout areas for the status display.
#[derive(Debug, Clone)]
pub struct StatusLayout {
    /// Area for the lease summary panel.
    pub summary: Rect,
    /// Area for the port history panel.
    pub history: Rect,
    /// Area for the activity log panel.
    pub activity: Rect,
    /// Area for the keybinding footer.
    pub footer: Rect,
}

impl StatusLayout {
    /// Compute the layout, or `None` when the terminal is too small.
    ///
    /// Callers degrade to an error message instead of rendering panels
    /// that would truncate into garbage.
    #[must_use]
    pub fn compute(area: Rect) -> Option<Self> {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return None;
        }

        // Split vertically: [top panels] [activity] [footer]
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(11), // Top panels
                Constraint::Min(3),     // Activity (fill remaining)
                Constraint::Length(1),  // Footer
            ])
            .split(area);

        // Split top panels horizontally: [summary] [history]
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical[0]);

        Some(Self {
            summary: horizontal[0],
            history: horizontal[1],
            activity: vertical[1],
            footer: vertical[2],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_computation() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = StatusLayout::compute(area).unwrap();

        // Summary and history should be side by side
        assert_eq!(layout.summary.y, layout.history.y);

        // Activity should be below the top panels
        assert!(layout.activity.y > layout.summary.y);

        // Footer should be at the bottom
        assert!(layout.footer.y > layout.activity.y);
        assert_eq!(layout.footer.height, 1);
    }

    #[test]
    fn test_layout_widths() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = StatusLayout::compute(area).unwrap();

        assert_eq!(layout.summary.width, 60);
        assert_eq!(layout.history.width, 40);

        // Activity and footer should span full width
        assert_eq!(layout.activity.width, 100);
        assert_eq!(layout.footer.width, 100);
    }

    #[test]
    fn test_too_small_terminal() {
        assert!(StatusLayout::compute(Rect::new(0, 0, 20, 24)).is_none());
        assert!(StatusLayout::compute(Rect::new(0, 0, 80, 8)).is_none());
        assert!(StatusLayout::compute(Rect::new(0, 0, MIN_WIDTH, MIN_HEIGHT)).is_some());
    }
}
