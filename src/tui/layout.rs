//! Responsive layout for the panel arrangement
//!
//! One source of truth for width thresholds; the result area goes
//! side-by-side on wide terminals and stacks on narrow ones.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// < 80 cols: stack everything
    Compact,
    /// 80-119 cols
    Normal,
    /// 120+ cols: room for matrix and heatmap side by side
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=79 => Breakpoint::Compact,
            80..=119 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }

    /// Check if at least this breakpoint (inclusive)
    pub fn at_least(&self, min: Breakpoint) -> bool {
        self.ordinal() >= min.ordinal()
    }

    fn ordinal(&self) -> u8 {
        match self {
            Breakpoint::Compact => 0,
            Breakpoint::Normal => 1,
            Breakpoint::Wide => 2,
        }
    }
}

/// The screen regions every frame renders into
pub struct Panes {
    pub status: Rect,
    pub line_plot: Rect,
    pub tokens: Rect,
    pub cells: Rect,
    pub matches: Rect,
    pub heatmap: Rect,
}

pub fn split(area: Rect) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // status line
            Constraint::Min(10),    // line plot
            Constraint::Length(3),  // token sequence
            Constraint::Length(3),  // cell list
            Constraint::Length(14), // results
        ])
        .split(area);

    let (matches, heatmap) = if Breakpoint::from_width(area.width).at_least(Breakpoint::Normal) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[4]);
        (columns[0], columns[1])
    } else {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[4]);
        (halves[0], halves[1])
    };

    Panes {
        status: rows[0],
        line_plot: rows[1],
        tokens: rows[2],
        cells: rows[3],
        matches,
        heatmap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(60), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(79), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(80), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(119), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(200), Breakpoint::Wide);
    }

    #[test]
    fn at_least_is_inclusive() {
        assert!(Breakpoint::Wide.at_least(Breakpoint::Normal));
        assert!(Breakpoint::Normal.at_least(Breakpoint::Normal));
        assert!(!Breakpoint::Compact.at_least(Breakpoint::Normal));
    }

    #[test]
    fn wide_terminals_get_side_by_side_results() {
        let panes = split(Rect::new(0, 0, 120, 40));
        assert_eq!(panes.matches.y, panes.heatmap.y);
        assert!(panes.matches.x < panes.heatmap.x);
    }

    #[test]
    fn narrow_terminals_stack_results() {
        let panes = split(Rect::new(0, 0, 60, 40));
        assert_eq!(panes.matches.x, panes.heatmap.x);
        assert!(panes.matches.y < panes.heatmap.y);
    }
}
