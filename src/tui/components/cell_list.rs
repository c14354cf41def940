// Cell list panel - the selected cell indices, spelled out

use crate::surface::{CellListModel, CellListSurface};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct CellListPanel {
    model: CellListModel,
}

impl CellListPanel {
    pub fn new() -> Self {
        Self {
            model: CellListModel::default(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Selected Cells ({}) ", self.model.cells.len());
        let (text, style) = if self.model.cells.is_empty() {
            (
                "none - brush a time range with the arrow keys".to_string(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            let list = self
                .model
                .cells
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            (list, Style::default())
        };

        let paragraph = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }
}

impl Default for CellListPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl CellListSurface for CellListPanel {
    fn update(&mut self, model: CellListModel) {
        self.model = model;
    }
}
