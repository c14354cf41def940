// Match matrix panel
//
// Ranked nearest-neighbor rows as token strips. Hidden while a match query
// is in flight; the coordinator reveals it once new rows are installed.

use crate::surface::{MatchMatrixModel, MatchMatrixSurface, RenderOptions};
use crate::util::fit_width;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub struct MatchMatrixPanel {
    model: MatchMatrixModel,
    visible: bool,
    options: RenderOptions,
}

impl MatchMatrixPanel {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            model: MatchMatrixModel::default(),
            visible: false,
            options,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Matches ");

        if !self.visible {
            let hint = if self.model.rows.is_empty() {
                "press m (fast) or M (precise) to fetch matches"
            } else {
                "matching..."
            };
            let paragraph = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let width = self.options.cell_width as usize;
        let rows: Vec<Row> = self
            .model
            .rows
            .iter()
            .map(|row| {
                let strip: String = row
                    .words
                    .iter()
                    .map(|word| fit_width(word, width))
                    .collect();
                Row::new(vec![
                    Cell::from(row.row_id.to_string()),
                    Cell::from(format!("{:.3}", row.match_score)),
                    Cell::from(strip),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(7),
                Constraint::Min(10),
            ],
        )
        .header(
            Row::new(vec!["pos", "score", "context"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .block(block);
        frame.render_widget(table, area);
    }
}

impl MatchMatrixSurface for MatchMatrixPanel {
    fn update(&mut self, model: MatchMatrixModel) {
        self.model = model;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update_options(&mut self, options: &RenderOptions, _re_render: bool) {
        self.options = *options;
    }
}
