// Heatmap panel
//
// Colors each match row's tokens by one metadata dimension. The active
// dimension cycles locally (the coordinator only supplies the catalog and
// the matrices), normalized over the whole visible matrix.

use super::to_color;
use crate::select::ColorScale;
use crate::surface::{HeatmapModel, HeatmapSurface};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Columns per heatmap cell
const BLOCK_WIDTH: usize = 2;

pub struct HeatmapPanel {
    model: HeatmapModel,
    /// Dimensions announced with the current context
    available: Vec<String>,
    active: usize,
}

impl HeatmapPanel {
    pub fn new() -> Self {
        Self {
            model: HeatmapModel::default(),
            available: Vec::new(),
            active: 0,
        }
    }

    /// Cycle to the next metadata dimension
    pub fn next_dim(&mut self) {
        if !self.model.dims.is_empty() {
            self.active = (self.active + 1) % self.model.dims.len();
        }
    }

    fn active_dim(&self) -> Option<&String> {
        self.model.dims.get(self.active)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(dim) = self.active_dim() else {
            let hint = if self.available.is_empty() {
                "no metadata dimensions"
            } else {
                "awaiting match results"
            };
            let paragraph = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" Heatmap "));
            frame.render_widget(paragraph, area);
            return;
        };

        let matrix = self.model.matrices.get(dim).cloned().unwrap_or_default();
        let flat: Vec<f32> = matrix.iter().flatten().copied().collect();
        let scale = ColorScale::from_values(&flat);

        let lines: Vec<Line> = matrix
            .iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|&v| {
                            Span::styled(
                                " ".repeat(BLOCK_WIDTH),
                                Style::default().bg(to_color(scale.color(v))),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let title = format!(" Heatmap [{dim}] (d: next) ");
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
    }
}

impl Default for HeatmapPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapSurface for HeatmapPanel {
    fn update(&mut self, model: HeatmapModel) {
        if self.active >= model.dims.len() {
            self.active = 0;
        }
        self.model = model;
    }

    fn set_meta_options(&mut self, dims: &[String]) {
        self.available = dims.to_vec();
    }
}
