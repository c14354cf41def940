// Line plot panel
//
// Draws one trace per cell across the context window, dims unselected
// cells, and overlays the threshold as a horizontal marker line.

use super::ACCENT;
use crate::surface::{LineChartModel, LineChartSurface, RenderOptions};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

pub struct LinePlotPanel {
    model: LineChartModel,
    threshold: f32,
    selected: Vec<usize>,
    options: RenderOptions,
    /// chart points per trace, precomputed on update
    points: Vec<Vec<(f64, f64)>>,
    y_bounds: (f64, f64),
}

impl LinePlotPanel {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            model: LineChartModel::default(),
            threshold: 0.0,
            selected: Vec::new(),
            options,
            points: Vec::new(),
            y_bounds: (0.0, 1.0),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        // Crop to the timesteps the token panel below can show at the shared
        // cell width, so both panels cover the same span.
        let visible = (area.width.saturating_sub(2) / self.options.cell_width.max(1)) as usize;
        let x_max = self.model.time_steps.min(visible.max(1)).max(1) as f64;

        let threshold_marker = [
            (0.0, self.threshold as f64),
            (x_max, self.threshold as f64),
        ];

        let mut datasets = Vec::with_capacity(self.points.len() + 1);
        // unselected first so highlighted traces draw on top
        for (trace, points) in self.model.traces.iter().zip(&self.points) {
            if !self.selected.contains(&trace.index) {
                datasets.push(
                    Dataset::default()
                        .graph_type(GraphType::Line)
                        .marker(symbols::Marker::Braille)
                        .style(Style::default().fg(Color::DarkGray))
                        .data(points),
                );
            }
        }
        for (trace, points) in self.model.traces.iter().zip(&self.points) {
            if self.selected.contains(&trace.index) {
                datasets.push(
                    Dataset::default()
                        .graph_type(GraphType::Line)
                        .marker(symbols::Marker::Braille)
                        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                        .data(points),
                );
            }
        }
        datasets.push(
            Dataset::default()
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Dot)
                .style(Style::default().fg(Color::Yellow))
                .data(&threshold_marker),
        );

        let title = format!(
            " Cell Activations ({} cells, {} selected) ",
            self.model.traces.len(),
            self.selected.len()
        );
        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title(title))
            .x_axis(
                Axis::default()
                    .bounds([0.0, x_max])
                    .labels(vec![Span::raw("0"), Span::raw(format!("{x_max:.0}"))]),
            )
            .y_axis(
                Axis::default()
                    .bounds([self.y_bounds.0, self.y_bounds.1])
                    .labels(vec![
                        Span::raw(format!("{:.2}", self.y_bounds.0)),
                        Span::raw(format!("{:.2}", self.y_bounds.1)),
                    ]),
            );
        frame.render_widget(chart, area);
    }

    #[cfg(test)]
    fn selected(&self) -> &[usize] {
        &self.selected
    }
}

impl LineChartSurface for LinePlotPanel {
    fn update(&mut self, model: LineChartModel) {
        self.points = model
            .traces
            .iter()
            .map(|trace| {
                trace
                    .values
                    .iter()
                    .enumerate()
                    .map(|(t, &v)| (t as f64, v as f64))
                    .collect()
            })
            .collect();

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for trace in &model.traces {
            for &v in &trace.values {
                lo = lo.min(v as f64);
                hi = hi.max(v as f64);
            }
        }
        self.y_bounds = if lo.is_finite() && hi.is_finite() && hi > lo {
            (lo, hi)
        } else {
            (0.0, 1.0)
        };

        self.model = model;
    }

    fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    fn set_selected_cells(&mut self, cells: &[usize]) {
        self.selected = cells.to_vec();
    }

    fn update_options(&mut self, options: &RenderOptions, _re_render: bool) {
        self.options = *options;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CellTrace;

    #[test]
    fn update_precomputes_points_and_bounds() {
        let mut panel = LinePlotPanel::new(RenderOptions::default());
        panel.update(LineChartModel {
            time_steps: 3,
            traces: vec![
                CellTrace {
                    index: 0,
                    values: vec![0.2, 0.8, 0.5],
                },
                CellTrace {
                    index: 1,
                    values: vec![-0.1, 0.0, 0.1],
                },
            ],
        });

        assert_eq!(panel.points.len(), 2);
        assert_eq!(panel.points[0][1], (1.0, 0.8f32 as f64));
        assert!((panel.y_bounds.0 - (-0.1f32 as f64)).abs() < 1e-6);
        assert!((panel.y_bounds.1 - (0.8f32 as f64)).abs() < 1e-6);
    }

    #[test]
    fn empty_model_keeps_sane_bounds() {
        let mut panel = LinePlotPanel::new(RenderOptions::default());
        panel.update(LineChartModel::default());
        assert_eq!(panel.y_bounds, (0.0, 1.0));
    }

    #[test]
    fn selection_is_replaced_not_merged() {
        let mut panel = LinePlotPanel::new(RenderOptions::default());
        panel.set_selected_cells(&[1, 2, 3]);
        panel.set_selected_cells(&[7]);
        assert_eq!(panel.selected(), &[7]);
    }
}
