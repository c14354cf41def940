//! Coordinator - the fixed-order update pipeline
//!
//! One handler per event, each an explicit sequence: mutate the controller,
//! re-derive, then push view-models to the dependent surfaces. The ordering
//! rules live here and nowhere else:
//!
//! - the cell selection is recomputed only after a new context window is
//!   installed, and before any dependent surface redraws
//! - the result panel is revealed only after its rows and heatmap data are
//!   in place, never the other way around
//!
//! After its own pipeline runs, each handled event is published on the bus
//! for auxiliary listeners.

use crate::backend::{BackendReply, ContextParams};
use crate::events::{EventBus, VisEvent};
use crate::select::ColorScale;
use crate::session::{ReplyOutcome, SessionController};
use crate::surface::{
    CellListModel, CellTrace, HeatmapModel, LineChartModel, MatchMatrixModel, MatchMatrixRow,
    RenderOptions, Surfaces, TokenSequenceModel,
};
use std::collections::HashMap;

/// Pan step in timesteps, matching the position controls
pub const PAN_STEP: i64 = 5;

pub struct Coordinator {
    controller: SessionController,
    bus: EventBus,
    options: RenderOptions,
    last_error: Option<String>,
}

impl Coordinator {
    pub fn new(controller: SessionController, bus: EventBus) -> Self {
        let options = RenderOptions {
            cell_width: controller.cell_width(),
            ..Default::default()
        };
        Self {
            controller,
            bus,
            options,
            last_error: None,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController {
        &mut self.controller
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Most recent backend failure, for the status line
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Entry point for UI interaction and data events.
    pub fn dispatch(&mut self, event: VisEvent, surfaces: &mut Surfaces<'_>) {
        match &event {
            VisEvent::BrushSelectionChanged { range } => {
                self.controller.set_word_brush(*range);
                self.update_cell_selection(true, surfaces);
            }
            VisEvent::ZeroBrushSelectionChanged { range } => {
                self.controller.set_word_brush_zero(*range);
                self.update_cell_selection(true, surfaces);
            }
            VisEvent::ThresholdChanged { value } => {
                self.controller.set_threshold(*value);
                surfaces.line_chart.set_threshold(self.controller.threshold());
                self.update_cell_selection(true, surfaces);
            }
            VisEvent::CellWidthChanged { delta } => {
                let width = (self.controller.cell_width() as i32 + *delta as i32).max(1) as u16;
                self.controller.set_cell_width(width);
                self.options.cell_width = self.controller.cell_width();
                // every token-aligned panel gets the same width
                surfaces.line_chart.update_options(&self.options, true);
                surfaces.token_sequence.update_options(&self.options, true);
                surfaces.match_matrix.update_options(&self.options, true);
            }
            VisEvent::PanRequested { offset } => {
                // keep the brush over the same tokens while the anchor moves
                if let Some((b0, b1)) = self.controller.selection().word_brush {
                    self.controller.set_word_brush(Some((b0 - offset, b1 - offset)));
                }
                let pos = self.controller.pos() + offset;
                self.controller.set_pos(pos);
                self.controller.request_context(ContextParams::default());
            }
            VisEvent::MatchRequested { mode } => {
                // hide first; only the results event may reveal
                surfaces.match_matrix.set_visible(false);
                let dims = self.controller.meta_dims().to_vec();
                self.controller.request_match(dims, *mode);
            }
            VisEvent::WindowResize { width, height } => {
                self.controller.set_window_size(*width, *height);
            }
            VisEvent::NewContextAvailable => self.on_new_context(surfaces),
            VisEvent::NewMatchingResults => self.on_new_match(surfaces),
        }
        self.bus.publish(&event);
    }

    /// Entry point for backend replies. Installed payloads re-enter
    /// `dispatch` as data events; superseded replies vanish silently and
    /// failures only touch the error notice.
    pub fn handle_reply(&mut self, reply: BackendReply, surfaces: &mut Surfaces<'_>) {
        match reply {
            BackendReply::Context { token, result } => {
                match self.controller.apply_context(token, result) {
                    ReplyOutcome::Installed => {
                        self.last_error = None;
                        self.dispatch(VisEvent::NewContextAvailable, surfaces);
                    }
                    ReplyOutcome::Stale => {}
                    ReplyOutcome::Failed(err) => {
                        tracing::error!(error = %err, "context fetch failed");
                        self.last_error = Some(format!("context fetch failed: {err:#}"));
                    }
                }
            }
            BackendReply::Match { token, result } => {
                match self.controller.apply_match(token, result) {
                    ReplyOutcome::Installed => {
                        self.last_error = None;
                        self.dispatch(VisEvent::NewMatchingResults, surfaces);
                    }
                    ReplyOutcome::Stale => {}
                    ReplyOutcome::Failed(err) => {
                        tracing::error!(error = %err, "match fetch failed");
                        self.last_error = Some(format!("match fetch failed: {err:#}"));
                    }
                }
            }
        }
    }

    /// A new window was installed: rebuild everything that derives from it,
    /// in dependency order.
    fn on_new_context(&mut self, surfaces: &mut Surfaces<'_>) {
        let window = self.controller.window();
        let line_model = LineChartModel {
            time_steps: window.time_steps(),
            traces: window
                .data
                .iter()
                .enumerate()
                .map(|(index, values)| CellTrace {
                    index,
                    values: values.clone(),
                })
                .collect(),
        };
        surfaces.line_chart.update(line_model);
        surfaces.line_chart.set_threshold(self.controller.threshold());

        let selection = self.controller.selection();
        surfaces.token_sequence.update(TokenSequenceModel {
            words: self.controller.words().to_vec(),
            word_brush: selection.word_brush,
            word_brush_zero: selection.word_brush_zero,
        });

        self.update_cell_selection(true, surfaces);

        let dims = self.controller.meta_dims().to_vec();
        surfaces.heatmap.set_meta_options(&dims);
    }

    /// New rows arrived: annotate, fill the result surfaces, then reveal.
    fn on_new_match(&mut self, surfaces: &mut Surfaces<'_>) {
        let rows: Vec<MatchMatrixRow> = self
            .controller
            .match_rows()
            .iter()
            .map(|row| MatchMatrixRow {
                row_id: row.pos,
                pos_offset: row.left,
                match_score: row.match_score,
                words: row.words.clone(),
            })
            .collect();

        let mut dims = self.controller.meta_dims().to_vec();
        if dims.is_empty() {
            // fall back to whatever dimensions the rows carry
            let mut seen: Vec<String> = self
                .controller
                .match_rows()
                .iter()
                .flat_map(|row| row.meta.keys().cloned())
                .collect();
            seen.sort();
            seen.dedup();
            dims = seen;
        }
        let mut matrices: HashMap<String, Vec<Vec<f32>>> = HashMap::new();
        for dim in &dims {
            let matrix = self
                .controller
                .match_rows()
                .iter()
                .map(|row| {
                    // normalize ragged strips to the row's own span
                    let steps = (row.right - row.left).max(0) as usize;
                    let mut strip = row.meta.get(dim).cloned().unwrap_or_default();
                    strip.resize(steps, 0.0);
                    strip
                })
                .collect();
            matrices.insert(dim.clone(), matrix);
        }

        surfaces.match_matrix.update(MatchMatrixModel { rows });
        surfaces.heatmap.update(HeatmapModel { dims, matrices });
        surfaces.match_matrix.set_visible(true);
    }

    /// Recompute the derived selection and push the dependent view-models.
    ///
    /// Mirrors the line-chart highlight, the token backgrounds and the cell
    /// list; an empty selection clears all three.
    fn update_cell_selection(&mut self, force_recompute: bool, surfaces: &mut Surfaces<'_>) {
        let cells = self.controller.cell_selection(force_recompute);
        surfaces.line_chart.set_selected_cells(&cells);

        if cells.is_empty() {
            surfaces.token_sequence.set_word_backgrounds(None);
            surfaces.cell_list.update(CellListModel { cells: Vec::new() });
        } else {
            let sum_vec = self.controller.sum_cell_values(&cells);
            let scale = ColorScale::from_values(&sum_vec);
            let colors = sum_vec.iter().map(|&v| scale.color(v)).collect();
            surfaces.token_sequence.set_word_backgrounds(Some(colors));
            surfaces.cell_list.update(CellListModel { cells });
        }
    }
}
