//! Rendering-surface contracts and the view-models the coordinator pushes
//!
//! Surfaces receive copies or derived values only - never references into
//! live controller state - so no panel can corrupt controller invariants.
//! The TUI panels implement these traits; coordinator tests use recording
//! fakes.

use crate::select::Rgb;
use std::collections::HashMap;

/// Shared rendering parameters kept visually consistent across panels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Columns per token cell
    pub cell_width: u16,
    /// Panel anchor, for surfaces that place themselves
    pub position: (u16, u16),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_width: 8,
            position: (0, 0),
        }
    }
}

/// One cell's activation trace across the window
#[derive(Debug, Clone, PartialEq)]
pub struct CellTrace {
    pub index: usize,
    pub values: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineChartModel {
    pub time_steps: usize,
    pub traces: Vec<CellTrace>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenSequenceModel {
    pub words: Vec<String>,
    pub word_brush: Option<(i64, i64)>,
    pub word_brush_zero: Option<(i64, i64)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellListModel {
    pub cells: Vec<usize>,
}

/// One ranked match row, annotated with view-only aliases at the
/// coordination boundary: `row_id` mirrors the backend `pos`, `pos_offset`
/// mirrors `left`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMatrixRow {
    pub row_id: i64,
    pub pos_offset: i64,
    pub match_score: f32,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchMatrixModel {
    pub rows: Vec<MatchMatrixRow>,
}

/// Per-dimension value matrices over the match rows, rows x timesteps
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapModel {
    pub dims: Vec<String>,
    pub matrices: HashMap<String, Vec<Vec<f32>>>,
}

pub trait LineChartSurface {
    /// Replace displayed traces
    fn update(&mut self, model: LineChartModel);
    /// Move the threshold marker
    fn set_threshold(&mut self, threshold: f32);
    /// Highlight the selected cells
    fn set_selected_cells(&mut self, cells: &[usize]);
    fn update_options(&mut self, options: &RenderOptions, re_render: bool);
}

pub trait TokenSequenceSurface {
    /// Replace displayed words and brush overlays
    fn update(&mut self, model: TokenSequenceModel);
    /// Per-word background colors driven by the selection aggregate;
    /// `None` clears them (empty selection)
    fn set_word_backgrounds(&mut self, colors: Option<Vec<Rgb>>);
    fn update_options(&mut self, options: &RenderOptions, re_render: bool);
}

pub trait CellListSurface {
    fn update(&mut self, model: CellListModel);
}

pub trait MatchMatrixSurface {
    fn update(&mut self, model: MatchMatrixModel);
    /// Stale-data policy: hidden while a match is in flight, revealed only
    /// once new rows are in place
    fn set_visible(&mut self, visible: bool);
    fn update_options(&mut self, options: &RenderOptions, re_render: bool);
}

pub trait HeatmapSurface {
    fn update(&mut self, model: HeatmapModel);
    /// Metadata dimensions available with the current context
    fn set_meta_options(&mut self, dims: &[String]);
}

/// Mutable borrows of every panel, handed to the coordinator per dispatch
pub struct Surfaces<'a> {
    pub line_chart: &'a mut dyn LineChartSurface,
    pub token_sequence: &'a mut dyn TokenSequenceSurface,
    pub cell_list: &'a mut dyn CellListSurface,
    pub match_matrix: &'a mut dyn MatchMatrixSurface,
    pub heatmap: &'a mut dyn HeatmapSurface,
}
