// Rendering panels - the concrete surfaces behind the coordinator's traits
//
// Each panel stores the last view-model it was pushed and renders it on
// demand; rendering never reaches back into controller state.

pub mod cell_list;
pub mod heatmap;
pub mod line_plot;
pub mod match_matrix;
pub mod token_sequence;

pub use cell_list::CellListPanel;
pub use heatmap::HeatmapPanel;
pub use line_plot::LinePlotPanel;
pub use match_matrix::MatchMatrixPanel;
pub use token_sequence::TokenSequencePanel;

use crate::select::Rgb;
use ratatui::style::Color;

/// Accent used for selected traces and highlights, the high end of the
/// selection color scale
pub const ACCENT: Color = Color::Rgb(19, 153, 228);

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Readable foreground on top of a light-to-blue scale background
pub fn contrast_fg(rgb: Rgb) -> Color {
    // perceived luminance, quick integer approximation
    let luma = (rgb.0 as u32 * 299 + rgb.1 as u32 * 587 + rgb.2 as u32 * 114) / 1000;
    if luma > 140 {
        Color::Black
    } else {
        Color::White
    }
}
