//! Derived-selection engine
//!
//! Pure functions from controller state to derived views: the selected cell
//! set, the per-timestep aggregate over a selection, and the color mapping
//! driven by that aggregate. No state lives here; the session controller
//! memoizes results per state generation.

use crate::session::{ContextWindow, SelectionState};

/// Mean of `values` over a half-open range, clamped to the slice bounds.
///
/// Returns `None` when the range is empty or inverted after clamping, so a
/// degenerate brush yields "no score" rather than an error.
fn range_mean(values: &[f32], range: (i64, i64)) -> Option<f32> {
    let len = values.len() as i64;
    let lo = range.0.clamp(0, len) as usize;
    let hi = range.1.clamp(0, len) as usize;
    if hi <= lo {
        return None;
    }
    let slice = &values[lo..hi];
    Some(slice.iter().sum::<f32>() / slice.len() as f32)
}

/// Per-cell score: mean over the brush window, minus the mean over the
/// zero-brush window when one is set.
///
/// A missing or degenerate positive brush means no score at all; a
/// degenerate zero-brush is treated as absent.
fn cell_score(values: &[f32], selection: &SelectionState) -> Option<f32> {
    let brush = selection.word_brush?;
    let pos_avg = range_mean(values, brush)?;
    match selection.word_brush_zero.and_then(|zero| range_mean(values, zero)) {
        Some(zero_avg) => Some(pos_avg - zero_avg),
        None => Some(pos_avg),
    }
}

/// Cell indices whose score clears the threshold, in cell index order.
///
/// The boundary is inclusive: a score exactly equal to the threshold
/// selects the cell.
pub fn cell_selection(window: &ContextWindow, selection: &SelectionState) -> Vec<usize> {
    window
        .data
        .iter()
        .enumerate()
        .filter_map(|(index, values)| {
            let score = cell_score(values, selection)?;
            (score >= selection.threshold).then_some(index)
        })
        .collect()
}

/// Sum over the given cells, one value per timestep.
///
/// Unknown cell indices are skipped; an empty cell list yields a zero
/// vector of the window's length.
pub fn sum_cell_values(window: &ContextWindow, cells: &[usize]) -> Vec<f32> {
    let mut sums = vec![0.0f32; window.time_steps()];
    for &cell in cells {
        let Some(values) = window.data.get(cell) else {
            continue;
        };
        for (sum, value) in sums.iter_mut().zip(values) {
            *sum += value;
        }
    }
    sums
}

/// RGB triple used by surfaces; panels convert to their own color type.
pub type Rgb = (u8, u8, u8);

const SCALE_LOW: Rgb = (255, 255, 255);
const SCALE_HIGH: Rgb = (19, 153, 228);

/// Linear color scale over `[0, max]` mapping to a fixed white-to-blue
/// range.
///
/// A degenerate domain (`max <= 0`, e.g. an all-zero sum vector) maps every
/// input to the low color instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    max: f32,
}

impl ColorScale {
    pub fn from_values(values: &[f32]) -> Self {
        let max = values.iter().copied().fold(0.0f32, f32::max);
        Self { max }
    }

    pub fn color(&self, value: f32) -> Rgb {
        if self.max <= 0.0 {
            return SCALE_LOW;
        }
        let t = (value / self.max).clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        (
            mix(SCALE_LOW.0, SCALE_HIGH.0),
            mix(SCALE_LOW.1, SCALE_HIGH.1),
            mix(SCALE_LOW.2, SCALE_HIGH.2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 timesteps, 3 cells: means over [2,5) are 0.6, 0.4 and 0.2;
    /// the first cell's mean over [7,9) is 0.55.
    fn window() -> ContextWindow {
        let mut c0 = vec![0.0; 10];
        c0[2] = 0.6;
        c0[3] = 0.6;
        c0[4] = 0.6;
        c0[7] = 0.55;
        c0[8] = 0.55;
        let mut c1 = vec![0.0; 10];
        c1[2] = 0.4;
        c1[3] = 0.4;
        c1[4] = 0.4;
        let mut c2 = vec![0.0; 10];
        c2[2] = 0.2;
        c2[3] = 0.2;
        c2[4] = 0.2;
        ContextWindow {
            left: 100,
            right: 110,
            data: vec![c0, c1, c2],
        }
    }

    fn selection(
        brush: Option<(i64, i64)>,
        zero: Option<(i64, i64)>,
        threshold: f32,
    ) -> SelectionState {
        SelectionState {
            word_brush: brush,
            word_brush_zero: zero,
            threshold,
        }
    }

    #[test]
    fn brush_mean_against_threshold() {
        let sel = selection(Some((2, 5)), None, 0.5);
        assert_eq!(cell_selection(&window(), &sel), vec![0]);
    }

    #[test]
    fn zero_brush_subtracts_baseline() {
        // score = 0.6 - 0.55 = 0.05 < 0.5, so the first cell drops out
        let sel = selection(Some((2, 5)), Some((7, 9)), 0.5);
        assert_eq!(cell_selection(&window(), &sel), Vec::<usize>::new());
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let sel = selection(Some((2, 5)), None, 0.6);
        assert_eq!(cell_selection(&window(), &sel), vec![0]);
    }

    #[test]
    fn absent_brush_selects_nothing() {
        let sel = selection(None, None, -100.0);
        assert!(cell_selection(&window(), &sel).is_empty());
    }

    #[test]
    fn inverted_brush_selects_nothing() {
        let sel = selection(Some((5, 2)), None, -100.0);
        assert!(cell_selection(&window(), &sel).is_empty());
    }

    #[test]
    fn empty_brush_selects_nothing() {
        let sel = selection(Some((3, 3)), None, -100.0);
        assert!(cell_selection(&window(), &sel).is_empty());
    }

    #[test]
    fn out_of_range_brush_is_clamped() {
        // [8, 99) clamps to [8, 10); both cells average 0 there except c0
        let sel = selection(Some((8, 99)), None, 0.2);
        assert_eq!(cell_selection(&window(), &sel), vec![0]);
    }

    #[test]
    fn degenerate_zero_brush_is_ignored() {
        let with_zero = selection(Some((2, 5)), Some((9, 9)), 0.5);
        let without = selection(Some((2, 5)), None, 0.5);
        assert_eq!(
            cell_selection(&window(), &with_zero),
            cell_selection(&window(), &without)
        );
    }

    #[test]
    fn raising_threshold_never_grows_the_selection() {
        let w = window();
        let mut previous = usize::MAX;
        for step in 0..20 {
            let sel = selection(Some((2, 5)), None, step as f32 * 0.05);
            let size = cell_selection(&w, &sel).len();
            assert!(size <= previous, "selection grew at threshold step {step}");
            previous = size;
        }
    }

    #[test]
    fn selection_is_deterministic() {
        let w = window();
        let sel = selection(Some((2, 5)), None, 0.1);
        assert_eq!(cell_selection(&w, &sel), cell_selection(&w, &sel));
    }

    #[test]
    fn sum_over_cells() {
        let w = window();
        let sums = sum_cell_values(&w, &[0, 1]);
        assert_eq!(sums.len(), 10);
        assert!((sums[2] - 1.0).abs() < 1e-6);
        assert!((sums[7] - 0.55).abs() < 1e-6);
    }

    #[test]
    fn sum_over_no_cells_is_zero_vector() {
        let sums = sum_cell_values(&window(), &[]);
        assert_eq!(sums, vec![0.0; 10]);
    }

    #[test]
    fn sum_skips_unknown_cells() {
        let w = window();
        assert_eq!(sum_cell_values(&w, &[0, 99]), sum_cell_values(&w, &[0]));
    }

    #[test]
    fn color_scale_endpoints() {
        let scale = ColorScale::from_values(&[0.0, 2.0]);
        assert_eq!(scale.color(0.0), (255, 255, 255));
        assert_eq!(scale.color(2.0), (19, 153, 228));
    }

    #[test]
    fn color_scale_clamps_out_of_domain() {
        let scale = ColorScale::from_values(&[1.0]);
        assert_eq!(scale.color(5.0), (19, 153, 228));
        assert_eq!(scale.color(-1.0), (255, 255, 255));
    }

    #[test]
    fn zero_domain_falls_back_to_constant_low() {
        let scale = ColorScale::from_values(&[0.0, 0.0]);
        assert_eq!(scale.color(0.0), (255, 255, 255));
        assert_eq!(scale.color(123.0), (255, 255, 255));

        let empty = ColorScale::from_values(&[]);
        assert_eq!(empty.color(1.0), (255, 255, 255));
    }
}
