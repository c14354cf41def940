//! Input adapters - translate key presses into typed events
//!
//! Pure mapping from a key plus a snapshot of the relevant session state to
//! an action; no state lives here, which keeps the bindings testable
//! without a terminal.
//!
//! Bindings:
//! - arrows move the active brush, shift+arrows resize it
//! - Tab switches between the positive and the zero brush
//! - x clears the active brush, +/- nudges the threshold
//! - [ ] zoom token cells, , . pan the context window
//! - m / M trigger a fast / precise match, d cycles the heatmap dimension
//! - q or Esc quits

use crate::backend::MatchMode;
use crate::coordinator::PAN_STEP;
use crate::events::VisEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Threshold nudge per key press
const THRESHOLD_STEP: f32 = 0.05;

/// Width of a freshly created brush
const DEFAULT_BRUSH_LEN: i64 = 3;

/// Which brush the arrow keys currently edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushTarget {
    #[default]
    Positive,
    Zero,
}

impl BrushTarget {
    pub fn toggled(self) -> Self {
        match self {
            BrushTarget::Positive => BrushTarget::Zero,
            BrushTarget::Zero => BrushTarget::Positive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BrushTarget::Positive => "brush",
            BrushTarget::Zero => "zero-brush",
        }
    }
}

/// Snapshot of the state the bindings depend on
#[derive(Debug, Clone, Copy)]
pub struct InputContext {
    pub brush: Option<(i64, i64)>,
    pub zero_brush: Option<(i64, i64)>,
    pub threshold: f32,
    pub time_steps: usize,
    pub target: BrushTarget,
}

impl InputContext {
    fn active_brush(&self) -> Option<(i64, i64)> {
        match self.target {
            BrushTarget::Positive => self.brush,
            BrushTarget::Zero => self.zero_brush,
        }
    }

    fn brush_event(&self, range: Option<(i64, i64)>) -> VisEvent {
        match self.target {
            BrushTarget::Positive => VisEvent::BrushSelectionChanged { range },
            BrushTarget::Zero => VisEvent::ZeroBrushSelectionChanged { range },
        }
    }
}

/// What a key press amounts to
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    Quit,
    ToggleBrushTarget,
    CycleHeatmapDim,
    Emit(VisEvent),
}

/// Map a key press to an action; `None` for unbound keys and repeats.
pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Tab => Some(InputAction::ToggleBrushTarget),
        KeyCode::Char('d') => Some(InputAction::CycleHeatmapDim),

        KeyCode::Left if shifted => resize_brush(ctx, -1),
        KeyCode::Right if shifted => resize_brush(ctx, 1),
        KeyCode::Left => move_brush(ctx, -1),
        KeyCode::Right => move_brush(ctx, 1),
        KeyCode::Char('x') => Some(InputAction::Emit(ctx.brush_event(None))),

        KeyCode::Char('+') | KeyCode::Char('=') => Some(InputAction::Emit(
            VisEvent::ThresholdChanged {
                value: ctx.threshold + THRESHOLD_STEP,
            },
        )),
        KeyCode::Char('-') => Some(InputAction::Emit(VisEvent::ThresholdChanged {
            value: ctx.threshold - THRESHOLD_STEP,
        })),

        KeyCode::Char('[') => Some(InputAction::Emit(VisEvent::CellWidthChanged { delta: -1 })),
        KeyCode::Char(']') => Some(InputAction::Emit(VisEvent::CellWidthChanged { delta: 1 })),

        KeyCode::Char(',') => Some(InputAction::Emit(VisEvent::PanRequested {
            offset: -PAN_STEP,
        })),
        KeyCode::Char('.') => Some(InputAction::Emit(VisEvent::PanRequested {
            offset: PAN_STEP,
        })),

        KeyCode::Char('m') => Some(InputAction::Emit(VisEvent::MatchRequested {
            mode: MatchMode::Fast,
        })),
        KeyCode::Char('M') => Some(InputAction::Emit(VisEvent::MatchRequested {
            mode: MatchMode::Precise,
        })),

        _ => None,
    }
}

/// Shift the active brush, or create one at the window center when absent.
fn move_brush(ctx: &InputContext, delta: i64) -> Option<InputAction> {
    let steps = ctx.time_steps as i64;
    if steps == 0 {
        return None;
    }
    let range = match ctx.active_brush() {
        Some((b0, b1)) => {
            let len = b1 - b0;
            let b0 = (b0 + delta).clamp(0, (steps - len).max(0));
            (b0, b0 + len)
        }
        None => {
            let len = DEFAULT_BRUSH_LEN.min(steps);
            let b0 = (steps - len) / 2;
            (b0, b0 + len)
        }
    };
    Some(InputAction::Emit(ctx.brush_event(Some(range))))
}

/// Grow or shrink the active brush's right edge; never below one step.
fn resize_brush(ctx: &InputContext, delta: i64) -> Option<InputAction> {
    let steps = ctx.time_steps as i64;
    let (b0, b1) = ctx.active_brush()?;
    let b1 = (b1 + delta).clamp(b0 + 1, steps.max(b0 + 1));
    Some(InputAction::Emit(ctx.brush_event(Some((b0, b1)))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift_press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    fn ctx() -> InputContext {
        InputContext {
            brush: Some((4, 7)),
            zero_brush: None,
            threshold: 0.5,
            time_steps: 20,
            target: BrushTarget::Positive,
        }
    }

    #[test]
    fn quit_keys() {
        assert_eq!(map_key(press(KeyCode::Char('q')), &ctx()), Some(InputAction::Quit));
        assert_eq!(map_key(press(KeyCode::Esc), &ctx()), Some(InputAction::Quit));
    }

    #[test]
    fn arrows_move_the_active_brush() {
        let action = map_key(press(KeyCode::Right), &ctx());
        assert_eq!(
            action,
            Some(InputAction::Emit(VisEvent::BrushSelectionChanged {
                range: Some((5, 8))
            }))
        );
    }

    #[test]
    fn moving_clamps_at_the_window_edge() {
        let mut c = ctx();
        c.brush = Some((0, 3));
        let action = map_key(press(KeyCode::Left), &c);
        assert_eq!(
            action,
            Some(InputAction::Emit(VisEvent::BrushSelectionChanged {
                range: Some((0, 3))
            }))
        );
    }

    #[test]
    fn first_arrow_creates_a_centered_brush() {
        let mut c = ctx();
        c.brush = None;
        let action = map_key(press(KeyCode::Right), &c);
        assert_eq!(
            action,
            Some(InputAction::Emit(VisEvent::BrushSelectionChanged {
                range: Some((8, 11))
            }))
        );
    }

    #[test]
    fn no_brush_without_a_window() {
        let mut c = ctx();
        c.brush = None;
        c.time_steps = 0;
        assert_eq!(map_key(press(KeyCode::Right), &c), None);
    }

    #[test]
    fn shift_arrows_resize() {
        let grow = map_key(shift_press(KeyCode::Right), &ctx());
        assert_eq!(
            grow,
            Some(InputAction::Emit(VisEvent::BrushSelectionChanged {
                range: Some((4, 8))
            }))
        );

        let mut c = ctx();
        c.brush = Some((4, 5));
        // a brush never shrinks below one step
        let shrink = map_key(shift_press(KeyCode::Left), &c);
        assert_eq!(
            shrink,
            Some(InputAction::Emit(VisEvent::BrushSelectionChanged {
                range: Some((4, 5))
            }))
        );
    }

    #[test]
    fn tab_switches_the_brush_target() {
        assert_eq!(
            map_key(press(KeyCode::Tab), &ctx()),
            Some(InputAction::ToggleBrushTarget)
        );
        assert_eq!(BrushTarget::Positive.toggled(), BrushTarget::Zero);
        assert_eq!(BrushTarget::Zero.toggled(), BrushTarget::Positive);
    }

    #[test]
    fn zero_target_edits_the_zero_brush() {
        let mut c = ctx();
        c.target = BrushTarget::Zero;
        c.zero_brush = Some((10, 12));
        let action = map_key(press(KeyCode::Left), &c);
        assert_eq!(
            action,
            Some(InputAction::Emit(VisEvent::ZeroBrushSelectionChanged {
                range: Some((9, 11))
            }))
        );
    }

    #[test]
    fn threshold_and_zoom_and_pan() {
        match map_key(press(KeyCode::Char('+')), &ctx()) {
            Some(InputAction::Emit(VisEvent::ThresholdChanged { value })) => {
                assert!((value - 0.55).abs() < 1e-6)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            map_key(press(KeyCode::Char(']')), &ctx()),
            Some(InputAction::Emit(VisEvent::CellWidthChanged { delta: 1 }))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('.')), &ctx()),
            Some(InputAction::Emit(VisEvent::PanRequested { offset: PAN_STEP }))
        );
    }

    #[test]
    fn match_triggers() {
        assert_eq!(
            map_key(press(KeyCode::Char('m')), &ctx()),
            Some(InputAction::Emit(VisEvent::MatchRequested {
                mode: MatchMode::Fast
            }))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('M')), &ctx()),
            Some(InputAction::Emit(VisEvent::MatchRequested {
                mode: MatchMode::Precise
            }))
        );
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key, &ctx()), None);
    }
}
