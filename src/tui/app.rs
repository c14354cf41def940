// TUI application state
//
// Owns the coordinator and the concrete panels, routes input actions into
// coordinator dispatches, and renders each frame from whatever the panels
// were last pushed.

use super::components::{
    CellListPanel, HeatmapPanel, LinePlotPanel, MatchMatrixPanel, TokenSequencePanel,
};
use super::input::{self, BrushTarget, InputAction, InputContext};
use super::layout;
use crate::backend::{BackendReply, ContextParams};
use crate::coordinator::Coordinator;
use crate::events::{EventBus, EventKind, VisEvent};
use crate::session::SessionController;
use crate::surface::Surfaces;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// The concrete rendering surfaces
pub struct Panels {
    pub line_plot: LinePlotPanel,
    pub token_sequence: TokenSequencePanel,
    pub cell_list: CellListPanel,
    pub match_matrix: MatchMatrixPanel,
    pub heatmap: HeatmapPanel,
}

impl Panels {
    fn surfaces(&mut self) -> Surfaces<'_> {
        Surfaces {
            line_chart: &mut self.line_plot,
            token_sequence: &mut self.token_sequence,
            cell_list: &mut self.cell_list,
            match_matrix: &mut self.match_matrix,
            heatmap: &mut self.heatmap,
        }
    }
}

/// Main application state for the TUI
pub struct App {
    pub coordinator: Coordinator,
    pub panels: Panels,
    pub brush_target: BrushTarget,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: SessionController) -> Self {
        let mut coordinator = Coordinator::new(controller, EventBus::new());
        coordinator
            .bus_mut()
            .subscribe(EventKind::NewContextAvailable, |_| {
                tracing::info!("context window updated");
            });
        coordinator
            .bus_mut()
            .subscribe(EventKind::NewMatchingResults, |_| {
                tracing::info!("matching results updated");
            });
        let options = coordinator.options();
        Self {
            coordinator,
            panels: Panels {
                line_plot: LinePlotPanel::new(options),
                token_sequence: TokenSequencePanel::new(options),
                cell_list: CellListPanel::new(),
                match_matrix: MatchMatrixPanel::new(options),
                heatmap: HeatmapPanel::new(),
            },
            brush_target: BrushTarget::default(),
            should_quit: false,
        }
    }

    /// Issue the initial context fetch
    pub fn bootstrap(&mut self) {
        self.coordinator
            .controller_mut()
            .request_context(ContextParams::default());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let controller = self.coordinator.controller();
        let selection = controller.selection();
        let ctx = InputContext {
            brush: selection.word_brush,
            zero_brush: selection.word_brush_zero,
            threshold: selection.threshold,
            time_steps: controller.window().time_steps(),
            target: self.brush_target,
        };

        match input::map_key(key, &ctx) {
            Some(InputAction::Quit) => self.should_quit = true,
            Some(InputAction::ToggleBrushTarget) => {
                self.brush_target = self.brush_target.toggled();
            }
            Some(InputAction::CycleHeatmapDim) => self.panels.heatmap.next_dim(),
            Some(InputAction::Emit(event)) => self.dispatch(event),
            None => {}
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.dispatch(VisEvent::WindowResize { width, height });
        tracing::debug!(
            size = ?self.coordinator.controller().window_size(),
            "viewport resized"
        );
    }

    pub fn handle_reply(&mut self, reply: BackendReply) {
        let mut surfaces = self.panels.surfaces();
        self.coordinator.handle_reply(reply, &mut surfaces);
    }

    fn dispatch(&mut self, event: VisEvent) {
        let mut surfaces = self.panels.surfaces();
        self.coordinator.dispatch(event, &mut surfaces);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let panes = layout::split(frame.area());
        self.render_status(frame, panes.status);
        self.panels.line_plot.render(frame, panes.line_plot);
        self.panels.token_sequence.render(frame, panes.tokens);
        self.panels.cell_list.render(frame, panes.cells);
        self.panels.match_matrix.render(frame, panes.matches);
        self.panels.heatmap.render(frame, panes.heatmap);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let controller = self.coordinator.controller();
        let mut spans = vec![
            Span::styled(
                format!(" {} ", controller.source()),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::raw(format!(
                " pos {}  cells {}  threshold {:.2}  width {}  editing {} ",
                controller.pos(),
                controller.window().cell_count(),
                controller.threshold(),
                controller.cell_width(),
                self.brush_target.label(),
            )),
        ];
        if controller.match_pending() {
            spans.push(Span::styled(
                " matching... ",
                Style::default().fg(Color::Yellow),
            ));
        }
        if let Some(error) = self.coordinator.last_error() {
            spans.push(Span::styled(
                format!(" {error} "),
                Style::default().fg(Color::Red),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
