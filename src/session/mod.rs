//! Session controller - single owner of authoritative client state
//!
//! Owns the context window, the brush/threshold inputs the selection
//! predicate runs on, the shared render scale and the latest match rows.
//! Derived values (cell selection, sum vector) are computed by `select` and
//! memoized per state generation; every invalidating mutation bumps the
//! generation so a stale memo can never be served.
//!
//! Backend fetches run as spawned tasks and re-enter the event loop as
//! `BackendReply` messages. Each request captures a per-resource token; a
//! reply is applied only when its token is still the latest outstanding for
//! that resource, so out-of-order responses are discarded instead of
//! clobbering newer state.

use crate::backend::{
    Backend, BackendReply, ContextParams, ContextPayload, ContextQuery, MatchMode, MatchPayload,
    MatchQuery, MatchRow,
};
use crate::select;
use tokio::sync::mpsc;

/// Activation slice currently loaded, spanning [left, right)
#[derive(Debug, Clone, PartialEq)]
pub struct ContextWindow {
    pub left: i64,
    pub right: i64,
    /// data[cell][t], every row of length right-left
    pub data: Vec<Vec<f32>>,
}

impl ContextWindow {
    pub fn empty() -> Self {
        Self {
            left: 0,
            right: 0,
            data: Vec::new(),
        }
    }

    pub fn time_steps(&self) -> usize {
        (self.right - self.left).max(0) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.data.len()
    }
}

/// Brush and threshold inputs the selection predicate runs on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Positive half-open time range, window coordinates
    pub word_brush: Option<(i64, i64)>,
    /// Baseline range subtracted from the brush region
    pub word_brush_zero: Option<(i64, i64)>,
    /// Score cutoff, inclusive
    pub threshold: f32,
}

/// What happened to a backend reply
#[derive(Debug)]
pub enum ReplyOutcome {
    /// The payload was installed as new state
    Installed,
    /// A newer request superseded this reply; state untouched
    Stale,
    /// The fetch failed; state untouched
    Failed(anyhow::Error),
}

pub struct SessionController {
    backend: Backend,
    reply_tx: mpsc::UnboundedSender<BackendReply>,

    params: ContextQuery,
    window: ContextWindow,
    words: Vec<String>,
    meta_dims: Vec<String>,
    selection: SelectionState,
    cell_width: u16,
    window_size: (u16, u16),

    match_rows: Vec<MatchRow>,
    match_pending: bool,

    // generation-tagged memo of the derived cell selection
    generation: u64,
    selection_cache: Option<(u64, Vec<usize>)>,

    // latest outstanding request token per resource
    context_token: u64,
    match_token: u64,
}

impl SessionController {
    pub fn new(
        backend: Backend,
        reply_tx: mpsc::UnboundedSender<BackendReply>,
        params: ContextQuery,
        threshold: f32,
        cell_width: u16,
    ) -> Self {
        Self {
            backend,
            reply_tx,
            params,
            window: ContextWindow::empty(),
            words: Vec::new(),
            meta_dims: Vec::new(),
            selection: SelectionState {
                threshold,
                ..Default::default()
            },
            cell_width: cell_width.max(1),
            window_size: (0, 0),
            match_rows: Vec::new(),
            match_pending: false,
            generation: 0,
            selection_cache: None,
            context_token: 0,
            match_token: 0,
        }
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn meta_dims(&self) -> &[String] {
        &self.meta_dims
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn threshold(&self) -> f32 {
        self.selection.threshold
    }

    pub fn cell_width(&self) -> u16 {
        self.cell_width
    }

    pub fn pos(&self) -> i64 {
        self.params.pos
    }

    pub fn source(&self) -> &str {
        &self.params.source
    }

    pub fn window_size(&self) -> (u16, u16) {
        self.window_size
    }

    pub fn match_rows(&self) -> &[MatchRow] {
        &self.match_rows
    }

    pub fn match_pending(&self) -> bool {
        self.match_pending
    }

    // ── State writes ─────────────────────────────────────────────────────
    //
    // Pure writes: none of these render. The coordinator decides what gets
    // recomputed and pushed after each one.

    pub fn set_word_brush(&mut self, range: Option<(i64, i64)>) {
        self.selection.word_brush = range;
        self.invalidate();
    }

    pub fn set_word_brush_zero(&mut self, range: Option<(i64, i64)>) {
        self.selection.word_brush_zero = range;
        self.invalidate();
    }

    pub fn set_threshold(&mut self, value: f32) {
        self.selection.threshold = round4(value);
        self.invalidate();
    }

    pub fn set_cell_width(&mut self, width: u16) {
        self.cell_width = width.max(1);
        self.invalidate();
    }

    pub fn set_pos(&mut self, pos: i64) {
        self.params.pos = pos;
    }

    pub fn set_window_size(&mut self, width: u16, height: u16) {
        self.window_size = (width, height);
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    // ── Derived state ────────────────────────────────────────────────────

    /// Current derived cell selection.
    ///
    /// Served from the memo when it belongs to the current state generation
    /// and `force_recompute` is false; recomputed otherwise.
    pub fn cell_selection(&mut self, force_recompute: bool) -> Vec<usize> {
        if !force_recompute {
            if let Some((generation, cached)) = &self.selection_cache {
                if *generation == self.generation {
                    return cached.clone();
                }
            }
        }
        let computed = select::cell_selection(&self.window, &self.selection);
        self.selection_cache = Some((self.generation, computed.clone()));
        computed
    }

    /// Aggregate time-series over the given cells, one value per timestep
    pub fn sum_cell_values(&self, cells: &[usize]) -> Vec<f32> {
        select::sum_cell_values(&self.window, cells)
    }

    // ── Backend actions ──────────────────────────────────────────────────

    /// Merge `partial` into the current query parameters and fetch a new
    /// context window. The reply re-enters the loop as a `BackendReply`.
    pub fn request_context(&mut self, partial: ContextParams) {
        self.params.merge(partial);
        self.context_token += 1;
        let token = self.context_token;
        let backend = self.backend.clone();
        let query = self.params.clone();
        let tx = self.reply_tx.clone();
        tracing::debug!(pos = query.pos, token, "requesting context window");
        tokio::spawn(async move {
            let result = backend.fetch_context(&query).await;
            let _ = tx.send(BackendReply::Context { token, result });
        });
    }

    /// Fetch nearest-neighbor matches for the current cell selection.
    ///
    /// The cell set is snapshotted here, so the eventual rows correspond to
    /// the selection at request time even if the user keeps brushing.
    pub fn request_match(&mut self, meta_dims: Vec<String>, mode: MatchMode) {
        let cells = self.cell_selection(false);
        self.match_pending = true;
        self.match_token += 1;
        let token = self.match_token;
        let backend = self.backend.clone();
        let query = MatchQuery {
            source: self.params.source.clone(),
            cells,
            meta_dims,
            mode,
        };
        let tx = self.reply_tx.clone();
        tracing::debug!(cells = query.cells.len(), token, ?mode, "requesting matches");
        tokio::spawn(async move {
            let result = backend.fetch_match(&query).await;
            let _ = tx.send(BackendReply::Match { token, result });
        });
    }

    /// Install a context reply, unless it is superseded or failed.
    ///
    /// On success the window and words are replaced wholesale; on failure
    /// every piece of state keeps its prior value.
    pub fn apply_context(
        &mut self,
        token: u64,
        result: anyhow::Result<ContextPayload>,
    ) -> ReplyOutcome {
        if token != self.context_token {
            tracing::debug!(token, latest = self.context_token, "discarding superseded context reply");
            return ReplyOutcome::Stale;
        }
        match result {
            Ok(payload) => {
                if let Err(err) = payload.validate() {
                    return ReplyOutcome::Failed(err);
                }
                self.window = ContextWindow {
                    left: payload.left,
                    right: payload.right,
                    data: payload.states,
                };
                self.words = payload.words;
                self.meta_dims = payload.meta_dims;
                self.invalidate();
                ReplyOutcome::Installed
            }
            Err(err) => ReplyOutcome::Failed(err),
        }
    }

    /// Install a match reply, unless it is superseded or failed.
    pub fn apply_match(
        &mut self,
        token: u64,
        result: anyhow::Result<MatchPayload>,
    ) -> ReplyOutcome {
        if token != self.match_token {
            tracing::debug!(token, latest = self.match_token, "discarding superseded match reply");
            return ReplyOutcome::Stale;
        }
        self.match_pending = false;
        match result {
            Ok(payload) => {
                self.match_rows = payload.rows;
                ReplyOutcome::Installed
            }
            Err(err) => ReplyOutcome::Failed(err),
        }
    }
}

/// Round to four decimal places, matching the threshold granularity the UI
/// reports.
fn round4(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}
