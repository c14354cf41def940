// Demo mode: serve the client from a synthetic corpus
//
// Generates a deterministic pseudo-corpus (tokens plus per-cell activation
// traces) and answers context and match queries with the same payload shapes
// as the HTTP backend. Lets the whole UI be exercised with `--demo` and
// keeps controller/coordinator tests free of network plumbing.
//
// Run with: cellscope --demo

use super::{ContextPayload, ContextQuery, MatchPayload, MatchQuery, MatchMode, MatchRow};
use anyhow::{ensure, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

/// Length of the synthetic corpus
const CORPUS_LEN: i64 = 100_000;

/// Number of hidden cells in the synthetic model
const DEMO_CELLS: usize = 16;

/// Tokens in a returned match window: [pos-5, pos+10)
const MATCH_BEFORE: i64 = 5;
const MATCH_AFTER: i64 = 10;

/// Ranked rows returned per match query
const MATCH_LIMIT: usize = 20;

/// Simulated backend latency
const DEMO_LATENCY: Duration = Duration::from_millis(80);

const VOCAB: &[&str] = &[
    "the", "model", "reads", "its", "state", "over", "time", "a", "cell",
    "fires", "when", "this", "pattern", "holds", "quiet", "between",
    "phrases", "and", "long", "memory", "carries", "each", "signal",
    "forward", "until", "it", "fades",
];

/// Offline data source with deterministic contents
#[derive(Debug, Clone, Default)]
pub struct DemoBackend;

impl DemoBackend {
    pub fn new() -> Self {
        Self
    }

    pub(super) async fn fetch_context(&self, query: &ContextQuery) -> Result<ContextPayload> {
        sleep(DEMO_LATENCY).await;

        let lo = query.left as i64;
        let hi = (CORPUS_LEN - query.right as i64 - 1).max(lo);
        let pos = query.pos.clamp(lo, hi);
        let left = pos - query.left as i64;
        let right = pos + query.right as i64;
        ensure!(right > left, "demo window is empty");

        let states = (0..DEMO_CELLS)
            .map(|cell| (left..right).map(|t| activation(cell, t)).collect())
            .collect();
        let words = (left..right).map(word_at).collect();

        Ok(ContextPayload {
            left,
            right,
            states,
            words,
            meta_dims: vec!["activation".to_string(), "position".to_string()],
        })
    }

    pub(super) async fn fetch_match(&self, query: &MatchQuery) -> Result<MatchPayload> {
        sleep(DEMO_LATENCY).await;

        if query.cells.is_empty() {
            return Ok(MatchPayload { rows: Vec::new() });
        }

        // Fast mode samples the corpus sparsely; precise walks a denser grid
        let stride = match query.mode {
            MatchMode::Fast => 211,
            MatchMode::Precise => 37,
        };

        let mut scored: Vec<(i64, f32)> = (MATCH_BEFORE..CORPUS_LEN - MATCH_AFTER)
            .step_by(stride)
            .map(|pos| (pos, candidate_score(&query.cells, pos)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(MATCH_LIMIT);

        let rows = scored
            .into_iter()
            .map(|(pos, match_score)| {
                let left = pos - MATCH_BEFORE;
                let right = pos + MATCH_AFTER;
                let words: Vec<String> = (left..right).map(word_at).collect();
                let activation_strip: Vec<f32> = (left..right)
                    .map(|t| query.cells.iter().map(|&c| activation(c, t)).sum())
                    .collect();
                let position_strip: Vec<f32> = (left..right)
                    .map(|t| t as f32 / CORPUS_LEN as f32)
                    .collect();
                let mut meta = HashMap::new();
                meta.insert("activation".to_string(), activation_strip);
                meta.insert("position".to_string(), position_strip);
                MatchRow {
                    pos,
                    left,
                    right,
                    match_score,
                    words,
                    meta,
                }
            })
            .collect();

        Ok(MatchPayload { rows })
    }
}

/// Activation of one cell at one corpus position, in [0, 1].
///
/// Each cell gets its own period and phase so traces are visually distinct
/// and brushes land on genuinely different score profiles.
fn activation(cell: usize, t: i64) -> f32 {
    let period = 7.0 + cell as f32 * 3.5;
    let phase = cell as f32 * 0.9;
    let wave = (t as f32 / period + phase).sin();
    let ripple = (t as f32 / (period * 5.3)).cos() * 0.2;
    ((wave + ripple) * 0.5 + 0.5).clamp(0.0, 1.0)
}

/// Mean activation of the selected cells around a candidate position
fn candidate_score(cells: &[usize], pos: i64) -> f32 {
    let span = 5;
    let total: f32 = (pos - 2..pos + 3)
        .flat_map(|t| cells.iter().map(move |&c| activation(c, t)))
        .sum();
    total / (span * cells.len() as i64) as f32
}

fn word_at(t: i64) -> String {
    // Fibonacci hashing keeps neighboring positions on different tokens
    let mixed = (t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 33;
    VOCAB[(mixed % VOCAB.len() as u64) as usize].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_query(pos: i64) -> ContextQuery {
        ContextQuery {
            source: "demo".to_string(),
            pos,
            left: 20,
            right: 30,
        }
    }

    #[tokio::test]
    async fn context_payload_shape_is_valid() {
        let payload = DemoBackend::new()
            .fetch_context(&context_query(1_000))
            .await
            .unwrap();
        payload.validate().unwrap();
        assert_eq!(payload.right - payload.left, 50);
        assert_eq!(payload.states.len(), DEMO_CELLS);
    }

    #[tokio::test]
    async fn context_is_deterministic() {
        let backend = DemoBackend::new();
        let a = backend.fetch_context(&context_query(5_000)).await.unwrap();
        let b = backend.fetch_context(&context_query(5_000)).await.unwrap();
        assert_eq!(a.states, b.states);
        assert_eq!(a.words, b.words);
    }

    #[tokio::test]
    async fn out_of_corpus_anchor_is_clamped() {
        let payload = DemoBackend::new()
            .fetch_context(&context_query(-500))
            .await
            .unwrap();
        payload.validate().unwrap();
        assert!(payload.left >= 0);
    }

    #[tokio::test]
    async fn match_rows_are_ranked_and_aligned() {
        let backend = DemoBackend::new();
        let payload = backend
            .fetch_match(&MatchQuery {
                source: "demo".to_string(),
                cells: vec![0, 3],
                meta_dims: vec!["activation".to_string()],
                mode: MatchMode::Fast,
            })
            .await
            .unwrap();

        assert!(!payload.rows.is_empty());
        assert!(payload.rows.len() <= MATCH_LIMIT);
        for pair in payload.rows.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        for row in &payload.rows {
            let steps = (row.right - row.left) as usize;
            assert_eq!(row.words.len(), steps);
            assert_eq!(row.meta["activation"].len(), steps);
        }
    }

    #[tokio::test]
    async fn empty_cell_selection_yields_no_rows() {
        let payload = DemoBackend::new()
            .fetch_match(&MatchQuery {
                source: "demo".to_string(),
                cells: Vec::new(),
                meta_dims: Vec::new(),
                mode: MatchMode::Precise,
            })
            .await
            .unwrap();
        assert!(payload.rows.is_empty());
    }

    #[test]
    fn activation_stays_in_unit_range() {
        for cell in 0..DEMO_CELLS {
            for t in (0..10_000).step_by(113) {
                let v = activation(cell, t);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
