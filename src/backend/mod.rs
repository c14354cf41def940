//! Backend client for the model-serving API
//!
//! Two endpoints: a context fetch returning the activation window plus
//! aligned words, and a match fetch returning ranked nearest-neighbor rows.
//! `Backend::Demo` serves the same payload shapes from a synthetic corpus so
//! the full client runs without a server.

mod demo;

pub use demo::DemoBackend;

use anyhow::{ensure, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Matching mode: precise trades latency for recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Precise,
    Fast,
}

/// Query parameters for the context endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ContextQuery {
    pub source: String,
    /// Anchor position in the corpus
    pub pos: i64,
    /// Timesteps before the anchor
    pub left: u32,
    /// Timesteps after the anchor
    pub right: u32,
}

impl ContextQuery {
    /// Merge a partial parameter set; `None` fields keep their current value.
    pub fn merge(&mut self, partial: ContextParams) {
        if let Some(source) = partial.source {
            self.source = source;
        }
        if let Some(pos) = partial.pos {
            self.pos = pos;
        }
        if let Some(left) = partial.left {
            self.left = left;
        }
        if let Some(right) = partial.right {
            self.right = right;
        }
    }
}

/// Partial context parameters, merged into the current query on request
#[derive(Debug, Clone, Default)]
pub struct ContextParams {
    pub source: Option<String>,
    pub pos: Option<i64>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

/// Context payload: the activation window plus aligned words
#[derive(Debug, Clone, Deserialize)]
pub struct ContextPayload {
    pub left: i64,
    pub right: i64,
    /// states[cell][t] for t in [0, right-left)
    pub states: Vec<Vec<f32>>,
    pub words: Vec<String>,
    /// Metadata dimensions the backend can annotate matches with
    #[serde(default)]
    pub meta_dims: Vec<String>,
}

impl ContextPayload {
    /// Reject payloads that violate the window invariants before they can
    /// reach controller state.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.right > self.left,
            "context window is empty: left={} right={}",
            self.left,
            self.right
        );
        let steps = (self.right - self.left) as usize;
        ensure!(
            self.words.len() == steps,
            "words misaligned: {} words for {} timesteps",
            self.words.len(),
            steps
        );
        for (cell, row) in self.states.iter().enumerate() {
            ensure!(
                row.len() == steps,
                "cell {} has {} values for {} timesteps",
                cell,
                row.len(),
                steps
            );
        }
        Ok(())
    }
}

/// Body of the match endpoint request
#[derive(Debug, Clone, Serialize)]
pub struct MatchQuery {
    pub source: String,
    pub cells: Vec<usize>,
    pub meta_dims: Vec<String>,
    pub mode: MatchMode,
}

/// One ranked nearest-neighbor row
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchRow {
    pub pos: i64,
    pub left: i64,
    pub right: i64,
    pub match_score: f32,
    pub words: Vec<String>,
    /// Per-dimension value strips aligned with `words`
    #[serde(default)]
    pub meta: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchPayload {
    pub rows: Vec<MatchRow>,
}

/// Replies from spawned fetch tasks, tagged with the request token that
/// issued them so superseded responses can be discarded.
#[derive(Debug)]
pub enum BackendReply {
    Context {
        token: u64,
        result: Result<ContextPayload>,
    },
    Match {
        token: u64,
        result: Result<MatchPayload>,
    },
}

/// Data source for the session: a real HTTP backend or the demo corpus
#[derive(Clone)]
pub enum Backend {
    Http(HttpBackend),
    Demo(DemoBackend),
}

impl Backend {
    pub async fn fetch_context(&self, query: &ContextQuery) -> Result<ContextPayload> {
        match self {
            Backend::Http(http) => http.fetch_context(query).await,
            Backend::Demo(demo) => demo.fetch_context(query).await,
        }
    }

    pub async fn fetch_match(&self, query: &MatchQuery) -> Result<MatchPayload> {
        match self {
            Backend::Http(http) => http.fetch_match(query).await,
            Backend::Demo(demo) => demo.fetch_match(query).await,
        }
    }
}

/// HTTP client for the context and match endpoints
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_context(&self, query: &ContextQuery) -> Result<ContextPayload> {
        let url = format!("{}/api/context", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("context request to {url} failed"))?
            .error_for_status()
            .context("context request rejected by backend")?;

        let payload: ContextPayload = response
            .json()
            .await
            .context("malformed context payload")?;
        payload.validate()?;
        Ok(payload)
    }

    async fn fetch_match(&self, query: &MatchQuery) -> Result<MatchPayload> {
        let url = format!("{}/api/match", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .with_context(|| format!("match request to {url} failed"))?
            .error_for_status()
            .context("match request rejected by backend")?;

        response.json().await.context("malformed match payload")
    }
}
