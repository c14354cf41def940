// Cellscope - terminal explorer for recurrent-model hidden states
//
// Renders per-timestep, per-cell activations of a recurrent sequence model
// next to nearest-neighbor matches over the corpus, and keeps several
// coordinated panels consistent while the user brushes time ranges and
// tunes the selection threshold.
//
// Architecture:
// - Session controller: owns the context window, brush/threshold state and
//   the latest match rows; issues token-tagged backend fetches
// - Derived-selection engine: pure scoring, aggregation and color mapping
// - Coordinator: fixed-order pipeline pushing view-models to the panels
// - Backend (reqwest): context and match endpoints, plus a demo source
// - TUI (ratatui): the rendering surfaces and the input adapters

mod backend;
mod cli;
mod config;
mod coordinator;
mod events;
mod logging;
mod select;
mod session;
mod surface;
mod tui;
mod util;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    if cli::handle_command(&args) {
        return Ok(());
    }

    let config = cli::resolve_config(&args);
    let _guard = logging::init(&config.log_dir)?;
    tracing::info!(
        version = config::VERSION,
        source = %config.source,
        demo = config.demo_mode,
        "starting cellscope"
    );

    tui::run(config).await
}
