// CLI module - command-line argument parsing and the config subcommand
//
// Flags override environment and file configuration; the `config`
// subcommand inspects or regenerates the config file.

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};

/// Cellscope - terminal explorer for recurrent-model hidden states
#[derive(Parser)]
#[command(name = "cellscope")]
#[command(version = VERSION)]
#[command(about = "Explore recurrent-model activations and corpus matches", long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Data source to explore (e.g. ptb/words)
    #[arg(long)]
    pub source: Option<String>,

    /// Initial context anchor position
    #[arg(long)]
    pub pos: Option<i64>,

    /// Initial selection threshold
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Serve synthetic data instead of a backend
    #[arg(long)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration to the config file
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle subcommands. Returns true if one was handled (exit after).
pub fn handle_command(cli: &Cli) -> bool {
    match &cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if *path {
                handle_config_path();
            } else if *show {
                print!("{}", Config::from_env().to_toml());
            } else if *reset {
                handle_config_reset();
            } else {
                println!("Usage: cellscope config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Write the default configuration to the config file");
                println!("  --path    Show config file path");
            }
            true
        }
        None => false,
    }
}

/// Resolve the effective configuration: defaults, file, env, then flags.
pub fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(source) = &cli.source {
        config.source = source.clone();
    }
    if let Some(pos) = cli.pos {
        config.pos = pos;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if cli.demo {
        config.demo_mode = true;
    }
    config
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };
    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Error: Could not create {}: {err}", parent.display());
            std::process::exit(1);
        }
    }
    match std::fs::write(&path, Config::default().to_toml()) {
        Ok(()) => println!("Wrote default configuration to {}", path.display()),
        Err(err) => {
            eprintln!("Error: Could not write {}: {err}", path.display());
            std::process::exit(1);
        }
    }
}
