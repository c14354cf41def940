//! Configuration for the explorer
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (highest priority)
//! 2. Environment variables
//! 3. Config file (~/.config/cellscope/config.toml)
//! 4. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the model-serving backend
    pub base_url: String,

    /// Data source to explore (corpus/model identifier on the backend)
    pub source: String,

    /// Initial context anchor position
    pub pos: i64,

    /// Timesteps requested before the anchor
    pub left: u32,

    /// Timesteps requested after the anchor
    pub right: u32,

    /// Initial selection threshold
    pub threshold: f32,

    /// Initial token cell width in columns
    pub cell_width: u16,

    /// Serve synthetic data instead of a backend
    pub demo_mode: bool,

    /// Directory for log files
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            source: "ptb/words".to_string(),
            pos: 1_000,
            left: 20,
            right: 30,
            threshold: 0.3,
            cell_width: 8,
            demo_mode: false,
            log_dir: default_log_dir(),
        }
    }
}

/// On-disk representation: every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub source: Option<String>,
    pub pos: Option<i64>,
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub threshold: Option<f32>,
    pub cell_width: Option<u16>,
    pub demo_mode: Option<bool>,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Path of the config file, if a config directory exists on this platform
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cellscope").join("config.toml"))
    }

    /// Effective configuration from file and environment (no CLI overrides)
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(path) = Self::config_path() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<FileConfig>(&text) {
                    Ok(file) => config.apply_file(file),
                    Err(err) => {
                        eprintln!("Warning: ignoring malformed {}: {err}", path.display())
                    }
                },
                Err(_) => {} // no config file is the common case
            }
        }
        config.apply_env_vars();
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.base_url {
            self.base_url = v;
        }
        if let Some(v) = file.source {
            self.source = v;
        }
        if let Some(v) = file.pos {
            self.pos = v;
        }
        if let Some(v) = file.left {
            self.left = v;
        }
        if let Some(v) = file.right {
            self.right = v;
        }
        if let Some(v) = file.threshold {
            self.threshold = v;
        }
        if let Some(v) = file.cell_width {
            self.cell_width = v;
        }
        if let Some(v) = file.demo_mode {
            self.demo_mode = v;
        }
        if let Some(v) = file.log_dir {
            self.log_dir = v;
        }
    }

    fn apply_env_vars(&mut self) {
        if let Ok(v) = std::env::var("CELLSCOPE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("CELLSCOPE_SOURCE") {
            self.source = v;
        }
        if let Ok(v) = std::env::var("CELLSCOPE_POS") {
            if let Ok(pos) = v.parse() {
                self.pos = pos;
            }
        }
        if let Ok(v) = std::env::var("CELLSCOPE_DEMO") {
            self.demo_mode = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("CELLSCOPE_LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
    }

    /// Render the effective configuration as a TOML document
    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        out.push_str("# cellscope configuration\n");
        out.push_str("# Precedence: CLI flags > environment > this file > defaults\n\n");
        out.push_str(&format!("base_url = {:?}\n", self.base_url));
        out.push_str(&format!("source = {:?}\n", self.source));
        out.push_str(&format!("pos = {}\n", self.pos));
        out.push_str(&format!("left = {}\n", self.left));
        out.push_str(&format!("right = {}\n", self.right));
        out.push_str(&format!("threshold = {}\n", format_float(self.threshold)));
        out.push_str(&format!("cell_width = {}\n", self.cell_width));
        out.push_str(&format!("demo_mode = {}\n", self.demo_mode));
        out.push_str(&format!("log_dir = {:?}\n", self.log_dir.display().to_string()));
        out
    }
}

/// TOML floats need a decimal point even for whole values
fn format_float(value: f32) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cellscope")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The serialized default config must parse back; catches TOML syntax
    /// slips in `to_toml`.
    #[test]
    fn default_config_round_trips() {
        let config = Config::default();
        let text = config.to_toml();
        let parsed: FileConfig = toml::from_str(&text)
            .unwrap_or_else(|err| panic!("default config should round-trip:\n{text}\n{err}"));
        assert_eq!(parsed.base_url.as_deref(), Some(config.base_url.as_str()));
        assert_eq!(parsed.pos, Some(config.pos));
        assert_eq!(parsed.cell_width, Some(config.cell_width));
        assert_eq!(parsed.demo_mode, Some(false));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut config = Config::default();
        config.apply_file(FileConfig {
            source: Some("wiki/chars".to_string()),
            threshold: Some(0.7),
            ..Default::default()
        });
        assert_eq!(config.source, "wiki/chars");
        assert_eq!(config.threshold, 0.7);
        // untouched fields keep their defaults
        assert_eq!(config.pos, Config::default().pos);
    }

    #[test]
    fn whole_floats_stay_valid_toml() {
        let mut config = Config::default();
        config.threshold = 1.0;
        let parsed: FileConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.threshold, Some(1.0));
    }
}
