//! Configuration loading and parsing.
//!
//! Parses `keel.toml` (or an override path provided by the binary). Two tables
//! are recognised:
//!
//! ```toml
//! [editor]
//! undo_depth = 1000
//! shift_width = 4
//! expand_tab = true
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Every field is optional and unknown fields are ignored so older binaries
//! keep reading newer files. A file that fails to parse is reported with a
//! `warn!` and replaced by defaults; a missing file is not an error.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

/// Smallest accepted `undo_depth`.
pub const MIN_UNDO_DEPTH: usize = 1;
/// `shift_width` is clamped into `1..=MAX_SHIFT_WIDTH`.
pub const MAX_SHIFT_WIDTH: usize = 16;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_undo_depth")]
    pub undo_depth: usize,
    #[serde(default = "EditorConfig::default_shift_width")]
    pub shift_width: usize,
    #[serde(default = "EditorConfig::default_expand_tab")]
    pub expand_tab: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: Self::default_undo_depth(),
            shift_width: Self::default_shift_width(),
            expand_tab: Self::default_expand_tab(),
        }
    }
}

impl EditorConfig {
    const fn default_undo_depth() -> usize {
        1000
    }
    const fn default_shift_width() -> usize {
        4
    }
    const fn default_expand_tab() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` still wins when set.
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file contents, when one was read
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Config path following platform conventions: `./keel.toml` first, then the
/// user config directory (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("keel.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("keel").join("keel.toml");
    }
    local
}

/// Load configuration from `path` (or the discovered location). Only I/O
/// failures other than "not found" are returned as errors.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading config file {}", path.display()));
        }
    };
    let file = match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => file,
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            ConfigFile::default()
        }
    };
    let mut cfg = Config {
        raw: Some(content),
        path: Some(path),
        file,
    };
    cfg.clamp();
    Ok(cfg)
}

impl Config {
    /// Pull out-of-range editor values back into their accepted ranges.
    fn clamp(&mut self) {
        let editor = &mut self.file.editor;
        if editor.undo_depth < MIN_UNDO_DEPTH {
            info!(target: "config", raw = editor.undo_depth, clamped = MIN_UNDO_DEPTH, "undo_depth_clamped");
            editor.undo_depth = MIN_UNDO_DEPTH;
        }
        let shift = editor.shift_width.clamp(1, MAX_SHIFT_WIDTH);
        if shift != editor.shift_width {
            info!(target: "config", raw = editor.shift_width, clamped = shift, "shift_width_clamped");
            editor.shift_width = shift;
        }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.file.editor
    }

    pub fn log_filter(&self) -> &str {
        &self.file.log.filter
    }
}
