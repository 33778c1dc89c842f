//! Runtime configuration: defaults, optional config file, CLI overrides.
//!
//! The config file uses a small `key = value` subset of TOML:
//!
//! ```text
//! # ~/.config/bili-downloader/config.toml
//! bind = "0.0.0.0:8000"
//! base_dir = "/srv/bili"
//! download_dir = "downloads"       # relative to base_dir
//! engine_binary = "/usr/local/bin/yt-dlp"
//! cookies_file = "bilibili.com_cookies.txt"
//! verbosity = "verbose"
//! ```

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::download::DEFAULT_YTDLP_BINARY;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default download directory name, relative to the base directory.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Cookie file name looked up in the base directory.
pub const DEFAULT_COOKIES_FILE: &str = "bilibili.com_cookies.txt";

/// Directory name under the user config root.
const CONFIG_DIR_NAME: &str = "bili-downloader";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A line is not `key = value`
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax {
        /// 1-based line number
        line: usize,
    },

    /// A known key has a value of the wrong shape
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        /// The offending key
        key: String,
        /// 1-based line number
        line: usize,
        /// What was expected
        reason: String,
    },

    /// A config file named on the command line does not exist
    #[error("config file '{path}' does not exist")]
    Missing {
        /// Config file path
        path: PathBuf,
    },

    /// Key is not recognized
    #[error("unknown configuration key: '{key}' on line {line}")]
    UnknownKey {
        /// The unknown key
        key: String,
        /// 1-based line number
        line: usize,
    },

    /// Bind address does not parse as `host:port`
    #[error("invalid bind address '{value}': {reason}")]
    InvalidBind {
        /// The configured value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Tracing filter directive for this verbosity.
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
            Self::Quiet => "error",
        }
    }
}

/// Values read from the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Listen address
    pub bind: Option<String>,
    /// Application base directory
    pub base_dir: Option<PathBuf>,
    /// Download directory (relative paths resolve against `base_dir`)
    pub download_dir: Option<PathBuf>,
    /// yt-dlp executable
    pub engine_binary: Option<PathBuf>,
    /// Cookie file (relative paths resolve against `base_dir`)
    pub cookies_file: Option<PathBuf>,
    /// Log verbosity
    pub verbosity: Option<VerbositySetting>,
}

/// Values given on the command line. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub bind: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub engine_binary: Option<PathBuf>,
    pub cookies_file: Option<PathBuf>,
}

/// Fully resolved configuration injected into the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Application base directory
    pub base_dir: PathBuf,
    /// Directory downloads are written to and listed from
    pub download_dir: PathBuf,
    /// yt-dlp executable
    pub engine_binary: PathBuf,
    /// Cookie file, used only when it exists
    pub cookies_file: PathBuf,
}

impl AppConfig {
    /// Merges defaults, file config and overrides (highest wins).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBind`] if the bind address is malformed.
    pub fn resolve(file: Option<&FileConfig>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = file.cloned().unwrap_or_default();

        let bind_value = overrides
            .bind
            .clone()
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBind {
                value: bind_value.clone(),
                reason: e.to_string(),
            })?;

        let base_dir = overrides
            .base_dir
            .clone()
            .or(file.base_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let download_dir = overrides
            .download_dir
            .clone()
            .or(file.download_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));
        let cookies_file = overrides
            .cookies_file
            .clone()
            .or(file.cookies_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIES_FILE));
        let engine_binary = overrides
            .engine_binary
            .clone()
            .or(file.engine_binary)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP_BINARY));

        Ok(Self {
            bind,
            download_dir: base_dir.join(download_dir),
            cookies_file: base_dir.join(cookies_file),
            base_dir,
            engine_binary,
        })
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bili-downloader/config.toml`
/// 2. `$HOME/.config/bili-downloader/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file at `path`, or `None` if it does not exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_file_config(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&raw).map(Some)
}

/// Loads a config file the user named explicitly; unlike the default
/// location, a missing file is an error.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the file does not exist, or any error
/// [`load_file_config`] returns.
pub fn load_required_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    load_file_config(path)?.ok_or_else(|| ConfigError::Missing {
        path: path.to_path_buf(),
    })
}

/// Parses config file contents.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first bad line.
pub fn parse_config_str(raw: &str) -> Result<FileConfig, ConfigError> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax { line: line_no });
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            line: line_no,
            reason: reason.to_string(),
        };

        match key {
            "bind" => {
                cfg.bind = Some(parse_string_literal(value).ok_or_else(|| invalid(QUOTED))?);
            }
            "base_dir" => {
                cfg.base_dir = Some(parse_path(value).ok_or_else(|| invalid(QUOTED))?);
            }
            "download_dir" => {
                cfg.download_dir = Some(parse_path(value).ok_or_else(|| invalid(QUOTED))?);
            }
            "engine_binary" => {
                cfg.engine_binary = Some(parse_path(value).ok_or_else(|| invalid(QUOTED))?);
            }
            "cookies_file" => {
                cfg.cookies_file = Some(parse_path(value).ok_or_else(|| invalid(QUOTED))?);
            }
            "verbosity" => {
                let label = parse_string_literal(value).ok_or_else(|| invalid(QUOTED))?;
                cfg.verbosity = Some(
                    parse_verbosity(&label)
                        .ok_or_else(|| invalid("expected one of: default, verbose, quiet, debug"))?,
                );
            }
            unknown => {
                return Err(ConfigError::UnknownKey {
                    key: unknown.to_string(),
                    line: line_no,
                });
            }
        }
    }
    Ok(cfg)
}

const QUOTED: &str = "expected double-quoted string";

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Option<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        return None;
    }
    Some(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_path(raw_value: &str) -> Option<PathBuf> {
    parse_string_literal(raw_value)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn parse_verbosity(value: &str) -> Option<VerbositySetting> {
    match value {
        "default" => Some(VerbositySetting::Default),
        "verbose" => Some(VerbositySetting::Verbose),
        "quiet" => Some(VerbositySetting::Quiet),
        "debug" => Some(VerbositySetting::Debug),
        _ => None,
    }
}
