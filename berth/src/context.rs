//! Application context that holds resolved configuration
//!
//! Precedence, lowest first:
//! 1. Default values
//! 2. Config file (`BERTH_CONFIG` or `<config_dir>/berth/config.yaml`)
//! 3. `BERTH_*` environment variables
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::format::OutputFormat;
use libberth::Config;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Verbosity selected with repeated `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Quiet,
    Verbose,
    VeryVerbose,
    Trace,
}

impl VerbosityLevel {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Verbose,
            2 => VerbosityLevel::VeryVerbose,
            _ => VerbosityLevel::Trace,
        }
    }

    /// Default filter when `RUST_LOG` is unset.
    pub fn filter(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "warn",
            VerbosityLevel::Verbose => "libberth=info,berth=info",
            VerbosityLevel::VeryVerbose => "libberth=debug,berth=debug",
            VerbosityLevel::Trace => "trace",
        }
    }
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub format: OutputFormat,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(format: OutputFormat) -> Result<Self, String> {
        let path = get_config_path().filter(|p| p.exists());
        debug!(path = ?path, "loading configuration");
        let config = Config::load(path.as_deref()).map_err(|e| e.to_string())?;
        Ok(Self { config, format })
    }
}

/// Returns the config file path, honouring `BERTH_CONFIG`.
pub fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("BERTH_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("berth").join("config.yaml"))
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the verbosity.
pub fn init_tracing(verbosity: VerbosityLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| verbosity.filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
