use indicatif::{ProgressBar, ProgressStyle};
use libberth::{Notice, Severity};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

/// Trait for output formatting that can be TTY-aware or plain text
pub trait OutputFormatter: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);

    fn warning(&self, message: &str);

    fn info(&self, message: &str);

    /// Create a spinner for a registry round trip
    fn spinner(&self, message: &str) -> ProgressBar;
}

/// TTY-aware formatter with colors and a spinner
pub struct TtyFormatter;

impl OutputFormatter for TtyFormatter {
    fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message);
    }

    fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

/// Plain text formatter for non-TTY output (piped, scripted)
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("⚠ {}", message);
    }

    fn info(&self, message: &str) {
        eprintln!("ℹ {}", message);
    }

    fn spinner(&self, _message: &str) -> ProgressBar {
        ProgressBar::hidden()
    }
}

/// Create the appropriate formatter based on TTY and environment
pub fn create_formatter() -> Box<dyn OutputFormatter> {
    if std::env::var("NO_COLOR").is_ok() {
        return Box::new(PlainFormatter);
    }

    if std::io::stdout().is_terminal() || std::io::stderr().is_terminal() {
        Box::new(TtyFormatter)
    } else {
        Box::new(PlainFormatter)
    }
}

static FORMATTER: OnceLock<Box<dyn OutputFormatter>> = OnceLock::new();

fn get_formatter() -> &'static dyn OutputFormatter {
    FORMATTER.get_or_init(create_formatter).as_ref()
}

pub fn success(message: &str) {
    get_formatter().success(message);
}

pub fn error(message: &str) {
    get_formatter().error(message);
}

pub fn warning(message: &str) {
    get_formatter().warning(message);
}

pub fn spinner(message: &str) -> ProgressBar {
    get_formatter().spinner(message)
}

/// Prints an engine notice at the matching level.
pub fn notice(notice: &Notice) {
    let message = notice_text(notice);
    match notice.severity {
        Severity::Info => get_formatter().info(&message),
        Severity::Warning => get_formatter().warning(&message),
        Severity::Blocking => get_formatter().error(&message),
    }
}

/// Notice message prefixed with its container, if any.
pub fn notice_text(notice: &Notice) -> String {
    match notice.container_index {
        Some(index) => format!("[container {}] {}", index, notice.message),
        None => notice.message.clone(),
    }
}

/// Reports a failed command and exits with status 1.
pub fn fail(message: &str) -> ! {
    error(message);
    std::process::exit(1);
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable pretty format
    Pretty,
    Json,
    Yaml,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Pretty,
        }
    }
}

/// Trait for types that can be formatted for CLI output
pub trait Formattable: Serialize {
    /// Format the type for pretty (human-readable) output
    fn format_pretty(&self) -> String;
}

/// Format a single item for output
pub fn format_output<T: Formattable>(item: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(item.format_pretty()),
        OutputFormat::Json => serde_json::to_string_pretty(item)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(item).map_err(|e| format!("Failed to serialize to YAML: {}", e))
        }
    }
}

/// Formats and prints `item`, exiting on serialisation failure.
pub fn print_output<T: Formattable>(item: &T, format: OutputFormat) {
    match format_output(item, format) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => fail(&e),
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
