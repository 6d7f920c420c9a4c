//! Environment variables, including bulk import and export.
//!
//! The bulk format is one `key;value` pair per line. Imports also accept
//! `,` as the delimiter when a line has no `;`.

use crate::error::{BerthError, Result};
use crate::model::EnvVar;
use chrono::NaiveDateTime;
use tracing::debug;

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvImport {
    pub added: usize,
    /// Non-blank lines that did not yield a pair.
    pub skipped: usize,
}

/// A bulk export ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvExport {
    pub filename: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvEdit {
    Key(String),
    Value(String),
}

/// Splits one line into a pair, trying `;` first and then `,`.
///
/// Only the first delimiter splits, so values may contain either
/// character. Returns `None` for lines with a single column or an invalid
/// key.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(';').or_else(|| line.split_once(','))?;
    let key = key.trim();
    validate_key(key).ok()?;
    Some((key.to_string(), value.to_string()))
}

/// Parses a delimited blob into pairs, skipping blank lines.
pub fn parse_blob(text: &str) -> (Vec<(String, String)>, usize) {
    let mut pairs = Vec::new();
    let mut skipped = 0;

    for (n, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(pair) => pairs.push(pair),
            None => {
                debug!(line = n + 1, "skipping unparseable env line");
                skipped += 1;
            }
        }
    }

    (pairs, skipped)
}

/// Renders pairs as `key;value` lines.
pub fn render(vars: &[EnvVar]) -> String {
    vars.iter()
        .map(|v| format!("{};{}\n", v.key, v.value))
        .collect()
}

/// `env-vars-container-<index>-<YYYYmmdd-HHMMSS>.csv`
pub fn export_filename(container_index: usize, at: NaiveDateTime) -> String {
    format!(
        "env-vars-container-{}-{}.csv",
        container_index,
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Keys are non-empty and free of whitespace, `=` and delimiters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(BerthError::validation("Environment variable key is required"));
    }
    if key
        .chars()
        .any(|c| c.is_whitespace() || c == '=' || c == ';' || c == ',')
    {
        return Err(BerthError::validation(format!(
            "Invalid environment variable key '{}'",
            key
        )));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(BerthError::validation(
            "Environment variable values cannot span lines",
        ));
    }
    Ok(())
}

/// Ordered environment variables of one container.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    container_index: usize,
    vars: Vec<EnvVar>,
}

impl EnvManager {
    pub fn new(container_index: usize) -> Self {
        Self {
            container_index,
            vars: Vec::new(),
        }
    }

    pub fn from_entries(container_index: usize, vars: Vec<EnvVar>) -> Self {
        let mut manager = Self { container_index, vars };
        manager.set_container_index(container_index);
        manager
    }

    pub fn vars(&self) -> &[EnvVar] {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn add_var(&mut self, key: &str, value: &str) -> Result<usize> {
        let key = key.trim();
        validate_key(key)?;
        validate_value(value)?;
        self.vars.push(EnvVar {
            key: key.to_string(),
            value: value.to_string(),
            container_index: self.container_index,
        });
        Ok(self.vars.len() - 1)
    }

    pub fn remove_var(&mut self, index: usize) -> Result<EnvVar> {
        self.check_index(index)?;
        Ok(self.vars.remove(index))
    }

    pub fn edit_var(&mut self, index: usize, edit: EnvEdit) -> Result<()> {
        self.check_index(index)?;
        match edit {
            EnvEdit::Key(key) => {
                let key = key.trim();
                validate_key(key)?;
                self.vars[index].key = key.to_string();
            }
            EnvEdit::Value(value) => {
                validate_value(&value)?;
                self.vars[index].value = value;
            }
        }
        Ok(())
    }

    /// Appends every pair parsed from `text`.
    pub fn import(&mut self, text: &str) -> EnvImport {
        let (pairs, skipped) = parse_blob(text);
        let added = pairs.len();
        self.vars
            .extend(pairs.into_iter().map(|(key, value)| EnvVar {
                key,
                value,
                container_index: self.container_index,
            }));
        EnvImport { added, skipped }
    }

    pub fn export(&self, at: NaiveDateTime) -> EnvExport {
        EnvExport {
            filename: export_filename(self.container_index, at),
            contents: render(&self.vars),
        }
    }

    pub fn set_container_index(&mut self, container_index: usize) {
        self.container_index = container_index;
        for var in &mut self.vars {
            var.container_index = container_index;
        }
    }

    pub fn snapshot(&self) -> Vec<EnvVar> {
        self.vars.clone()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.vars.len() {
            Ok(())
        } else {
            Err(BerthError::out_of_range("environment variable", index, self.vars.len()))
        }
    }
}
