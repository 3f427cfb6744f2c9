//! @ai:module:intent Accumulate severity-leveled findings produced while walking manifests
//! @ai:module:layer domain
//! @ai:module:public_api Severity, Position, Diagnostic, Diagnostics
//! @ai:module:depends_on rules
//! @ai:module:stateless false

use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// @ai:intent Severity level of a finding, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Warning
    }
}

impl Severity {
    /// @ai:intent Map a numeric log level (1-5) onto a severity
    /// @ai:example (3) -> Some(Warning)
    /// @ai:example (9) -> None
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warning),
            4 => Some(Self::Error),
            5 => Some(Self::Fatal),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// @ai:intent Line and column of a finding; column is not tracked and stays 0
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Start of a line.
    pub fn line(line: usize) -> Self {
        Self::new(line, 0)
    }

    /// Used for whole-file findings that cannot be localized.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// @ai:intent A single recorded finding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub severity: Severity,
    pub position: Position,
    pub message: String,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, ({}, {}), {:?}, {:?})",
            self.file,
            self.severity.level(),
            self.position.line,
            self.position.column,
            self.message,
            self.text
        )
    }
}

/// @ai:intent Ordered sink that every parsing call logs into
/// @ai:invariant entries keep insertion order and are never deduplicated
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Record a finding
    /// @ai:effects mutates self
    pub fn log(
        &mut self,
        file: &str,
        severity: Severity,
        position: Position,
        message: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            file: file.to_string(),
            severity,
            position,
            message: message.into(),
            text: text.into(),
        });
    }

    /// @ai:intent Evaluate a rule, logging its fixed severity and message when it does not match
    /// @ai:post returns true iff the rule matched; nothing is logged on a match
    /// @ai:effects mutates self on failure
    pub fn check_rule(&mut self, text: &str, position: Position, file: &str, rule: Rule) -> bool {
        match rule.evaluate(text) {
            Ok(()) => true,
            Err(violation) => {
                self.log(
                    file,
                    violation.severity,
                    position,
                    violation.message,
                    text,
                );
                false
            }
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// @ai:intent Take every recorded entry and leave the sink empty
    /// @ai:effects mutates self
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    /// @ai:intent Entries at or above a threshold, in recording order
    /// @ai:effects pure
    pub fn at_or_above(&self, threshold: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity >= threshold)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }
}
