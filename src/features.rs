//! Named booleans that switch optional syntax and checks on.
//!
//! A story can also turn features on for itself with header lines at the
//! top of the file:
//!
//! ```text
//! // FEAT: single_quotes=true
//! // FEAT: strict_conditions=1
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

const HEADER: &str = "// FEAT:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Accept `'...'` string literals.
    pub single_quotes: bool,
    /// Let function bodies see and write story-level variables.
    pub globals: bool,
    /// Conditions of `if`, `else if` and `while` must be `boolean`.
    pub strict_conditions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    Unknown(String),
    InvalidValue { name: String, value: String },
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureError::Unknown(name) => write!(f, "unknown feature `{}`", name),
            FeatureError::InvalidValue { name, value } => {
                write!(f, "feature `{}` can't be set to `{}`", name, value)
            }
        }
    }
}

impl std::error::Error for FeatureError {}

impl Features {
    pub const NAMES: &'static [&'static str] = &["single_quotes", "globals", "strict_conditions"];

    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "single_quotes" => Some(&mut self.single_quotes),
            "globals" => Some(&mut self.globals),
            "strict_conditions" => Some(&mut self.strict_conditions),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "single_quotes" => Some(self.single_quotes),
            "globals" => Some(self.globals),
            "strict_conditions" => Some(self.strict_conditions),
            _ => None,
        }
    }

    pub fn set(&mut self, name: &str, value: bool) -> Result<(), FeatureError> {
        let slot = self
            .slot(name)
            .ok_or_else(|| FeatureError::Unknown(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    pub fn with(mut self, name: &str, value: bool) -> Result<Self, FeatureError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Apply the `// FEAT: name=value` lines found before the first line of
    /// code. Later lines override earlier ones.
    pub fn with_header(mut self, source: &str) -> Result<Self, FeatureError> {
        for line in source.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(setting) = line.strip_prefix(HEADER) else {
                if line.starts_with("//") {
                    continue;
                }
                break;
            };
            let (name, value) = match setting.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (setting.trim(), "true"),
            };
            let value = parse_flag(value).ok_or_else(|| FeatureError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
            self.set(name, value)?;
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
