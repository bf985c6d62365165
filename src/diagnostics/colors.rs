//! ANSI escapes for diagnostics; empty when `NO_COLOR` is set.

use std::env;

pub struct Colors {
    pub red: &'static str,
    pub yellow: &'static str,
    pub cyan: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub fn from_env() -> Self {
        if env::var_os("NO_COLOR").is_some() {
            Self::plain()
        } else {
            Self::ansi()
        }
    }

    pub fn ansi() -> Self {
        Self {
            red: "\u{1b}[31m",
            yellow: "\u{1b}[33m",
            cyan: "\u{1b}[36m",
            bold: "\u{1b}[1m",
            reset: "\u{1b}[0m",
        }
    }

    pub fn plain() -> Self {
        Self {
            red: "",
            yellow: "",
            cyan: "",
            bold: "",
            reset: "",
        }
    }
}
