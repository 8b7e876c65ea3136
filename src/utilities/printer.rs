//! Console printer with ANSI color support, used by the REPL binary.

use serde::{Deserialize, Serialize};

use crate::logs::LogType;

/// Available colors for printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterColor {
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
    White,
    Purple,
    BoldRed,
    BoldGreen,
    BoldYellow,
    BoldCyan,
    BoldPurple,
}

impl PrinterColor {
    /// ANSI escape code for this color.
    fn ansi_code(&self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
            Self::Blue => "\x1b[34m",
            Self::Cyan => "\x1b[36m",
            Self::White => "\x1b[37m",
            Self::Purple => "\x1b[35m",
            Self::BoldRed => "\x1b[1;31m",
            Self::BoldGreen => "\x1b[1;32m",
            Self::BoldYellow => "\x1b[1;33m",
            Self::BoldCyan => "\x1b[1;36m",
            Self::BoldPurple => "\x1b[1;35m",
        }
    }

    /// Color used to render a log entry of the given type.
    pub fn for_log_type(log_type: LogType) -> Self {
        match log_type {
            LogType::Info => Self::White,
            LogType::Success => Self::Green,
            LogType::Warning => Self::Yellow,
            LogType::Error => Self::BoldRed,
        }
    }

    /// Map a persona color tag (`"emerald"`, `"amber"`, ...) to a console color.
    pub fn for_color_tag(tag: &str) -> Self {
        match tag {
            "emerald" | "green" => Self::BoldGreen,
            "amber" | "yellow" => Self::BoldYellow,
            "violet" | "purple" => Self::BoldPurple,
            "rose" | "red" => Self::BoldRed,
            "sky" | "cyan" => Self::BoldCyan,
            "blue" => Self::Blue,
            _ => Self::White,
        }
    }
}

/// ANSI reset code.
const RESET: &str = "\x1b[0m";

/// A piece of colored text.
pub struct ColoredText {
    pub text: String,
    pub color: PrinterColor,
}

impl ColoredText {
    pub fn new(text: impl Into<String>, color: PrinterColor) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Printer for console output with color support.
#[derive(Debug, Clone, Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `content` in the escape codes for `color`.
    pub fn paint(&self, content: &str, color: PrinterColor) -> String {
        format!("{}{}{}", color.ansi_code(), content, RESET)
    }

    /// Print a message with the specified color.
    pub fn print(&self, content: &str, color: PrinterColor) {
        println!("{}", self.paint(content, color));
    }

    /// Print multiple colored text segments on a single line.
    pub fn print_colored(&self, segments: &[ColoredText]) {
        let line: String = segments
            .iter()
            .map(|segment| self.paint(&segment.text, segment.color))
            .collect();
        println!("{}", line);
    }
}
