//! Console helpers: colored message prefixes and color detection.

use crate::models::policy::Level;
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Colors are used unless `NO_COLOR` is set or the stream is not a terminal.
pub fn colors_enabled(no_color: bool, terminal: bool) -> bool {
    !no_color && terminal
}

pub fn use_colors(stream: Stream) -> bool {
    let terminal = match stream {
        Stream::Stdout => io::stdout().is_terminal(),
        Stream::Stderr => io::stderr().is_terminal(),
    };
    colors_enabled(std::env::var_os("NO_COLOR").is_some(), terminal)
}

/// The runner writes to both streams with one color setting.
pub fn console_colors() -> bool {
    use_colors(Stream::Stdout) && use_colors(Stream::Stderr)
}

fn prefix(label: &str, stream: Stream, paint: fn(&str) -> String) -> String {
    if use_colors(stream) {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", Stream::Stderr, |s| s.red().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", Stream::Stderr, |s| s.blue().bold().to_string())
}

/// Prefix for a policy violation printed on stdout in verbose mode.
pub fn level_prefix(level: Level) -> String {
    match level {
        Level::Error => prefix("error:", Stream::Stdout, |s| s.red().bold().to_string()),
        Level::Warn => prefix("warn:", Stream::Stdout, |s| s.yellow().bold().to_string()),
        Level::Info => prefix("info:", Stream::Stdout, |s| s.blue().bold().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_enabled() {
        assert!(colors_enabled(false, true));
        assert!(!colors_enabled(true, true));
        assert!(!colors_enabled(false, false));
    }

    #[test]
    fn test_level_prefix_matches_level() {
        assert!(level_prefix(Level::Info).contains("info:"));
        assert!(level_prefix(Level::Warn).contains("warn:"));
        assert!(level_prefix(Level::Error).contains("error:"));
    }
}
