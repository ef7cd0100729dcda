//! Line colorizer
//!
//! Matches a rendered line against a [`CompiledPattern`] and wraps each named
//! capture in an ANSI foreground color. Only the captured values survive:
//! literal text between groups is dropped and the values are re-joined with a
//! single space.

use super::CompiledPattern;
use std::collections::HashMap;

/// Standard terminal foreground colors, cycled by group position
pub const DEFAULT_COLORS: [u8; 7] = [31, 32, 33, 34, 35, 36, 37];

const RESET: &str = "\x1b[0m";

/// A pattern plus per-group color overrides
#[derive(Debug, Clone)]
pub struct Colorizer {
    pattern: CompiledPattern,
    colors: HashMap<String, u8>,
}

impl Colorizer {
    pub fn new(pattern: CompiledPattern, colors: HashMap<String, u8>) -> Self {
        Self { pattern, colors }
    }

    pub fn colorize(&self, line: &str) -> String {
        colorize(line, &self.pattern, &self.colors)
    }
}

/// Colorize `line`, or return it unchanged if `pattern` doesn't match.
///
/// Group `i` gets its override from `overrides` by name, else
/// `DEFAULT_COLORS[i % 7]`. A group that didn't participate in the match
/// contributes an empty colored segment.
pub fn colorize(line: &str, pattern: &CompiledPattern, overrides: &HashMap<String, u8>) -> String {
    let Some(caps) = pattern.regex().captures(line) else {
        return line.to_string();
    };

    let segments: Vec<String> = pattern
        .names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let color = overrides
                .get(name)
                .copied()
                .unwrap_or(DEFAULT_COLORS[idx % DEFAULT_COLORS.len()]);
            let text = caps.name(name).map(|m| m.as_str()).unwrap_or("");
            colorize_text(text, color)
        })
        .collect();

    segments.join(" ").trim().to_string()
}

fn colorize_text(text: &str, color: u8) -> String {
    format!("\x1b[{}m{}{}", color, text, RESET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::LogFormat;

    fn syslog() -> CompiledPattern {
        LogFormat::Syslog.compile().unwrap()
    }

    #[test]
    fn test_no_match_passes_through() {
        assert_eq!(
            colorize("no match here", &syslog(), &HashMap::new()),
            "no match here"
        );
    }

    #[test]
    fn test_default_palette_by_position() {
        let out = colorize("Jan 1 00:00:00 host app: hello", &syslog(), &HashMap::new());
        assert_eq!(
            out,
            "\x1b[31mJan 1 00:00:00\x1b[0m \x1b[32mhost\x1b[0m \x1b[33mapp:\x1b[0m \x1b[34mhello\x1b[0m"
        );
    }

    #[test]
    fn test_override_by_group_name() {
        let overrides = HashMap::from([("source".to_string(), 36u8)]);
        let out = colorize("Jan 1 00:00:00 host app: hello", &syslog(), &overrides);
        assert!(out.contains("\x1b[36mhost\x1b[0m"));
        // Groups without an override keep their positional color
        assert!(out.starts_with("\x1b[31mJan 1 00:00:00"));
        assert!(out.ends_with("\x1b[34mhello\x1b[0m"));
    }

    #[test]
    fn test_literal_text_between_groups_is_dropped() {
        let pattern = CompiledPattern::new(r"^\[(?<level>\w+)\]\s*--\s*(?<msg>.*)$").unwrap();
        let out = colorize("[WARN] -- disk nearly full", &pattern, &HashMap::new());
        assert_eq!(out, "\x1b[31mWARN\x1b[0m \x1b[32mdisk nearly full\x1b[0m");
    }

    #[test]
    fn test_palette_wraps_after_seven_groups() {
        let pattern = CompiledPattern::new(
            r"(?<a>\w) (?<b>\w) (?<c>\w) (?<d>\w) (?<e>\w) (?<f>\w) (?<g>\w) (?<h>\w)",
        )
        .unwrap();
        let out = colorize("1 2 3 4 5 6 7 8", &pattern, &HashMap::new());
        assert!(out.starts_with("\x1b[31m1\x1b[0m"));
        assert!(out.ends_with("\x1b[31m8\x1b[0m"));
    }

    #[test]
    fn test_colorizer_uses_its_overrides() {
        let colorizer = Colorizer::new(syslog(), HashMap::from([("message".to_string(), 35u8)]));
        let out = colorizer.colorize("Jan 1 00:00:00 host app: hello");
        assert!(out.ends_with("\x1b[35mhello\x1b[0m"));
    }
}
