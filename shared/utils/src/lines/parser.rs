//! Order Line Parser
//!
//! Extracts a part number and a trailing quantity from each line, e.g.
//! `1-0987656-1 2st`, `PN-100 5 x`, `PN-100 x5` or `PN-100 5`.

use regex::Regex;
use std::sync::OnceLock;

use wiretronic_models::ParsedItem;

/// Quantity used when a line carries no usable quantity token.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Trailing quantity recognizer.
///
/// Suffix patterns are tried in priority order: `<n> st`, `<n> x`, `x<n>`,
/// bare `<n>`. Each must be separated from the part number by whitespace.
pub struct QuantityParser {
    patterns: Vec<Regex>,
}

impl Default for QuantityParser {
    fn default() -> Self {
        let patterns = [
            r"(?i)\s+([0-9]+)\s*st\s*$",
            r"(?i)\s+([0-9]+)\s*x\s*$",
            r"(?i)\s+x([0-9]+)\s*$",
            r"\s+([0-9]+)\s*$",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("quantity patterns are valid regexes"))
        .collect();

        Self { patterns }
    }
}

impl QuantityParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every non-blank line of `text`, preserving order.
    pub fn parse_lines(&self, text: &str) -> Vec<ParsedItem> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.parse_line(line))
            .collect()
    }

    /// Parse one already-trimmed, non-blank line.
    pub fn parse_line(&self, line: &str) -> ParsedItem {
        let quantity = self.extract_quantity(line).unwrap_or(DEFAULT_QUANTITY);
        let part_number = self.strip_trailing_quantity(line);

        ParsedItem {
            part_number: if part_number.is_empty() {
                line.to_string()
            } else {
                part_number
            },
            quantity: Some(quantity),
            raw: line.to_string(),
        }
    }

    /// First pattern whose captured number is a positive integer.
    fn extract_quantity(&self, line: &str) -> Option<u32> {
        self.patterns.iter().find_map(|pattern| {
            pattern
                .captures(line)
                .and_then(|captures| captures.get(1))
                .and_then(|digits| digits.as_str().parse::<u32>().ok())
                .filter(|qty| *qty > 0)
        })
    }

    /// Removes the suffix matched by the first matching pattern, whether or
    /// not its number was usable.
    fn strip_trailing_quantity(&self, line: &str) -> String {
        self.patterns
            .iter()
            .find(|pattern| pattern.is_match(line))
            .map(|pattern| pattern.replace(line, "").trim().to_string())
            .unwrap_or_else(|| line.trim().to_string())
    }
}

/// Parse order lines with a shared parser instance.
pub fn parse_lines(text: &str) -> Vec<ParsedItem> {
    static PARSER: OnceLock<QuantityParser> = OnceLock::new();
    PARSER.get_or_init(QuantityParser::new).parse_lines(text)
}
