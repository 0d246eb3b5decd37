//! # Text Layout
//!
//! Line breaking and measurement for the block renderer.
//!
//! Wrapping is greedy against real AFM advance widths, with break
//! opportunities from UAX#14. Long single tokens that exceed the column are
//! kept whole; they overflow visually rather than being hyphen-split or
//! truncated.

use crate::font::FontContext;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position (i.e. "can we break before
/// char[i]?"). Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields (byte_offset, opportunity) where byte_offset is
    // the start of the next segment; convert byte offsets to char indices.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines that fit within `max_width`.
    ///
    /// Greedy: each line takes as many characters as fit, backing up to the
    /// last break opportunity on overflow. A single unbreakable token wider
    /// than the column stays on its own line.
    pub fn break_into_lines(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font_size: f64,
        weight: u32,
        italic: bool,
    ) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }

        let chars: Vec<char> = text.chars().collect();
        let widths: Vec<f64> = chars
            .iter()
            .map(|&ch| font_context.char_width(ch, weight, italic, font_size))
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines: Vec<String> = Vec::new();
        let mut line_start = 0usize;
        let mut line_width = 0.0f64;
        let mut last_break: Option<usize> = None;

        let mut i = 0usize;
        while i < chars.len() {
            let ch = chars[i];

            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        // Flush up to (and excluding) the newline char itself.
                        let end = if matches!(chars[i - 1], '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                            i - 1
                        } else {
                            i
                        };
                        lines.push(trim_trailing(&chars[line_start..end]));
                        line_start = i;
                        line_width = 0.0;
                        last_break = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break = Some(i);
                    }
                    None => {}
                }
            }

            if matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                i += 1;
                continue;
            }

            // Break only on strict overflow: a char that lands exactly on
            // the column edge still fits.
            if line_width + widths[i] > max_width && i > line_start {
                let bp = last_break.filter(|&bp| bp > line_start);
                let end = bp.unwrap_or(i);
                lines.push(trim_trailing(&chars[line_start..end]));
                line_start = end;
                // Skip leading whitespace on the continuation line.
                while line_start < chars.len()
                    && chars[line_start] == ' '
                    && line_start < i + 1
                {
                    line_start += 1;
                }
                if line_start > i {
                    i = line_start;
                    line_width = 0.0;
                    last_break = None;
                    continue;
                }
                line_width = widths[line_start..=i].iter().sum();
                last_break = None;
            } else {
                line_width += widths[i];
            }
            i += 1;
        }

        if line_start < chars.len() {
            lines.push(trim_trailing(&chars[line_start..]));
        } else if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }

    /// Number of wrapped lines `text` occupies in a column of `max_width`.
    pub fn line_count(
        &self,
        font_context: &FontContext,
        text: &str,
        max_width: f64,
        font_size: f64,
        weight: u32,
        italic: bool,
    ) -> usize {
        self.break_into_lines(font_context, text, max_width, font_size, weight, italic)
            .len()
    }
}

fn trim_trailing(chars: &[char]) -> String {
    let s: String = chars.iter().collect();
    s.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, width: f64) -> Vec<String> {
        let ctx = FontContext::new();
        TextLayout::new().break_into_lines(&ctx, text, width, 11.0, 400, false)
    }

    #[test]
    fn test_empty_text_is_one_line() {
        assert_eq!(wrap("", 100.0), vec![String::new()]);
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap("hola", 200.0), vec!["hola".to_string()]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        let lines = wrap("uno dos tres cuatro cinco seis siete ocho", 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(!line.starts_with(' '));
            assert!(!line.ends_with(' '));
        }
        // No word is split in half.
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, "uno dos tres cuatro cinco seis siete ocho");
    }

    #[test]
    fn test_long_token_overflows_without_split() {
        let token = "Supercalifragilisticoespialidoso";
        let lines = wrap(token, 20.0);
        assert_eq!(lines, vec![token.to_string()]);
    }

    #[test]
    fn test_mandatory_break_on_newline() {
        let lines = wrap("primera\nsegunda", 500.0);
        assert_eq!(lines, vec!["primera".to_string(), "segunda".to_string()]);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("abc", 400, false, 11.0);
        let lines = TextLayout::new().break_into_lines(&ctx, "abc", w, 11.0, 400, false);
        assert_eq!(lines.len(), 1);
    }
}
