//! Deterministic text measurement, wrapping and truncation.
//!
//! Widths are estimated from per-character em fractions rather than font metrics, so layout never
//! depends on which fonts happen to be installed.

const ELLIPSIS: &str = "...";

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1FAFF
        | 0x20000..=0x3FFFD)
}

/// Estimated advance of `c` in ems.
pub fn char_em(c: char, mono: bool) -> f32 {
    if mono {
        return if is_wide(c) { 1.2 } else { 0.6 };
    }
    if is_wide(c) {
        1.0
    } else if c.is_whitespace() {
        0.28
    } else if c.is_ascii_uppercase() || c.is_ascii_digit() || c == 'm' || c == 'w' {
        0.64
    } else if matches!(c, 'i' | 'l' | 'j' | '.' | ',' | ':' | ';' | '\'' | '!' | '|') {
        0.28
    } else {
        0.52
    }
}

/// Estimated rendered width of `text` in pixels.
pub fn text_width(text: &str, size: f32, mono: bool) -> f32 {
    text.chars().map(|c| char_em(c, mono)).sum::<f32>() * size
}

/// Cut `text` to at most `max_chars` characters, ending with `...` when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}

/// Cut `text` so its estimated width fits `max_width`, ending with `...` when shortened.
pub fn fit_width(text: &str, max_width: f32, size: f32, mono: bool) -> String {
    if text_width(text, size, mono) <= max_width {
        return text.to_string();
    }
    let budget = max_width - text_width(ELLIPSIS, size, mono);
    let mut used = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let w = char_em(c, mono) * size;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}

/// Greedy word wrap against an estimated pixel width.
///
/// Words wider than a full line are broken at character boundaries. Runs of whitespace collapse
/// to one space. Empty input yields no lines.
pub fn wrap_text(text: &str, max_width: f32, size: f32, mono: bool) -> Vec<String> {
    let space = char_em(' ', mono) * size;
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_w = 0.0f32;

    for word in text.split_whitespace() {
        let word_w = text_width(word, size, mono);
        if word_w > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_w = 0.0;
            }
            for c in word.chars() {
                let w = char_em(c, mono) * size;
                if line_w + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_w = 0.0;
                }
                line.push(c);
                line_w += w;
            }
            continue;
        }

        let needed = if line.is_empty() {
            word_w
        } else {
            line_w + space + word_w
        };
        if needed > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_w = word_w;
        } else {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            line_w = needed;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// [`wrap_text`] capped at `max_lines`; the last kept line ends with `...` when text was dropped.
pub fn wrap_capped(
    text: &str,
    max_width: f32,
    size: f32,
    mono: bool,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = wrap_text(text, max_width, size, mono);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let with_marker = format!("{last}{ELLIPSIS}");
            *last = fit_width(&with_marker, max_width, size, mono);
            if !last.ends_with(ELLIPSIS) {
                last.push_str(ELLIPSIS);
            }
        }
    }
    lines
}

/// Make arbitrary text safe for an SVG text node.
///
/// Characters XML 1.0 forbids are dropped, tabs become four spaces, line breaks become spaces and
/// markup characters are escaped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("    "),
            '\n' | '\r' => out.push(' '),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
