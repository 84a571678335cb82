//! Line-oriented Markdown structure scanner used by the document adapter.
//!
//! Only the structure the adapter consumes is recognized: headings, fenced code, bullet and
//! numbered lists, pipe tables and plain text lines.

use std::sync::OnceLock;

use regex::Regex;

use crate::{adapters::cached_regex, foundation::error::ReelResult};

/// One heading and the content up to the next heading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub level: u8,
    /// Plain text lines, trimmed.
    pub text: Vec<String>,
    /// Fenced code blocks, one entry per line.
    pub code_blocks: Vec<Vec<String>>,
    /// Bullet and numbered list entries in document order, nesting flattened.
    pub list_items: Vec<String>,
    /// Pipe tables; separator rows are dropped, the first row is the header.
    pub tables: Vec<Vec<Vec<String>>>,
}

impl Section {
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
            ..Self::default()
        }
    }

    pub fn has_code(&self) -> bool {
        self.code_blocks.iter().any(|b| !b.is_empty())
    }

    pub fn has_table(&self) -> bool {
        self.tables.iter().any(|t| t.len() >= 2)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && !self.has_code()
            && self.list_items.is_empty()
            && self.tables.iter().all(|t| t.is_empty())
    }

    /// Content size used by the merge heuristic.
    pub fn weight(&self) -> usize {
        self.text.len()
            + self.code_blocks.iter().map(Vec::len).sum::<usize>()
            + self.list_items.len()
            + self.tables.iter().map(Vec::len).sum::<usize>()
    }

    /// Append `other`'s content; headings join as `A & B` unless equal.
    pub fn absorb(&mut self, other: Section) {
        if other.heading != self.heading && !other.heading.is_empty() {
            self.heading = if self.heading.is_empty() {
                other.heading
            } else {
                format!("{} & {}", self.heading, other.heading)
            };
        }
        self.level = self.level.min(other.level);
        self.text.extend(other.text);
        self.code_blocks.extend(other.code_blocks);
        self.list_items.extend(other.list_items);
        self.tables.extend(other.tables);
    }
}

/// Document title plus its sections in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocStructure {
    pub title: String,
    pub sections: Vec<Section>,
}

fn heading_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^(#{1,6})\s+(.+)$")
}

fn bullet_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^\s*[-*+]\s+(.+)$")
}

fn numbered_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^\s*\d+[.)]\s+(.+)$")
}

fn table_row_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^\s*\|.*\|\s*$")
}

fn table_sep_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^:?-+:?$")
}

fn rule_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"^\s*([-*_]\s*){3,}$")
}

fn generated_re() -> ReelResult<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached_regex(&RE, r"(?i)^\*?_?generated:.*$")
}

/// `true` for lines that carry no content: blanks, horizontal rules, `Generated:` stamps.
pub fn is_metadata_line(line: &str) -> ReelResult<bool> {
    let t = line.trim();
    Ok(t.is_empty() || rule_re()?.is_match(t) || generated_re()?.is_match(t))
}

/// Remove inline Markdown: links keep their text, emphasis and code spans keep their content.
pub fn strip_inline(text: &str) -> ReelResult<String> {
    static LINK: OnceLock<Regex> = OnceLock::new();
    static IMAGE: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    static CODE: OnceLock<Regex> = OnceLock::new();

    let out = cached_regex(&IMAGE, r"!\[([^\]]*)\]\([^)]*\)")?.replace_all(text, "$1");
    let out = cached_regex(&LINK, r"\[([^\]]+)\]\([^)]*\)")?.replace_all(&out, "$1");
    let out = cached_regex(&BOLD, r"(\*\*|__)([^*_]+)(\*\*|__)")?.replace_all(&out, "$2");
    let out = cached_regex(&ITALIC, r"\*([^*]+)\*")?.replace_all(&out, "$1");
    let out = cached_regex(&CODE, r"`([^`]+)`")?.replace_all(&out, "$1");
    Ok(out.trim().to_string())
}

#[derive(Default)]
struct Scanner {
    doc: DocStructure,
    current: Option<Section>,
    /// Content seen before the first section heading.
    preamble: Section,
    in_code: bool,
    code: Vec<String>,
    table: Vec<Vec<String>>,
}

impl Scanner {
    fn target(&mut self) -> &mut Section {
        self.current.as_mut().unwrap_or(&mut self.preamble)
    }

    fn flush_table(&mut self) {
        if !self.table.is_empty() {
            let table = std::mem::take(&mut self.table);
            self.target().tables.push(table);
        }
    }

    fn flush_section(&mut self) {
        self.flush_table();
        if let Some(section) = self.current.take() {
            self.doc.sections.push(section);
        }
    }

    fn finish(mut self) -> DocStructure {
        if self.in_code {
            let code = std::mem::take(&mut self.code);
            self.target().code_blocks.push(code);
        }
        self.flush_section();

        if !self.preamble.is_empty() {
            self.preamble.heading = if self.doc.sections.is_empty() {
                "Overview".to_string()
            } else {
                "Introduction".to_string()
            };
            self.preamble.level = 2;
            self.doc.sections.insert(0, self.preamble);
        } else if self.doc.sections.is_empty() && !self.doc.title.is_empty() {
            let mut overview = Section::new("Overview", 2);
            overview.text.push(format!("Content from {}", self.doc.title));
            self.doc.sections.push(overview);
        }
        self.doc
    }
}

/// Scan `content` into a title and sections.
///
/// Leading metadata is skipped. The first level-1 heading becomes the title; every other heading
/// opens a section. Content before the first section heading is kept as an "Introduction"
/// section, or as "Overview" when the document has no other section. A titled document with no
/// content at all still gets one "Overview" section.
pub fn parse_markdown(content: &str) -> ReelResult<DocStructure> {
    let mut lines = content.lines().peekable();
    while let Some(line) = lines.peek() {
        if !is_metadata_line(line)? {
            break;
        }
        lines.next();
    }

    let mut s = Scanner::default();
    for line in lines {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if s.in_code {
                let code = std::mem::take(&mut s.code);
                s.target().code_blocks.push(code);
                s.in_code = false;
            } else {
                s.flush_table();
                s.in_code = true;
            }
            continue;
        }
        if s.in_code {
            s.code.push(line.trim_end().to_string());
            continue;
        }

        if table_row_re()?.is_match(line) {
            let cells: Vec<String> = trimmed
                .trim_matches('|')
                .split('|')
                .map(|c| c.trim().to_string())
                .collect();
            let sep = table_sep_re()?;
            if !cells.iter().all(|c| sep.is_match(c)) {
                s.table.push(cells);
            }
            continue;
        }
        s.flush_table();

        if let Some(caps) = heading_re()?.captures(line) {
            let level = caps[1].len() as u8;
            let heading = strip_inline(&caps[2])?;
            if level == 1 && s.doc.title.is_empty() {
                s.doc.title = heading;
            } else {
                s.flush_section();
                s.current = Some(Section::new(heading, level));
            }
            continue;
        }

        if let Some(caps) = bullet_re()?
            .captures(line)
            .or(numbered_re()?.captures(line))
        {
            let item = caps[1].trim().to_string();
            if !is_metadata_line(&item)? {
                s.target().list_items.push(item);
            }
            continue;
        }

        if is_metadata_line(trimmed)? {
            continue;
        }
        s.target().text.push(trimmed.to_string());
    }
    Ok(s.finish())
}

#[cfg(test)]
#[path = "../../tests/unit/adapters/markdown.rs"]
mod tests;
