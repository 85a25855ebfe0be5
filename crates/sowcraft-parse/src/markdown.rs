//! Line-oriented Markdown block parser.
//!
//! Classifies each line of an AI-authored narrative into document nodes. It is
//! deliberately forgiving: anything it does not recognise becomes a paragraph.
//! Pricing-shaped tables are not emitted as nodes; they are handed back as
//! fallback candidate rows and their position becomes an insertion slot for the
//! enforced pricing table.
//!
//! # Line classes
//!
//! - `| ... |` runs: a table region (second line skipped if it is `|---|`)
//! - `#`, `##`, `###`: headings 1–3 (deeper prefixes clamp to 3)
//! - `---`, `***`, `___`: horizontal rule (checked before bullets)
//! - `-`, `*`, `+`, `•` followed by a space: bullet item
//! - `[pricing_table]` / `[editablePricingTable]`: pricing insertion sentinel
//! - ```` ``` ```` fences: JSON payloads are dropped, other code becomes paragraphs
//! - anything else non-blank: a paragraph

use sowcraft_core::{CandidateRoleRow, DocumentNode, Inline, ListItem};
use tracing::debug;

use crate::inline::parse_inline;
use crate::table;

/// Where the enforced pricing table should go, as an index into
/// [`ParsedNarrative::nodes`] (the table goes before the node at that index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub index: usize,
    pub source: InsertionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionSource {
    /// An explicit `[pricing_table]` marker.
    Sentinel,
    /// The position of the first pricing-shaped Markdown table.
    PricingTable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNarrative {
    pub nodes: Vec<DocumentNode>,
    /// Rows of the first pricing-shaped table; used when no JSON payload exists.
    pub fallback_rows: Vec<CandidateRoleRow>,
    sentinel: Option<usize>,
    table_slot: Option<usize>,
}

impl ParsedNarrative {
    /// Sentinel position if one was seen, else the first pricing table's position.
    pub fn insertion_point(&self) -> Option<InsertionPoint> {
        self.sentinel
            .map(|index| InsertionPoint {
                index,
                source: InsertionSource::Sentinel,
            })
            .or(self.table_slot.map(|index| InsertionPoint {
                index,
                source: InsertionSource::PricingTable,
            }))
    }
}

const SENTINELS: &[&str] = &["[pricing_table]", "[editablepricingtable]"];

pub fn parse_markdown(text: &str) -> ParsedNarrative {
    let lines: Vec<&str> = text.lines().collect();
    let mut parser = BlockParser::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            parser.end_list();
            i += 1;
            continue;
        }

        if let Some(info) = trimmed.strip_prefix("```") {
            parser.end_list();
            let start = i + 1;
            let mut end = start;
            while end < lines.len() && !lines[end].trim_start().starts_with("```") {
                end += 1;
            }
            parser.fence(info.trim(), &lines[start..end]);
            i = end + 1;
            continue;
        }

        if table::is_table_line(line) {
            parser.end_list();
            let mut rows: Vec<Vec<String>> = Vec::new();
            let mut j = i;
            while j < lines.len() && table::is_table_line(lines[j]) {
                let cells = table::split_row(lines[j]);
                if !(j == i + 1 && table::is_alignment_row(&cells)) {
                    rows.push(cells);
                }
                j += 1;
            }
            parser.table(rows);
            i = j;
            continue;
        }

        let lower = trimmed.to_lowercase();
        if SENTINELS.contains(&lower.as_str()) {
            parser.end_list();
            parser.sentinel();
            i += 1;
            continue;
        }

        if let Some((level, rest)) = heading(trimmed) {
            parser.end_list();
            parser.push(DocumentNode::heading(level, parse_inline(rest)));
        } else if is_rule(trimmed) {
            parser.end_list();
            parser.push(DocumentNode::HorizontalRule);
        } else if let Some(item) = bullet(trimmed) {
            parser.list.push(ListItem {
                content: parse_inline(item),
            });
        } else {
            parser.end_list();
            parser.push(DocumentNode::paragraph(parse_inline(trimmed)));
        }
        i += 1;
    }

    parser.end_list();
    debug!(
        nodes = parser.out.nodes.len(),
        fallback_rows = parser.out.fallback_rows.len(),
        "parsed narrative"
    );
    parser.out
}

#[derive(Default)]
struct BlockParser {
    out: ParsedNarrative,
    list: Vec<ListItem>,
}

impl BlockParser {
    fn push(&mut self, node: DocumentNode) {
        self.out.nodes.push(node);
    }

    fn end_list(&mut self) {
        if !self.list.is_empty() {
            let items = std::mem::take(&mut self.list);
            self.out.nodes.push(DocumentNode::BulletList { items });
        }
    }

    /// Only the first sentinel counts; later ones are dropped.
    fn sentinel(&mut self) {
        if self.out.sentinel.is_none() {
            self.out.sentinel = Some(self.out.nodes.len());
        }
    }

    fn table(&mut self, rows: Vec<Vec<String>>) {
        match table::pricing_rows(&rows) {
            Some(candidates) => {
                if self.out.table_slot.is_none() {
                    self.out.table_slot = Some(self.out.nodes.len());
                    self.out.fallback_rows = candidates;
                }
            }
            None if !rows.is_empty() => self.push(DocumentNode::RawTable { rows }),
            None => {}
        }
    }

    fn fence(&mut self, info: &str, body: &[&str]) {
        let first = body.iter().map(|l| l.trim()).find(|l| !l.is_empty()).unwrap_or("");
        let is_payload =
            info.eq_ignore_ascii_case("json") || first.starts_with('{') || first.starts_with('[');
        if is_payload {
            return;
        }
        for line in body.iter().map(|l| l.trim_end()).filter(|l| !l.trim().is_empty()) {
            self.push(DocumentNode::paragraph(vec![Inline::plain(line)]));
        }
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(((hashes.min(3)) as u8, rest.trim()))
}

fn is_rule(line: &str) -> bool {
    let compact: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && matches!(compact[0], '-' | '*' | '_')
        && compact.iter().all(|&c| c == compact[0])
}

fn bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '+' | '•') {
        return None;
    }
    let rest = chars.as_str();
    if marker == '•' {
        return Some(rest.trim());
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}
