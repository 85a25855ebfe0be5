//! Typed document tree handed to the editor and to storage.
//!
//! Serialises as a JSON array of nodes, each tagged with a `type` field
//! (`heading`, `paragraph`, `bulletList`, `horizontalRule`, `rawTable`,
//! `pricingTable`).

use serde::{Deserialize, Serialize};

use crate::catalog::normalize_role;
use crate::pricing::PricingTableBlock;

fn is_false(b: &bool) -> bool {
    !*b
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inline {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn styled(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Concatenated text of a run sequence, formatting dropped.
pub fn plain_text(runs: &[Inline]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// A list item: one paragraph of inline content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocumentNode {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    BulletList { items: Vec<ListItem> },
    HorizontalRule,
    RawTable { rows: Vec<Vec<String>> },
    PricingTable(PricingTableBlock),
}

impl DocumentNode {
    /// Heading with the level clamped into `1..=3`.
    pub fn heading(level: u8, content: Vec<Inline>) -> Self {
        DocumentNode::Heading {
            level: level.clamp(1, 3),
            content,
        }
    }

    pub fn paragraph(content: Vec<Inline>) -> Self {
        DocumentNode::Paragraph { content }
    }

    pub fn is_pricing_table(&self) -> bool {
        matches!(self, DocumentNode::PricingTable(_))
    }
}

/// An ordered sequence of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub nodes: Vec<DocumentNode>,
}

impl Document {
    pub fn new(nodes: Vec<DocumentNode>) -> Self {
        Self { nodes }
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The first pricing table, if any.
    pub fn pricing_table(&self) -> Option<&PricingTableBlock> {
        self.nodes.iter().find_map(|n| match n {
            DocumentNode::PricingTable(block) => Some(block),
            _ => None,
        })
    }

    pub fn pricing_table_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_pricing_table()).count()
    }

    /// Ex-GST investment of the first pricing table, as stored alongside the
    /// document. Rows with a non-positive rate or a role mentioning "total" are
    /// skipped; a document without pricing is worth 0.
    pub fn total_investment(&self) -> f64 {
        let Some(block) = self.pricing_table() else {
            return 0.0;
        };
        block
            .rows
            .iter()
            .filter(|r| r.rate() > 0.0 && !normalize_role(r.role()).contains("total"))
            .map(|r| r.hours() * r.rate())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingRow;
    use pretty_assertions::assert_eq;

    #[test]
    fn nodes_serialise_with_type_tags() {
        let doc = Document::new(vec![
            DocumentNode::heading(2, vec![Inline::plain("Overview")]),
            DocumentNode::paragraph(vec![
                Inline::plain("Plain "),
                Inline::styled("bold", true, false),
            ]),
            DocumentNode::BulletList {
                items: vec![ListItem {
                    content: vec![Inline::plain("item")],
                }],
            },
            DocumentNode::HorizontalRule,
            DocumentNode::PricingTable(PricingTableBlock::new(vec![], 0.0)),
        ]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json[0]["type"], "heading");
        assert_eq!(json[0]["level"], 2);
        assert_eq!(json[1]["type"], "paragraph");
        assert_eq!(json[1]["content"][0], serde_json::json!({"text": "Plain "}));
        assert_eq!(json[1]["content"][1]["bold"], true);
        assert_eq!(json[2]["type"], "bulletList");
        assert_eq!(json[3], serde_json::json!({"type": "horizontalRule"}));
        assert_eq!(json[4]["type"], "pricingTable");
        assert_eq!(json[4]["discountPercent"], 0.0);
    }

    #[test]
    fn json_roundtrip_preserves_tree() {
        let doc = Document::new(vec![
            DocumentNode::heading(1, vec![Inline::styled("Title", false, true)]),
            DocumentNode::RawTable {
                rows: vec![vec!["a".into(), "b".into()]],
            },
        ]);
        let text = doc.to_json_pretty().unwrap();
        assert_eq!(Document::from_json(&text).unwrap(), doc);
    }

    #[test]
    fn heading_level_is_clamped() {
        assert_eq!(
            DocumentNode::heading(6, vec![]),
            DocumentNode::Heading { level: 3, content: vec![] }
        );
        assert_eq!(
            DocumentNode::heading(0, vec![]),
            DocumentNode::Heading { level: 1, content: vec![] }
        );
    }

    #[test]
    fn total_investment_skips_zero_rate_and_total_rows() {
        let block = PricingTableBlock::new(
            vec![
                PricingRow::new("Dev", "", 10.0, 120.0),
                PricingRow::new("Unknown", "", 5.0, 0.0),
                PricingRow::new("Subtotal", "", 1.0, 1000.0),
            ],
            10.0,
        );
        let doc = Document::new(vec![DocumentNode::PricingTable(block)]);
        assert_eq!(doc.total_investment(), 1200.0);
        assert_eq!(Document::default().total_investment(), 0.0);
    }
}
