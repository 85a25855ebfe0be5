//! Merge narrative nodes and the enforced pricing table into one document.

use sowcraft_core::{Document, DocumentNode, Inline, PricingTableBlock, plain_text};
use sowcraft_parse::InsertionPoint;
use tracing::debug;

use crate::sanitize::sanitize;

const AUTO_HEADING: &str = "Investment Breakdown";
const PRICING_HEADING_WORDS: &[&str] = &["investment", "pricing", "budget", "cost"];

/// Per-call insertion guard: the pricing table is placed at most once, however
/// many sentinels, pricing tables or stale pricing nodes the input carries.
#[derive(Debug)]
pub struct AssemblyState {
    pending: Option<PricingTableBlock>,
    pricing_inserted: bool,
}

impl AssemblyState {
    pub fn new(block: PricingTableBlock) -> Self {
        Self {
            pending: Some(block),
            pricing_inserted: false,
        }
    }

    pub fn pricing_inserted(&self) -> bool {
        self.pricing_inserted
    }

    /// Push the pricing node if it has not been placed yet.
    fn place(&mut self, out: &mut Vec<DocumentNode>) {
        if self.pricing_inserted {
            return;
        }
        if let Some(block) = self.pending.take() {
            out.push(DocumentNode::PricingTable(block));
            self.pricing_inserted = true;
        }
    }
}

/// Build the final document.
///
/// The pricing table goes at `insertion` when given. Without one, the first
/// pricing node already present in `nodes` is replaced in place; failing that
/// the table is appended, after an "Investment Breakdown" heading unless some
/// heading already talks about investment, pricing, budget or cost. Any other
/// pricing nodes in the input are dropped. The result is sanitised.
pub fn assemble(
    nodes: Vec<DocumentNode>,
    insertion: Option<InsertionPoint>,
    block: PricingTableBlock,
) -> Document {
    let mut state = AssemblyState::new(block);
    let at = insertion.map(|p| p.index.min(nodes.len()));
    let mut out: Vec<DocumentNode> = Vec::with_capacity(nodes.len() + 2);

    for (i, node) in nodes.into_iter().enumerate() {
        if at == Some(i) {
            state.place(&mut out);
        }
        match node {
            DocumentNode::PricingTable(_) if at.is_none() => state.place(&mut out),
            DocumentNode::PricingTable(_) => debug!(index = i, "dropping stale pricing node"),
            other => out.push(other),
        }
    }

    if !state.pricing_inserted() {
        if at.is_none() && !has_pricing_heading(&out) {
            out.push(DocumentNode::heading(2, vec![Inline::plain(AUTO_HEADING)]));
        }
        state.place(&mut out);
    }

    Document::new(sanitize(out))
}

fn has_pricing_heading(nodes: &[DocumentNode]) -> bool {
    nodes.iter().any(|n| match n {
        DocumentNode::Heading { content, .. } => {
            let text = plain_text(content).to_lowercase();
            PRICING_HEADING_WORDS.iter().any(|w| text.contains(w))
        }
        _ => false,
    })
}
