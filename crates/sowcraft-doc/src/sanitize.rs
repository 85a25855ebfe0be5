//! Remove empty text from a document tree.
//!
//! Blank runs never reach the editor: leading and trailing ones are dropped,
//! and a blank run between two others is folded into the run before it so the
//! words on either side stay apart. Nodes left with nothing to show are
//! removed: list items, lists, paragraphs, headings and all-blank raw tables.

use sowcraft_core::{DocumentNode, Inline, ListItem};

pub fn sanitize(nodes: Vec<DocumentNode>) -> Vec<DocumentNode> {
    nodes.into_iter().filter_map(sanitize_node).collect()
}

fn sanitize_node(node: DocumentNode) -> Option<DocumentNode> {
    match node {
        DocumentNode::Heading { level, content } => {
            let content = clean_runs(content);
            (!content.is_empty()).then_some(DocumentNode::Heading { level, content })
        }
        DocumentNode::Paragraph { content } => {
            let content = clean_runs(content);
            (!content.is_empty()).then_some(DocumentNode::Paragraph { content })
        }
        DocumentNode::BulletList { items } => {
            let items: Vec<ListItem> = items
                .into_iter()
                .map(|item| ListItem {
                    content: clean_runs(item.content),
                })
                .filter(|item| !item.content.is_empty())
                .collect();
            (!items.is_empty()).then_some(DocumentNode::BulletList { items })
        }
        DocumentNode::RawTable { rows } => {
            let blank = rows.iter().flatten().all(|cell| cell.trim().is_empty());
            (!blank).then_some(DocumentNode::RawTable { rows })
        }
        other => Some(other),
    }
}

fn clean_runs(runs: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::with_capacity(runs.len());
    let mut pending_space = String::new();

    for run in runs {
        if run.is_blank() {
            if !out.is_empty() {
                pending_space.push_str(&run.text);
            }
            continue;
        }
        if let Some(last) = out.last_mut() {
            last.text.push_str(&std::mem::take(&mut pending_space));
        }
        out.push(run);
    }
    out
}
