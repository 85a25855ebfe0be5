//! Raw AI response → document with one enforced pricing table.

use sowcraft_core::{CandidateRoleRow, Document, PricingPolicy, RoleCatalog, StructuredScope};
use sowcraft_parse::{
    Extraction, clean_content, detect_discount, detect_title, extract_structured, parse_markdown,
};
use sowcraft_pricing::{EnforcedPricing, PricingEngine, Violation, validate};
use tracing::info;

use crate::assemble::assemble;
use crate::error::ConvertError;

/// Where the pricing candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingSource {
    StructuredPayload,
    MarkdownTable,
    ExistingDocument,
}

impl PricingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PricingSource::StructuredPayload => "structured payload",
            PricingSource::MarkdownTable => "markdown table",
            PricingSource::ExistingDocument => "existing document",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub title: String,
    pub document: Document,
    pub pricing: EnforcedPricing,
    pub source: PricingSource,
    /// Ex-GST investment stored alongside the document.
    pub total_investment: f64,
    /// Nested scope from the payload, when present; feeds the workbook.
    pub scope: Option<StructuredScope>,
    /// Review flags over the enforced table.
    pub review: Vec<Violation>,
}

/// Convert a raw AI response into a document.
///
/// The JSON payload's roles take precedence over a pricing-shaped Markdown
/// table. A discount stated in the narrative wins over one in the payload.
/// Fails only when no pricing row survives enforcement.
pub fn convert(
    raw: &str,
    catalog: &RoleCatalog,
    policy: &PricingPolicy,
) -> Result<Conversion, ConvertError> {
    let text = clean_content(raw);
    let narrative = parse_markdown(&text);

    let (candidates, scope, payload_discount, source) = match extract_structured(&text) {
        Extraction::Found(payload) => (
            payload.candidates,
            payload.scope,
            payload.discount_percent,
            PricingSource::StructuredPayload,
        ),
        Extraction::NotFound => (
            narrative.fallback_rows.clone(),
            None,
            None,
            PricingSource::MarkdownTable,
        ),
    };

    let discount = effective_discount(&text, payload_discount);
    let pricing = PricingEngine::new(catalog, policy).enforce(&candidates, discount)?;
    let review = validate(&pricing.block, catalog, policy);

    let insertion = narrative.insertion_point();
    let document = assemble(narrative.nodes, insertion, pricing.block.clone());
    let title = detect_title(&text, scope.as_ref());
    let total_investment = document.total_investment();

    info!(
        title = %title,
        source = source.as_str(),
        nodes = document.nodes.len(),
        total_investment,
        review = review.len(),
        "converted narrative"
    );

    Ok(Conversion {
        title,
        document,
        pricing,
        source,
        total_investment,
        scope,
        review,
    })
}

/// Nested scope and discount for the workbook, read straight from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeExtraction {
    pub scope: StructuredScope,
    pub discount_percent: f64,
}

/// Pull the nested scope out of a raw response without running pricing
/// enforcement, so a scope whose roles are all placeholders still yields a
/// workbook. `None` when the response carries no valid `scopeItems`.
pub fn extract_scope(raw: &str) -> Option<ScopeExtraction> {
    let text = clean_content(raw);
    let payload = extract_structured(&text).found()?;
    let discount_percent = effective_discount(&text, payload.discount_percent);
    let scope = payload.scope?;
    info!(items = scope.scope_items.len(), discount_percent, "extracted scope for workbook");
    Some(ScopeExtraction {
        scope,
        discount_percent,
    })
}

/// A discount stated in the narrative wins over one in the payload.
fn effective_discount(text: &str, payload_discount: Option<f64>) -> f64 {
    detect_discount(text).or(payload_discount).unwrap_or(0.0)
}

/// Re-run enforcement over a stored document's pricing table and put the
/// result back in the same place. Documents without a pricing table fail the
/// same way an empty narrative does.
pub fn reprice(
    document: &Document,
    catalog: &RoleCatalog,
    policy: &PricingPolicy,
) -> Result<Conversion, ConvertError> {
    let (candidates, discount): (Vec<CandidateRoleRow>, f64) = match document.pricing_table() {
        Some(block) => (
            block.rows.iter().map(CandidateRoleRow::from).collect(),
            block.discount_percent,
        ),
        None => (Vec::new(), 0.0),
    };

    let pricing = PricingEngine::new(catalog, policy).enforce(&candidates, discount)?;
    let review = validate(&pricing.block, catalog, policy);
    let document = assemble(document.nodes.clone(), None, pricing.block.clone());
    let total_investment = document.total_investment();

    Ok(Conversion {
        title: String::new(),
        document,
        pricing,
        source: PricingSource::ExistingDocument,
        total_investment,
        scope: None,
        review,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sowcraft_core::{DocumentNode, PricingRow};
    use sowcraft_pricing::PricingError;

    const HEAD_OF: &str = "Tech - Head Of - Senior Project Management";
    const COORD: &str = "Tech - Delivery - Project Coordination";
    const DEV: &str = "Tech - Producer - Development";
    const AM: &str = "Account Management - (Account Manager)";

    fn run(raw: &str) -> Result<Conversion, ConvertError> {
        convert(raw, RoleCatalog::standard(), &PricingPolicy::default())
    }

    #[test]
    fn sentinel_scenario_with_structured_scope() {
        let raw = r#"## Overview
Some text
[pricing_table]

```json
{"scopeItems":[{"name":"Phase 1","roles":[{"role":"Tech - Producer - Development","hours":40}]}]}
```"#;
        let out = run(raw).unwrap();
        let nodes = &out.document.nodes;
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[0], DocumentNode::Heading { level: 2, .. }));
        assert!(matches!(nodes[1], DocumentNode::Paragraph { .. }));

        let DocumentNode::PricingTable(block) = &nodes[2] else {
            panic!("expected pricing node, got {:?}", nodes[2]);
        };
        let roles: Vec<&str> = block.rows.iter().map(PricingRow::role).collect();
        assert_eq!(roles, vec![HEAD_OF, COORD, DEV, AM]);
        assert_eq!(block.rows[2].hours(), 40.0);
        assert_eq!(block.rows[2].rate(), 120.0);
        assert_eq!(out.source, PricingSource::StructuredPayload);
        assert_eq!(out.scope.unwrap().scope_items[0].name, "Phase 1");
    }

    #[test]
    fn markdown_table_is_the_fallback() {
        let raw = "# Scope of Work: Acme\n\n## Investment\n\
                   | Role | Description | Hours | Rate |\n|---|---|---|---|\n\
                   | Tech - Producer - Design | Mockups | 10 | 150 |\n\n\
                   We offer a 5% discount.";
        let out = run(raw).unwrap();
        assert_eq!(out.source, PricingSource::MarkdownTable);
        assert_eq!(out.title, "Scope of Work: Acme");
        assert_eq!(out.pricing.block.discount_percent, 5.0);

        let kinds: Vec<bool> =
            out.document.nodes.iter().map(DocumentNode::is_pricing_table).collect();
        assert_eq!(
            kinds,
            vec![false, false, true, false],
            "table replaced in place under its heading"
        );

        let design = &out.pricing.block.rows[2];
        assert_eq!(design.rate(), 120.0, "catalog rate beats the table's rate");
    }

    #[test]
    fn no_pricing_data_is_a_blocking_error() {
        assert_eq!(
            run("## Overview\nJust words.").unwrap_err(),
            ConvertError::Pricing(PricingError::NoPricingDataAvailable)
        );
        let placeholders = "| Role | Hours | Rate |\n|---|---|---|\n| Select role... | 0 | 0 |";
        assert!(run(placeholders).is_err());
    }

    #[test]
    fn negative_markdown_hours_never_reach_the_total() {
        let raw = "| Role | Description | Hours | Rate |\n|---|---|---|---|\n\
                   | Tech - Producer - Design | Mockups | -10 | 120 |\n\
                   | Tech - Producer - Development | Build | 5 | 120 |";
        let out = run(raw).unwrap();
        let roles: Vec<&str> = out.pricing.block.rows.iter().map(PricingRow::role).collect();
        assert!(!roles.contains(&"Tech - Producer - Design"), "negative row dropped: {roles:?}");
        assert!(out.pricing.block.rows.iter().all(|r| r.hours() >= 0.0));
        assert_eq!(out.total_investment, out.pricing.summary.subtotal);
    }

    #[test]
    fn negative_payload_hours_string_is_dropped() {
        let raw = r#"```json
{"suggestedRoles":[
  {"role":"Tech - Producer - Design","hours":"-5"},
  {"role":"Tech - Producer - Development","hours":5}
]}
```"#;
        let out = run(raw).unwrap();
        let roles: Vec<&str> = out.pricing.block.rows.iter().map(PricingRow::role).collect();
        assert!(!roles.contains(&"Tech - Producer - Design"), "negative row dropped: {roles:?}");
        assert!(roles.contains(&DEV));
    }

    #[test]
    fn reasoning_is_stripped_before_parsing() {
        let raw = "<think>| Role | Hours | Rate |\n| Secret | 1 | 1 |</think>\n\
                   | Role | Hours | Rate |\n| Tech - Producer - Design | 2 | 0 |";
        let out = run(raw).unwrap();
        assert!(out.pricing.block.rows.iter().all(|r| r.role() != "Secret"));
    }

    #[test]
    fn total_investment_matches_subtotal() {
        let raw = r#"```json
{"suggestedRoles":[{"role":"Tech - Producer - Development","hours":10}]}
```"#;
        let out = run(raw).unwrap();
        assert_eq!(out.total_investment, out.pricing.summary.subtotal);
        assert_eq!(out.document.pricing_table_count(), 1);
    }

    #[test]
    fn unmatched_roles_are_flagged_for_review() {
        let raw = r#"```json
{"suggestedRoles":[{"role":"Chief Vibes Officer","hours":2}]}
```"#;
        let out = run(raw).unwrap();
        assert_eq!(out.pricing.unmatched, vec!["Chief Vibes Officer".to_string()]);
        assert!(
            out.review
                .iter()
                .any(|v| v.code == sowcraft_pricing::ViolationCode::UnmatchedRole)
        );
    }

    #[test]
    fn reprice_is_stable_on_converted_output() {
        let raw = r#"Intro
[pricing_table]
```json
{"suggestedRoles":["Tech - Producer - Design"]}
```"#;
        let out = run(raw).unwrap();
        let again =
            reprice(&out.document, RoleCatalog::standard(), &PricingPolicy::default()).unwrap();
        assert_eq!(again.document, out.document);
        assert_eq!(again.document.pricing_table_count(), 1);
    }

    #[test]
    fn scope_is_extracted_even_when_pricing_has_nothing_left() {
        let raw = r#"Offering 10% discount.
```json
{"scopeItems":[{"name":"Phase 1","roles":[{"role":"TBD","hours":8}]}],"discount":3}
```"#;
        assert!(run(raw).is_err(), "placeholders alone cannot be priced");

        let extracted = extract_scope(raw).unwrap();
        assert_eq!(extracted.scope.scope_items[0].name, "Phase 1");
        assert_eq!(extracted.discount_percent, 10.0);
    }

    #[test]
    fn extract_scope_needs_scope_items() {
        let raw = r#"```json
{"suggestedRoles":[{"role":"Tech - Producer - Design","hours":2}]}
```"#;
        assert_eq!(extract_scope(raw), None);
        assert_eq!(extract_scope("## Overview\nJust words."), None);
    }

    #[test]
    fn reprice_without_table_fails() {
        let doc = Document::default();
        assert!(reprice(&doc, RoleCatalog::standard(), &PricingPolicy::default()).is_err());
    }
}
