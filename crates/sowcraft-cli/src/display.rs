//! Vertical card display for conversions, workbooks and the rate card.

use std::path::Path;

use sowcraft_core::{PricingPolicy, RoleCatalogEntry, format_aud};
use sowcraft_doc::Conversion;
use sowcraft_pricing::{Severity, Violation};
use sowcraft_sheet::WorkbookModel;

const MAX_ROLE_WIDTH: usize = 48;

// ── Public API ──

/// Print a converted document as a card: identity, pricing rows, totals, review flags.
pub fn print_conversion(conversion: &Conversion, policy: &PricingPolicy) {
    if conversion.title.is_empty() {
        println!("=== SOW ===");
    } else {
        println!("=== {} ===", conversion.title);
    }
    println!();

    println!("Document");
    println!("  {:<26} {}", "pricing source", conversion.source.as_str());
    println!("  {:<26} {}", "nodes", conversion.document.nodes.len());
    if let Some(scope) = &conversion.scope {
        println!("  {:<26} {}", "scope items", scope.scope_items.len());
    }
    println!();

    let block = &conversion.pricing.block;
    println!("Pricing");
    for row in &block.rows {
        println!(
            "  {:<width$} {:>7} h  {:>11}  {:>12}",
            truncate(row.role(), MAX_ROLE_WIDTH),
            trim_hours(row.hours()),
            format_aud(row.rate()),
            format_aud(row.total()),
            width = MAX_ROLE_WIDTH
        );
    }
    println!();

    let summary = &conversion.pricing.summary;
    println!("Totals");
    println!("  {:<26} {}", "total hours", trim_hours(block.total_hours()));
    println!("  {:<26} {}", "subtotal", format_aud(summary.subtotal));
    if summary.discount_percent > 0.0 {
        println!(
            "  {:<26} -{}",
            format!("discount ({}%)", trim_hours(summary.discount_percent)),
            format_aud(summary.discount_amount)
        );
        println!("  {:<26} {}", "after discount", format_aud(summary.after_discount));
    }
    println!(
        "  {:<26} {}",
        format!("gst ({}%)", trim_hours(policy.gst_rate * 100.0)),
        format_aud(summary.gst)
    );
    println!("  {:<26} {}", "total (inc. gst)", format_aud(summary.grand_total));
    println!("  {:<26} {}", "total (rounded)", format_aud(summary.rounded_total));
    println!("  {:<26} {}", "total investment", format_aud(conversion.total_investment));
    println!();

    print_review(&conversion.review);
}

pub fn print_workbook(model: &WorkbookModel, path: &Path) {
    println!("=== {} ===", model.title);
    println!();
    println!("Workbook");
    println!("  {:<26} {}", "path", path.display());
    println!("  {:<26} {}", "scope sheets", model.scope_sheets.len());
    println!("  {:<26} {}", "rate card rows", model.pricing_sheet.len());
    let unknown: Vec<&str> = model
        .pricing_sheet
        .iter()
        .filter(|r| !r.catalogued)
        .map(|r| r.role.as_str())
        .collect();
    if !unknown.is_empty() {
        println!("  {:<26} {}", "not in rate card", unknown.join(", "));
    }
    println!();
}

pub fn print_roles(entries: &[&RoleCatalogEntry]) {
    for entry in entries {
        println!(
            "  {:<width$} {:>10}",
            entry.name,
            format_aud(entry.hourly_rate),
            width = MAX_ROLE_WIDTH + 4
        );
    }
    println!();
    println!("{} roles", entries.len());
}

// ── Review flags ──

fn print_review(review: &[Violation]) {
    if review.is_empty() {
        return;
    }
    println!("Review");
    for v in review {
        let marker = match v.severity {
            Severity::Error => "error",
            Severity::Warning => "warn",
        };
        println!("  {:<5} {:<22} {}", marker, v.code.as_str(), v.message);
    }
    println!();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn trim_hours(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}").trim_end_matches('0').to_string()
    }
}
