//! Deterministic HTML export of a document.
//!
//! The pricing table renders with its summary block (subtotal, discount, GST,
//! total and rounded total) computed from the table itself, so the export
//! always agrees with the rows it shows.

use sowcraft_core::{Document, DocumentNode, Inline, PricingPolicy, PricingTableBlock, format_aud};
use sowcraft_pricing::summarize;

pub fn render_html(doc: &Document, policy: &PricingPolicy) -> String {
    let mut html = String::new();
    for node in &doc.nodes {
        render_node(&mut html, node, policy);
    }
    html
}

fn render_node(html: &mut String, node: &DocumentNode, policy: &PricingPolicy) {
    match node {
        DocumentNode::Heading { level, content } => {
            html.push_str(&format!("<h{level}>{}</h{level}>\n", inline_html(content)));
        }
        DocumentNode::Paragraph { content } => {
            html.push_str(&format!("<p>{}</p>\n", inline_html(content)));
        }
        DocumentNode::BulletList { items } => {
            html.push_str("<ul>\n");
            for item in items {
                html.push_str(&format!("  <li>{}</li>\n", inline_html(&item.content)));
            }
            html.push_str("</ul>\n");
        }
        DocumentNode::HorizontalRule => html.push_str("<hr />\n"),
        DocumentNode::RawTable { rows } => render_raw_table(html, rows),
        DocumentNode::PricingTable(block) => render_pricing_table(html, block, policy),
    }
}

fn inline_html(runs: &[Inline]) -> String {
    runs.iter()
        .map(|run| {
            let mut text = escape(&run.text);
            if run.italic {
                text = format!("<em>{text}</em>");
            }
            if run.bold {
                text = format!("<strong>{text}</strong>");
            }
            text
        })
        .collect()
}

fn render_raw_table(html: &mut String, rows: &[Vec<String>]) {
    html.push_str("<table>\n");
    for (i, row) in rows.iter().enumerate() {
        let tag = if i == 0 { "th" } else { "td" };
        html.push_str("  <tr>");
        for cell in row {
            html.push_str(&format!("<{tag}>{}</{tag}>", escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

// ── Pricing ──

fn render_pricing_table(html: &mut String, block: &PricingTableBlock, policy: &PricingPolicy) {
    let summary = summarize(block, policy);

    html.push_str("<table class=\"pricing-table\">\n");
    html.push_str(concat!(
        "  <tr><th>Role</th><th>Description</th><th>Hours</th>",
        "<th>Rate (AUD)</th><th>Total (AUD)</th></tr>\n"
    ));
    for row in &block.rows {
        html.push_str(&format!(
            "  <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(row.role()),
            escape(row.description()),
            format_hours(row.hours()),
            format_aud(row.rate()),
            format_aud(row.total()),
        ));
    }
    html.push_str("</table>\n");

    html.push_str("<table class=\"pricing-summary\">\n");
    summary_row(html, "Subtotal", &format_aud(summary.subtotal));
    if summary.discount_percent > 0.0 {
        summary_row(
            html,
            &format!("Discount ({}%)", format_hours(summary.discount_percent)),
            &format!("-{}", format_aud(summary.discount_amount)),
        );
        summary_row(html, "Subtotal after discount", &format_aud(summary.after_discount));
    }
    summary_row(
        html,
        &format!("GST ({}%)", format_hours(policy.gst_rate * 100.0)),
        &format_aud(summary.gst),
    );
    summary_row(html, "Total (inc. GST)", &format_aud(summary.grand_total));
    summary_row(html, "Total (rounded)", &format_aud(summary.rounded_total));
    html.push_str("</table>\n");
}

fn summary_row(html: &mut String, label: &str, value: &str) {
    html.push_str(&format!("  <tr><td>{}</td><td>{}</td></tr>\n", escape(label), value));
}

/// `8` rather than `8.0`; fractional hours keep up to two places.
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        let s = format!("{hours:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn escape(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}
