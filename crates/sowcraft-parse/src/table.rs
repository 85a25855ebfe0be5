//! Pipe-table helpers shared by the block parser.

use sowcraft_core::{CandidateRoleRow, normalize_role};

/// A line that belongs to a pipe table: `| ... |` with optional outer whitespace.
pub(crate) fn is_table_line(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 2 && t.starts_with('|') && t.ends_with('|')
}

/// Cells of a table line, trimmed, outer pipes removed.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let t = line.trim();
    let t = t.strip_prefix('|').unwrap_or(t);
    let t = t.strip_suffix('|').unwrap_or(t);
    t.split('|').map(|c| c.trim().to_string()).collect()
}

/// `|---|:---:|---:|` style separator.
pub(crate) fn is_alignment_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|c| {
            let inner = c.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.bytes().all(|b| b == b'-')
        })
}

/// Read a number by keeping only digits and the first decimal point
/// (`"$1,200.50"` → 1200.5). A `-` before the first digit makes it negative
/// (`"-$10"` → -10). Cells without digits give `None`.
pub(crate) fn parse_number(cell: &str) -> Option<f64> {
    let mut digits = String::with_capacity(cell.len() + 1);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in cell.chars() {
        if c.is_ascii_digit() {
            seen_digit = true;
            digits.push(c);
        } else if c == '-' && !seen_digit && !digits.starts_with('-') {
            digits.insert(0, '-');
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            digits.push('.');
        }
    }
    if !seen_digit {
        return None;
    }
    digits.parse().ok()
}

/// Strip emphasis markers so `**Dev**` reads as `Dev`.
fn strip_emphasis(cell: &str) -> String {
    cell.replace("**", "").trim_matches(|c| c == '*' || c == '_').trim().to_string()
}

// ── Pricing-shaped tables ──

struct PricingColumns {
    role: usize,
    description: Option<usize>,
    hours: usize,
    rate: usize,
}

/// Header columns when the first row names role, hours and rate.
fn header_columns(header: &[String]) -> Option<PricingColumns> {
    let lower: Vec<String> = header.iter().map(|c| c.to_lowercase()).collect();
    Some(PricingColumns {
        role: column(&lower, |c| c.contains("role"))?,
        hours: column(&lower, |c| c.contains("hour") || c == "hrs")?,
        rate: column(&lower, |c| c.contains("rate"))?,
        description: column(&lower, |c| {
            c.contains("desc") || c.contains("task") || c.contains("deliverable")
        }),
    })
}

fn column(lower: &[String], pred: impl Fn(&str) -> bool) -> Option<usize> {
    lower.iter().position(|c| pred(c.as_str()))
}

/// Candidate rows if the table is pricing-shaped, else `None`.
///
/// Recognised shapes: a header naming role, hours and rate columns; or a
/// headerless `role | description | hours | rate [| total]` grid where every row
/// has numeric hours and rate. Rows whose role mentions "total" are skipped.
pub(crate) fn pricing_rows(rows: &[Vec<String>]) -> Option<Vec<CandidateRoleRow>> {
    let (cols, data) = match rows.split_first() {
        Some((header, rest)) => match header_columns(header) {
            Some(cols) => (cols, rest),
            None if positional_shape(rows) => (
                PricingColumns {
                    role: 0,
                    description: Some(1),
                    hours: 2,
                    rate: 3,
                },
                rows,
            ),
            None => return None,
        },
        None => return None,
    };

    let candidates = data
        .iter()
        .filter_map(|row| {
            let role = strip_emphasis(row.get(cols.role)?);
            if normalize_role(&role).contains("total") {
                return None;
            }
            let description = cols
                .description
                .and_then(|i| row.get(i))
                .map(|d| strip_emphasis(d))
                .unwrap_or_default();
            let hours = row.get(cols.hours).and_then(|c| parse_number(c)).unwrap_or(0.0);
            let rate = row.get(cols.rate).and_then(|c| parse_number(c)).unwrap_or(0.0);
            Some(CandidateRoleRow::new(role, description, hours, rate))
        })
        .collect();
    Some(candidates)
}

fn positional_shape(rows: &[Vec<String>]) -> bool {
    !rows.is_empty()
        && rows.iter().all(|r| {
            r.len() >= 4 && parse_number(&r[2]).is_some() && parse_number(&r[3]).is_some()
        })
}
