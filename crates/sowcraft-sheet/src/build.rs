//! Build a formula-linked workbook from a structured scope.
//!
//! Nothing on the pricing or summary sheets is a precomputed value: hours roll
//! up into `Pricing` through `SUMIF`, rates flow back into scope sheets through
//! `VLOOKUP`, and `SOW_Summary` points at each scope sheet's TOTAL row.

use std::collections::HashMap;

use sowcraft_core::{PricingPolicy, RoleCatalog, StructuredScope, normalize_role};
use tracing::{debug, info};

use crate::error::WorkbookError;
use crate::model::{
    PRICING_FIRST_ROW, PRICING_SHEET, RoleAggregateRow, SCOPE_FIRST_ROW, SUMMARY_FIRST_ROW,
    ScopeRoleRow, ScopeSheetModel, SummaryRow, WorkbookModel, trim_number,
};

const DEFAULT_TITLE: &str = "New SOW";

pub fn build_workbook(
    scope: &StructuredScope,
    catalog: &RoleCatalog,
    policy: &PricingPolicy,
    discount_percent: f64,
) -> Result<WorkbookModel, WorkbookError> {
    if scope.scope_items.is_empty() {
        return Err(WorkbookError::EmptyScope);
    }

    // Unknown roles go after the catalog, in order of first appearance. Every
    // spelling of one normalised name uses the first spelling so VLOOKUP and
    // SUMIF match it exactly.
    let mut unknown: Vec<String> = Vec::new();
    let mut spelling: HashMap<String, String> = HashMap::new();
    for role in scope.scope_items.iter().flat_map(|item| &item.roles) {
        let name = role.role.trim();
        if name.is_empty() || catalog.lookup(name).is_some() {
            continue;
        }
        spelling.entry(normalize_role(name)).or_insert_with(|| {
            unknown.push(name.to_string());
            name.to_string()
        });
    }
    let pricing_last = PRICING_FIRST_ROW + (catalog.len() + unknown.len()) as u32 - 1;
    let rate_range = format!("{PRICING_SHEET}!$A${PRICING_FIRST_ROW}:$B${pricing_last}");

    // ── Scope sheets ──
    let scope_sheets: Vec<ScopeSheetModel> = scope
        .scope_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let rows: Vec<ScopeRoleRow> = item
                .roles
                .iter()
                .filter(|r| !r.role.trim().is_empty())
                .enumerate()
                .map(|(j, r)| {
                    let row = SCOPE_FIRST_ROW + j as u32;
                    let role = match catalog.lookup(&r.role) {
                        Some(entry) => entry.name.clone(),
                        None => spelling
                            .get(&normalize_role(&r.role))
                            .cloned()
                            .unwrap_or_else(|| r.role.trim().to_string()),
                    };
                    ScopeRoleRow {
                        role,
                        hours: sane_hours(r.hours),
                        rate_formula: format!("VLOOKUP($A{row},{rate_range},2,FALSE)"),
                        total_formula: format!("B{row}*C{row}"),
                    }
                })
                .collect();

            let totals_row = SCOPE_FIRST_ROW + rows.len() as u32;
            let (hours_total_formula, cost_total_formula) = if rows.is_empty() {
                ("0".to_string(), "0".to_string())
            } else {
                let last = totals_row - 1;
                (
                    format!("SUM(B{SCOPE_FIRST_ROW}:B{last})"),
                    format!("SUM(D{SCOPE_FIRST_ROW}:D{last})"),
                )
            };

            ScopeSheetModel {
                name: format!("Scope{}", i + 1),
                title: item.name.clone(),
                overview: item.overview.clone(),
                rows,
                totals_row,
                hours_total_formula,
                cost_total_formula,
                deliverables: item.deliverables.clone(),
                assumptions: item.assumptions.clone(),
            }
        })
        .collect();

    // ── Pricing sheet ──
    let entries = catalog
        .entries()
        .iter()
        .map(|e| (e.name.clone(), e.hourly_rate, true))
        .chain(unknown.into_iter().map(|name| (name, 0.0, false)));
    let pricing_sheet: Vec<RoleAggregateRow> = entries
        .enumerate()
        .map(|(i, (role, rate, catalogued))| {
            let row = PRICING_FIRST_ROW + i as u32;
            RoleAggregateRow {
                role,
                rate,
                catalogued,
                hours_formula: hours_rollup(&scope_sheets, row),
                total_formula: format!("B{row}*C{row}"),
            }
        })
        .collect();

    // ── Summary sheet ──
    let gst = trim_number(policy.gst_rate);
    let summary_sheet: Vec<SummaryRow> = scope_sheets
        .iter()
        .enumerate()
        .map(|(i, sheet)| {
            let row = SUMMARY_FIRST_ROW + i as u32;
            let t = sheet.totals_row;
            SummaryRow {
                label: sheet.title.clone(),
                hours_formula: format!("{}!B{t}", sheet.name),
                subtotal_formula: format!("{}!D{t}", sheet.name),
                gst_formula: format!("C{row}*{gst}"),
                total_formula: format!("C{row}+D{row}"),
            }
        })
        .collect();
    let last = SUMMARY_FIRST_ROW + summary_sheet.len() as u32 - 1;
    let summary_totals = SummaryRow {
        label: "TOTALS".to_string(),
        hours_formula: format!("SUM(B{SUMMARY_FIRST_ROW}:B{last})"),
        subtotal_formula: format!("SUM(C{SUMMARY_FIRST_ROW}:C{last})"),
        gst_formula: format!("SUM(D{SUMMARY_FIRST_ROW}:D{last})"),
        total_formula: format!("SUM(E{SUMMARY_FIRST_ROW}:E{last})"),
    };

    let title = match scope.title.trim() {
        "" => DEFAULT_TITLE.to_string(),
        t => t.to_string(),
    };
    let discount_percent = if discount_percent.is_finite() {
        discount_percent.clamp(0.0, 100.0)
    } else {
        0.0
    };

    info!(
        title = %title,
        scopes = scope_sheets.len(),
        pricing_rows = pricing_sheet.len(),
        unknown_roles = pricing_sheet.iter().filter(|r| !r.catalogued).count(),
        "built workbook model"
    );

    Ok(WorkbookModel {
        title,
        pricing_sheet,
        scope_sheets,
        summary_sheet,
        summary_totals,
        discount_percent,
        rounding_increment: policy.rounding_increment,
        gst_rate: policy.gst_rate,
    })
}

/// `SUMIF` over every scope sheet that has role rows, joined with `+`.
fn hours_rollup(scopes: &[ScopeSheetModel], row: u32) -> String {
    let terms: Vec<String> = scopes
        .iter()
        .filter_map(|s| {
            let last = s.last_role_row()?;
            let n = &s.name;
            let roles = format!("{n}!$A${SCOPE_FIRST_ROW}:$A${last}");
            let hours = format!("{n}!$B${SCOPE_FIRST_ROW}:$B${last}");
            Some(format!("SUMIF({roles},$A{row},{hours})"))
        })
        .collect();
    if terms.is_empty() {
        debug!(row, "no scope rows to aggregate");
        "0".to_string()
    } else {
        terms.join("+")
    }
}

fn sane_hours(hours: f64) -> f64 {
    if hours.is_finite() && hours > 0.0 { hours } else { 0.0 }
}
