//! Workbook model: typed rows per sheet kind, flattened to cell grids for
//! writing.
//!
//! Row numbers in formulas are 1-based spreadsheet rows. Each sheet kind has a
//! fixed layout so formulas on one sheet can address rows on another:
//!
//! | Sheet         | Row 1 | Row 2    | Row 3  | Data from |
//! |---------------|-------|----------|--------|-----------|
//! | `Pricing`     | header| data     | data   | 2         |
//! | `ScopeK`      | name  | overview | header | 4         |
//! | `SOW_Summary` | title | (blank)  | header | 4         |

pub const PRICING_SHEET: &str = "Pricing";
pub const SUMMARY_SHEET: &str = "SOW_Summary";

pub(crate) const PRICING_FIRST_ROW: u32 = 2;
pub(crate) const SCOPE_FIRST_ROW: u32 = 4;
pub(crate) const SUMMARY_FIRST_ROW: u32 = 4;

pub(crate) const UNKNOWN_ROLE_NOTE: &str = "Not in rate card - review";

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Formula text without the leading `=`.
    Formula(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn formula(f: impl Into<String>) -> Self {
        Cell::Formula(f.into())
    }
}

/// 0-based column index → `A`, `B`, …, `Z`, `AA`, …
pub fn col_letter(mut col: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

// ── Pricing sheet ──

/// One rate-card role with its hours aggregated from every scope sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAggregateRow {
    pub role: String,
    pub rate: f64,
    /// False for scope roles missing from the catalog; their rate is 0.
    pub catalogued: bool,
    pub hours_formula: String,
    pub total_formula: String,
}

// ── Scope sheets ──

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeRoleRow {
    pub role: String,
    pub hours: f64,
    pub rate_formula: String,
    pub total_formula: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeSheetModel {
    /// `Scope1`, `Scope2`, … in scope-item order.
    pub name: String,
    pub title: String,
    pub overview: Option<String>,
    pub rows: Vec<ScopeRoleRow>,
    /// Spreadsheet row of the TOTAL line.
    pub totals_row: u32,
    pub hours_total_formula: String,
    pub cost_total_formula: String,
    pub deliverables: Vec<String>,
    pub assumptions: Vec<String>,
}

impl ScopeSheetModel {
    /// Last role row, or `None` when the sheet has no roles.
    pub fn last_role_row(&self) -> Option<u32> {
        (!self.rows.is_empty()).then(|| SCOPE_FIRST_ROW + self.rows.len() as u32 - 1)
    }
}

// ── Summary sheet ──

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub hours_formula: String,
    pub subtotal_formula: String,
    pub gst_formula: String,
    pub total_formula: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookModel {
    pub title: String,
    pub pricing_sheet: Vec<RoleAggregateRow>,
    pub scope_sheets: Vec<ScopeSheetModel>,
    pub summary_sheet: Vec<SummaryRow>,
    pub summary_totals: SummaryRow,
    pub discount_percent: f64,
    pub rounding_increment: f64,
    pub gst_rate: f64,
}

/// A flattened sheet ready for writing. `rows[i]` is spreadsheet row `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub hidden: bool,
    pub widths: Vec<f64>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub bold: bool,
}

impl Row {
    fn new(cells: Vec<Cell>) -> Self {
        Self { cells, bold: false }
    }

    fn bold(cells: Vec<Cell>) -> Self {
        Self { cells, bold: true }
    }

    fn blank() -> Self {
        Self::default()
    }
}

impl Sheet {
    /// Cell at a 1-based row and 0-based column.
    pub fn cell(&self, row: u32, col: usize) -> &Cell {
        self.rows
            .get(row.saturating_sub(1) as usize)
            .and_then(|r| r.cells.get(col))
            .unwrap_or(&EMPTY)
    }
}

impl WorkbookModel {
    /// Spreadsheet row of the summary TOTALS line.
    pub fn summary_totals_row(&self) -> u32 {
        SUMMARY_FIRST_ROW + self.summary_sheet.len() as u32
    }

    /// Sheets in workbook order: summary, scopes, then the hidden pricing sheet.
    pub fn sheets(&self) -> Vec<Sheet> {
        let mut out = Vec::with_capacity(self.scope_sheets.len() + 2);
        out.push(self.summary_grid());
        out.extend(self.scope_sheets.iter().map(scope_grid));
        out.push(self.pricing_grid());
        out
    }

    fn summary_grid(&self) -> Sheet {
        let gst_label = format!("GST ({}%)", trim_number(self.gst_rate * 100.0));
        let mut rows = vec![
            Row::bold(vec![Cell::text(&self.title)]),
            Row::blank(),
            Row::bold(vec![
                Cell::text("Scope"),
                Cell::text("Total Hours"),
                Cell::text("Subtotal (ex. GST)"),
                Cell::text(gst_label),
                Cell::text("Total (inc. GST)"),
            ]),
        ];
        for r in &self.summary_sheet {
            rows.push(Row::new(summary_cells(r)));
        }
        rows.push(Row::bold(summary_cells(&self.summary_totals)));

        let totals = self.summary_totals_row();
        let discount = totals + 2;
        let after = totals + 3;
        let increment = totals + 4;
        rows.push(Row::blank());
        rows.push(Row::new(vec![
            Cell::text("Discount %"),
            Cell::Number(self.discount_percent),
        ]));
        rows.push(Row::new(vec![
            Cell::text("Total after discount"),
            Cell::formula(format!("E{totals}*(1-B{discount}/100)")),
        ]));
        rows.push(Row::new(vec![
            Cell::text("Round to nearest"),
            Cell::Number(self.rounding_increment),
        ]));
        rows.push(Row::bold(vec![
            Cell::text("Rounded total"),
            Cell::formula(format!("ROUND(B{after}/B{increment},0)*B{increment}")),
        ]));

        Sheet {
            name: SUMMARY_SHEET.to_string(),
            hidden: false,
            widths: vec![36.0, 14.0, 20.0, 14.0, 20.0],
            rows,
        }
    }

    fn pricing_grid(&self) -> Sheet {
        let mut rows = vec![Row::bold(vec![
            Cell::text("Role"),
            Cell::text("Hourly Rate (AUD)"),
            Cell::text("Total Hours"),
            Cell::text("Total Cost (AUD)"),
            Cell::text("Note"),
        ])];
        for r in &self.pricing_sheet {
            let note = if r.catalogued {
                Cell::Empty
            } else {
                Cell::text(UNKNOWN_ROLE_NOTE)
            };
            rows.push(Row::new(vec![
                Cell::text(&r.role),
                Cell::Number(r.rate),
                Cell::formula(&r.hours_formula),
                Cell::formula(&r.total_formula),
                note,
            ]));
        }
        Sheet {
            name: PRICING_SHEET.to_string(),
            hidden: true,
            widths: vec![52.0, 18.0, 14.0, 18.0, 28.0],
            rows,
        }
    }
}

fn scope_grid(scope: &ScopeSheetModel) -> Sheet {
    let mut rows = vec![
        Row::bold(vec![Cell::text(&scope.title)]),
        match &scope.overview {
            Some(text) => Row::new(vec![Cell::text(text)]),
            None => Row::blank(),
        },
        Row::bold(vec![
            Cell::text("Role"),
            Cell::text("Hours"),
            Cell::text("Rate (AUD)"),
            Cell::text("Total (AUD)"),
        ]),
    ];
    for r in &scope.rows {
        rows.push(Row::new(vec![
            Cell::text(&r.role),
            Cell::Number(r.hours),
            Cell::formula(&r.rate_formula),
            Cell::formula(&r.total_formula),
        ]));
    }
    rows.push(Row::bold(vec![
        Cell::text("TOTAL"),
        Cell::formula(&scope.hours_total_formula),
        Cell::Empty,
        Cell::formula(&scope.cost_total_formula),
    ]));

    let sections = [
        ("Deliverables", &scope.deliverables),
        ("Assumptions", &scope.assumptions),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        rows.push(Row::blank());
        rows.push(Row::bold(vec![Cell::text(heading)]));
        rows.extend(items.iter().map(|item| Row::new(vec![Cell::text(item)])));
    }

    Sheet {
        name: scope.name.clone(),
        hidden: false,
        widths: vec![52.0, 10.0, 14.0, 16.0],
        rows,
    }
}

fn summary_cells(r: &SummaryRow) -> Vec<Cell> {
    vec![
        Cell::text(&r.label),
        Cell::formula(&r.hours_formula),
        Cell::formula(&r.subtotal_formula),
        Cell::formula(&r.gst_formula),
        Cell::formula(&r.total_formula),
    ]
}

/// `10` rather than `10.0` in labels and formula constants.
pub(crate) fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(4), "E");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
        assert_eq!(col_letter(27), "AB");
        assert_eq!(col_letter(701), "ZZ");
        assert_eq!(col_letter(702), "AAA");
    }

    #[test]
    fn trims_numbers() {
        assert_eq!(trim_number(10.0), "10");
        assert_eq!(trim_number(0.1), "0.1");
        assert_eq!(trim_number(12.5), "12.5");
    }

    #[test]
    fn sheet_cell_out_of_range_is_empty() {
        let sheet = Sheet {
            name: "S".into(),
            hidden: false,
            widths: vec![],
            rows: vec![Row::new(vec![Cell::Number(1.0)])],
        };
        assert_eq!(sheet.cell(1, 0), &Cell::Number(1.0));
        assert_eq!(sheet.cell(1, 3), &Cell::Empty);
        assert_eq!(sheet.cell(9, 0), &Cell::Empty);
    }
}
