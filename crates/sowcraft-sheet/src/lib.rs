//! Spreadsheet side of the SOW pipeline.
//!
//! A [`WorkbookModel`] is built from a structured scope: a hidden `Pricing`
//! lookup sheet, one `ScopeN` sheet per scope item and a `SOW_Summary` sheet,
//! linked by formulas so that a rate-card edit in the workbook flows through
//! every total. [`WorkbookModel::to_xlsx`] writes it as an OOXML package.

mod build;
mod error;
mod model;
mod xlsx;

pub use build::build_workbook;
pub use error::WorkbookError;
pub use model::{
    Cell, PRICING_SHEET, RoleAggregateRow, Row, SUMMARY_SHEET, ScopeRoleRow, ScopeSheetModel, Sheet,
    SummaryRow, WorkbookModel, col_letter,
};
