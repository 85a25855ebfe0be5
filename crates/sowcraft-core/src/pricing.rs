//! Pricing rows before and after enforcement.
//!
//! [`CandidateRoleRow`] is whatever the narrative or its JSON payload claimed.
//! [`PricingRow`] is an enforced row: its `total` is always `hours * rate` because
//! the only constructor computes it.

use serde::{Deserialize, Serialize};

/// A pricing row as found in the source text, before catalog matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoleRow {
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: f64,
    #[serde(default)]
    pub rate: f64,
}

impl CandidateRoleRow {
    pub fn new(
        role: impl Into<String>,
        description: impl Into<String>,
        hours: f64,
        rate: f64,
    ) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            hours,
            rate,
        }
    }
}

/// An enforced pricing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    role: String,
    description: String,
    hours: f64,
    rate: f64,
    total: f64,
}

impl PricingRow {
    pub fn new(
        role: impl Into<String>,
        description: impl Into<String>,
        hours: f64,
        rate: f64,
    ) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            hours,
            rate,
            total: hours * rate,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hours(&self) -> f64 {
        self.hours
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

impl From<&PricingRow> for CandidateRoleRow {
    fn from(row: &PricingRow) -> Self {
        CandidateRoleRow::new(row.role.clone(), row.description.clone(), row.hours, row.rate)
    }
}

/// The single pricing table of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTableBlock {
    pub rows: Vec<PricingRow>,
    pub discount_percent: f64,
}

impl PricingTableBlock {
    /// Discount is clamped into `[0, 100]`; NaN becomes 0.
    pub fn new(rows: Vec<PricingRow>, discount_percent: f64) -> Self {
        let discount_percent = if discount_percent.is_nan() {
            0.0
        } else {
            discount_percent.clamp(0.0, 100.0)
        };
        Self {
            rows,
            discount_percent,
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(PricingRow::hours).sum()
    }

    pub fn subtotal(&self) -> f64 {
        self.rows.iter().map(PricingRow::total).sum()
    }
}

/// Derived money figures for a pricing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub subtotal: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub gst: f64,
    pub grand_total: f64,
    pub rounded_total: f64,
}
