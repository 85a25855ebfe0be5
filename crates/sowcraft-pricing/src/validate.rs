//! Review checks over a pricing table.
//!
//! Errors mean the table should not be exported as-is; warnings are flags for
//! a human to look at. Enforced tables never carry errors unless the policy's
//! own roles are missing from the catalog.

use serde::Serialize;
use sowcraft_core::{PricingPolicy, PricingTableBlock, RoleCatalog};

use crate::roles::{RoleKind, is_quality_assurance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    MandatoryRoleMissing,
    InvalidRowValues,
    UnmatchedRole,
    QaBaselineMissing,
}

impl ViolationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationCode::MandatoryRoleMissing => "MANDATORY_ROLE_MISSING",
            ViolationCode::InvalidRowValues => "INVALID_ROW_VALUES",
            ViolationCode::UnmatchedRole => "UNMATCHED_ROLE",
            ViolationCode::QaBaselineMissing => "QA_BASELINE_MISSING",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ViolationCode::MandatoryRoleMissing | ViolationCode::InvalidRowValues => {
                Severity::Error
            }
            ViolationCode::UnmatchedRole | ViolationCode::QaBaselineMissing => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    fn new(code: ViolationCode, message: String) -> Self {
        Self {
            code,
            severity: code.severity(),
            message,
        }
    }
}

pub fn validate(
    block: &PricingTableBlock,
    catalog: &RoleCatalog,
    policy: &PricingPolicy,
) -> Vec<Violation> {
    let mut out = Vec::new();

    // ── Mandatory roles ──
    for (kind, name) in [
        (RoleKind::HeadOf, &policy.head_of_role),
        (RoleKind::ProjectCoordination, &policy.project_coordination_role),
        (RoleKind::AccountManagement, &policy.account_management_role),
    ] {
        if !block.rows.iter().any(|r| RoleKind::of(r.role()) == kind) {
            out.push(Violation::new(
                ViolationCode::MandatoryRoleMissing,
                format!("Mandatory role missing: {name}"),
            ));
        }
    }

    // ── Row values ──
    let mut invalid = 0usize;
    for row in &block.rows {
        let catalogued = catalog.lookup(row.role()).is_some();
        if !catalogued {
            out.push(Violation::new(
                ViolationCode::UnmatchedRole,
                format!("Role not in rate card, review rate: {}", row.role()),
            ));
        }
        let bad_numbers = !(row.hours().is_finite() && row.rate().is_finite()) || row.hours() < 0.0;
        let unpriced = catalogued && row.hours() > 0.0 && row.rate() <= 0.0;
        if bad_numbers || unpriced {
            invalid += 1;
        }
    }
    if invalid > 0 {
        out.push(Violation::new(
            ViolationCode::InvalidRowValues,
            format!(
                "Found {invalid} pricing rows with invalid values \
                 (negative hours or non-positive rate with hours > 0)."
            ),
        ));
    }

    // ── QA baseline ──
    let execution_hours: f64 = block
        .rows
        .iter()
        .filter(|r| !RoleKind::of(r.role()).is_mandatory())
        .map(|r| r.hours())
        .sum();
    if execution_hours > 0.0 {
        let qa_hours: f64 = block
            .rows
            .iter()
            .filter(|r| is_quality_assurance(r.role()))
            .map(|r| r.hours())
            .sum();
        let required = policy.qa_baseline.required_hours(execution_hours).ceil();
        if qa_hours < required {
            out.push(Violation::new(
                ViolationCode::QaBaselineMissing,
                format!(
                    "QA baseline not met: {qa_hours}h provided, {required}h recommended \
                     (>= {}% of {execution_hours}h, min {}h).",
                    policy.qa_baseline.percent * 100.0,
                    policy.qa_baseline.min_hours
                ),
            ));
        }
    }

    out
}

/// True when any violation is an error.
pub fn is_blocking(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
}
