//! Pricing table enforcement.
//!
//! Candidate rows become the document's pricing table in one pass:
//!
//! 1. Match each role against the catalog. A match replaces the role name and
//!    rate with the catalog's; an unmatched role keeps its text and its own rate
//!    (or 0) and is reported for review.
//! 2. Drop placeholder rows and rows with non-finite or negative numbers.
//! 3. Put the mandatory roles in place: Head-Of first, Project Coordination
//!    second, one merged Account Management row last. Missing ones are inserted.
//! 4. Recompute every total and the summary figures.
//!
//! Running the pass on its own output changes nothing.

use std::collections::HashSet;

use sowcraft_core::{
    CandidateRoleRow, MandatoryHours, PricingPolicy, PricingRow, PricingSummary, PricingTableBlock,
    RoleCatalog, normalize_role,
};
use tracing::{debug, info, warn};

use crate::error::PricingError;
use crate::roles::RoleKind;
use crate::summary::summarize;

#[derive(Debug, Clone, PartialEq)]
pub struct EnforcedPricing {
    pub block: PricingTableBlock,
    pub summary: PricingSummary,
    /// Roles kept with their literal name because the catalog has no match.
    pub unmatched: Vec<String>,
}

pub struct PricingEngine<'a> {
    catalog: &'a RoleCatalog,
    policy: &'a PricingPolicy,
    placeholders: HashSet<String>,
}

/// A row after catalog matching.
#[derive(Debug, Clone)]
struct Matched {
    role: String,
    description: String,
    hours: f64,
    rate: f64,
    catalogued: bool,
    kind: RoleKind,
}

impl Matched {
    fn into_row(self) -> PricingRow {
        PricingRow::new(self.role, self.description, self.hours, self.rate)
    }
}

impl<'a> PricingEngine<'a> {
    pub fn new(catalog: &'a RoleCatalog, policy: &'a PricingPolicy) -> Self {
        let placeholders = policy.placeholder_roles.iter().map(|p| normalize_role(p)).collect();
        Self {
            catalog,
            policy,
            placeholders,
        }
    }

    pub fn enforce(
        &self,
        candidates: &[CandidateRoleRow],
        discount_percent: f64,
    ) -> Result<EnforcedPricing, PricingError> {
        let matched: Vec<Matched> = candidates
            .iter()
            .map(|c| self.match_row(c))
            .filter(|m| self.keep(m))
            .collect();

        if matched.is_empty() {
            warn!(candidates = candidates.len(), "no pricing rows survived filtering");
            return Err(PricingError::NoPricingDataAvailable);
        }

        let unmatched: Vec<String> = matched
            .iter()
            .filter(|m| !m.catalogued)
            .map(|m| m.role.clone())
            .collect();

        let rows = self.place_mandatory(matched);
        let block = PricingTableBlock::new(rows, discount_percent);
        let summary = summarize(&block, self.policy);

        info!(
            rows = block.rows.len(),
            unmatched = unmatched.len(),
            subtotal = summary.subtotal,
            rounded_total = summary.rounded_total,
            "enforced pricing table"
        );

        Ok(EnforcedPricing {
            block,
            summary,
            unmatched,
        })
    }

    /// Re-run enforcement over an existing table, e.g. after a manual edit.
    pub fn reenforce(&self, block: &PricingTableBlock) -> Result<EnforcedPricing, PricingError> {
        let candidates: Vec<CandidateRoleRow> =
            block.rows.iter().map(CandidateRoleRow::from).collect();
        self.enforce(&candidates, block.discount_percent)
    }

    // ── Matching and filtering ──

    fn match_row(&self, c: &CandidateRoleRow) -> Matched {
        let description = c.description.trim().to_string();
        match self.catalog.lookup(&c.role) {
            Some(entry) => Matched {
                kind: RoleKind::of(&entry.name),
                role: entry.name.clone(),
                description,
                hours: c.hours,
                rate: entry.hourly_rate,
                catalogued: true,
            },
            None => {
                let role = c.role.trim().to_string();
                let rate = if c.rate.is_finite() && c.rate > 0.0 { c.rate } else { 0.0 };
                Matched {
                    kind: RoleKind::of(&role),
                    role,
                    description,
                    hours: c.hours,
                    rate,
                    catalogued: false,
                }
            }
        }
    }

    fn keep(&self, m: &Matched) -> bool {
        let key = normalize_role(&m.role);
        if key.is_empty() || self.placeholders.contains(&key) {
            debug!(role = %m.role, "dropping placeholder row");
            return false;
        }
        if !(m.hours.is_finite() && m.hours >= 0.0 && m.rate.is_finite() && m.rate >= 0.0) {
            warn!(
                role = %m.role,
                hours = m.hours,
                rate = m.rate,
                "dropping row with invalid numbers"
            );
            return false;
        }
        true
    }

    // ── Mandatory roles ──

    fn place_mandatory(&self, rows: Vec<Matched>) -> Vec<PricingRow> {
        let mut head_of: Option<Matched> = None;
        let mut coordination: Option<Matched> = None;
        let mut account: Vec<Matched> = Vec::new();
        let mut others: Vec<Matched> = Vec::new();

        for row in rows {
            match row.kind {
                RoleKind::HeadOf if head_of.is_none() => head_of = Some(row),
                RoleKind::ProjectCoordination if coordination.is_none() => coordination = Some(row),
                RoleKind::AccountManagement => account.push(row),
                _ => others.push(row),
            }
        }

        let execution_hours: f64 = others.iter().map(|r| r.hours).sum();
        let minimums = self.policy.minimums.resolve(execution_hours);
        let raise = self.policy.minimums.raises_existing();

        let head_of = self.settle(
            head_of,
            &self.policy.head_of_role,
            &self.policy.head_of_description,
            minimums.head_of,
            raise,
        );
        let coordination = self.settle(
            coordination,
            &self.policy.project_coordination_role,
            &self.policy.project_coordination_description,
            minimums.project_coordination,
            raise,
        );
        let account = self.merge_account_management(account, &minimums, raise);

        let mut out = Vec::with_capacity(others.len() + 3);
        out.push(head_of.into_row());
        out.push(coordination.into_row());
        out.extend(others.into_iter().map(Matched::into_row));
        out.push(account.into_row());
        out
    }

    /// Keep an existing mandatory row (raised to the minimum in tiered mode) or
    /// insert the policy role with minimum hours.
    fn settle(
        &self,
        existing: Option<Matched>,
        role: &str,
        description: &str,
        minimum: f64,
        raise: bool,
    ) -> Matched {
        match existing {
            Some(mut row) => {
                if raise && row.hours < minimum {
                    debug!(
                        role = %row.role,
                        from = row.hours,
                        to = minimum,
                        "raising mandatory role hours"
                    );
                    row.hours = minimum;
                }
                row
            }
            None => {
                debug!(role, hours = minimum, "inserting mandatory role");
                self.policy_row(role, description, minimum)
            }
        }
    }

    fn policy_row(&self, role: &str, description: &str, hours: f64) -> Matched {
        let (role, rate, catalogued) = match self.catalog.lookup(role) {
            Some(entry) => (entry.name.clone(), entry.hourly_rate, true),
            None => (role.to_string(), 0.0, false),
        };
        Matched {
            kind: RoleKind::of(&role),
            role,
            description: description.to_string(),
            hours,
            rate,
            catalogued,
        }
    }

    /// Collapse every Account Management row into one. Hours are summed and the
    /// first non-empty description is kept; the first catalogued member supplies
    /// the name and rate, else the policy's canonical role does.
    fn merge_account_management(
        &self,
        rows: Vec<Matched>,
        minimums: &MandatoryHours,
        raise: bool,
    ) -> Matched {
        if rows.is_empty() {
            return self.policy_row(
                &self.policy.account_management_role,
                &self.policy.account_management_description,
                minimums.account_management,
            );
        }

        if rows.len() > 1 {
            debug!(rows = rows.len(), "merging account management rows");
        }

        let hours: f64 = rows.iter().map(|r| r.hours).sum();
        let description = rows
            .iter()
            .map(|r| r.description.as_str())
            .find(|d| !d.is_empty())
            .unwrap_or_default()
            .to_string();

        let mut merged = match rows.into_iter().find(|r| r.catalogued) {
            Some(first) => first,
            None => self.policy_row(&self.policy.account_management_role, "", 0.0),
        };
        merged.hours = if raise { hours.max(minimums.account_management) } else { hours };
        merged.description = description;
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sowcraft_core::Minimums;

    const HEAD_OF: &str = "Tech - Head Of - Senior Project Management";
    const COORD: &str = "Tech - Delivery - Project Coordination";
    const AM: &str = "Account Management - (Account Manager)";

    fn candidate(role: &str, hours: f64, rate: f64) -> CandidateRoleRow {
        CandidateRoleRow::new(role, "", hours, rate)
    }

    fn roles(block: &PricingTableBlock) -> Vec<&str> {
        block.rows.iter().map(PricingRow::role).collect()
    }

    fn enforce(candidates: &[CandidateRoleRow]) -> EnforcedPricing {
        let policy = PricingPolicy::default();
        PricingEngine::new(RoleCatalog::standard(), &policy)
            .enforce(candidates, 0.0)
            .unwrap()
    }

    #[test]
    fn inserts_missing_mandatory_roles_in_order() {
        let out = enforce(&[candidate("Tech - Producer - Design", 10.0, 0.0)]);
        assert_eq!(roles(&out.block), vec![HEAD_OF, COORD, "Tech - Producer - Design", AM]);
        let hours: Vec<f64> = out.block.rows.iter().map(PricingRow::hours).collect();
        assert_eq!(hours, vec![3.0, 6.0, 10.0, 8.0]);
        assert_eq!(out.block.rows[0].description(), "Strategic oversight");
        assert_eq!(out.block.rows[2].rate(), 120.0, "catalog rate applied");
    }

    #[test]
    fn catalog_overrides_name_and_rate() {
        let out = enforce(&[candidate("tech-producer -design", 2.0, 999.0)]);
        let row = &out.block.rows[2];
        assert_eq!(row.role(), "Tech - Producer - Design");
        assert_eq!(row.rate(), 120.0);
        assert_eq!(row.total(), 240.0);
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn unmatched_role_keeps_text_and_rate() {
        let out = enforce(&[
            candidate("Chief Vibes Officer", 2.0, 500.0),
            candidate("Mystery Role", 3.0, 0.0),
        ]);
        assert_eq!(out.block.rows[2].role(), "Chief Vibes Officer");
        assert_eq!(out.block.rows[2].rate(), 500.0);
        assert_eq!(out.block.rows[3].rate(), 0.0);
        assert_eq!(
            out.unmatched,
            vec!["Chief Vibes Officer".to_string(), "Mystery Role".to_string()]
        );
    }

    #[test]
    fn existing_mandatory_rows_move_into_place() {
        let out = enforce(&[
            candidate(AM, 4.0, 0.0),
            candidate("Tech - Producer - Design", 10.0, 0.0),
            candidate(COORD, 12.0, 0.0),
            candidate("Tech - Producer - Development", 20.0, 0.0),
            candidate(HEAD_OF, 1.0, 0.0),
        ]);
        assert_eq!(
            roles(&out.block),
            vec![HEAD_OF, COORD, "Tech - Producer - Design", "Tech - Producer - Development", AM]
        );
        assert_eq!(out.block.rows[0].hours(), 1.0, "fixed minimums never touch existing rows");
        assert_eq!(out.block.rows[4].hours(), 4.0);
    }

    #[test]
    fn account_management_rows_merge_into_one() {
        let mut first = candidate(AM, 5.0, 0.0);
        first.description = "Weekly status".into();
        let out = enforce(&[
            first,
            candidate("Tech - Producer - Design", 1.0, 0.0),
            candidate(AM, 3.0, 0.0),
        ]);
        let am_rows: Vec<&PricingRow> = out.block.rows.iter().filter(|r| r.role() == AM).collect();
        assert_eq!(am_rows.len(), 1);
        assert_eq!(am_rows[0].hours(), 8.0);
        assert_eq!(am_rows[0].description(), "Weekly status");
        assert_eq!(out.block.rows.last().unwrap().role(), AM);
    }

    #[test]
    fn merged_account_management_uses_first_catalogued_member() {
        let out = enforce(&[
            candidate("Account Manager (freelance)", 2.0, 90.0),
            candidate("Account Management - (Senior Account Manager)", 4.0, 0.0),
        ]);
        let last = out.block.rows.last().unwrap();
        assert_eq!(last.role(), "Account Management - (Senior Account Manager)");
        assert_eq!(last.rate(), 210.0);
        assert_eq!(last.hours(), 6.0);
    }

    #[test]
    fn uncatalogued_account_management_falls_back_to_canonical_role() {
        let out = enforce(&[candidate("Account Manager (freelance)", 2.0, 90.0)]);
        let last = out.block.rows.last().unwrap();
        assert_eq!(last.role(), AM);
        assert_eq!(last.rate(), 180.0);
        assert_eq!(last.hours(), 2.0);
    }

    #[test]
    fn placeholders_and_bad_numbers_are_dropped() {
        let out = enforce(&[
            candidate("Select role...", 5.0, 100.0),
            candidate("TOTAL", 50.0, 0.0),
            candidate("", 1.0, 1.0),
            candidate("Tech - Producer - Design", f64::NAN, 0.0),
            candidate("Tech - Producer - Testing", -1.0, 0.0),
            candidate("Tech - Producer - Development", 3.0, 0.0),
        ]);
        assert_eq!(roles(&out.block), vec![HEAD_OF, COORD, "Tech - Producer - Development", AM]);
    }

    #[test]
    fn nothing_left_is_an_error() {
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(RoleCatalog::standard(), &policy);
        assert_eq!(engine.enforce(&[], 0.0), Err(PricingError::NoPricingDataAvailable));
        assert_eq!(
            engine.enforce(
                &[candidate("Select role", 1.0, 1.0), candidate("Subtotal", 1.0, 1.0)],
                0.0,
            ),
            Err(PricingError::NoPricingDataAvailable)
        );
    }

    #[test]
    fn enforcement_is_idempotent() {
        let policy = PricingPolicy::default();
        let engine = PricingEngine::new(RoleCatalog::standard(), &policy);
        let first = engine
            .enforce(
                &[
                    candidate("Unknown Role", 4.0, 75.0),
                    candidate(AM, 5.0, 0.0),
                    candidate("tech - producer - design", 10.0, 0.0),
                    candidate(AM, 3.0, 0.0),
                ],
                12.5,
            )
            .unwrap();
        let second = engine.reenforce(&first.block).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn tiered_minimums_raise_and_insert() {
        let policy = PricingPolicy {
            minimums: Minimums::tiered(),
            ..PricingPolicy::default()
        };
        let engine = PricingEngine::new(RoleCatalog::standard(), &policy);
        // 150 execution hours: medium tier (3 / 10 / 10).
        let out = engine
            .enforce(
                &[
                    candidate(HEAD_OF, 1.0, 0.0),
                    candidate("Tech - Producer - Development", 150.0, 0.0),
                ],
                0.0,
            )
            .unwrap();
        let hours: Vec<f64> = out.block.rows.iter().map(PricingRow::hours).collect();
        assert_eq!(hours, vec![3.0, 10.0, 150.0, 10.0]);

        let again = engine.reenforce(&out.block).unwrap();
        assert_eq!(again.block, out.block);
    }

    #[test]
    fn totals_are_recomputed_and_summarised() {
        let out = enforce(&[candidate("Tech - Producer - Development", 10.0, 0.0)]);
        for row in &out.block.rows {
            assert_eq!(row.total(), row.hours() * row.rate());
        }
        // 3*365 + 6*110 + 10*120 + 8*180
        assert_eq!(out.summary.subtotal, 1095.0 + 660.0 + 1200.0 + 1440.0);
    }
}
