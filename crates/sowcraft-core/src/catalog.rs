//! Role catalog: the authoritative rate card of billable roles.
//!
//! AI-authored pricing tables spell role names loosely ("Tech-Head Of - Senior
//! Project Management", "account management – account manager"). Every lookup
//! goes through [`normalize_role`] so that spacing, case, dash style and
//! parentheses never cause a miss.
//!
//! The standard catalog is the house rate card (AUD/hr). It is
//! built once per process and shared read-only.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A billable role with its hourly rate in AUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCatalogEntry {
    pub name: String,
    #[serde(alias = "rate")]
    pub hourly_rate: f64,
}

// ── Standard rate card ──

const STANDARD_RATE_CARD: &[(&str, f64)] = &[
    ("Account Management - (Senior Account Director)", 365.0),
    ("Account Management - (Account Director)", 295.0),
    ("Account Management - (Account Manager)", 180.0),
    ("Account Management (Off)", 120.0),
    ("Account Management - (Senior Account Manager)", 210.0),
    ("Project Management - (Account Director)", 295.0),
    ("Project Management - (Account Manager)", 180.0),
    ("Project Management - (Senior Account Manager)", 210.0),
    ("Tech - Delivery - Project Coordination", 110.0),
    ("Tech - Delivery - Project Management", 150.0),
    ("Tech - Head Of - Customer Experience Strategy", 365.0),
    ("Tech - Head Of - Program Strategy", 365.0),
    ("Tech - Head Of - Senior Project Management", 365.0),
    ("Tech - Head Of - System Setup", 365.0),
    ("Tech - Integrations", 170.0),
    ("Tech - Integrations (Srn MAP)", 295.0),
    ("Tech - Keyword Research", 120.0),
    ("Tech - Landing Page - (Offshore)", 120.0),
    ("Tech - Landing Page - (Onshore)", 210.0),
    ("Tech - Producer - Admin Configuration", 120.0),
    ("Tech - Producer - Campaign Build", 120.0),
    ("Tech - Producer - Chat Bot / Live Chat", 120.0),
    ("Tech - Producer - Copywriting", 120.0),
    ("Tech - Producer - Deployment", 120.0),
    ("Tech - Producer - Design", 120.0),
    ("Tech - Producer - Development", 120.0),
    ("Tech - Producer - Documentation Setup", 120.0),
    ("Tech - Producer - Email Production", 120.0),
    ("Tech - Producer - Field / Property Setup", 120.0),
    ("Tech - Producer - Integration Assistance", 120.0),
    ("Tech - Producer - Landing Page Production", 120.0),
    ("Tech - Producer - Lead Scoring Setup", 120.0),
    ("Tech - Producer - Reporting", 120.0),
    ("Tech - Producer - Services", 120.0),
    ("Tech - Producer - SMS Setup", 120.0),
    ("Tech - Producer - Support & Monitoring", 120.0),
    ("Tech - Producer - Testing", 120.0),
    ("Tech - Producer - Training", 120.0),
    ("Tech - Producer - Web Development", 120.0),
    ("Tech - Producer - Workflows", 120.0),
    ("Tech - SEO Producer", 120.0),
    ("Tech - SEO Strategy", 180.0),
    ("Tech - Specialist - Admin Configuration", 180.0),
    ("Tech - Specialist - Campaign Optimisation", 180.0),
    ("Tech - Specialist - Campaign Orchestration", 180.0),
    ("Tech - Specialist - Database Management", 180.0),
    ("Tech - Specialist - Email Production", 180.0),
    ("Tech - Specialist - Integration Configuration", 180.0),
    ("Tech - Specialist - Integration Services", 190.0),
    ("Tech - Specialist - Lead Scoring Setup", 180.0),
    ("Tech - Specialist - Program Management", 180.0),
    ("Tech - Specialist - Reporting", 180.0),
    ("Tech - Specialist - Services", 180.0),
    ("Tech - Specialist - Testing", 180.0),
    ("Tech - Specialist - Training", 180.0),
    ("Tech - Specialist - Workflows", 180.0),
    ("Tech - Sr. Architect - Approval & Testing", 365.0),
    ("Tech - Sr. Architect - Consultancy Services", 365.0),
    ("Tech - Sr. Architect - Data Strategy", 365.0),
    ("Tech - Sr. Architect - Integration Strategy", 365.0),
    ("Tech - Sr. Consultant - Admin Configuration", 295.0),
    ("Tech - Sr. Consultant - Advisory & Consultation", 295.0),
    ("Tech - Sr. Consultant - Approval & Testing", 295.0),
    ("Tech - Sr. Consultant - Campaign Optimisation", 295.0),
    ("Tech - Sr. Consultant - Campaign Strategy", 295.0),
    ("Tech - Sr. Consultant - Database Management", 295.0),
    ("Tech - Sr. Consultant - Reporting", 295.0),
    ("Tech - Sr. Consultant - Services", 295.0),
    ("Tech - Sr. Consultant - Strategy", 295.0),
    ("Tech - Sr. Consultant - Training", 295.0),
    ("Tech - Website Optimisation", 120.0),
    ("Content - Campaign Strategy (Onshore)", 180.0),
    ("Content - Keyword Research (Offshore)", 120.0),
    ("Content - Keyword Research (Onshore)", 150.0),
    ("Content - Optimisation (Onshore)", 150.0),
    ("Content - Reporting (Offshore)", 120.0),
    ("Content - Reporting (Onshore)", 150.0),
    ("Content - SEO Copywriting (Onshore)", 150.0),
    ("Content - SEO Strategy (Onshore)", 210.0),
    ("Content - Website Optimisations (Offshore)", 120.0),
    ("Copywriting (Offshore)", 120.0),
    ("Copywriting (Onshore)", 180.0),
    ("Design - Digital Asset (Offshore)", 140.0),
    ("Design - Digital Asset (Onshore)", 190.0),
    ("Design - Email (Offshore)", 120.0),
    ("Design - Email (Onshore)", 295.0),
    ("Design - Landing Page (Onshore)", 190.0),
    ("Design - Landing page (Offshore)", 120.0),
    ("Dev (orTech) - Landing Page - (Offshore)", 120.0),
    ("Dev (orTech) - Landing Page - (Onshore)", 210.0),
];

static STANDARD: LazyLock<RoleCatalog> = LazyLock::new(|| {
    RoleCatalog::from_entries(STANDARD_RATE_CARD.iter().map(|&(name, rate)| RoleCatalogEntry {
        name: name.to_string(),
        hourly_rate: rate,
    }))
});

// ── Normalisation ──

/// Normalise a role name into its lookup key.
///
/// - Lowercase.
/// - Whitespace runs collapse to one space, and leading/trailing space is dropped.
/// - Hyphens lose surrounding spaces (`"a - b"`, `"a- b"`, `"a-b"` all give `"a-b"`).
///   En/em dashes and the minus sign count as hyphens.
/// - Parentheses are ignored: `"Account Management - (Account Manager)"` and
///   `"Account Management - Account Manager"` share a key.
pub fn normalize_role(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars() {
        let c = match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '(' | ')' => ' ',
            c => c,
        };

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if c == '-' {
            // Drop the space before a hyphen; the one after is never emitted.
            pending_space = false;
            out.push('-');
            continue;
        }

        if pending_space && !out.is_empty() && !out.ends_with('-') {
            out.push(' ');
        }
        pending_space = false;
        out.extend(c.to_lowercase());
    }

    out
}

// ── Catalog ──

/// Rate card keyed by normalised role name.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    entries: Vec<RoleCatalogEntry>,
    index: HashMap<String, usize>,
}

impl RoleCatalog {
    /// The standard rate card, built on first use.
    pub fn standard() -> &'static RoleCatalog {
        &STANDARD
    }

    /// Build a catalog from arbitrary entries. When two entries normalise to the
    /// same key the first one wins; entries with a non-positive rate are skipped.
    pub fn from_entries(entries: impl IntoIterator<Item = RoleCatalogEntry>) -> Self {
        let mut catalog = RoleCatalog::default();
        for entry in entries {
            if !(entry.hourly_rate.is_finite() && entry.hourly_rate > 0.0) {
                tracing::warn!(
                    role = %entry.name,
                    rate = entry.hourly_rate,
                    "skipping rate card entry with invalid rate"
                );
                continue;
            }
            let key = normalize_role(&entry.name);
            if key.is_empty() || catalog.index.contains_key(&key) {
                continue;
            }
            catalog.index.insert(key, catalog.entries.len());
            catalog.entries.push(entry);
        }
        catalog
    }

    /// Exact lookup by normalised name.
    pub fn lookup(&self, name: &str) -> Option<&RoleCatalogEntry> {
        self.index
            .get(&normalize_role(name))
            .map(|&i| &self.entries[i])
    }

    /// Entries in rate-card order.
    pub fn entries(&self) -> &[RoleCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose normalised name contains the normalised term.
    pub fn search(&self, term: &str) -> Vec<&RoleCatalogEntry> {
        let needle = normalize_role(term);
        self.entries
            .iter()
            .filter(|e| normalize_role(&e.name).contains(&needle))
            .collect()
    }
}
