//! Commercial pricing policy and the TOML configuration file that carries it.
//!
//! Every constant the pricing pass relies on lives here: mandatory role names,
//! minimum hours, GST, rounding, placeholder sentinels and the QA baseline.
//! [`PricingPolicy::default`] is the house policy; a TOML file can override any
//! field and optionally replace the rate card:
//!
//! ```toml
//! [pricing]
//! gst_rate = 0.10
//! rounding_increment = 100.0
//!
//! [pricing.minimums]
//! mode = "tiered"
//!
//! [[roles]]
//! name = "Tech - Producer - Development"
//! rate = 120.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::{RoleCatalog, RoleCatalogEntry};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid policy TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid policy: {0}")]
    Invalid(String),
}

// ── Mandatory role minima ──

/// Hours for each of the three mandatory governance roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MandatoryHours {
    pub head_of: f64,
    pub project_coordination: f64,
    pub account_management: f64,
}

/// A project-size tier. `max_execution_hours = None` is the open-ended top tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoursTier {
    pub name: String,
    #[serde(default)]
    pub max_execution_hours: Option<f64>,
    pub hours: MandatoryHours,
}

/// How mandatory role hours are chosen.
///
/// `Fixed` only sets the hours of rows the pricing pass inserts. `Tiered` picks
/// the tier by execution hours (everything except the mandatory rows) and also
/// raises existing mandatory rows up to the tier minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Minimums {
    Fixed {
        #[serde(default = "default_fixed_hours")]
        hours: MandatoryHours,
    },
    Tiered {
        #[serde(default = "default_tiers")]
        tiers: Vec<HoursTier>,
    },
}

fn default_fixed_hours() -> MandatoryHours {
    MandatoryHours {
        head_of: 3.0,
        project_coordination: 6.0,
        account_management: 8.0,
    }
}

fn default_tiers() -> Vec<HoursTier> {
    vec![
        HoursTier {
            name: "small".into(),
            max_execution_hours: Some(80.0),
            hours: MandatoryHours {
                head_of: 2.0,
                project_coordination: 6.0,
                account_management: 8.0,
            },
        },
        HoursTier {
            name: "medium".into(),
            max_execution_hours: Some(200.0),
            hours: MandatoryHours {
                head_of: 3.0,
                project_coordination: 10.0,
                account_management: 10.0,
            },
        },
        HoursTier {
            name: "large".into(),
            max_execution_hours: None,
            hours: MandatoryHours {
                head_of: 4.0,
                project_coordination: 14.0,
                account_management: 12.0,
            },
        },
    ]
}

impl Default for Minimums {
    fn default() -> Self {
        Minimums::Fixed {
            hours: default_fixed_hours(),
        }
    }
}

impl Minimums {
    /// The tiered policy with the house tiers.
    pub fn tiered() -> Self {
        Minimums::Tiered {
            tiers: default_tiers(),
        }
    }

    /// Hours for the mandatory roles given the project's execution hours.
    pub fn resolve(&self, execution_hours: f64) -> MandatoryHours {
        match self {
            Minimums::Fixed { hours } => *hours,
            Minimums::Tiered { tiers } => tiers
                .iter()
                .find(|t| t.max_execution_hours.is_none_or(|max| execution_hours <= max))
                .or(tiers.last())
                .map(|t| t.hours)
                .unwrap_or_else(default_fixed_hours),
        }
    }

    /// Whether existing mandatory rows are raised to the resolved minimum.
    pub fn raises_existing(&self) -> bool {
        matches!(self, Minimums::Tiered { .. })
    }
}

/// Minimum QA/testing allocation: `max(min_hours, percent * execution hours)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QaBaseline {
    pub percent: f64,
    pub min_hours: f64,
}

impl QaBaseline {
    pub fn required_hours(&self, execution_hours: f64) -> f64 {
        (execution_hours * self.percent).max(self.min_hours)
    }
}

// ── Policy ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Catalog role inserted when no Head-Of row exists.
    pub head_of_role: String,
    /// Catalog role inserted when no Project Coordination row exists.
    pub project_coordination_role: String,
    /// Canonical Account Management role; used when the merged row has no catalogued member.
    pub account_management_role: String,
    pub head_of_description: String,
    pub project_coordination_description: String,
    pub account_management_description: String,
    pub minimums: Minimums,
    pub gst_rate: f64,
    pub rounding_increment: f64,
    /// Normalised role names that mark a row as a placeholder or a totals line.
    pub placeholder_roles: Vec<String>,
    pub qa_baseline: QaBaseline,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            head_of_role: "Tech - Head Of - Senior Project Management".into(),
            project_coordination_role: "Tech - Delivery - Project Coordination".into(),
            account_management_role: "Account Management - (Account Manager)".into(),
            head_of_description: "Strategic oversight".into(),
            project_coordination_description: "Delivery coordination".into(),
            account_management_description: "Client comms & governance".into(),
            minimums: Minimums::default(),
            gst_rate: 0.10,
            rounding_increment: 100.0,
            placeholder_roles: [
                "select role",
                "select role...",
                "choose role",
                "tbd",
                "n/a",
                "total",
                "subtotal",
                "grand total",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            qa_baseline: QaBaseline {
                percent: 0.05,
                min_hours: 4.0,
            },
        }
    }
}

impl PricingPolicy {
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        Ok(SowcraftConfig::from_toml_str(s)?.pricing)
    }

    /// Reject values that would make the pricing pass meaningless.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(0.0..=1.0).contains(&self.gst_rate) {
            return Err(PolicyError::Invalid(format!(
                "gst_rate must be within 0..=1, got {}",
                self.gst_rate
            )));
        }
        if !(self.rounding_increment.is_finite() && self.rounding_increment > 0.0) {
            return Err(PolicyError::Invalid(format!(
                "rounding_increment must be positive, got {}",
                self.rounding_increment
            )));
        }
        for (field, value) in [
            ("head_of_role", &self.head_of_role),
            ("project_coordination_role", &self.project_coordination_role),
            ("account_management_role", &self.account_management_role),
        ] {
            if value.trim().is_empty() {
                return Err(PolicyError::Invalid(format!("{field} must not be empty")));
            }
        }
        if let Minimums::Tiered { tiers } = &self.minimums {
            if tiers.is_empty() {
                return Err(PolicyError::Invalid("tiered minimums need at least one tier".into()));
            }
            let ordered = tiers.windows(2).all(|w| {
                match (w[0].max_execution_hours, w[1].max_execution_hours) {
                    (Some(a), Some(b)) => a < b,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            });
            if !ordered {
                return Err(PolicyError::Invalid(
                    "tiers must be ordered by max_execution_hours with the open tier last".into(),
                ));
            }
        }
        Ok(())
    }
}

// ── Config file ──

/// Top-level configuration file: pricing policy plus an optional rate card override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SowcraftConfig {
    pub pricing: PricingPolicy,
    pub roles: Vec<RoleCatalogEntry>,
}

impl SowcraftConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        let config: SowcraftConfig = toml::from_str(s)?;
        config.pricing.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), roles = config.roles.len(), "loaded policy file");
        Ok(config)
    }

    /// The rate card this configuration prices against.
    pub fn catalog(&self) -> RoleCatalog {
        if self.roles.is_empty() {
            RoleCatalog::standard().clone()
        } else {
            RoleCatalog::from_entries(self.roles.iter().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_policy_is_valid() {
        PricingPolicy::default().validate().unwrap();
    }

    #[test]
    fn default_mandatory_roles_are_catalogued() {
        let policy = PricingPolicy::default();
        let catalog = RoleCatalog::standard();
        assert_eq!(catalog.lookup(&policy.head_of_role).unwrap().hourly_rate, 365.0);
        assert_eq!(catalog.lookup(&policy.project_coordination_role).unwrap().hourly_rate, 110.0);
        assert_eq!(catalog.lookup(&policy.account_management_role).unwrap().hourly_rate, 180.0);
    }

    #[test]
    fn fixed_minimums_ignore_execution_hours() {
        let m = Minimums::default();
        assert_eq!(m.resolve(10.0), m.resolve(10_000.0));
        assert_eq!(m.resolve(0.0).account_management, 8.0);
        assert!(!m.raises_existing());
    }

    #[test]
    fn tiered_minimums_pick_tier_by_execution_hours() {
        let m = Minimums::tiered();
        assert_eq!(m.resolve(80.0).head_of, 2.0, "80h is still small");
        assert_eq!(m.resolve(80.5).project_coordination, 10.0);
        assert_eq!(m.resolve(200.0).account_management, 10.0);
        assert_eq!(m.resolve(5_000.0).head_of, 4.0);
        assert!(m.raises_existing());
    }

    #[test]
    fn qa_baseline_has_floor() {
        let qa = PricingPolicy::default().qa_baseline;
        assert_eq!(qa.required_hours(20.0), 4.0);
        assert_eq!(qa.required_hours(200.0), 10.0);
    }

    #[test]
    fn empty_toml_gives_default_policy() {
        let config = SowcraftConfig::from_toml_str("").unwrap();
        assert_eq!(config.pricing, PricingPolicy::default());
        assert!(config.roles.is_empty());
        assert_eq!(config.catalog().len(), RoleCatalog::standard().len());
    }

    #[test]
    fn toml_overrides_fields_and_rate_card() {
        let text = r#"
            [pricing]
            gst_rate = 0.15
            rounding_increment = 50.0

            [pricing.minimums]
            mode = "tiered"

            [[roles]]
            name = "Dev"
            rate = 150.0
        "#;
        let config = SowcraftConfig::from_toml_str(text).unwrap();
        assert_eq!(config.pricing.gst_rate, 0.15);
        assert_eq!(config.pricing.rounding_increment, 50.0);
        assert_eq!(config.pricing.minimums, Minimums::tiered());
        assert_eq!(config.pricing.head_of_role, "Tech - Head Of - Senior Project Management");
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("dev").unwrap().hourly_rate, 150.0);
    }

    #[test]
    fn toml_fixed_hours_override() {
        let text = r#"
            [pricing.minimums]
            mode = "fixed"
            hours = { head_of = 1.0, project_coordination = 2.0, account_management = 3.0 }
        "#;
        let policy = PricingPolicy::from_toml_str(text).unwrap();
        assert_eq!(policy.minimums.resolve(0.0).project_coordination, 2.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err =
            PricingPolicy::from_toml_str("[pricing]\nrounding_increment = 0.0\n").unwrap_err();
        assert!(matches!(err, PolicyError::Invalid(_)), "got {err:?}");

        let err = PricingPolicy::from_toml_str("[pricing]\ngst_rate = \"ten\"\n").unwrap_err();
        assert!(matches!(err, PolicyError::Toml(_)), "got {err:?}");
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "[pricing]\ngst_rate = 0.0\n").unwrap();
        assert_eq!(SowcraftConfig::load(&path).unwrap().pricing.gst_rate, 0.0);

        let missing = dir.path().join("nope.toml");
        assert!(matches!(SowcraftConfig::load(&missing), Err(PolicyError::Io { .. })));
    }
}
