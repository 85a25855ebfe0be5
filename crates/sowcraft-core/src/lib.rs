pub mod catalog;
pub mod document;
pub mod money;
pub mod policy;
pub mod pricing;
pub mod scope;

pub use catalog::{RoleCatalog, RoleCatalogEntry, normalize_role};
pub use document::{Document, DocumentNode, Inline, ListItem, plain_text};
pub use money::{format_aud, round_to_increment};
pub use policy::{
    HoursTier, MandatoryHours, Minimums, PolicyError, PricingPolicy, QaBaseline, SowcraftConfig,
};
pub use pricing::{CandidateRoleRow, PricingRow, PricingSummary, PricingTableBlock};
pub use scope::{ScopeItem, ScopeRole, StructuredScope};
