//! Pricing pass: turn candidate rows into the one enforced pricing table.

mod enforce;
mod error;
pub mod roles;
mod summary;
mod validate;

pub use enforce::{EnforcedPricing, PricingEngine};
pub use error::PricingError;
pub use roles::RoleKind;
pub use summary::summarize;
pub use validate::{Severity, Violation, ViolationCode, is_blocking, validate};
