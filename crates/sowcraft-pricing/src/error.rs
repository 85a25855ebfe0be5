use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No candidate row survived filtering; there is nothing to price.
    #[error("no pricing data available: no valid role rows after filtering")]
    NoPricingDataAvailable,
}
