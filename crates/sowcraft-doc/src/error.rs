use sowcraft_pricing::PricingError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error(transparent)]
    Pricing(#[from] PricingError),
}
