//! Document side of the SOW pipeline: assembly, sanitisation, HTML export, and
//! the `convert` entry point that runs the whole text → document pass.

mod assemble;
mod error;
pub mod html;
mod pipeline;
mod sanitize;

pub use assemble::{AssemblyState, assemble};
pub use error::ConvertError;
pub use html::render_html;
pub use pipeline::{Conversion, PricingSource, ScopeExtraction, convert, extract_scope, reprice};
pub use sanitize::sanitize;
