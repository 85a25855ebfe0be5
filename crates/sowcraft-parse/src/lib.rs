//! Text-side of the SOW pipeline: cleaning, block parsing, JSON payload extraction,
//! and the small pattern detectors (discount, title) that read the raw narrative.

pub mod clean;
pub mod detect;
pub mod extract;
pub mod inline;
pub mod markdown;
mod table;

pub use clean::clean_content;
pub use detect::{detect_discount, detect_title};
pub use extract::{Extraction, StructuredPayload, extract_structured};
pub use inline::parse_inline;
pub use markdown::{InsertionPoint, InsertionSource, ParsedNarrative, parse_markdown};
