//! Pattern detectors over the raw narrative: discount percentage and title.

use std::sync::LazyLock;

use regex::Regex;
use sowcraft_core::StructuredScope;

// ── Discount ──

/// "discount" then up to 40 characters on the same line, then `N%`.
static DISCOUNT_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)discount[^\n]{0,40}?(\d+(?:\.\d+)?)\s*%").expect("discount pattern")
});

/// `N%` then up to 40 characters on the same line, then "discount".
static DISCOUNT_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*%[^\n]{0,40}?discount").expect("discount pattern")
});

/// Discount percentage mentioned in the narrative, clamped to `[0, 100]`.
///
/// `"discount of 10%"` is preferred over `"10% discount"` when both forms occur.
pub fn detect_discount(text: &str) -> Option<f64> {
    [&*DISCOUNT_AFTER, &*DISCOUNT_BEFORE]
        .iter()
        .find_map(|re| re.captures(text)?.get(1)?.as_str().parse::<f64>().ok())
        .map(|d| d.clamp(0.0, 100.0))
}

// ── Title ──

static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("h1 pattern"));

static SCOPE_OF_WORK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Scope of Work:\s+(.+)").expect("scope pattern"));

static CLIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\*\*Client:\*\*\s+(.+)$").expect("client pattern"));

pub const DEFAULT_TITLE: &str = "New SOW";

/// Document title: first `# ` heading, else `Scope of Work: X`, else
/// `**Client:** X` as `SOW - X`, else the payload title, else "New SOW".
pub fn detect_title(text: &str, scope: Option<&StructuredScope>) -> String {
    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| tidy(m.as_str()))
            .filter(|s| !s.is_empty())
    };

    capture(&*H1)
        .or_else(|| capture(&*SCOPE_OF_WORK))
        .or_else(|| capture(&*CLIENT).map(|client| format!("SOW - {client}")))
        .or_else(|| {
            scope
                .map(|s| tidy(&s.title))
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn tidy(s: &str) -> String {
    s.replace("**", "").trim().to_string()
}
