//! Structured scope extraction from JSON embedded in the narrative.
//!
//! Two payload shapes are recognised:
//!
//! - flat: `{ "suggestedRoles": [ {"role", "hours", "description"?, "rate"?} | "Role", ... ] }`
//! - nested: `{ "title"?, "overview"?, "scopeItems": [ item, ... ] }` where each
//!   item is `{"name", "overview"?, "roles": [{"role", "hours"}], ...}`
//!
//! Fenced ```` ```json ```` blocks are tried first, then any other fence, then a
//! brace-matching scan around each literal `scopeItems`/`suggestedRoles` key.
//! A payload is either accepted whole or ignored; nothing partial escapes.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use sowcraft_core::{CandidateRoleRow, ScopeItem, ScopeRole, StructuredScope, normalize_role};
use tracing::{debug, info};

use crate::table::parse_number;

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(StructuredPayload),
    NotFound,
}

impl Extraction {
    pub fn found(self) -> Option<StructuredPayload> {
        match self {
            Extraction::Found(p) => Some(p),
            Extraction::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Flat,
    Nested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPayload {
    pub shape: PayloadShape,
    /// Pricing candidates: the flat list, or nested roles aggregated by name.
    pub candidates: Vec<CandidateRoleRow>,
    /// Present when the payload carried valid `scopeItems`.
    pub scope: Option<StructuredScope>,
    pub discount_percent: Option<f64>,
}

// ── Wire shapes ──

/// A number that may arrive as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Num(f64),
    Text(String),
}

impl NumberLike {
    fn value(&self) -> f64 {
        match self {
            NumberLike::Num(n) => *n,
            NumberLike::Text(s) => parse_number(s).unwrap_or(0.0),
        }
    }
}

fn number(n: &Option<NumberLike>) -> f64 {
    n.as_ref().map(NumberLike::value).unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    outcomes: Vec<String>,
    #[serde(default)]
    assumptions: Vec<String>,
    #[serde(default)]
    scope_items: Option<Vec<RawScopeItem>>,
    #[serde(default)]
    suggested_roles: Option<Vec<RawSuggestedRole>>,
    #[serde(default, alias = "discount")]
    discount_percent: Option<NumberLike>,
    #[serde(default, rename = "project_details", alias = "projectDetails")]
    project_details: Option<RawProjectDetails>,
}

#[derive(Debug, Deserialize)]
struct RawProjectDetails {
    #[serde(default, alias = "discountPercentage")]
    discount_percentage: Option<NumberLike>,
}

#[derive(Debug, Deserialize)]
struct RawScopeItem {
    #[serde(default, alias = "title")]
    name: Option<String>,
    #[serde(default, alias = "description")]
    overview: Option<String>,
    #[serde(default)]
    roles: Option<Vec<RawScopeRole>>,
    #[serde(default)]
    deliverables: Vec<String>,
    #[serde(default)]
    assumptions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawScopeRole {
    role: String,
    #[serde(default)]
    hours: Option<NumberLike>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSuggestedRole {
    Name(String),
    Detailed {
        role: String,
        #[serde(default)]
        hours: Option<NumberLike>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        rate: Option<NumberLike>,
    },
}

// ── Search ──

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\n?(.*?)```").expect("fence pattern")
});

const PAYLOAD_KEYS: &[&str] = &["\"scopeItems\"", "\"suggestedRoles\""];

/// Enclosing-object attempts per key occurrence.
const MAX_ENCLOSING_ATTEMPTS: usize = 16;

/// Opening braces brace-matched per key occurrence, enclosing or not.
const MAX_OPEN_BRACES: usize = 64;

pub fn extract_structured(text: &str) -> Extraction {
    let fences: Vec<(&str, &str)> = FENCE
        .captures_iter(text)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect();

    let tagged = fences.iter().filter(|(info, _)| info.eq_ignore_ascii_case("json"));
    let untagged = fences.iter().filter(|(info, _)| !info.eq_ignore_ascii_case("json"));

    for (_, body) in tagged.chain(untagged) {
        if let Some(payload) = validate(body.trim()) {
            info!(
                shape = ?payload.shape,
                roles = payload.candidates.len(),
                "structured payload found in fence"
            );
            return Extraction::Found(payload);
        }
    }

    for key in PAYLOAD_KEYS {
        for (at, _) in text.match_indices(key) {
            for candidate in enclosing_objects(text, at).take(MAX_ENCLOSING_ATTEMPTS) {
                if let Some(payload) = validate(candidate) {
                    info!(
                        shape = ?payload.shape,
                        roles = payload.candidates.len(),
                        "structured payload found by brace scan"
                    );
                    return Extraction::Found(payload);
                }
            }
        }
    }

    Extraction::NotFound
}

/// `{...}` spans that contain byte offset `at`, innermost first. Only the
/// nearest [`MAX_OPEN_BRACES`] opening braces are considered.
fn enclosing_objects(text: &str, at: usize) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    bytes[..at]
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, b)| **b == b'{')
        .take(MAX_OPEN_BRACES)
        .filter_map(move |(start, _)| {
            let end = matching_brace(bytes, start)?;
            (end > at).then(|| &text[start..=end])
        })
}

/// Index of the `}` closing the `{` at `start`, skipping braces inside strings.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ── Validation ──

fn validate(body: &str) -> Option<StructuredPayload> {
    let raw: RawPayload = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "ignoring unparseable JSON block");
            return None;
        }
    };

    let discount_percent = raw
        .discount_percent
        .as_ref()
        .or_else(|| raw.project_details.as_ref()?.discount_percentage.as_ref())
        .map(NumberLike::value);

    let scope = nested_scope(&raw);
    let flat = raw.suggested_roles.as_deref().map(flat_candidates).unwrap_or_default();

    let (shape, candidates) = match &scope {
        _ if !flat.is_empty() => (PayloadShape::Flat, flat),
        Some(scope) => (PayloadShape::Nested, aggregate_roles(scope)),
        None => {
            debug!("JSON block has no usable roles");
            return None;
        }
    };

    Some(StructuredPayload {
        shape,
        candidates,
        scope,
        discount_percent,
    })
}

fn flat_candidates(roles: &[RawSuggestedRole]) -> Vec<CandidateRoleRow> {
    roles
        .iter()
        .map(|r| match r {
            RawSuggestedRole::Name(name) => CandidateRoleRow::new(name.trim(), "", 0.0, 0.0),
            RawSuggestedRole::Detailed {
                role,
                hours,
                description,
                rate,
            } => CandidateRoleRow::new(
                role.trim(),
                description.as_deref().unwrap_or("").trim(),
                number(hours),
                number(rate),
            ),
        })
        .filter(|c| !c.role.is_empty())
        .collect()
}

/// Valid only if there is at least one item, every item has roles, and at
/// least one role exists overall.
fn nested_scope(raw: &RawPayload) -> Option<StructuredScope> {
    let items = raw.scope_items.as_ref()?;
    if items.is_empty() {
        return None;
    }

    let mut scope_items = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let roles: Vec<ScopeRole> = item
            .roles
            .as_ref()?
            .iter()
            .filter(|r| !r.role.trim().is_empty())
            .map(|r| ScopeRole {
                role: r.role.trim().to_string(),
                hours: number(&r.hours),
            })
            .collect();
        if roles.is_empty() {
            debug!(item = i, "scope item without roles; rejecting payload");
            return None;
        }
        let name = item
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Scope {}", i + 1));
        scope_items.push(ScopeItem {
            name,
            overview: item.overview.clone().filter(|o| !o.trim().is_empty()),
            roles,
            deliverables: item.deliverables.clone(),
            assumptions: item.assumptions.clone(),
        });
    }

    Some(StructuredScope {
        title: raw
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Scope of Work".to_string()),
        overview: raw.overview.clone(),
        outcomes: raw.outcomes.clone(),
        assumptions: raw.assumptions.clone(),
        scope_items,
    })
}

/// One candidate per normalised role across all scope items: hours summed,
/// first spelling kept, order of first appearance.
fn aggregate_roles(scope: &StructuredScope) -> Vec<CandidateRoleRow> {
    let mut order: Vec<CandidateRoleRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for role in scope.scope_items.iter().flat_map(|item| &item.roles) {
        let key = normalize_role(&role.role);
        match index.get(&key) {
            Some(&i) => order[i].hours += role.hours,
            None => {
                index.insert(key, order.len());
                order.push(CandidateRoleRow::new(role.role.clone(), "", role.hours, 0.0));
            }
        }
    }
    order
}
