//! Structured scope: the nested scope-of-work payload behind the workbook.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeRole {
    pub role: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub roles: Vec<ScopeRole>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
}

impl ScopeItem {
    pub fn total_hours(&self) -> f64 {
        self.roles.iter().map(|r| r.hours).sum()
    }
}

/// A multi-item scope. `scope_items` is never empty once extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredScope {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
    pub scope_items: Vec<ScopeItem>,
}

impl StructuredScope {
    pub fn total_hours(&self) -> f64 {
        self.scope_items.iter().map(ScopeItem::total_hours).sum()
    }
}
