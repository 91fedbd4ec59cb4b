//! Shared core types: scopes and their filter predicates.

use serde::{Deserialize, Serialize};

/// A named, filterable contextual unit a dashboard can be restricted to.
///
/// Scopes are immutable once fetched and are identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form grouping used by pickers (e.g. "environment", "team").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Id of the enclosing scope node, if the backend organises scopes hierarchically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Ordered filter predicates; all must hold for a target to be in scope.
    #[serde(default)]
    pub filters: Vec<ScopeFilter>,
}

impl Scope {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            category: None,
            parent: None,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A single `(key, operator, value)` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    pub key: String,
    pub operator: FilterOperator,

    #[serde(default)]
    pub value: String,

    /// Operand list for `one-of` / `not-one-of`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl ScopeFilter {
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            operator,
            value: value.into(),
            values: Vec::new(),
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FilterOperator::Equals, value)
    }

    pub fn one_of<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            operator: FilterOperator::OneOf,
            value: String::new(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Filter operators understood by scope predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    RegexMatch,
    RegexNotMatch,
    OneOf,
    NotOneOf,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not-equals",
            FilterOperator::RegexMatch => "regex-match",
            FilterOperator::RegexNotMatch => "regex-not-match",
            FilterOperator::OneOf => "one-of",
            FilterOperator::NotOneOf => "not-one-of",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the selector treats toggles and bulk selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// At most one scope is pending at a time.
    Single,
    /// Any number of scopes, in the order they were picked.
    #[default]
    Multi,
}
