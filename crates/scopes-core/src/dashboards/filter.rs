//! Matching scope filter predicates against dashboard labels.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::warn;

use crate::types::{FilterOperator, Scope, ScopeFilter};

use super::Dashboard;

/// A scope with its regex patterns compiled up front, reusable across a
/// whole dashboard listing.
#[derive(Debug)]
pub struct ScopeMatcher<'a> {
    filters: Vec<CompiledFilter<'a>>,
}

#[derive(Debug)]
struct CompiledFilter<'a> {
    filter: &'a ScopeFilter,
    /// `Some(None)` marks a regex operator whose pattern failed to compile.
    regex: Option<Option<Regex>>,
}

impl<'a> ScopeMatcher<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        Self {
            filters: scope.filters.iter().map(CompiledFilter::new).collect(),
        }
    }

    /// Whether every filter holds for `dashboard`. A scope without filters
    /// places no restriction.
    pub fn matches(&self, dashboard: &Dashboard) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.matches(&dashboard.labels))
    }

    /// Number of regex filters whose pattern did not compile.
    pub fn invalid_patterns(&self) -> usize {
        self.filters
            .iter()
            .filter(|filter| matches!(filter.regex, Some(None)))
            .count()
    }
}

impl<'a> CompiledFilter<'a> {
    fn new(filter: &'a ScopeFilter) -> Self {
        let regex = match filter.operator {
            FilterOperator::RegexMatch | FilterOperator::RegexNotMatch => Some(compile(filter)),
            _ => None,
        };
        Self { filter, regex }
    }

    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let filter = self.filter;
        let label = labels.get(&filter.key).map(String::as_str);

        match (filter.operator, &self.regex) {
            (FilterOperator::Equals, _) => label == Some(filter.value.as_str()),
            (FilterOperator::NotEquals, _) => label != Some(filter.value.as_str()),
            (FilterOperator::OneOf, _) => {
                label.is_some_and(|value| filter.values.iter().any(|v| v == value))
            }
            (FilterOperator::NotOneOf, _) => {
                !label.is_some_and(|value| filter.values.iter().any(|v| v == value))
            }
            (FilterOperator::RegexMatch, Some(Some(regex))) => {
                label.is_some_and(|value| regex.is_match(value))
            }
            (FilterOperator::RegexNotMatch, Some(Some(regex))) => {
                !label.is_some_and(|value| regex.is_match(value))
            }
            (FilterOperator::RegexMatch | FilterOperator::RegexNotMatch, _) => false,
        }
    }
}

/// Whether every filter of `scope` holds for `dashboard`.
///
/// Compiles the scope's patterns on each call; use [`ScopeMatcher`] when
/// checking many dashboards.
pub fn scope_matches(scope: &Scope, dashboard: &Dashboard) -> bool {
    ScopeMatcher::new(scope).matches(dashboard)
}

/// Evaluate one predicate. A missing label only satisfies the negative
/// operators. Regex patterns are anchored; an invalid pattern matches nothing.
pub fn filter_matches(filter: &ScopeFilter, labels: &BTreeMap<String, String>) -> bool {
    CompiledFilter::new(filter).matches(labels)
}

fn compile(filter: &ScopeFilter) -> Option<Regex> {
    match Regex::new(&format!("^(?:{})$", filter.value)) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(key = %filter.key, pattern = %filter.value, error = %err, "Invalid scope filter pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_label_satisfies_only_negative_operators() {
        let empty = labels(&[]);
        assert!(!filter_matches(&ScopeFilter::equals("env", "prod"), &empty));
        assert!(filter_matches(
            &ScopeFilter::new("env", FilterOperator::NotEquals, "prod"),
            &empty
        ));
        assert!(!filter_matches(&ScopeFilter::one_of("env", ["prod"]), &empty));
        assert!(filter_matches(
            &ScopeFilter::new("env", FilterOperator::RegexNotMatch, "prod"),
            &empty
        ));
    }

    #[test]
    fn test_regex_is_anchored() {
        let prod = labels(&[("cluster", "prod-eu-1")]);
        assert!(filter_matches(
            &ScopeFilter::new("cluster", FilterOperator::RegexMatch, "prod-.*"),
            &prod
        ));
        assert!(!filter_matches(
            &ScopeFilter::new("cluster", FilterOperator::RegexMatch, "eu"),
            &prod
        ));
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let prod = labels(&[("cluster", "prod")]);
        for operator in [FilterOperator::RegexMatch, FilterOperator::RegexNotMatch] {
            assert!(!filter_matches(&ScopeFilter::new("cluster", operator, "("), &prod));
        }
    }

    #[test]
    fn test_not_one_of_excludes_listed_values() {
        let filter = ScopeFilter {
            operator: FilterOperator::NotOneOf,
            ..ScopeFilter::one_of("env", ["dev", "staging"])
        };
        assert!(!filter_matches(&filter, &labels(&[("env", "dev")])));
        assert!(filter_matches(&filter, &labels(&[("env", "prod")])));
    }

    #[test]
    fn test_matcher_compiles_patterns_once_for_many_dashboards() {
        let scope = Scope::new("broken", "Broken")
            .with_filter(ScopeFilter::new("cluster", FilterOperator::RegexMatch, "("))
            .with_filter(ScopeFilter::new("env", FilterOperator::RegexMatch, "prod|staging"));
        let matcher = ScopeMatcher::new(&scope);
        assert_eq!(matcher.invalid_patterns(), 1);

        let dashboards: Vec<Dashboard> = (0..50)
            .map(|i| {
                Dashboard::new(format!("d{i}"), "Dash")
                    .with_label("cluster", "prod")
                    .with_label("env", "prod")
            })
            .collect();
        assert!(dashboards.iter().all(|dashboard| !matcher.matches(dashboard)));

        let valid = Scope::new("env", "Env")
            .with_filter(ScopeFilter::new("env", FilterOperator::RegexMatch, "prod|staging"));
        let matcher = ScopeMatcher::new(&valid);
        assert_eq!(matcher.invalid_patterns(), 0);
        assert!(dashboards.iter().all(|dashboard| matcher.matches(dashboard)));
    }
}
