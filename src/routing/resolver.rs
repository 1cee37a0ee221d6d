//! Rule lookup.
//!
//! # Responsibilities
//! - Hold the loaded rules in file order
//! - Return the first rule matching a request, or none
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - O(n) scan; first match wins, no best-match scoring

use axum::http::Request;

use crate::routing::rule::Rule;

/// Ordered, read-only set of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// First rule matching the request, if any.
    pub fn rule_for<B>(&self, request: &Request<B>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(request))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, method: Option<&str>, name: &str) -> Rule {
        Rule::new(pattern, "/target", method.map(String::from), Some(name.into())).unwrap()
    }

    fn request(method: &str, path: &str) -> Request<()> {
        Request::builder().method(method).uri(path).body(()).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let rules = RuleSet::new(vec![
            rule(r"/api/v1/projects/\d+", None, "first"),
            rule(r"/api/v1/projects/(\d+)", None, "second"),
        ]);
        let matched = rules.rule_for(&request("GET", "/api/v1/projects/123")).unwrap();
        assert_eq!(matched.name(), Some("first"));
    }

    #[test]
    fn test_skips_rules_for_other_methods() {
        let rules = RuleSet::new(vec![
            rule(r"/api/v1/projects", Some("GET"), "read"),
            rule(r"/api/v1/projects", Some("POST"), "write"),
        ]);
        let matched = rules.rule_for(&request("POST", "/api/v1/projects")).unwrap();
        assert_eq!(matched.name(), Some("write"));
    }

    #[test]
    fn test_no_match() {
        let rules = RuleSet::new(vec![rule(r"/api/v1/projects/\d+", None, "projects")]);
        assert!(rules.rule_for(&request("GET", "/nonexistent/path")).is_none());
        assert!(RuleSet::default().rule_for(&request("GET", "/")).is_none());
    }
}
