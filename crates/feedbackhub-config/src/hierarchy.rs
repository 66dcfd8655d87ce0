//! Naming policy for the academic hierarchy.
//!
//! The validators in the hierarchy module never hard-code institution rules;
//! they read them from a [`HierarchyPolicy`] so each deployment can tune them.
//!
//! # Environment Variables
//!
//! - `HIERARCHY_RESERVED_WORDS`: comma-separated course names that are refused
//!   (default: `admin,system,test,null,undefined`)
//! - `HIERARCHY_YEAR_VALUES`: comma-separated year labels accepted on add/edit
//!   (default: `1,2,3,4`)
//! - `HIERARCHY_ALLOW_CUSTOM_YEARS`: accept free-text year labels on add/edit
//!   (default: `false`)
//! - `HIERARCHY_DEFAULT_BATCHES`: batches given to subjects loaded without a
//!   batch list (default: `A,B,C,D`)

use std::env;

use crate::cors::split_list;

pub const DEFAULT_RESERVED_WORDS: [&str; 5] = ["admin", "system", "test", "null", "undefined"];
pub const DEFAULT_YEAR_VALUES: [&str; 4] = ["1", "2", "3", "4"];
pub const DEFAULT_BATCHES: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyPolicy {
    /// Course names refused regardless of case.
    pub reserved_words: Vec<String>,
    /// Year labels accepted when adding or renaming a year.
    pub year_values: Vec<String>,
    /// When set, any well-formed label is accepted as a year name.
    pub allow_custom_years: bool,
    /// Batches assigned to subjects that arrive without a batch list.
    pub default_batches: Vec<String>,
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self {
            reserved_words: DEFAULT_RESERVED_WORDS.iter().map(|s| s.to_string()).collect(),
            year_values: DEFAULT_YEAR_VALUES.iter().map(|s| s.to_string()).collect(),
            allow_custom_years: false,
            default_batches: DEFAULT_BATCHES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl HierarchyPolicy {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the policy from an arbitrary key lookup, falling back to the
    /// defaults for missing or blank values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let list = |key: &str, fallback: Vec<String>| {
            lookup(key)
                .map(|raw| split_list(&raw))
                .filter(|items| !items.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            reserved_words: list("HIERARCHY_RESERVED_WORDS", defaults.reserved_words),
            year_values: list("HIERARCHY_YEAR_VALUES", defaults.year_values),
            allow_custom_years: lookup("HIERARCHY_ALLOW_CUSTOM_YEARS")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.allow_custom_years),
            default_batches: list("HIERARCHY_DEFAULT_BATCHES", defaults.default_batches),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        let name = name.trim();
        self.reserved_words
            .iter()
            .any(|word| word.eq_ignore_ascii_case(name))
    }

    pub fn is_allowed_year(&self, name: &str) -> bool {
        let name = name.trim();
        self.year_values.iter().any(|value| value == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let policy = HierarchyPolicy::from_lookup(|_| None);
        assert_eq!(policy, HierarchyPolicy::default());
        assert_eq!(policy.default_batches, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_reserved_words_are_case_insensitive() {
        let policy = HierarchyPolicy::default();
        assert!(policy.is_reserved("Admin"));
        assert!(policy.is_reserved(" NULL "));
        assert!(!policy.is_reserved("Administration"));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let policy = HierarchyPolicy::from_lookup(lookup_from(&[
            ("HIERARCHY_YEAR_VALUES", "1,2,3,4,5"),
            ("HIERARCHY_ALLOW_CUSTOM_YEARS", "TRUE"),
            ("HIERARCHY_DEFAULT_BATCHES", "X, Y"),
        ]));

        assert!(policy.is_allowed_year("5"));
        assert!(policy.allow_custom_years);
        assert_eq!(policy.default_batches, vec!["X", "Y"]);
        assert_eq!(policy.reserved_words.len(), 5);
    }

    #[test]
    fn test_blank_override_keeps_default() {
        let policy = HierarchyPolicy::from_lookup(lookup_from(&[("HIERARCHY_YEAR_VALUES", " , ")]));
        assert_eq!(policy.year_values, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_year_values_are_exact() {
        let policy = HierarchyPolicy::default();
        assert!(policy.is_allowed_year("3"));
        assert!(!policy.is_allowed_year("03"));
        assert!(!policy.is_allowed_year("First"));
    }
}
