// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Kubernetes label selectors

mod selector;
pub mod validation;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

pub use selector::{Operator, Requirement, Selector, SelectorError};

/// Read access to a set of labels
pub trait Labels {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<&str>;
}

impl Labels for BTreeMap<String, String> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        BTreeMap::get(self, key).map(String::as_str)
    }
}

impl<S: BuildHasher> Labels for HashMap<String, String, S> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

/// Convert an API `LabelSelector` into a [`Selector`]
///
/// A missing selector selects nothing; an empty one selects everything.
pub fn from_label_selector(ls: Option<&LabelSelector>) -> Result<Selector, SelectorError> {
    let Some(ls) = ls else {
        return Ok(Selector::nothing());
    };

    let mut selector = Selector::everything();

    if let Some(match_labels) = &ls.match_labels {
        for (key, value) in match_labels {
            selector.add(Requirement::new(key, Operator::Equals, [value.as_str()])?);
        }
    }

    for expr in ls.match_expressions.iter().flatten() {
        let operator = match expr.operator.as_str() {
            "In" => Operator::In,
            "NotIn" => Operator::NotIn,
            "Exists" => Operator::Exists,
            "DoesNotExist" => Operator::DoesNotExist,
            other => return Err(SelectorError::UnsupportedOperator(other.to_string())),
        };
        let values = expr.values.clone().unwrap_or_default();
        selector.add(Requirement::new(&expr.key, operator, values)?);
    }

    Ok(selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelectorRequirement;

    fn set(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hashmap_labels() {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), "web".to_string());
        assert!(labels.has("app"));
        assert_eq!(Labels::get(&labels, "app"), Some("web"));
        assert_eq!(Labels::get(&labels, "tier"), None);
        assert!(Selector::parse("app=web").unwrap().matches(&labels));
    }

    #[test]
    fn test_missing_label_selector_selects_nothing() {
        let selector = from_label_selector(None).unwrap();
        assert!(!selector.matches(&set(&[])));
    }

    #[test]
    fn test_empty_label_selector_selects_everything() {
        let selector = from_label_selector(Some(&LabelSelector::default())).unwrap();
        assert!(selector.is_everything());
        assert!(selector.matches(&set(&[("app", "web")])));
    }

    #[test]
    fn test_label_selector_conversion() {
        let ls = LabelSelector {
            match_labels: Some(set(&[("app", "web")])),
            match_expressions: Some(vec![
                LabelSelectorRequirement {
                    key: "env".to_string(),
                    operator: "In".to_string(),
                    values: Some(vec!["prod".to_string(), "staging".to_string()]),
                },
                LabelSelectorRequirement {
                    key: "canary".to_string(),
                    operator: "DoesNotExist".to_string(),
                    values: None,
                },
            ]),
        };
        let selector = from_label_selector(Some(&ls)).unwrap();
        assert_eq!(selector.to_string(), "app=web,!canary,env in (prod,staging)");
        assert!(selector.matches(&set(&[("app", "web"), ("env", "prod")])));
        assert!(!selector.matches(&set(&[("app", "web"), ("env", "dev")])));
    }

    #[test]
    fn test_label_selector_bad_operator() {
        let ls = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![LabelSelectorRequirement {
                key: "replicas".to_string(),
                operator: "Gt".to_string(),
                values: Some(vec!["1".to_string()]),
            }]),
        };
        assert_eq!(
            from_label_selector(Some(&ls)),
            Err(SelectorError::UnsupportedOperator("Gt".to_string()))
        );
    }
}
