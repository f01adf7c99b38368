// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Label key and value validation
//!
//! Keys are qualified names: an optional DNS-1123 subdomain prefix followed by
//! `/` and a name part. Values are either empty or follow the same character
//! rules as the name part.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a label value and of the name part of a key
pub const QUALIFIED_NAME_MAX_LENGTH: usize = 63;

/// Maximum length of the DNS subdomain prefix of a key
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

static QUALIFIED_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").unwrap());

static DNS1123_SUBDOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

/// Check a label key, returning a description of every violation found
pub fn validate_label_key(key: &str) -> Vec<String> {
    let mut errs = Vec::new();

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if name.contains('/') {
        errs.push(
            "a qualified name must consist of an optional prefix and a name separated by '/'"
                .to_string(),
        );
        return errs;
    }

    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            errs.push("prefix part must be non-empty".to_string());
        } else {
            if prefix.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
                errs.push(format!(
                    "prefix part must be no more than {} characters",
                    DNS1123_SUBDOMAIN_MAX_LENGTH
                ));
            }
            if !DNS1123_SUBDOMAIN_PATTERN.is_match(prefix) {
                errs.push(
                    "prefix part must be a lowercase RFC 1123 subdomain".to_string(),
                );
            }
        }
    }

    if name.is_empty() {
        errs.push("name part must be non-empty".to_string());
    } else {
        if name.len() > QUALIFIED_NAME_MAX_LENGTH {
            errs.push(format!(
                "name part must be no more than {} characters",
                QUALIFIED_NAME_MAX_LENGTH
            ));
        }
        if !QUALIFIED_NAME_PATTERN.is_match(name) {
            errs.push(
                "name part must consist of alphanumeric characters, '-', '_' or '.', \
                 and must start and end with an alphanumeric character"
                    .to_string(),
            );
        }
    }

    errs
}

/// Check a label value, returning a description of every violation found
pub fn validate_label_value(value: &str) -> Vec<String> {
    let mut errs = Vec::new();
    if value.is_empty() {
        return errs;
    }
    if value.len() > QUALIFIED_NAME_MAX_LENGTH {
        errs.push(format!(
            "must be no more than {} characters",
            QUALIFIED_NAME_MAX_LENGTH
        ));
    }
    if !QUALIFIED_NAME_PATTERN.is_match(value) {
        errs.push(
            "a valid label must be an empty string or consist of alphanumeric characters, \
             '-', '_' or '.', and must start and end with an alphanumeric character"
                .to_string(),
        );
    }
    errs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keys() {
        assert!(validate_label_key("app").is_empty());
        assert!(validate_label_key("a").is_empty());
        assert!(validate_label_key("app.kubernetes_io-name").is_empty());
        assert!(validate_label_key("Role").is_empty());
    }

    #[test]
    fn test_prefixed_keys() {
        assert!(validate_label_key("projectcalico.org/orchestrator").is_empty());
        assert!(validate_label_key("kubernetes.io/hostname").is_empty());
        assert!(!validate_label_key("Example.com/name").is_empty());
        assert!(!validate_label_key("/name").is_empty());
        assert!(!validate_label_key("example.com/").is_empty());
        assert!(!validate_label_key("a/b/c").is_empty());
    }

    #[test]
    fn test_bad_keys() {
        assert!(!validate_label_key("").is_empty());
        assert!(!validate_label_key("-app").is_empty());
        assert!(!validate_label_key("app-").is_empty());
        assert!(!validate_label_key("app name").is_empty());
        assert!(!validate_label_key(&"a".repeat(64)).is_empty());
        assert!(validate_label_key(&"a".repeat(63)).is_empty());
    }

    #[test]
    fn test_values() {
        assert!(validate_label_value("").is_empty());
        assert!(validate_label_value("prod").is_empty());
        assert!(validate_label_value("v1.2_3-rc").is_empty());
        assert!(!validate_label_value("-prod").is_empty());
        assert!(!validate_label_value("a b").is_empty());
        assert!(!validate_label_value(&"v".repeat(64)).is_empty());
    }
}
