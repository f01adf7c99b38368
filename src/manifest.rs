// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Loading HostEndpoints from manifest files
//!
//! Accepts YAML (including multi-document streams) and JSON. A document may
//! be a single `HostEndpoint`, or a `HostEndpointList` / `List` with `items`.
//! Documents of any other kind are skipped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use kube::{Resource, ResourceExt};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::apis::projectcalico::v3::HostEndpoint;
use crate::cache::Store;

const LIST_KINDS: &[&str] = &["HostEndpointList", "List"];

fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

/// Decode one HostEndpoint object, filling in type metadata and an empty
/// spec when the manifest leaves them out
fn decode_host_endpoint(mut value: Value, source: &str) -> Result<HostEndpoint> {
    let Value::Mapping(map) = &mut value else {
        bail!("{}: HostEndpoint document is not a mapping", source);
    };
    if !map.contains_key("apiVersion") {
        let api_version = HostEndpoint::api_version(&()).to_string();
        map.insert(Value::String("apiVersion".to_string()), Value::String(api_version));
    }
    if !map.contains_key("kind") {
        let kind = HostEndpoint::kind(&()).to_string();
        map.insert(Value::String("kind".to_string()), Value::String(kind));
    }
    if !map.contains_key("spec") {
        map.insert(Value::String("spec".to_string()), Value::Mapping(Mapping::new()));
    }

    let hep: HostEndpoint = serde_yaml::from_value(value)
        .with_context(|| format!("{}: invalid HostEndpoint", source))?;

    if hep.meta().name.as_deref().is_none_or(str::is_empty) {
        bail!("{}: HostEndpoint has no metadata.name", source);
    }
    Ok(hep)
}

/// Whether a document is a HostEndpoint we understand
fn is_host_endpoint(value: &Value, source: &str) -> bool {
    if str_field(value, "kind") != Some(HostEndpoint::kind(&()).as_ref()) {
        return false;
    }
    match str_field(value, "apiVersion") {
        None => true,
        Some(v) if v == HostEndpoint::api_version(&()) => true,
        Some(v) => {
            warn!(
                source = %source,
                api_version = %v,
                "Skipping HostEndpoint with unsupported apiVersion"
            );
            false
        }
    }
}

/// Parse every HostEndpoint out of a manifest string
pub fn parse_manifests(content: &str, source: &str) -> Result<Vec<HostEndpoint>> {
    let mut heps = Vec::new();

    for (idx, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document)
            .with_context(|| format!("{}: failed to parse document {}", source, idx + 1))?;
        let doc_source = format!("{}#{}", source, idx + 1);

        if value.is_null() {
            continue;
        }

        let kind = str_field(&value, "kind").unwrap_or_default().to_string();
        if LIST_KINDS.contains(&kind.as_str()) {
            let items = match value.get("items") {
                Some(Value::Sequence(items)) => items.clone(),
                Some(Value::Null) | None => Vec::new(),
                Some(_) => bail!("{}: items is not a list", doc_source),
            };
            for (item_idx, item) in items.into_iter().enumerate() {
                let item_source = format!("{}/items/{}", doc_source, item_idx);
                if is_host_endpoint(&item, &item_source) {
                    heps.push(decode_host_endpoint(item, &item_source)?);
                } else {
                    warn!(
                        source = %item_source,
                        kind = ?str_field(&item, "kind"),
                        "Skipping non-HostEndpoint item"
                    );
                }
            }
        } else if is_host_endpoint(&value, &doc_source) {
            heps.push(decode_host_endpoint(value, &doc_source)?);
        } else {
            warn!(source = %doc_source, kind = %kind, "Skipping non-HostEndpoint document");
        }
    }

    debug!(source = %source, count = heps.len(), "Parsed manifests");
    Ok(heps)
}

/// Read and parse one manifest file
pub fn load_file(path: &Path) -> Result<Vec<HostEndpoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
    parse_manifests(&content, &path.display().to_string())
}

/// Load every file into the store; later files win on name clashes
pub fn load_into(store: &Store<HostEndpoint>, paths: &[PathBuf]) -> Result<usize> {
    let mut loaded = 0;
    for path in paths {
        for hep in load_file(path)? {
            let name = hep.name_any();
            store
                .add(hep)
                .with_context(|| format!("Failed to cache HostEndpoint {}", name))?;
            loaded += 1;
        }
    }
    info!(
        files = paths.len(),
        objects = loaded,
        cached = store.len(),
        "Loaded HostEndpoints"
    );
    Ok(loaded)
}
