// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod csv;
mod json;
mod table;
mod yaml;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{Context, Result};
use hep_lister::HostEndpoint;
use kube::{Resource, ResourceExt};
use serde_json::json;

use crate::cli::OutputFormat;

/// Column headers of the tabular views
pub const COLUMNS: &[&str] = &["NAME", "NODE", "INTERFACE", "EXPECTED IPS", "PROFILES", "LABELS"];

/// One cell of the tabular views. List cells keep their elements so each
/// formatter can decide how to lay them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    List(Vec<String>),
}

impl Field {
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Text(s) => s.is_empty(),
            Field::List(items) => items.is_empty(),
        }
    }

    /// Comma separated rendering
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Field::Text(s) => Cow::Borrowed(s),
            Field::List(items) => Cow::Owned(items.join(",")),
        }
    }
}

/// Tabular view of a set of HostEndpoints
#[derive(Debug, Clone)]
pub struct HostEndpointTable {
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Field>>,
}

impl HostEndpointTable {
    pub fn from_host_endpoints(heps: &[Arc<HostEndpoint>]) -> Self {
        let rows = heps
            .iter()
            .map(|hep| {
                let labels = hep
                    .labels()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                vec![
                    Field::Text(hep.name_any()),
                    Field::Text(hep.spec.node.clone()),
                    Field::Text(hep.spec.interface_name.clone()),
                    Field::List(hep.spec.expected_ips.clone()),
                    Field::List(hep.spec.profiles.clone()),
                    Field::List(labels),
                ]
            })
            .collect();

        Self {
            columns: COLUMNS,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Full object view: the object itself for `get`, a HostEndpointList otherwise
fn document(heps: &[Arc<HostEndpoint>], single: bool) -> Result<serde_json::Value> {
    if single && let [hep] = heps {
        return serde_json::to_value(hep.as_ref()).context("Failed to serialize HostEndpoint");
    }

    let items = heps
        .iter()
        .map(|hep| serde_json::to_value(hep.as_ref()))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to serialize HostEndpoints")?;

    Ok(json!({
        "apiVersion": HostEndpoint::api_version(&()),
        "kind": "HostEndpointList",
        "metadata": {},
        "items": items,
    }))
}

/// Render HostEndpoints in the requested format
pub fn render(
    heps: &[Arc<HostEndpoint>],
    single: bool,
    format: OutputFormat,
    no_headers: bool,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(TableFormatter::format(
            &HostEndpointTable::from_host_endpoints(heps),
            no_headers,
        )),
        OutputFormat::Csv => Ok(CsvFormatter::format(
            &HostEndpointTable::from_host_endpoints(heps),
            no_headers,
        )),
        OutputFormat::Json => JsonFormatter::format(&document(heps, single)?),
        OutputFormat::Yaml => YamlFormatter::format(&document(heps, single)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hep_lister::HostEndpointSpec;

    fn sample() -> Vec<Arc<HostEndpoint>> {
        let mut hep = HostEndpoint::new(
            "node1-eth0",
            HostEndpointSpec {
                node: "node1".to_string(),
                interface_name: "eth0".to_string(),
                expected_ips: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
                ..Default::default()
            },
        );
        hep.metadata.labels = Some(
            [
                ("role".to_string(), "worker".to_string()),
                ("zone".to_string(), "a".to_string()),
            ]
            .into(),
        );
        vec![Arc::new(hep)]
    }

    #[test]
    fn test_table_rows() {
        let result = HostEndpointTable::from_host_endpoints(&sample());
        assert_eq!(result.columns.len(), 6);
        assert_eq!(result.row_count(), 1);
        assert_eq!(
            result.rows[0],
            vec![
                Field::Text("node1-eth0".to_string()),
                Field::Text("node1".to_string()),
                Field::Text("eth0".to_string()),
                Field::List(vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]),
                Field::List(vec![]),
                Field::List(vec!["role=worker".to_string(), "zone=a".to_string()]),
            ]
        );
        assert_eq!(result.rows[0][3].joined(), "10.0.0.1,10.0.0.2");
        assert!(result.rows[0][4].is_empty());
    }

    #[test]
    fn test_render_single_json() {
        let out = render(&sample(), true, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "HostEndpoint");
        assert_eq!(value["metadata"]["name"], "node1-eth0");
    }

    #[test]
    fn test_render_list_yaml() {
        let out = render(&sample(), false, OutputFormat::Yaml, false).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["kind"].as_str(), Some("HostEndpointList"));
        assert_eq!(value["items"][0]["spec"]["node"].as_str(), Some("node1"));
    }

    #[test]
    fn test_render_empty_list() {
        let out = render(&[], false, OutputFormat::Table, false).unwrap();
        assert_eq!(out, "(0 rows)");

        let out = render(&[], false, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["items"], json!([]));
    }
}
