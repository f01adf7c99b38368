// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::borrow::Cow;

use super::HostEndpointTable;

/// Quote a field when it holds a separator, a quote or a line break
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub struct CsvFormatter;

impl CsvFormatter {
    /// One record per HostEndpoint. List cells are joined with "," and
    /// therefore always quoted when they hold more than one element.
    pub fn format(result: &HostEndpointTable, no_headers: bool) -> String {
        let header = (!no_headers).then(|| {
            result
                .columns
                .iter()
                .map(|c| escape(c))
                .collect::<Vec<_>>()
                .join(",")
        });

        let records = result.rows.iter().map(|row| {
            row.iter()
                .map(|field| escape(&field.joined()).into_owned())
                .collect::<Vec<_>>()
                .join(",")
        });

        header.into_iter().chain(records).collect::<Vec<_>>().join("\n")
    }
}
