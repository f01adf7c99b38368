// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use comfy_table::{Table, presets::ASCII_BORDERS_ONLY_CONDENSED};

use super::{Field, HostEndpointTable};

/// Widest a list cell may grow before its tail is summarized
const MAX_LIST_WIDTH: usize = 60;

/// Placeholder for empty cells, as kubectl prints them
const NONE: &str = "<none>";

fn more(count: usize) -> String {
    format!("+{} more", count)
}

/// Join list elements with "," keeping only whole elements, and summarize
/// the ones that do not fit as "+N more". The first element is always kept.
fn fit_list(items: &[String], max_width: usize) -> String {
    let full = items.join(",");
    if full.chars().count() <= max_width {
        return full;
    }

    let mut kept = 0;
    let mut width = 0;
    for item in items {
        let next = width + usize::from(kept > 0) + item.chars().count();
        let rest = items.len() - kept - 1;
        let suffix = if rest == 0 { 0 } else { more(rest).len() + 1 };
        if kept > 0 && next + suffix > max_width {
            break;
        }
        width = next;
        kept += 1;
    }

    match items.len() - kept {
        0 => full,
        rest => format!("{},{}", items[..kept].join(","), more(rest)),
    }
}

fn cell_text(field: &Field) -> String {
    if field.is_empty() {
        return NONE.to_string();
    }
    match field {
        Field::Text(s) => s.clone(),
        Field::List(items) => fit_list(items, MAX_LIST_WIDTH),
    }
}

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &HostEndpointTable, no_headers: bool) -> String {
        if result.row_count() == 0 {
            return "(0 rows)".to_string();
        }

        let mut table = Table::new();
        table.load_preset(ASCII_BORDERS_ONLY_CONDENSED);
        if !no_headers {
            table.set_header(result.columns.iter().copied());
        }
        for row in &result.rows {
            table.add_row(row.iter().map(cell_text));
        }

        format!("{}\n({} rows)", table, result.row_count())
    }
}
