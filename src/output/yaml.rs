// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::{Context, Result};

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(value: &serde_json::Value) -> Result<String> {
        serde_yaml::to_string(value).context("Failed to render YAML")
    }
}
