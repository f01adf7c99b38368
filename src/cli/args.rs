// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "hep-lister")]
#[command(author, version, about = "Look up Calico HostEndpoints by name or label selector")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Manifest file(s) to load HostEndpoints from (YAML or JSON).
    /// Defaults to the manifests saved in the config file.
    #[arg(short = 'f', long = "file", value_name = "PATH", global = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Omit column headers in output
    #[arg(long, global = true)]
    pub no_headers: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single HostEndpoint by name
    Get {
        /// HostEndpoint name
        name: String,
    },

    /// List HostEndpoints, optionally filtered
    List {
        /// Label selector, e.g. "role=worker,zone in (a,b)"
        #[arg(short = 'l', long)]
        selector: Option<String>,

        /// Only endpoints on this node
        #[arg(long)]
        node: Option<String>,
    },

    /// Save default manifests and output format
    Config {
        /// Manifest file to load by default (repeatable)
        #[arg(long = "manifest", value_name = "PATH")]
        manifests: Vec<PathBuf>,

        /// Default output format
        #[arg(long, value_enum)]
        default_output: Option<OutputFormat>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
    Yaml,
}
