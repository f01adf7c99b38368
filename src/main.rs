// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::prelude::*;

use cli::{Args, Command, OutputFormat};
use hep_lister::cache::Store;
use hep_lister::listers::projectcalico::v3::host_endpoint_indexers;
use hep_lister::{
    HostEndpoint, HostEndpointLister, Selector, manifest, new_host_endpoint_lister,
};
use kube::ResourceExt;

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate at 10MB or daily, keep 5 files
    let log_path = log_dir.join("hep-lister.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, guard) = file_appender.get_non_blocking_appender();
    // Keep the background writer alive for the life of the process
    std::mem::forget(guard);

    let filter = if verbose {
        "hep_lister=debug"
    } else {
        "hep_lister=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    if verbose {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stderr_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = config::Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config");
        config::Config::default()
    });

    match &args.command {
        Command::Config {
            manifests,
            default_output,
        } => save_config(config, manifests, *default_output),
        Command::Get { name } => {
            let lister = build_lister(&args, &config)?;
            let hep = lister.get(name)?;
            print(&[hep], true, &args, &config)
        }
        Command::List { selector, node } => {
            let lister = build_lister(&args, &config)?;
            let selector = match selector {
                Some(s) => {
                    Selector::parse(s).with_context(|| format!("Invalid selector {:?}", s))?
                }
                None => Selector::everything(),
            };
            let heps = match node {
                Some(node) => lister
                    .list_by_node(node)?
                    .into_iter()
                    .filter(|hep| selector.matches(hep.labels()))
                    .collect(),
                None => lister.list(&selector)?,
            };
            print(&heps, false, &args, &config)
        }
    }
}

fn save_config(
    mut config: config::Config,
    manifests: &[PathBuf],
    default_output: Option<OutputFormat>,
) -> Result<()> {
    if !manifests.is_empty() {
        config.manifests = manifests
            .iter()
            .map(|p| std::path::absolute(p).unwrap_or_else(|_| p.clone()))
            .collect();
    }
    if default_output.is_some() {
        config.output = default_output;
    }
    config.save()?;
    println!(
        "Saved {} ({} manifest(s))",
        config::Config::config_path()?.display(),
        config.manifests.len()
    );
    Ok(())
}

/// Load the manifests into an indexed store and wrap it in a lister
fn build_lister(args: &Args, config: &config::Config) -> Result<Arc<dyn HostEndpointLister>> {
    let paths = if args.files.is_empty() {
        &config.manifests
    } else {
        &args.files
    };
    if paths.is_empty() {
        bail!(
            "No manifest files given. Use -f PATH, or save defaults with \
             `hep-lister config --manifest PATH`"
        );
    }

    let store: Arc<Store<HostEndpoint>> =
        Arc::new(Store::with_indexers(host_endpoint_indexers()));
    let loaded = manifest::load_into(&store, paths)?;
    debug!(loaded, cached = store.len(), "Store ready");

    Ok(new_host_endpoint_lister(store))
}

fn print(
    heps: &[Arc<HostEndpoint>],
    single: bool,
    args: &Args,
    config: &config::Config,
) -> Result<()> {
    let format = args.output.or(config.output).unwrap_or_default();
    println!("{}", output::render(heps, single, format, args.no_headers)?);
    Ok(())
}
