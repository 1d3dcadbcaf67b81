// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity-Reconcile preview tool
//!
//! Reads a JSON array of activities from stdin, proposes groups of
//! activities recorded by different sources for the same event, and prints
//! the resulting group records as JSON without storing anything.

use activity_reconcile::{
    config::Config,
    models::Activity,
    services::{cluster_by_starttime, GroupOptions, Reconciler},
};
use anyhow::Context;
use std::io::{self, Read};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the preview
    init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        threshold_secs = config.group_threshold.num_seconds(),
        timezone = %config.local_timezone,
        "Starting activity reconciliation preview"
    );

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read activities from stdin")?;
    let activities: Vec<Activity> =
        serde_json::from_str(&input).context("Failed to parse activities")?;
    tracing::info!(count = activities.len(), "Activities loaded");

    let reconciler = Reconciler::from_config(&config);
    let mut groups = Vec::new();
    for cluster in cluster_by_starttime(&activities, config.group_threshold) {
        groups.push(reconciler.group_of(cluster.members(), GroupOptions::default())?);
    }
    tracing::info!(groups = groups.len(), "Group previews built");

    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("activity_reconcile=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
