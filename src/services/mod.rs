// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - reconciliation logic.

pub mod clustering;
pub mod grouping;
pub mod merge;
pub mod multipart;
pub mod prompt;

pub use clustering::{cluster_by_starttime, ActivityCluster};
pub use grouping::{GroupingService, UngroupPlan};
pub use merge::{GroupOptions, Reconciler, GROUP_CLASSIFIER};
pub use prompt::{AssumeYes, Prompt};
