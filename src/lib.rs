// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity-Reconcile: merge activity records imported from several sources
//!
//! This crate detects activities that were recorded by more than one service,
//! folds them into group records, and builds multipart composites out of
//! sequential segments.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use config::Config;
pub use error::{ReconcileError, Result};
pub use models::{Activity, Field, FieldTable, Policy, Uid};
pub use services::{GroupOptions, GroupingService, Reconciler};
