// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The engine never owns persistence; workflows talk to an [`ActivityStore`]
//! supplied by the caller. [`MemoryStore`] is the in-process implementation.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{Activity, Uid};

/// Activity persistence consumed by the grouping workflows.
///
/// Each write replaces one whole record; `commit` makes pending writes
/// durable.
pub trait ActivityStore {
    /// Fetch the activity with the given uid.
    fn get(&self, uid: &Uid) -> Result<Option<Activity>>;

    /// Insert or replace an activity, returning its id.
    fn upsert(&mut self, activity: Activity) -> Result<i64>;

    fn remove(&mut self, activity: &Activity) -> Result<()>;

    fn commit(&mut self) -> Result<()>;
}
