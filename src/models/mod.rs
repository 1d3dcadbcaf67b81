// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the reconciliation engine.

pub mod activity;
pub mod fields;
pub mod metadata;
pub mod uid;

pub use activity::{Activity, ActivityPart, ActivityType, FieldMut, FieldRef, Resource};
pub use fields::{Field, FieldClass, FieldKind, FieldTable, FieldValue, Policy, VirtualField};
pub use metadata::Metadata;
pub use uid::{Uid, UidParts};
