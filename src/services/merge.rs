// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field merging: first-wins union, numeric aggregation and group records.
//!
//! All operations are driven by the [`FieldTable`] held by the
//! [`Reconciler`]. Protected fields are only written by forced unions,
//! internal fields are never written by the generic code. A field without
//! any input value is left unset; only structural problems (an unknown field
//! name, a collection field without a collection policy) are errors.

use chrono::Utc;

use crate::config::Config;
use crate::error::{ReconcileError, Result};
use crate::models::{
    Activity, ActivityType, Field, FieldClass, FieldMut, FieldRef, FieldTable, Policy, Uid,
};
use crate::time_utils::{as_seconds, group_stamp};

/// Classifier of synthetic group records.
pub const GROUP_CLASSIFIER: &str = "group";

/// Present values of one scalar field across `inputs`, in input order.
macro_rules! present {
    ($inputs:expr, $field:expr, $variant:ident) => {
        $inputs.iter().filter_map(|a| match a.field($field) {
            FieldRef::$variant(value) => value.as_ref(),
            _ => None,
        })
    };
}

/// Options for [`Reconciler::group_of`].
#[derive(Debug, Clone, Default)]
pub struct GroupOptions {
    /// Last value wins instead of first
    pub force: bool,
    /// Fields that are not taken over from the inputs
    pub ignored_fields: Vec<Field>,
    /// Existing group record to update instead of starting from scratch
    pub target: Option<Activity>,
}

impl GroupOptions {
    /// Resolve ignored field names, failing on names that are not declared fields.
    pub fn ignoring(mut self, names: &[&str]) -> Result<Self> {
        for name in names {
            self.ignored_fields.push(Field::from_name(name)?);
        }
        Ok(self)
    }
}

/// Outcome of comparing the present values of a field.
enum Agreement<T> {
    Missing,
    Unanimous(T),
    Conflict,
}

fn agreement<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Agreement<T> {
    let mut result = Agreement::Missing;
    for value in values {
        result = match result {
            Agreement::Missing => Agreement::Unanimous(value),
            Agreement::Unanimous(seen) if seen == value => Agreement::Unanimous(seen),
            _ => return Agreement::Conflict,
        };
    }
    result
}

/// Candidate a first-wins (or, forced, last-wins) fill would take.
fn pick<T>(has_value: bool, mut candidates: impl Iterator<Item = T>, force: bool) -> Option<T> {
    if force {
        candidates.last()
    } else if has_value {
        None
    } else {
        candidates.next()
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, candidates: impl Iterator<Item = T>, force: bool) {
    if let Some(value) = pick(slot.is_some(), candidates, force) {
        *slot = Some(value);
    }
}

/// Duration-weighted mean over inputs with both a value and a duration.
fn weighted_average(pairs: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (weighted, total) = pairs.fold((0.0, 0.0), |(weighted, total), (value, secs)| {
        (weighted + value * secs, total + secs)
    });
    (total > 0.0).then(|| weighted / total)
}

/// The merge engine, composed with the field table and local timezone it
/// consults.
#[derive(Debug, Clone)]
pub struct Reconciler {
    fields: FieldTable,
    local_timezone: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Reconciler {
    pub fn new(fields: FieldTable, local_timezone: impl Into<String>) -> Self {
        Self {
            fields,
            local_timezone: local_timezone.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(FieldTable::default(), config.local_timezone.clone())
    }

    pub fn fields(&self) -> &FieldTable {
        &self.fields
    }

    pub fn local_timezone(&self) -> &str {
        &self.local_timezone
    }

    // ─── Union ───────────────────────────────────────────────────

    /// Fill unset fields of `target` from `others`, first value wins.
    ///
    /// With `force`, already set fields are overwritten as well, the last
    /// value among `others` wins, and protected fields are included.
    /// Sequences are always unioned and maps always merged.
    pub fn union(&self, target: &mut Activity, others: &[&Activity], force: bool) -> Result<()> {
        self.union_fields(target, others, force, force, &[])
    }

    /// Like [`Reconciler::union`], leaving `target` untouched.
    pub fn union_copy(
        &self,
        target: &Activity,
        others: &[&Activity],
        force: bool,
    ) -> Result<Activity> {
        let mut copy = target.clone();
        self.union(&mut copy, others, force)?;
        Ok(copy)
    }

    pub(crate) fn union_fields(
        &self,
        target: &mut Activity,
        others: &[&Activity],
        force: bool,
        include_protected: bool,
        ignored: &[Field],
    ) -> Result<()> {
        for field in self.fields.mergeable() {
            if ignored.contains(&field) {
                continue;
            }
            if self.fields.is_protected(field) && !include_protected {
                continue;
            }
            self.union_field(target, others, field, force)?;
        }
        Ok(())
    }

    pub(crate) fn union_field(
        &self,
        target: &mut Activity,
        others: &[&Activity],
        field: Field,
        force: bool,
    ) -> Result<()> {
        match target.field_mut(field) {
            FieldMut::Id(slot) => {
                let ids = others.iter().map(|o| o.id).filter(|id| *id != 0);
                if let Some(id) = pick(*slot != 0, ids, force) {
                    *slot = id;
                }
            }
            FieldMut::Uid(slot) => fill(slot, present!(others, field, Uid).cloned(), force),
            FieldMut::Text(slot) => fill(slot, present!(others, field, Text).cloned(), force),
            FieldMut::Type(slot) => fill(slot, present!(others, field, Type).copied(), force),
            FieldMut::Time(slot) => fill(slot, present!(others, field, Time).copied(), force),
            FieldMut::LocalTime(slot) => {
                fill(slot, present!(others, field, LocalTime).copied(), force)
            }
            FieldMut::Duration(slot) => {
                fill(slot, present!(others, field, Duration).copied(), force)
            }
            FieldMut::Float(slot) => fill(slot, present!(others, field, Float).copied(), force),
            FieldMut::Integer(slot) => {
                fill(slot, present!(others, field, Integer).copied(), force)
            }
            FieldMut::Sequence(slot) => {
                self.require(field, Policy::Union)?;
                for other in others {
                    if let FieldRef::Sequence(values) = other.field(field) {
                        slot.extend(values.iter().cloned());
                    }
                }
                slot.sort();
                slot.dedup();
            }
            FieldMut::Mapping(slot) => {
                self.require(field, Policy::Merge)?;
                for other in others {
                    if let FieldRef::Mapping(entries) = other.field(field) {
                        slot.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                }
            }
            FieldMut::Parts(_) | FieldMut::Metadata(_) | FieldMut::Resources(_) => {
                tracing::debug!(field = %field, "Skipping internal field");
            }
        }
        Ok(())
    }

    /// Collection fields must carry their collection policy.
    fn require(&self, field: Field, expected: Policy) -> Result<()> {
        match self.fields.class(field) {
            FieldClass::Aggregable(policy) if policy == expected => Ok(()),
            FieldClass::Aggregable(policy) => Err(ReconcileError::MergeConfig {
                field: field.name(),
                policy: policy.name(),
            }),
            FieldClass::Protected | FieldClass::Internal => Err(ReconcileError::MergeConfig {
                field: field.name(),
                policy: "none",
            }),
        }
    }

    // ─── Add ─────────────────────────────────────────────────────

    /// Combine disjoint measurement intervals of one physical activity into
    /// `target`: start times take the minimum, durations and distances are
    /// summed, extremes take min/max, averages are duration-weighted and the
    /// type/timezone must agree (otherwise multisport/local timezone).
    pub fn add(&self, target: &mut Activity, others: &[&Activity]) -> Result<()> {
        let snapshot = target.clone();
        let mut inputs: Vec<&Activity> = Vec::with_capacity(others.len() + 1);
        inputs.push(&snapshot);
        inputs.extend_from_slice(others);
        self.aggregate(target, &inputs)
    }

    /// Like [`Reconciler::add`], leaving `target` untouched.
    pub fn add_copy(&self, target: &Activity, others: &[&Activity]) -> Result<Activity> {
        let mut copy = target.clone();
        self.add(&mut copy, others)?;
        Ok(copy)
    }

    /// Write every numerically aggregated field of `target` from `inputs`.
    pub(crate) fn aggregate(&self, target: &mut Activity, inputs: &[&Activity]) -> Result<()> {
        for field in self.fields.mergeable() {
            match self.fields.class(field) {
                FieldClass::Aggregable(Policy::First | Policy::Union | Policy::Merge) => {}
                FieldClass::Aggregable(policy) => {
                    self.aggregate_field(target, inputs, field, policy)?
                }
                FieldClass::Protected | FieldClass::Internal => {}
            }
        }
        Ok(())
    }

    fn aggregate_field(
        &self,
        target: &mut Activity,
        inputs: &[&Activity],
        field: Field,
        policy: Policy,
    ) -> Result<()> {
        match (target.field_mut(field), policy) {
            (FieldMut::Type(slot), Policy::Shared) => {
                *slot = match agreement(present!(inputs, field, Type).copied()) {
                    Agreement::Missing => None,
                    Agreement::Unanimous(t) => Some(t),
                    Agreement::Conflict => Some(ActivityType::Multisport),
                }
            }
            (FieldMut::Text(slot), Policy::Shared) => {
                *slot = match agreement(present!(inputs, field, Text)) {
                    Agreement::Missing => None,
                    Agreement::Unanimous(text) => Some(text.clone()),
                    Agreement::Conflict if field == Field::Timezone => {
                        Some(self.local_timezone.clone())
                    }
                    Agreement::Conflict => {
                        tracing::warn!(field = %field, "Inputs disagree, leaving field unset");
                        None
                    }
                }
            }
            (FieldMut::Time(slot), Policy::Min) => *slot = present!(inputs, field, Time).min().copied(),
            (FieldMut::Time(slot), Policy::Max) => *slot = present!(inputs, field, Time).max().copied(),
            (FieldMut::LocalTime(slot), Policy::Min) => {
                *slot = present!(inputs, field, LocalTime).min().copied()
            }
            (FieldMut::LocalTime(slot), Policy::Max) => {
                *slot = present!(inputs, field, LocalTime).max().copied()
            }
            (FieldMut::Duration(slot), Policy::Sum) => {
                *slot = present!(inputs, field, Duration).copied().reduce(|a, b| a + b)
            }
            (FieldMut::Duration(slot), Policy::Min) => {
                *slot = present!(inputs, field, Duration).min().copied()
            }
            (FieldMut::Duration(slot), Policy::Max) => {
                *slot = present!(inputs, field, Duration).max().copied()
            }
            (FieldMut::Float(slot), Policy::Sum) => {
                *slot = present!(inputs, field, Float).copied().reduce(|a, b| a + b)
            }
            (FieldMut::Float(slot), Policy::Min) => {
                *slot = present!(inputs, field, Float).copied().reduce(f64::min)
            }
            (FieldMut::Float(slot), Policy::Max) => {
                *slot = present!(inputs, field, Float).copied().reduce(f64::max)
            }
            // not rounded, unlike integer averages
            (FieldMut::Float(slot), Policy::Average) => {
                *slot = weighted_average(inputs.iter().filter_map(|a| {
                    match (a.field(field), a.duration) {
                        (FieldRef::Float(Some(v)), Some(d)) => Some((*v, as_seconds(d))),
                        _ => None,
                    }
                }))
            }
            (FieldMut::Integer(slot), Policy::Sum) => {
                *slot = present!(inputs, field, Integer)
                    .copied()
                    .reduce(|a, b| a.saturating_add(b))
            }
            (FieldMut::Integer(slot), Policy::Min) => {
                *slot = present!(inputs, field, Integer).min().copied()
            }
            (FieldMut::Integer(slot), Policy::Max) => {
                *slot = present!(inputs, field, Integer).max().copied()
            }
            (FieldMut::Integer(slot), Policy::Average) => {
                *slot = weighted_average(inputs.iter().filter_map(|a| {
                    match (a.field(field), a.duration) {
                        (FieldRef::Integer(Some(v)), Some(d)) => {
                            Some((f64::from(*v), as_seconds(d)))
                        }
                        _ => None,
                    }
                }))
                .map(|avg| avg.round() as u32)
            }
            (_, policy) => {
                return Err(ReconcileError::MergeConfig {
                    field: field.name(),
                    policy: policy.name(),
                })
            }
        }
        Ok(())
    }

    // ─── Groups ──────────────────────────────────────────────────

    /// Build (or update `options.target`) the group record standing for
    /// `activities`, which are assumed to be recordings of the same event.
    ///
    /// Ordinary fields follow union precedence; the uid becomes
    /// `group:<yymmddHHMMSS>` unless the target already is a group, the
    /// members are the inputs' uids and the resources of all inputs are
    /// merged, sorted by path.
    pub fn group_of(&self, activities: &[&Activity], options: GroupOptions) -> Result<Activity> {
        let GroupOptions {
            force,
            ignored_fields,
            target,
        } = options;
        let mut group = target.unwrap_or_default();

        self.union_fields(&mut group, activities, force, false, &ignored_fields)?;

        let has_group_uid = group
            .uid
            .as_ref()
            .is_some_and(|u| u.classifier() == GROUP_CLASSIFIER);
        if !has_group_uid {
            match group.starttime {
                Some(start) => group.uid = Some(Uid::activity(GROUP_CLASSIFIER, group_stamp(start))?),
                None => tracing::warn!(
                    members = activities.len(),
                    "Group has no start time, leaving uid unset"
                ),
            }
        }

        group.metadata.members = activities.iter().filter_map(|a| a.uid.clone()).collect();

        let mut resources = std::mem::take(&mut group.resources);
        for activity in activities {
            for resource in &activity.resources {
                if !resources.contains(resource) {
                    resources.push(resource.clone());
                }
            }
        }
        resources.sort_by(|a, b| a.path.cmp(&b.path));
        group.resources = resources;

        group.metadata.touch(Utc::now());

        tracing::debug!(
            uid = ?group.uid.as_ref().map(Uid::as_str),
            members = group.metadata.members.len(),
            "Built group record"
        );
        Ok(group)
    }
}
