// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field descriptor table for activities.
//!
//! Every activity attribute is a [`Field`] with a fixed [`FieldKind`] and a
//! reconciliation [`FieldClass`]: protected fields are only overwritten when
//! a merge is forced, internal fields are never touched by the generic merge
//! code, and aggregable fields carry the [`Policy`] used when disjoint
//! measurement intervals are combined. Policies can be overridden per field
//! through a [`FieldTable`]; incompatible overrides are rejected when the
//! table is built, never while merging.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ReconcileError, Result};
use crate::models::{ActivityType, Uid};

/// Declared activity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    Uid,
    Name,
    Type,
    Description,
    Starttime,
    Endtime,
    StarttimeLocal,
    EndtimeLocal,
    Timezone,
    Duration,
    DurationMoving,
    Distance,
    Ascent,
    Descent,
    ElevationMin,
    ElevationMax,
    Speed,
    SpeedMax,
    Heartrate,
    HeartrateMin,
    HeartrateMax,
    Calories,
    Cadence,
    Power,
    Tags,
    Equipment,
    Supplementary,
    Parts,
    Metadata,
    Resources,
}

impl Field {
    pub const ALL: [Field; 31] = [
        Field::Id,
        Field::Uid,
        Field::Name,
        Field::Type,
        Field::Description,
        Field::Starttime,
        Field::Endtime,
        Field::StarttimeLocal,
        Field::EndtimeLocal,
        Field::Timezone,
        Field::Duration,
        Field::DurationMoving,
        Field::Distance,
        Field::Ascent,
        Field::Descent,
        Field::ElevationMin,
        Field::ElevationMax,
        Field::Speed,
        Field::SpeedMax,
        Field::Heartrate,
        Field::HeartrateMin,
        Field::HeartrateMax,
        Field::Calories,
        Field::Cadence,
        Field::Power,
        Field::Tags,
        Field::Equipment,
        Field::Supplementary,
        Field::Parts,
        Field::Metadata,
        Field::Resources,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Uid => "uid",
            Field::Name => "name",
            Field::Type => "type",
            Field::Description => "description",
            Field::Starttime => "starttime",
            Field::Endtime => "endtime",
            Field::StarttimeLocal => "starttime_local",
            Field::EndtimeLocal => "endtime_local",
            Field::Timezone => "timezone",
            Field::Duration => "duration",
            Field::DurationMoving => "duration_moving",
            Field::Distance => "distance",
            Field::Ascent => "ascent",
            Field::Descent => "descent",
            Field::ElevationMin => "elevation_min",
            Field::ElevationMax => "elevation_max",
            Field::Speed => "speed",
            Field::SpeedMax => "speed_max",
            Field::Heartrate => "heartrate",
            Field::HeartrateMin => "heartrate_min",
            Field::HeartrateMax => "heartrate_max",
            Field::Calories => "calories",
            Field::Cadence => "cadence",
            Field::Power => "power",
            Field::Tags => "tags",
            Field::Equipment => "equipment",
            Field::Supplementary => "supplementary",
            Field::Parts => "parts",
            Field::Metadata => "metadata",
            Field::Resources => "resources",
        }
    }

    /// Look up a declared field by name.
    pub fn from_name(name: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| ReconcileError::UnknownField(name.to_string()))
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Id | Field::Uid => FieldKind::Identifier,
            Field::Name | Field::Description | Field::Timezone => FieldKind::Text,
            Field::Type => FieldKind::Type,
            Field::Starttime | Field::Endtime | Field::StarttimeLocal | Field::EndtimeLocal => {
                FieldKind::Time
            }
            Field::Duration | Field::DurationMoving => FieldKind::Duration,
            Field::Distance
            | Field::Ascent
            | Field::Descent
            | Field::ElevationMin
            | Field::ElevationMax
            | Field::Speed
            | Field::SpeedMax => FieldKind::Float,
            Field::Heartrate
            | Field::HeartrateMin
            | Field::HeartrateMax
            | Field::Calories
            | Field::Cadence
            | Field::Power => FieldKind::Integer,
            Field::Tags | Field::Equipment => FieldKind::Sequence,
            Field::Supplementary => FieldKind::Mapping,
            Field::Parts | Field::Metadata | Field::Resources => FieldKind::Structure,
        }
    }

    /// Built-in reconciliation class.
    pub fn default_class(self) -> FieldClass {
        use Policy::*;
        match self {
            Field::Id | Field::Uid => FieldClass::Protected,
            Field::Parts | Field::Metadata | Field::Resources => FieldClass::Internal,
            Field::Name | Field::Description => FieldClass::Aggregable(First),
            Field::Type | Field::Timezone => FieldClass::Aggregable(Shared),
            Field::Starttime | Field::StarttimeLocal => FieldClass::Aggregable(Min),
            Field::Endtime | Field::EndtimeLocal => FieldClass::Aggregable(Max),
            Field::Duration
            | Field::DurationMoving
            | Field::Distance
            | Field::Ascent
            | Field::Descent
            | Field::Calories => FieldClass::Aggregable(Sum),
            Field::ElevationMax | Field::SpeedMax | Field::HeartrateMax => {
                FieldClass::Aggregable(Max)
            }
            Field::ElevationMin | Field::HeartrateMin => FieldClass::Aggregable(Min),
            Field::Speed | Field::Heartrate | Field::Cadence | Field::Power => {
                FieldClass::Aggregable(Average)
            }
            Field::Tags | Field::Equipment => FieldClass::Aggregable(Union),
            Field::Supplementary => FieldClass::Aggregable(Merge),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Identifier,
    Text,
    Type,
    Time,
    Duration,
    Float,
    Integer,
    Sequence,
    Mapping,
    Structure,
}

/// How values of one field are combined across activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Keep the existing value, fill it from the first input that has one
    First,
    /// The value all inputs agree on, otherwise a fallback
    Shared,
    Sum,
    Min,
    Max,
    /// Duration-weighted mean, rounded to the nearest integer for integer
    /// fields; float fields (speed) keep full precision
    Average,
    /// Sorted set union of sequences
    Union,
    /// Shallow map merge, later entries win
    Merge,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Policy::First => "first",
            Policy::Shared => "shared",
            Policy::Sum => "sum",
            Policy::Min => "min",
            Policy::Max => "max",
            Policy::Average => "average",
            Policy::Union => "union",
            Policy::Merge => "merge",
        }
    }

    /// Whether this policy can be applied to values of the given kind.
    pub fn supports(self, kind: FieldKind) -> bool {
        use FieldKind::*;
        match self {
            Policy::First => matches!(kind, Text | Type | Time | Duration | Float | Integer),
            Policy::Shared => matches!(kind, Text | Type),
            Policy::Sum => matches!(kind, Duration | Float | Integer),
            Policy::Min | Policy::Max => matches!(kind, Time | Duration | Float | Integer),
            Policy::Average => matches!(kind, Float | Integer),
            Policy::Union => kind == Sequence,
            Policy::Merge => kind == Mapping,
        }
    }
}

/// Reconciliation class of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Overwritten only by forced merges
    Protected,
    /// Never touched by generic merges
    Internal,
    Aggregable(Policy),
}

/// Per-field reconciliation classes, validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    classes: BTreeMap<Field, FieldClass>,
}

impl Default for FieldTable {
    fn default() -> Self {
        Self {
            classes: Field::ALL
                .into_iter()
                .map(|f| (f, f.default_class()))
                .collect(),
        }
    }
}

impl FieldTable {
    /// Override the aggregation policy of a field.
    ///
    /// Fails with a merge-configuration error when the field is protected or
    /// internal, or when its kind cannot be aggregated with `policy`.
    pub fn with_policy(mut self, field: Field, policy: Policy) -> Result<Self> {
        let aggregable = matches!(self.class(field), FieldClass::Aggregable(_));
        if !aggregable || !policy.supports(field.kind()) {
            return Err(ReconcileError::MergeConfig {
                field: field.name(),
                policy: policy.name(),
            });
        }
        self.classes.insert(field, FieldClass::Aggregable(policy));
        Ok(self)
    }

    pub fn class(&self, field: Field) -> FieldClass {
        self.classes
            .get(&field)
            .copied()
            .unwrap_or_else(|| field.default_class())
    }

    pub fn policy(&self, field: Field) -> Option<Policy> {
        match self.class(field) {
            FieldClass::Aggregable(policy) => Some(policy),
            FieldClass::Protected | FieldClass::Internal => None,
        }
    }

    pub fn is_protected(&self, field: Field) -> bool {
        self.class(field) == FieldClass::Protected
    }

    /// Fields visited by merges, i.e. everything that is not internal.
    pub fn mergeable(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL
            .into_iter()
            .filter(|f| self.class(*f) != FieldClass::Internal)
    }
}

/// Computed fields that can be looked up by name like declared ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualField {
    /// Classifier of the activity uid
    Classifier,
    /// Sorted classifiers of the group members (or of the uid)
    Classifiers,
    Group,
    Multipart,
}

impl VirtualField {
    pub const ALL: [VirtualField; 4] = [
        VirtualField::Classifier,
        VirtualField::Classifiers,
        VirtualField::Group,
        VirtualField::Multipart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VirtualField::Classifier => "classifier",
            VirtualField::Classifiers => "classifiers",
            VirtualField::Group => "group",
            VirtualField::Multipart => "multipart",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        VirtualField::ALL.into_iter().find(|v| v.name() == name)
    }
}

/// Owned snapshot of a field value, as returned by name-based lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Type(ActivityType),
    Time(DateTime<Utc>),
    LocalTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Uid(Uid),
    List(Vec<String>),
    Map(BTreeMap<String, Value>),
    /// Size of a structured field
    Count(usize),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()).unwrap(), field);
        }
        assert!(matches!(
            Field::from_name("pace"),
            Err(ReconcileError::UnknownField(_))
        ));
    }

    #[test]
    fn test_default_classes_are_consistent() {
        for field in Field::ALL {
            if let FieldClass::Aggregable(policy) = field.default_class() {
                assert!(policy.supports(field.kind()), "{} / {:?}", field, policy);
            }
        }
    }

    #[test]
    fn test_override_policy() {
        let table = FieldTable::default()
            .with_policy(Field::Heartrate, Policy::Max)
            .unwrap();
        assert_eq!(table.policy(Field::Heartrate), Some(Policy::Max));
        assert_eq!(table.policy(Field::Id), None);
    }

    #[test]
    fn test_rejects_unsupported_policy() {
        let err = FieldTable::default()
            .with_policy(Field::Tags, Policy::Sum)
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MergeConfig {
                field: "tags",
                policy: "sum"
            }
        ));

        assert!(FieldTable::default().with_policy(Field::Name, Policy::Average).is_err());
        assert!(FieldTable::default().with_policy(Field::Uid, Policy::First).is_err());
        assert!(FieldTable::default().with_policy(Field::Parts, Policy::Union).is_err());
    }
}
