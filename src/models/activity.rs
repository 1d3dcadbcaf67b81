// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model shared by all sources.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Result;
use crate::models::fields::{Field, FieldValue, VirtualField};
use crate::models::{Metadata, Uid};

/// Sport classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Run,
    RunTrail,
    Walk,
    Hike,
    Bike,
    BikeRoad,
    BikeMountain,
    BikeIndoor,
    Swim,
    SwimOpenWater,
    Row,
    Paddle,
    Ski,
    SkiCrossCountry,
    Gym,
    Yoga,
    Climb,
    Drive,
    Multisport,
    #[serde(other)]
    Unknown,
}

impl ActivityType {
    pub fn display_name(self) -> &'static str {
        match self {
            ActivityType::Run => "Running",
            ActivityType::RunTrail => "Trail Running",
            ActivityType::Walk => "Walking",
            ActivityType::Hike => "Hiking",
            ActivityType::Bike => "Cycling",
            ActivityType::BikeRoad => "Road Cycling",
            ActivityType::BikeMountain => "Mountain Biking",
            ActivityType::BikeIndoor => "Indoor Cycling",
            ActivityType::Swim => "Swimming",
            ActivityType::SwimOpenWater => "Open Water Swimming",
            ActivityType::Row => "Rowing",
            ActivityType::Paddle => "Paddling",
            ActivityType::Ski => "Skiing",
            ActivityType::SkiCrossCountry => "Cross Country Skiing",
            ActivityType::Gym => "Strength Training",
            ActivityType::Yoga => "Yoga",
            ActivityType::Climb => "Climbing",
            ActivityType::Drive => "Driving",
            ActivityType::Multisport => "Multisport",
            ActivityType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A file attached to an activity (recording, summary, image, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Content type, e.g. "gpx" or "application/json"
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Path of the file relative to its source's storage area
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Uid of the activity this resource was imported for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,
}

/// One segment reference of a multipart activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPart {
    /// Time since the end of the previous segment (zero for the first one)
    #[serde(with = "crate::time_utils::gap_secs")]
    pub gap: TimeDelta,
    pub uids: Vec<Uid>,
}

/// The canonical activity record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime_local: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime_local: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(
        with = "crate::time_utils::duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<TimeDelta>,
    #[serde(
        with = "crate::time_utils::duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_moving: Option<TimeDelta>,

    /// Meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_max: Option<f64>,
    /// Meters per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_max: Option<f64>,

    /// Beats per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<u32>,
    /// Watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<ActivityPart>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

/// Borrowed view of one field, used by the merge code.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Id(i64),
    Uid(&'a Option<Uid>),
    Text(&'a Option<String>),
    Type(&'a Option<ActivityType>),
    Time(&'a Option<DateTime<Utc>>),
    LocalTime(&'a Option<DateTime<FixedOffset>>),
    Duration(&'a Option<TimeDelta>),
    Float(&'a Option<f64>),
    Integer(&'a Option<u32>),
    Sequence(&'a Vec<String>),
    Mapping(&'a BTreeMap<String, Value>),
    Parts(&'a Vec<ActivityPart>),
    Metadata(&'a Metadata),
    Resources(&'a Vec<Resource>),
}

/// Mutable view of one field.
#[derive(Debug)]
pub enum FieldMut<'a> {
    Id(&'a mut i64),
    Uid(&'a mut Option<Uid>),
    Text(&'a mut Option<String>),
    Type(&'a mut Option<ActivityType>),
    Time(&'a mut Option<DateTime<Utc>>),
    LocalTime(&'a mut Option<DateTime<FixedOffset>>),
    Duration(&'a mut Option<TimeDelta>),
    Float(&'a mut Option<f64>),
    Integer(&'a mut Option<u32>),
    Sequence(&'a mut Vec<String>),
    Mapping(&'a mut BTreeMap<String, Value>),
    Parts(&'a mut Vec<ActivityPart>),
    Metadata(&'a mut Metadata),
    Resources(&'a mut Vec<Resource>),
}

impl Activity {
    /// True iff this activity stands for more than one member activity.
    pub fn is_group(&self) -> bool {
        self.metadata.is_group()
    }

    pub fn is_multipart(&self) -> bool {
        !self.parts.is_empty()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.uid.as_ref().map(Uid::classifier)
    }

    /// Classifiers of the group members, or of the own uid for plain activities.
    pub fn classifiers(&self) -> Vec<String> {
        let classifiers: BTreeSet<&str> = if self.metadata.members.is_empty() {
            self.classifier().into_iter().collect()
        } else {
            self.metadata.members.iter().map(Uid::classifier).collect()
        };
        classifiers.into_iter().map(str::to_string).collect()
    }

    /// Uids this activity stands for: its members for groups, otherwise its own uid.
    pub fn refs(&self) -> Vec<Uid> {
        if self.metadata.members.is_empty() {
            self.uid.iter().cloned().collect()
        } else {
            self.metadata.members.iter().cloned().collect()
        }
    }

    /// Add a tag, keeping the tag list sorted and free of duplicates.
    pub fn tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
            self.tags.sort();
        }
    }

    pub fn untag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn resources_for(&self, classifier: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.uid.as_ref().is_some_and(|u| u.classifier() == classifier))
            .collect()
    }

    pub fn field(&self, field: Field) -> FieldRef<'_> {
        match field {
            Field::Id => FieldRef::Id(self.id),
            Field::Uid => FieldRef::Uid(&self.uid),
            Field::Name => FieldRef::Text(&self.name),
            Field::Type => FieldRef::Type(&self.activity_type),
            Field::Description => FieldRef::Text(&self.description),
            Field::Starttime => FieldRef::Time(&self.starttime),
            Field::Endtime => FieldRef::Time(&self.endtime),
            Field::StarttimeLocal => FieldRef::LocalTime(&self.starttime_local),
            Field::EndtimeLocal => FieldRef::LocalTime(&self.endtime_local),
            Field::Timezone => FieldRef::Text(&self.timezone),
            Field::Duration => FieldRef::Duration(&self.duration),
            Field::DurationMoving => FieldRef::Duration(&self.duration_moving),
            Field::Distance => FieldRef::Float(&self.distance),
            Field::Ascent => FieldRef::Float(&self.ascent),
            Field::Descent => FieldRef::Float(&self.descent),
            Field::ElevationMin => FieldRef::Float(&self.elevation_min),
            Field::ElevationMax => FieldRef::Float(&self.elevation_max),
            Field::Speed => FieldRef::Float(&self.speed),
            Field::SpeedMax => FieldRef::Float(&self.speed_max),
            Field::Heartrate => FieldRef::Integer(&self.heartrate),
            Field::HeartrateMin => FieldRef::Integer(&self.heartrate_min),
            Field::HeartrateMax => FieldRef::Integer(&self.heartrate_max),
            Field::Calories => FieldRef::Integer(&self.calories),
            Field::Cadence => FieldRef::Integer(&self.cadence),
            Field::Power => FieldRef::Integer(&self.power),
            Field::Tags => FieldRef::Sequence(&self.tags),
            Field::Equipment => FieldRef::Sequence(&self.equipment),
            Field::Supplementary => FieldRef::Mapping(&self.metadata.supplementary),
            Field::Parts => FieldRef::Parts(&self.parts),
            Field::Metadata => FieldRef::Metadata(&self.metadata),
            Field::Resources => FieldRef::Resources(&self.resources),
        }
    }

    pub fn field_mut(&mut self, field: Field) -> FieldMut<'_> {
        match field {
            Field::Id => FieldMut::Id(&mut self.id),
            Field::Uid => FieldMut::Uid(&mut self.uid),
            Field::Name => FieldMut::Text(&mut self.name),
            Field::Type => FieldMut::Type(&mut self.activity_type),
            Field::Description => FieldMut::Text(&mut self.description),
            Field::Starttime => FieldMut::Time(&mut self.starttime),
            Field::Endtime => FieldMut::Time(&mut self.endtime),
            Field::StarttimeLocal => FieldMut::LocalTime(&mut self.starttime_local),
            Field::EndtimeLocal => FieldMut::LocalTime(&mut self.endtime_local),
            Field::Timezone => FieldMut::Text(&mut self.timezone),
            Field::Duration => FieldMut::Duration(&mut self.duration),
            Field::DurationMoving => FieldMut::Duration(&mut self.duration_moving),
            Field::Distance => FieldMut::Float(&mut self.distance),
            Field::Ascent => FieldMut::Float(&mut self.ascent),
            Field::Descent => FieldMut::Float(&mut self.descent),
            Field::ElevationMin => FieldMut::Float(&mut self.elevation_min),
            Field::ElevationMax => FieldMut::Float(&mut self.elevation_max),
            Field::Speed => FieldMut::Float(&mut self.speed),
            Field::SpeedMax => FieldMut::Float(&mut self.speed_max),
            Field::Heartrate => FieldMut::Integer(&mut self.heartrate),
            Field::HeartrateMin => FieldMut::Integer(&mut self.heartrate_min),
            Field::HeartrateMax => FieldMut::Integer(&mut self.heartrate_max),
            Field::Calories => FieldMut::Integer(&mut self.calories),
            Field::Cadence => FieldMut::Integer(&mut self.cadence),
            Field::Power => FieldMut::Integer(&mut self.power),
            Field::Tags => FieldMut::Sequence(&mut self.tags),
            Field::Equipment => FieldMut::Sequence(&mut self.equipment),
            Field::Supplementary => FieldMut::Mapping(&mut self.metadata.supplementary),
            Field::Parts => FieldMut::Parts(&mut self.parts),
            Field::Metadata => FieldMut::Metadata(&mut self.metadata),
            Field::Resources => FieldMut::Resources(&mut self.resources),
        }
    }

    /// Look up a declared or virtual field by name.
    pub fn value_of(&self, name: &str) -> Result<FieldValue> {
        if let Some(vf) = VirtualField::from_name(name) {
            return Ok(self.virtual_value(vf));
        }
        let field = Field::from_name(name)?;
        Ok(self.value(field))
    }

    pub fn value(&self, field: Field) -> FieldValue {
        fn opt<T: Clone>(v: &Option<T>, wrap: impl FnOnce(T) -> FieldValue) -> FieldValue {
            v.clone().map(wrap).unwrap_or(FieldValue::Missing)
        }

        match self.field(field) {
            FieldRef::Id(id) => FieldValue::Integer(id),
            FieldRef::Uid(v) => opt(v, FieldValue::Uid),
            FieldRef::Text(v) => opt(v, FieldValue::Text),
            FieldRef::Type(v) => opt(v, FieldValue::Type),
            FieldRef::Time(v) => opt(v, FieldValue::Time),
            FieldRef::LocalTime(v) => opt(v, FieldValue::LocalTime),
            FieldRef::Duration(v) => opt(v, FieldValue::Duration),
            FieldRef::Float(v) => opt(v, FieldValue::Float),
            FieldRef::Integer(v) => opt(v, |i| FieldValue::Integer(i64::from(i))),
            FieldRef::Sequence(v) => FieldValue::List(v.clone()),
            FieldRef::Mapping(v) => FieldValue::Map(v.clone()),
            FieldRef::Parts(v) => FieldValue::Count(v.len()),
            FieldRef::Metadata(v) => FieldValue::Count(v.supplementary.len()),
            FieldRef::Resources(v) => FieldValue::Count(v.len()),
        }
    }

    fn virtual_value(&self, vf: VirtualField) -> FieldValue {
        match vf {
            VirtualField::Classifier => self
                .classifier()
                .map(|c| FieldValue::Text(c.to_string()))
                .unwrap_or(FieldValue::Missing),
            VirtualField::Classifiers => FieldValue::List(self.classifiers()),
            VirtualField::Group => FieldValue::Bool(self.is_group()),
            VirtualField::Multipart => FieldValue::Bool(self.is_multipart()),
        }
    }
}

impl FieldRef<'_> {
    /// Whether the field still holds its default value.
    pub fn is_default(&self) -> bool {
        match self {
            FieldRef::Id(id) => *id == 0,
            FieldRef::Uid(v) => v.is_none(),
            FieldRef::Text(v) => v.is_none(),
            FieldRef::Type(v) => v.is_none(),
            FieldRef::Time(v) => v.is_none(),
            FieldRef::LocalTime(v) => v.is_none(),
            FieldRef::Duration(v) => v.is_none(),
            FieldRef::Float(v) => v.is_none(),
            FieldRef::Integer(v) => v.is_none(),
            FieldRef::Sequence(v) => v.is_empty(),
            FieldRef::Mapping(v) => v.is_empty(),
            FieldRef::Parts(v) => v.is_empty(),
            FieldRef::Metadata(v) => **v == Metadata::default(),
            FieldRef::Resources(v) => v.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconcileError;

    fn uid(s: &str) -> Uid {
        Uid::parse(s).unwrap()
    }

    #[test]
    fn test_group_and_multipart_flags() {
        let mut a = Activity::default();
        assert!(!a.is_group() && !a.is_multipart());

        a.metadata.members = [uid("polar:101"), uid("strava:101")].into_iter().collect();
        assert!(a.is_group());
        assert_eq!(a.classifiers(), vec!["polar", "strava"]);

        a.parts.push(ActivityPart {
            gap: TimeDelta::zero(),
            uids: vec![uid("polar:101")],
        });
        assert!(a.is_multipart());
    }

    #[test]
    fn test_tags_stay_sorted() {
        let mut a = Activity::default();
        a.tag("race");
        a.tag("commute");
        a.tag("race");
        assert_eq!(a.tags, vec!["commute", "race"]);
        a.untag("race");
        assert_eq!(a.tags, vec!["commute"]);
    }

    #[test]
    fn test_value_of() {
        let a = Activity {
            uid: Some(uid("strava:7")),
            distance: Some(10.0),
            heartrate: Some(140),
            ..Default::default()
        };
        assert_eq!(a.value_of("distance").unwrap(), FieldValue::Float(10.0));
        assert_eq!(a.value_of("heartrate").unwrap(), FieldValue::Integer(140));
        assert!(a.value_of("ascent").unwrap().is_missing());
        assert_eq!(
            a.value_of("classifier").unwrap(),
            FieldValue::Text("strava".to_string())
        );
        assert_eq!(a.value_of("group").unwrap(), FieldValue::Bool(false));
        assert!(matches!(
            a.value_of("pace"),
            Err(ReconcileError::UnknownField(_))
        ));
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{
            "id": 3,
            "uid": "polar:101",
            "type": "run",
            "starttime": "2022-02-22T10:00:00Z",
            "duration": 3600,
            "metadata": {"members": []}
        }"#;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.uid, Some(uid("polar:101")));
        assert_eq!(a.activity_type, Some(ActivityType::Run));
        assert_eq!(a.duration, Some(TimeDelta::hours(1)));

        let back = serde_json::to_value(&a).unwrap();
        assert_eq!(back["duration"], 3600);
        assert_eq!(back["type"], "run");
        assert!(back.get("distance").is_none());
    }

    #[test]
    fn test_out_of_range_durations_are_errors() {
        let json = r#"{"uid": "polar:1", "duration": 9223372036854775807}"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());

        let json = r#"{"uid": "polar:1", "duration_moving": -9223372036854775808}"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());

        let json = r#"{"parts": [{"gap": 9223372036854775807, "uids": ["polar:1"]}]}"#;
        assert!(serde_json::from_str::<Activity>(json).is_err());

        let json = r#"{"parts": [{"gap": -300, "uids": ["polar:1"]}]}"#;
        let a: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(a.parts[0].gap, TimeDelta::minutes(-5));
    }

    #[test]
    fn test_resources_for_classifier() {
        let resource = |path: &str, owner: Option<&str>| Resource {
            path: path.to_string(),
            uid: owner.map(uid),
            ..Default::default()
        };
        let a = Activity {
            resources: vec![
                resource("polar/101.gpx", Some("polar:101")),
                resource("strava/55.json", Some("strava:55")),
                resource("notes.txt", None),
            ],
            ..Default::default()
        };
        let polar: Vec<&str> = a.resources_for("polar").iter().map(|r| r.path.as_str()).collect();
        assert_eq!(polar, vec!["polar/101.gpx"]);
        assert!(a.resources_for("garmin").is_empty());
    }
}
