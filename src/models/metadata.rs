// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supplementary per-activity attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Uid;

/// Bookkeeping attributes attached to every activity.
///
/// `members` is only populated on group records and is the single source of
/// truth for whether an activity is a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub favourite: bool,
    /// Uids of the activities a group record stands for
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub members: BTreeSet<Uid>,
    /// Back-reference from a group member to its group record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of: Option<Uid>,
    /// Open extension map for attributes without a dedicated field
    #[serde(default, flatten)]
    pub supplementary: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn is_group(&self) -> bool {
        self.members.len() > 1
    }

    /// Look up a supplementary attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.supplementary.get(key)
    }

    /// Set a supplementary attribute, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.supplementary.insert(key.into(), value)
    }

    /// Refresh `modified`, initialising `created` on first touch.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified = Some(now);
        if self.created.is_none() {
            self.created = self.modified;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_needs_two_members() {
        let mut md = Metadata::default();
        assert!(!md.is_group());
        md.members.insert(Uid::parse("polar:101").unwrap());
        assert!(!md.is_group());
        md.members.insert(Uid::parse("strava:101").unwrap());
        assert!(md.is_group());
    }

    #[test]
    fn test_supplementary_roundtrip() {
        let json = r#"{"favourite":true,"members":["strava:101","polar:101"],"f1":"v1"}"#;
        let md: Metadata = serde_json::from_str(json).unwrap();
        assert!(md.favourite);
        assert_eq!(md.get("f1"), Some(&Value::from("v1")));
        let members: Vec<&str> = md.members.iter().map(Uid::as_str).collect();
        assert_eq!(members, vec!["polar:101", "strava:101"]);
    }

    #[test]
    fn test_touch_keeps_created() {
        let mut md = Metadata::default();
        let first = Utc::now();
        md.touch(first);
        assert_eq!(md.created, Some(first));
        let later = first + chrono::TimeDelta::seconds(5);
        md.touch(later);
        assert_eq!(md.created, Some(first));
        assert_eq!(md.modified, Some(later));
    }
}
