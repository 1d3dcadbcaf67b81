// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cross-source addressing of sources, activities, resources and segments.
//!
//! The canonical form is `<classifier>[:<local_id>][?<path>][#<part>]`, e.g.
//! `polar`, `polar:101`, `polar:101?recording.gpx` or `polar:101#2`. Equality,
//! ordering and hashing are defined on that string alone.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{ReconcileError, Result};

/// Explicit uid components. Fields left as `None` are not set (or, when used
/// as overrides in [`Uid::parse_with`], do not override the parsed value).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UidParts {
    pub classifier: Option<String>,
    pub local_id: Option<i64>,
    pub path: Option<String>,
    pub part: Option<u32>,
}

/// Immutable address of a source, an activity, a resource or a segment.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid {
    classifier: String,
    local_id: Option<i64>,
    path: Option<String>,
    part: Option<u32>,
    canonical: String,
}

impl Uid {
    /// Parse a canonical uid string.
    pub fn parse(s: &str) -> Result<Self> {
        Self::from_parts(split(s)?)
    }

    /// Parse a uid string, letting the explicitly given components win over
    /// the parsed ones.
    pub fn parse_with(s: &str, overrides: UidParts) -> Result<Self> {
        let parsed = split(s)?;
        Self::from_parts(UidParts {
            classifier: overrides.classifier.or(parsed.classifier),
            local_id: overrides.local_id.or(parsed.local_id),
            path: overrides.path.or(parsed.path),
            part: overrides.part.or(parsed.part),
        })
    }

    /// Build a uid from explicit components.
    pub fn from_parts(parts: UidParts) -> Result<Self> {
        let classifier = parts
            .classifier
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ReconcileError::InvalidUid("missing classifier".to_string()))?;

        if has_outer_whitespace(&classifier) {
            return Err(ReconcileError::InvalidUid(format!(
                "classifier {:?} has leading or trailing whitespace",
                classifier
            )));
        }
        if classifier.contains([':', '?', '#']) {
            return Err(ReconcileError::InvalidUid(format!(
                "classifier {:?} contains a reserved character",
                classifier
            )));
        }

        let path = parts.path.filter(|p| !p.is_empty());
        if let Some(path) = &path {
            if has_outer_whitespace(path) {
                return Err(ReconcileError::InvalidUid(format!(
                    "path {:?} has leading or trailing whitespace",
                    path
                )));
            }
            if path.contains('#') {
                return Err(ReconcileError::InvalidUid(format!(
                    "path {:?} contains a reserved character",
                    path
                )));
            }
        }

        if path.is_some() && parts.part.is_some() {
            return Err(ReconcileError::InvalidUid(format!(
                "{}: path and part are mutually exclusive",
                classifier
            )));
        }

        let mut canonical = classifier.clone();
        if let Some(id) = parts.local_id {
            canonical.push_str(&format!(":{}", id));
        }
        if let Some(path) = &path {
            canonical.push_str(&format!("?{}", path));
        }
        if let Some(part) = parts.part {
            canonical.push_str(&format!("#{}", part));
        }

        Ok(Self {
            classifier,
            local_id: parts.local_id,
            path,
            part: parts.part,
            canonical,
        })
    }

    /// Uid denoting a whole source.
    pub fn service(classifier: &str) -> Result<Self> {
        Self::from_parts(UidParts {
            classifier: Some(classifier.to_string()),
            ..Default::default()
        })
    }

    /// Uid denoting one activity of a source.
    pub fn activity(classifier: &str, local_id: i64) -> Result<Self> {
        Self::from_parts(UidParts {
            classifier: Some(classifier.to_string()),
            local_id: Some(local_id),
            ..Default::default()
        })
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn local_id(&self) -> Option<i64> {
        self.local_id
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn part(&self) -> Option<u32> {
        self.part
    }

    /// Canonical string form.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// `classifier[:local_id]`
    pub fn head(&self) -> String {
        match self.local_id {
            Some(id) => format!("{}:{}", self.classifier, id),
            None => self.classifier.clone(),
        }
    }

    /// Resource path or part number, whichever is present.
    pub fn tail(&self) -> Option<String> {
        match (&self.path, self.part) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(part)) => Some(part.to_string()),
            (None, None) => None,
        }
    }

    pub fn components(&self) -> UidParts {
        UidParts {
            classifier: Some(self.classifier.clone()),
            local_id: self.local_id,
            path: self.path.clone(),
            part: self.part,
        }
    }

    /// Same uid with the path reduced to its file name.
    pub fn base(&self) -> Self {
        match &self.path {
            Some(path) => {
                let name = path.rsplit('/').next().unwrap_or(path.as_str());
                self.with(|p| p.path = Some(name.to_string()))
            }
            None => self.clone(),
        }
    }

    /// The activity this uid belongs to, without path or part.
    pub fn as_activity(&self) -> Self {
        self.with(|p| {
            p.path = None;
            p.part = None;
        })
    }

    pub fn with_path(&self, path: &str) -> Result<Self> {
        let mut parts = self.components();
        parts.path = Some(path.to_string());
        Self::from_parts(parts)
    }

    pub fn with_part(&self, part: u32) -> Result<Self> {
        let mut parts = self.components();
        parts.part = Some(part);
        Self::from_parts(parts)
    }

    /// Infallible rebuild for edits that only strip or shorten components.
    fn with(&self, edit: impl FnOnce(&mut UidParts)) -> Self {
        let mut parts = self.components();
        edit(&mut parts);
        Self::from_parts(parts).unwrap_or_else(|_| self.clone())
    }

    /// Classifier only. When `services` is non-empty the classifier must
    /// also be one of them.
    pub fn denotes_service(&self, services: &[&str]) -> bool {
        let is_service = self.local_id.is_none() && self.path.is_none() && self.part.is_none();
        is_service && (services.is_empty() || services.contains(&self.classifier.as_str()))
    }

    pub fn denotes_activity(&self) -> bool {
        self.local_id.is_some() && self.path.is_none()
    }

    pub fn denotes_resource(&self) -> bool {
        self.local_id.is_some() && self.path.is_some()
    }

    pub fn denotes_part(&self) -> bool {
        self.local_id.is_some() && self.part.is_some()
    }
}

/// Parsing trims its input, so components must not start or end with whitespace.
fn has_outer_whitespace(s: &str) -> bool {
    s.trim() != s
}

/// Split a canonical string into its components without validating them.
fn split(s: &str) -> Result<UidParts> {
    let s = s.trim();
    let invalid = |reason: &str| ReconcileError::InvalidUid(format!("{:?}: {}", s, reason));

    let (rest, part) = match s.rsplit_once('#') {
        Some((rest, "")) => (rest, None),
        Some((rest, part)) => (
            rest,
            Some(part.parse::<u32>().map_err(|_| invalid("part is not a number"))?),
        ),
        None => (s, None),
    };

    let (rest, path) = match rest.split_once('?') {
        Some((rest, path)) => (rest, Some(path.to_string())),
        None => (rest, None),
    };

    let (classifier, local_id) = match rest.split_once(':') {
        Some((classifier, "")) => (classifier, None),
        Some((classifier, id)) => (
            classifier,
            Some(id.parse::<i64>().map_err(|_| invalid("local id is not a number"))?),
        ),
        None => (rest, None),
    };

    if classifier.is_empty() {
        return Err(invalid("missing classifier"));
    }

    Ok(UidParts {
        classifier: Some(classifier.to_string()),
        local_id,
        path,
        part,
    })
}

impl PartialEq for Uid {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Uid {}

impl PartialEq<str> for Uid {
    fn eq(&self, other: &str) -> bool {
        self.canonical == other
    }
}

impl PartialEq<&str> for Uid {
    fn eq(&self, other: &&str) -> bool {
        self.canonical == *other
    }
}

impl Hash for Uid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Ord for Uid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl PartialOrd for Uid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.canonical)
    }
}

impl FromStr for Uid {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = ReconcileError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.canonical
    }
}
