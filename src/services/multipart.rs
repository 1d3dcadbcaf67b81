// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multipart composites: one continuous session built from sequential
//! segments (e.g. swim, bike and run legs of a triathlon).

use chrono::TimeDelta;

use crate::error::Result;
use crate::models::{Activity, ActivityPart, FieldClass, Policy};
use crate::services::merge::Reconciler;
use crate::time_utils::format_duration;

impl Reconciler {
    /// Build the composite standing for `activities`.
    ///
    /// Segments are ordered by start time. Text fields are taken from the
    /// first segment that has them, tags and supplementary entries are
    /// unioned, and all other aggregable fields are combined by their
    /// policy. The composite has no uid of its own.
    pub fn multipart_of(&self, activities: &[&Activity]) -> Result<Activity> {
        let mut segments: Vec<&Activity> = activities.to_vec();
        segments.sort_by_key(|a| (a.starttime.is_none(), a.starttime));

        let mut multipart = Activity::default();
        for field in self.fields().mergeable() {
            if let FieldClass::Aggregable(Policy::First | Policy::Union | Policy::Merge) =
                self.fields().class(field)
            {
                self.union_field(&mut multipart, &segments, field, false)?;
            }
        }
        self.aggregate(&mut multipart, &segments)?;
        multipart.parts = parts_of(&segments);

        tracing::debug!(
            segments = multipart.parts.len(),
            kind = ?multipart.activity_type,
            "Built multipart activity"
        );
        Ok(multipart)
    }
}

/// Part list of chronologically sorted `segments`.
fn parts_of(segments: &[&Activity]) -> Vec<ActivityPart> {
    let mut parts = Vec::with_capacity(segments.len());
    let mut previous: Option<&Activity> = None;

    for segment in segments {
        let gap = match previous {
            None => TimeDelta::zero(),
            Some(prev) => match (prev.endtime, segment.starttime) {
                (Some(end), Some(start)) => {
                    let gap = start - end;
                    if gap < TimeDelta::zero() {
                        tracing::warn!(
                            id = segment.id,
                            overlap = %format_duration(-gap),
                            "Multipart segment overlaps its predecessor"
                        );
                    }
                    gap
                }
                _ => {
                    tracing::warn!(
                        id = segment.id,
                        "Multipart segment without start or end time, assuming no gap"
                    );
                    TimeDelta::zero()
                }
            },
        };
        parts.push(ActivityPart {
            gap,
            uids: segment.refs(),
        });
        previous = Some(segment);
    }
    parts
}
