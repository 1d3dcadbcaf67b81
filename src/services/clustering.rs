// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Candidate group discovery by start time proximity.
//!
//! Activities are sorted by start time and chained while the distance to the
//! immediately preceding activity stays below the threshold. Chaining on
//! consecutive gaps tolerates small clock skew between sources while keeping
//! the walk linear after the sort.

use chrono::TimeDelta;

use crate::models::Activity;

/// Activities likely recorded for the same real-world event, in start time order.
#[derive(Debug, Clone)]
pub struct ActivityCluster<'a> {
    members: Vec<&'a Activity>,
}

impl<'a> ActivityCluster<'a> {
    /// Chronologically first member.
    pub fn head(&self) -> &'a Activity {
        self.members[0]
    }

    /// All members but the head.
    pub fn tail(&self) -> &[&'a Activity] {
        &self.members[1..]
    }

    pub fn members(&self) -> &[&'a Activity] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Distinct names of the members, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .iter()
            .filter_map(|a| a.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Propose groups among `activities` whose consecutive start times are less
/// than `threshold` apart. Singletons are dropped; activities without a
/// start time are ignored.
pub fn cluster_by_starttime<'a, I>(activities: I, threshold: TimeDelta) -> Vec<ActivityCluster<'a>>
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut timed: Vec<&'a Activity> = activities
        .into_iter()
        .filter(|a| {
            if a.starttime.is_none() {
                tracing::debug!(id = a.id, "Skipping activity without start time");
            }
            a.starttime.is_some()
        })
        .collect();
    timed.sort_by_key(|a| a.starttime);

    let mut clusters: Vec<ActivityCluster<'a>> = Vec::new();
    let mut current: Vec<&'a Activity> = Vec::new();

    for activity in timed {
        if let Some(previous) = current.last() {
            let gap = match (activity.starttime, previous.starttime) {
                (Some(next), Some(prev)) => next - prev,
                _ => threshold,
            };
            if gap >= threshold {
                clusters.push(ActivityCluster {
                    members: std::mem::take(&mut current),
                });
            }
        }
        current.push(activity);
    }
    if !current.is_empty() {
        clusters.push(ActivityCluster { members: current });
    }

    clusters.retain(|c| c.len() > 1);

    tracing::debug!(clusters = clusters.len(), "Proposed activity groups");
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32, s: u32, name: &str) -> Activity {
        Activity {
            name: Some(name.to_string()),
            starttime: Some(Utc.with_ymd_and_hms(2022, 2, 22, h, m, s).unwrap()),
            ..Default::default()
        }
    }

    fn names(cluster: &ActivityCluster<'_>) -> Vec<String> {
        cluster
            .members()
            .iter()
            .filter_map(|a| a.name.clone())
            .collect()
    }

    #[test]
    fn test_consecutive_gaps() {
        let activities = vec![
            at(14, 0, 0, "a3"),
            at(10, 0, 1, "a2"),
            at(17, 0, 0, "a6"),
            at(10, 0, 0, "a1"),
            at(14, 0, 1, "a4"),
            at(14, 0, 2, "a5"),
        ];

        let clusters = cluster_by_starttime(&activities, TimeDelta::seconds(180));
        assert_eq!(clusters.len(), 2);
        assert_eq!(names(&clusters[0]), vec!["a1", "a2"]);
        assert_eq!(names(&clusters[1]), vec!["a3", "a4", "a5"]);
        assert_eq!(clusters[1].head().name.as_deref(), Some("a3"));
        assert_eq!(clusters[1].tail().len(), 2);
    }

    #[test]
    fn test_chain_longer_than_threshold() {
        // 0s, 150s, 300s: first and last are 300s apart but chained by the middle one.
        let activities = vec![
            at(10, 0, 0, "a"),
            at(10, 2, 30, "b"),
            at(10, 5, 0, "c"),
        ];
        let clusters = cluster_by_starttime(&activities, TimeDelta::seconds(180));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let activities = vec![at(10, 0, 0, "a"), at(10, 3, 0, "b")];
        assert!(cluster_by_starttime(&activities, TimeDelta::seconds(180)).is_empty());
    }

    #[test]
    fn test_empty_and_equal_times() {
        let empty: Vec<Activity> = Vec::new();
        assert!(cluster_by_starttime(&empty, TimeDelta::seconds(180)).is_empty());

        let activities = vec![at(10, 0, 0, "a"), at(10, 0, 0, "b")];
        let clusters = cluster_by_starttime(&activities, TimeDelta::seconds(180));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].names(), vec!["a", "b"]);
    }

    #[test]
    fn test_activities_without_starttime_are_ignored() {
        let activities = vec![at(10, 0, 0, "a"), Activity::default(), at(10, 0, 5, "b")];
        let clusters = cluster_by_starttime(&activities, TimeDelta::seconds(180));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }
}
