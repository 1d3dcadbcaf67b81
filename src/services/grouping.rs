// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Grouping workflows.
//!
//! Handles the persistence side of reconciliation:
//! 1. Propose clusters of freshly imported activities
//! 2. Ask for confirmation and, if needed, a name
//! 3. Build the group record and store it together with member back-references
//! 4. Undo groups and multipart composites again

use crate::config::Config;
use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::{Activity, Uid};
use crate::services::clustering::cluster_by_starttime;
use crate::services::merge::{GroupOptions, Reconciler};
use crate::services::prompt::Prompt;
use crate::time_utils::format_utc_rfc3339;

/// What undoing one group touches: the record to delete and the members whose
/// back-reference is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct UngroupPlan {
    pub group: Activity,
    pub members: Vec<Activity>,
}

/// Runs grouping decisions against a store.
pub struct GroupingService<S, P> {
    config: Config,
    reconciler: Reconciler,
    store: S,
    prompt: P,
}

impl<S: ActivityStore, P: Prompt> GroupingService<S, P> {
    pub fn new(config: Config, store: S, prompt: P) -> Self {
        let reconciler = Reconciler::from_config(&config);
        Self::with_reconciler(config, reconciler, store, prompt)
    }

    pub fn with_reconciler(config: Config, reconciler: Reconciler, store: S, prompt: P) -> Self {
        Self {
            config,
            reconciler,
            store,
            prompt,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Group `activities` by start time proximity.
    ///
    /// Each proposed cluster is confirmed separately unless `force` is set;
    /// when members carry different names one of them is picked for the
    /// group. Every accepted group is committed on its own, so a declined or
    /// failed cluster never affects the others. Returns the stored groups.
    pub fn group_activities(&mut self, activities: &[Activity], force: bool) -> Result<Vec<Activity>> {
        let clusters = cluster_by_starttime(activities, self.config.group_threshold);
        tracing::info!(
            activities = activities.len(),
            clusters = clusters.len(),
            "Proposing activity groups"
        );

        let mut groups = Vec::new();
        for cluster in clusters {
            let mut group = self
                .reconciler
                .group_of(cluster.members(), GroupOptions::default())?;

            if !force {
                let question = format!(
                    "Group {} activities ({})?",
                    cluster.len(),
                    describe(cluster.members())
                );
                if !self.prompt.confirm(&question) {
                    tracing::info!(uid = ?group.uid.as_ref().map(Uid::as_str), "Grouping declined");
                    continue;
                }

                let names = cluster.names();
                if names.len() > 1 {
                    group.name = Some(
                        self.prompt
                            .choose("Select a name for the new activity group:", &names),
                    );
                }
            }

            group.id = self.store.upsert(group.clone())?;
            for member in cluster.members() {
                let mut member = (*member).clone();
                member.metadata.member_of = group.uid.clone();
                self.store.upsert(member)?;
            }
            self.store.commit()?;

            tracing::info!(
                id = group.id,
                uid = ?group.uid.as_ref().map(Uid::as_str),
                members = cluster.len(),
                "Created activity group"
            );
            groups.push(group);
        }
        Ok(groups)
    }

    /// Resolve the members of `group` through the store and ask for
    /// confirmation unless `force` is set.
    ///
    /// Returns `None` when `group` is not a group or the user declined.
    pub fn plan_ungroup(&mut self, group: &Activity, force: bool) -> Result<Option<UngroupPlan>> {
        if !group.is_group() {
            tracing::debug!(id = group.id, "Not a group, nothing to ungroup");
            return Ok(None);
        }

        let mut members = Vec::with_capacity(group.metadata.members.len());
        for uid in &group.metadata.members {
            match self.store.get(uid)? {
                Some(member) => members.push(member),
                None => tracing::warn!(group = group.id, member = %uid, "Group member not found"),
            }
        }

        if !force {
            let question = format!(
                "Ungroup activity {} ({}, {})?",
                group.id,
                group.name.as_deref().unwrap_or("unnamed"),
                group
                    .starttime
                    .map_or_else(|| "no start time".to_string(), format_utc_rfc3339)
            );
            if !self.prompt.confirm(&question) {
                return Ok(None);
            }
        }

        Ok(Some(UngroupPlan {
            group: group.clone(),
            members,
        }))
    }

    /// Ungroup `groups`. With `pretend` the plans are only reported.
    pub fn ungroup_activities(
        &mut self,
        groups: &[Activity],
        force: bool,
        pretend: bool,
    ) -> Result<Vec<UngroupPlan>> {
        let mut plans = Vec::new();
        for group in groups {
            if let Some(plan) = self.plan_ungroup(group, force)? {
                plans.push(plan);
            }
        }

        if pretend {
            tracing::info!(groups = plans.len(), "Pretending, store left untouched");
            return Ok(plans);
        }

        for plan in &plans {
            self.apply(plan)?;
        }
        if !plans.is_empty() {
            self.store.commit()?;
        }
        Ok(plans)
    }

    /// Delete the group record and clear the members' back-references.
    fn apply(&mut self, plan: &UngroupPlan) -> Result<()> {
        self.store.remove(&plan.group)?;
        for member in &plan.members {
            let mut member = member.clone();
            member.metadata.member_of = None;
            self.store.upsert(member)?;
        }
        tracing::info!(
            id = plan.group.id,
            members = plan.members.len(),
            "Removed activity group"
        );
        Ok(())
    }

    /// Combine sequential `activities` into a multipart composite and store
    /// it. Returns `None` for fewer than two segments, more than the
    /// configured maximum, or when declined.
    pub fn part_activities(
        &mut self,
        activities: &[Activity],
        force: bool,
        pretend: bool,
    ) -> Result<Option<Activity>> {
        if activities.len() < 2 {
            tracing::debug!(segments = activities.len(), "Not enough segments for a multipart activity");
            return Ok(None);
        }
        if activities.len() > self.config.max_multipart_segments {
            tracing::warn!(
                segments = activities.len(),
                max = self.config.max_multipart_segments,
                "Too many segments for a multipart activity"
            );
            return Ok(None);
        }

        let segments: Vec<&Activity> = activities.iter().collect();
        let mut multipart = self.reconciler.multipart_of(&segments)?;

        if !force {
            let question = format!(
                "Create multipart activity from {} activities ({})?",
                segments.len(),
                describe(&segments)
            );
            if !self.prompt.confirm(&question) {
                return Ok(None);
            }
        }

        if !pretend {
            multipart.id = self.store.upsert(multipart.clone())?;
            self.store.commit()?;
            tracing::info!(id = multipart.id, segments = segments.len(), "Created multipart activity");
        }
        Ok(Some(multipart))
    }

    /// Remove multipart composites among `activities`, leaving their segments
    /// untouched. Returns the composites removed (or, with `pretend`, those
    /// that would be).
    pub fn unpart_activities(
        &mut self,
        activities: &[Activity],
        force: bool,
        pretend: bool,
    ) -> Result<Vec<Activity>> {
        let mut removed = Vec::new();
        for activity in activities.iter().filter(|a| a.is_multipart()) {
            if !force {
                let question = format!(
                    "Remove multipart activity {} with {} parts?",
                    activity.id,
                    activity.parts.len()
                );
                if !self.prompt.confirm(&question) {
                    continue;
                }
            }
            if !pretend {
                self.store.remove(activity)?;
            }
            removed.push(activity.clone());
        }
        if !pretend && !removed.is_empty() {
            self.store.commit()?;
        }
        Ok(removed)
    }
}

fn describe(activities: &[&Activity]) -> String {
    activities
        .iter()
        .map(|a| {
            a.uid
                .as_ref()
                .map_or_else(|| a.id.to_string(), Uid::to_string)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::prompt::AssumeYes;

    #[test]
    fn test_reconciler_follows_config() {
        let config = Config {
            local_timezone: "Europe/Berlin".to_string(),
            ..Config::default()
        };
        let service = GroupingService::new(config, MemoryStore::new(), AssumeYes);
        assert_eq!(service.reconciler().local_timezone(), "Europe/Berlin");
    }

    #[test]
    fn test_describe() {
        let a = Activity {
            uid: Some(Uid::parse("polar:1").unwrap()),
            ..Default::default()
        };
        let b = Activity {
            id: 7,
            ..Default::default()
        };
        assert_eq!(describe(&[&a, &b]), "polar:1, 7");
    }
}
