// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory activity store.

use std::collections::BTreeMap;

use crate::db::ActivityStore;
use crate::error::{ReconcileError, Result};
use crate::models::{Activity, Uid};

/// Activities keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    activities: BTreeMap<i64, Activity>,
    pending: usize,
    commits: usize,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that fails every operation, for testing error paths.
    pub fn new_offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Create a store holding `activities`, assigning ids where missing.
    pub fn with_activities(activities: impl IntoIterator<Item = Activity>) -> Result<Self> {
        let mut store = Self::new();
        for activity in activities {
            store.upsert(activity)?;
        }
        store.commit()?;
        Ok(store)
    }

    pub fn get_by_id(&self, id: i64) -> Option<&Activity> {
        self.activities.get(&id)
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Number of commits so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Writes since the last commit.
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(ReconcileError::Store("store not connected (offline mode)".to_string()));
        }
        Ok(())
    }

    fn id_of_uid(&self, uid: &Uid) -> Option<i64> {
        self.activities
            .iter()
            .find(|(_, a)| a.uid.as_ref() == Some(uid))
            .map(|(id, _)| *id)
    }

    fn next_id(&self) -> i64 {
        self.activities.keys().next_back().map_or(1, |id| id + 1)
    }
}

impl ActivityStore for MemoryStore {
    fn get(&self, uid: &Uid) -> Result<Option<Activity>> {
        self.check_online()?;
        Ok(self
            .id_of_uid(uid)
            .and_then(|id| self.activities.get(&id))
            .cloned())
    }

    fn upsert(&mut self, mut activity: Activity) -> Result<i64> {
        self.check_online()?;
        if activity.id == 0 {
            activity.id = activity
                .uid
                .as_ref()
                .and_then(|uid| self.id_of_uid(uid))
                .unwrap_or_else(|| self.next_id());
        }
        let id = activity.id;
        tracing::debug!(id, uid = ?activity.uid.as_ref().map(Uid::as_str), "Upserting activity");
        self.activities.insert(id, activity);
        self.pending += 1;
        Ok(id)
    }

    fn remove(&mut self, activity: &Activity) -> Result<()> {
        self.check_online()?;
        let id = if self.activities.contains_key(&activity.id) {
            Some(activity.id)
        } else {
            activity.uid.as_ref().and_then(|uid| self.id_of_uid(uid))
        };
        match id {
            Some(id) => {
                self.activities.remove(&id);
                self.pending += 1;
                tracing::debug!(id, "Removed activity");
                Ok(())
            }
            None => Err(ReconcileError::Store(format!(
                "activity {} not found",
                activity
                    .uid
                    .as_ref()
                    .map_or_else(|| activity.id.to_string(), Uid::to_string)
            ))),
        }
    }

    fn commit(&mut self) -> Result<()> {
        self.check_online()?;
        tracing::debug!(writes = self.pending, "Committing store");
        self.pending = 0;
        self.commits += 1;
        Ok(())
    }
}
