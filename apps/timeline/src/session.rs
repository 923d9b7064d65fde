//! Orchestrates one selected day: cache-first loads, optimistic mutations,
//! and chain cascades. Plans come from `DayTimeline`; this module executes
//! them against the API and keeps the cache in step.
//!
//! Mutations apply locally first and fire the request behind the scenes.
//! A failed request is logged and the optimistic state stands; the next
//! full load reconciles with the server.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use tracing::warn;

use crate::api::{ClientError, EntryApi};
use crate::cache::EntryCache;
use crate::model::{EntryId, EntryPatch, NewEntry, TimeEntry};
use crate::reconcile::{CopyPreviousPlan, DayTimeline, SavePlan, TimeSlot};
use crate::slots::SlotTime;

/// How often callers should re-stamp the current slot.
pub const CLOCK_TICK: Duration = Duration::from_secs(60);

/// What a "same as previous" gesture resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPreviousOutcome {
    NothingToCopy,
    NeedsConfirm,
    Applied,
}

pub struct TimelineSession {
    api: Arc<dyn EntryApi>,
    cache: Arc<dyn EntryCache>,
    timeline: Mutex<DayTimeline>,
}

impl TimelineSession {
    pub fn new(api: Arc<dyn EntryApi>, cache: Arc<dyn EntryCache>, date: &str) -> Self {
        Self {
            api,
            cache,
            timeline: Mutex::new(DayTimeline::new(date)),
        }
    }

    pub async fn date(&self) -> String {
        self.timeline.lock().await.date().to_string()
    }

    /// Switches to a date. Cached entries render first; the network result
    /// replaces them when it arrives. A network failure on a cached day is
    /// logged and the cached view stands; on an uncached day it surfaces.
    pub async fn load(&self, date: &str) -> Result<(), ClientError> {
        let cached = self.cache.load(date).await;
        if let Some(entries) = cached.clone() {
            *self.timeline.lock().await = DayTimeline::from_entries(date, entries);
        } else {
            *self.timeline.lock().await = DayTimeline::new(date);
        }

        match self.api.fetch_entries(date).await {
            Ok(entries) => {
                self.cache.store(date, entries.clone()).await;
                *self.timeline.lock().await = DayTimeline::from_entries(date, entries);
                Ok(())
            }
            Err(err) if cached.is_some() => {
                warn!(%date, error = %err, "entry refresh failed, keeping cached day");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn slots(&self, now: NaiveDateTime) -> Vec<TimeSlot> {
        self.timeline.lock().await.slots(now)
    }

    /// The activity text a slot should render, chains resolved.
    pub async fn display_activity(&self, start_time: &str) -> Option<String> {
        self.timeline
            .lock()
            .await
            .resolve_display(start_time)
            .map(str::to_string)
    }

    /// Saves one slot's editor content. Clearing or rewriting a slot that
    /// anchors a chain cascades the downstream markers, so nothing keeps
    /// inheriting content the user replaced.
    pub async fn save_slot(
        &self,
        slot: &SlotTime,
        activity: &str,
        thought: Option<&str>,
        is_same_as_previous: bool,
    ) -> Result<(), ClientError> {
        let (plan, cascade) = {
            let timeline = self.timeline.lock().await;
            let plan = timeline.plan_save(slot, activity, thought, is_same_as_previous);
            let cascade = match &plan {
                SavePlan::Update { .. } if !is_same_as_previous => {
                    timeline.plan_chain_break(&slot.start_time)
                }
                _ => Vec::new(),
            };
            (plan, cascade)
        };
        match plan {
            SavePlan::Delete { .. } => return self.delete_slot(&slot.start_time).await,
            other => self.execute(other).await,
        }
        self.cascade_delete(cascade).await;
        self.sync_cache().await;
        Ok(())
    }

    /// Deletes the entry at a slot plus the contiguous chain markers that
    /// inherited from it.
    pub async fn delete_slot(&self, start_time: &str) -> Result<(), ClientError> {
        let ids = {
            let timeline = self.timeline.lock().await;
            let Some(target) = timeline.entry_at(start_time).map(|e| e.id.clone()) else {
                return Ok(());
            };
            let mut ids = vec![target];
            ids.extend(timeline.plan_chain_break(start_time));
            ids
        };
        self.cascade_delete(ids).await;
        self.sync_cache().await;
        Ok(())
    }

    async fn cascade_delete(&self, ids: Vec<EntryId>) {
        if ids.is_empty() {
            return;
        }
        let removed = {
            let mut timeline = self.timeline.lock().await;
            ids.iter()
                .filter_map(|id| timeline.remove(id))
                .collect::<Vec<_>>()
        };
        for entry in &removed {
            if let Some(id) = entry.id.persisted() {
                if let Err(err) = self.api.delete_entry(id).await {
                    warn!(%id, error = %err, "entry delete failed, keeping local removal");
                }
            }
        }
    }

    /// Runs the "same as previous" gesture for a slot.
    pub async fn copy_previous(
        &self,
        start_time: &str,
        confirmed: bool,
    ) -> Result<CopyPreviousOutcome, ClientError> {
        let plan = {
            let timeline = self.timeline.lock().await;
            timeline.plan_copy_previous(start_time, confirmed)
        };
        match plan {
            CopyPreviousPlan::NothingToCopy => Ok(CopyPreviousOutcome::NothingToCopy),
            CopyPreviousPlan::NeedsConfirm => Ok(CopyPreviousOutcome::NeedsConfirm),
            CopyPreviousPlan::Apply { writes } => {
                for write in writes {
                    self.execute(write).await;
                }
                self.sync_cache().await;
                Ok(CopyPreviousOutcome::Applied)
            }
        }
    }

    /// Applies one activity to a selected run of slots.
    pub async fn apply_batch(
        &self,
        start_times: &[String],
        activity: &str,
    ) -> Result<(), ClientError> {
        let plans = {
            let timeline = self.timeline.lock().await;
            timeline.plan_batch(start_times, activity)
        };
        for plan in plans {
            self.execute(plan).await;
        }
        self.sync_cache().await;
        Ok(())
    }

    /// Applies one mutation optimistically, then settles it against the
    /// server. Failures are logged, never rolled back.
    async fn execute(&self, plan: SavePlan) {
        match plan {
            SavePlan::Noop | SavePlan::Delete { .. } => {}
            SavePlan::Create { entry } => {
                let placeholder = TimeEntry {
                    id: EntryId::local(&entry.date, &entry.start_time),
                    date: entry.date.clone(),
                    start_time: entry.start_time.clone(),
                    end_time: entry.end_time.clone(),
                    activity: entry.activity.clone(),
                    thought: entry.thought.clone(),
                    is_same_as_previous: entry.is_same_as_previous,
                };
                let placeholder_id = placeholder.id.clone();
                self.timeline.lock().await.upsert(placeholder);

                match self.api.create_entry(&entry).await {
                    Ok(Some(row)) => self.timeline.lock().await.upsert(row),
                    Ok(None) => {
                        // The server judged the entry blank and stored
                        // nothing; drop the placeholder to match.
                        self.timeline.lock().await.remove(&placeholder_id);
                    }
                    Err(err) => {
                        warn!(start_time = %entry.start_time, error = %err,
                            "entry create failed, keeping optimistic entry");
                    }
                }
            }
            SavePlan::Update { id, patch } => {
                {
                    let mut timeline = self.timeline.lock().await;
                    if let Some(entry) = timeline.entry_at_id(&id).cloned() {
                        timeline.upsert(patched(entry, &patch));
                    }
                }
                // A still-local id means the create is in flight; its
                // response will carry the latest content when it lands.
                let Some(persisted) = id.persisted() else {
                    return;
                };
                match self.api.update_entry(persisted, &patch).await {
                    Ok(row) => self.timeline.lock().await.upsert(row),
                    Err(err) => {
                        warn!(id = %persisted, error = %err,
                            "entry update failed, keeping optimistic entry");
                    }
                }
            }
        }
    }

    async fn sync_cache(&self) {
        let (date, entries) = {
            let timeline = self.timeline.lock().await;
            (
                timeline.date().to_string(),
                timeline.entries().cloned().collect::<Vec<_>>(),
            )
        };
        self.cache.store(&date, entries).await;
    }
}

fn patched(mut entry: TimeEntry, patch: &EntryPatch) -> TimeEntry {
    if let Some(activity) = &patch.activity {
        entry.activity = activity.clone();
    }
    if let Some(thought) = &patch.thought {
        entry.thought = (!thought.is_empty()).then(|| thought.clone());
    }
    if let Some(is_same) = patch.is_same_as_previous {
        entry.is_same_as_previous = is_same;
    }
    entry
}
