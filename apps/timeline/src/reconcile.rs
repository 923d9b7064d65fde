//! The day timeline reconciler: joins the fixed slot grid with the entries
//! fetched (or optimistically applied) for one date, and computes the
//! mutation plans for saves, "same as previous" chains, and batch edits.
//!
//! Everything here is pure. Plans are data; `TimelineSession` executes
//! them against the API.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::model::{EntryId, EntryPatch, NewEntry, TimeEntry};
use crate::slots::{self, SlotStatus, SlotTime};

/// One grid slot joined with its entry and wall-clock status.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub entry: Option<TimeEntry>,
    pub is_current: bool,
}

/// The single mutation a save resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SavePlan {
    /// Nothing to persist: blank content on an empty slot.
    Noop,
    /// Blank content over an existing, non-chained entry: delete it.
    Delete { id: EntryId },
    Create { entry: NewEntry },
    Update { id: EntryId, patch: EntryPatch },
}

/// Outcome of a "same as previous" gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyPreviousPlan {
    /// No prior slot with real content or an existing chain to anchor on.
    NothingToCopy,
    /// The target slot already holds user content; ask before overwriting.
    NeedsConfirm,
    /// Marker writes: the target slot plus any empty gap slots back up to
    /// the anchor, all flagged `is_same_as_previous` with no own content.
    Apply { writes: Vec<SavePlan> },
}

/// Entries for one selected date, keyed by slot start time. The key is the
/// logical identity, so a server row replaces its optimistic placeholder
/// on upsert.
#[derive(Debug, Clone)]
pub struct DayTimeline {
    date: String,
    grid: Vec<SlotTime>,
    entries: BTreeMap<String, TimeEntry>,
}

impl DayTimeline {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            grid: slots::day_slots(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_entries(date: impl Into<String>, entries: Vec<TimeEntry>) -> Self {
        let mut timeline = Self::new(date);
        timeline.replace_all(entries);
        timeline
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn entries(&self) -> impl Iterator<Item = &TimeEntry> {
        self.entries.values()
    }

    pub fn entry_at(&self, start_time: &str) -> Option<&TimeEntry> {
        self.entries.get(start_time)
    }

    pub fn entry_at_id(&self, id: &EntryId) -> Option<&TimeEntry> {
        self.entries.values().find(|e| &e.id == id)
    }

    pub fn replace_all(&mut self, entries: Vec<TimeEntry>) {
        self.entries = entries
            .into_iter()
            .map(|e| (e.start_time.clone(), e))
            .collect();
    }

    /// Inserts or replaces the entry for its slot. Last write for a start
    /// time wins, whenever it arrives.
    pub fn upsert(&mut self, entry: TimeEntry) {
        self.entries.insert(entry.start_time.clone(), entry);
    }

    pub fn remove(&mut self, id: &EntryId) -> Option<TimeEntry> {
        let key = self
            .entries
            .iter()
            .find(|(_, e)| &e.id == id)
            .map(|(k, _)| k.clone())?;
        self.entries.remove(&key)
    }

    /// Joins the grid with the entries and stamps each slot's status for
    /// the given wall-clock instant. Callers drive `now` from a coarse
    /// tick, not from every read.
    pub fn slots(&self, now: NaiveDateTime) -> Vec<TimeSlot> {
        let is_today = slots::format_date_key(now.date()) == self.date;
        let current_start = slots::current_slot_start(now.time());

        self.grid
            .iter()
            .map(|slot| {
                let entry = self.entries.get(&slot.start_time).cloned();
                let is_current = is_today && slot.start_time == current_start;
                let status = if is_current {
                    SlotStatus::Current
                } else if entry.is_some() {
                    SlotStatus::Recorded
                } else {
                    SlotStatus::Future
                };
                TimeSlot {
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                    status,
                    entry,
                    is_current,
                }
            })
            .collect()
    }

    /// The activity a slot should display. Chained slots inherit by
    /// reference: walk backward to the nearest entry with real content
    /// instead of duplicating the text into every marker.
    pub fn resolve_display(&self, start_time: &str) -> Option<&str> {
        let entry = self.entries.get(start_time)?;
        if !entry.activity.trim().is_empty() {
            return Some(&entry.activity);
        }
        if !entry.is_same_as_previous {
            return None;
        }
        self.entries
            .range(..start_time.to_string())
            .rev()
            .map(|(_, e)| e)
            .find(|e| !e.activity.trim().is_empty())
            .map(|e| e.activity.as_str())
    }

    /// Resolves one save to its mutation. Blank content over an existing
    /// entry deletes it unless the slot is a chain marker; blank content on
    /// an empty slot is a no-op.
    pub fn plan_save(
        &self,
        slot: &SlotTime,
        activity: &str,
        thought: Option<&str>,
        is_same_as_previous: bool,
    ) -> SavePlan {
        let blank = activity.trim().is_empty()
            && thought.map_or(true, |t| t.trim().is_empty());
        let existing = self.entries.get(&slot.start_time);

        if blank && !is_same_as_previous {
            return match existing {
                Some(entry) => SavePlan::Delete {
                    id: entry.id.clone(),
                },
                None => SavePlan::Noop,
            };
        }

        match existing {
            Some(entry) => SavePlan::Update {
                id: entry.id.clone(),
                patch: EntryPatch {
                    activity: Some(activity.to_string()),
                    thought: Some(thought.unwrap_or_default().to_string()),
                    is_same_as_previous: Some(is_same_as_previous),
                },
            },
            None => SavePlan::Create {
                entry: NewEntry {
                    date: self.date.clone(),
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                    activity: activity.to_string(),
                    thought: thought
                        .filter(|t| !t.trim().is_empty())
                        .map(str::to_string),
                    is_same_as_previous,
                },
            },
        }
    }

    /// The ids of the immediately-following contiguous run of chain
    /// markers. Editing a slot with real content or deleting it cascades
    /// these, so no marker silently inherits from stale content.
    pub fn plan_chain_break(&self, start_time: &str) -> Vec<EntryId> {
        let Some(index) = self.grid_index(start_time) else {
            return Vec::new();
        };

        let mut ids = Vec::new();
        for slot in &self.grid[index + 1..] {
            match self.entries.get(&slot.start_time) {
                Some(entry) if entry.is_same_as_previous => ids.push(entry.id.clone()),
                _ => break,
            }
        }
        ids
    }

    /// Plans the "same as previous" gesture for a slot. The anchor is the
    /// nearest prior slot with real activity or an existing chain marker;
    /// the plan backfills markers through the empty gap up to the anchor.
    pub fn plan_copy_previous(&self, start_time: &str, confirmed: bool) -> CopyPreviousPlan {
        let Some(target_index) = self.grid_index(start_time) else {
            return CopyPreviousPlan::NothingToCopy;
        };

        let anchor_index = self.grid[..target_index]
            .iter()
            .rposition(|slot| {
                self.entries
                    .get(&slot.start_time)
                    .is_some_and(|e| !e.activity.trim().is_empty() || e.is_same_as_previous)
            });
        let Some(anchor_index) = anchor_index else {
            return CopyPreviousPlan::NothingToCopy;
        };

        let target = self.entries.get(start_time);
        let has_own_content = target.is_some_and(|e| e.has_content() && !e.is_same_as_previous);
        if has_own_content && !confirmed {
            return CopyPreviousPlan::NeedsConfirm;
        }

        let mut writes = Vec::new();
        for slot in &self.grid[anchor_index + 1..=target_index] {
            match self.entries.get(&slot.start_time) {
                // Existing markers in the gap are already chained.
                Some(entry) if entry.is_same_as_previous && slot.start_time != start_time => {}
                Some(entry) => writes.push(SavePlan::Update {
                    id: entry.id.clone(),
                    patch: EntryPatch {
                        activity: Some(String::new()),
                        thought: Some(String::new()),
                        is_same_as_previous: Some(true),
                    },
                }),
                None => writes.push(SavePlan::Create {
                    entry: NewEntry {
                        date: self.date.clone(),
                        start_time: slot.start_time.clone(),
                        end_time: slot.end_time.clone(),
                        activity: String::new(),
                        thought: None,
                        is_same_as_previous: true,
                    },
                }),
            }
        }

        CopyPreviousPlan::Apply { writes }
    }

    /// One create-or-update per selected slot, all with the shared batch
    /// activity and the chain flag forced off.
    pub fn plan_batch(&self, start_times: &[String], activity: &str) -> Vec<SavePlan> {
        let activity = activity.trim();
        if activity.is_empty() {
            return Vec::new();
        }

        start_times
            .iter()
            .filter_map(|start| {
                let slot = self.grid.iter().find(|s| &s.start_time == start)?;
                Some(match self.entries.get(start) {
                    Some(entry) => SavePlan::Update {
                        id: entry.id.clone(),
                        patch: EntryPatch {
                            activity: Some(activity.to_string()),
                            thought: Some(String::new()),
                            is_same_as_previous: Some(false),
                        },
                    },
                    None => SavePlan::Create {
                        entry: NewEntry {
                            date: self.date.clone(),
                            start_time: slot.start_time.clone(),
                            end_time: slot.end_time.clone(),
                            activity: activity.to_string(),
                            thought: None,
                            is_same_as_previous: false,
                        },
                    },
                })
            })
            .collect()
    }

    fn grid_index(&self, start_time: &str) -> Option<usize> {
        self.grid.iter().position(|s| s.start_time == start_time)
    }
}

/// The contiguous run of slot start times between two grid indices, in
/// either drag direction.
pub fn select_range(grid: &[SlotTime], anchor: usize, current: usize) -> Vec<String> {
    let (start, end) = (anchor.min(current), anchor.max(current));
    grid.get(start..=end)
        .unwrap_or_default()
        .iter()
        .map(|s| s.start_time.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    const DATE: &str = "2024-01-01";

    fn entry(start: &str, activity: &str, is_same: bool) -> TimeEntry {
        let end = slots::day_slots()
            .iter()
            .find(|s| s.start_time == start)
            .map(|s| s.end_time.clone())
            .unwrap();
        TimeEntry {
            id: EntryId::Persisted(Uuid::new_v4()),
            date: DATE.to_string(),
            start_time: start.to_string(),
            end_time: end,
            activity: activity.to_string(),
            thought: None,
            is_same_as_previous: is_same,
        }
    }

    fn slot(start: &str) -> SlotTime {
        slots::day_slots()
            .into_iter()
            .find(|s| s.start_time == start)
            .unwrap()
    }

    fn at(date: &str, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn test_slots_join_and_status() {
        let timeline =
            DayTimeline::from_entries(DATE, vec![entry("09:00", "写代码", false)]);
        let joined = timeline.slots(at(DATE, 10, 15));

        assert_eq!(joined.len(), 48);
        let recorded = &joined[18]; // 09:00
        assert_eq!(recorded.status, SlotStatus::Recorded);
        assert_eq!(recorded.entry.as_ref().unwrap().activity, "写代码");

        let current = &joined[20]; // 10:00
        assert!(current.is_current);
        assert_eq!(current.status, SlotStatus::Current);

        assert_eq!(joined[21].status, SlotStatus::Future);
    }

    #[test]
    fn test_no_current_slot_on_other_days() {
        let timeline = DayTimeline::new(DATE);
        let joined = timeline.slots(at("2024-01-02", 10, 15));
        assert!(joined.iter().all(|s| !s.is_current));
    }

    #[test]
    fn test_upsert_replaces_placeholder_with_server_row() {
        let mut timeline = DayTimeline::new(DATE);
        let mut local = entry("09:00", "写代码", false);
        local.id = EntryId::local(DATE, "09:00");
        timeline.upsert(local);

        let server = entry("09:00", "写代码", false);
        let server_id = server.id.clone();
        timeline.upsert(server);

        assert_eq!(timeline.entries().count(), 1);
        assert_eq!(timeline.entry_at("09:00").unwrap().id, server_id);
    }

    #[test]
    fn test_remove_by_id() {
        let e = entry("09:00", "写代码", false);
        let id = e.id.clone();
        let mut timeline = DayTimeline::from_entries(DATE, vec![e]);
        assert!(timeline.remove(&id).is_some());
        assert!(timeline.entry_at("09:00").is_none());
        assert!(timeline.remove(&id).is_none());
    }

    #[test]
    fn test_resolve_display_walks_back_through_markers() {
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![
                entry("09:00", "写代码", false),
                entry("09:30", "", true),
                entry("10:00", "", true),
            ],
        );
        assert_eq!(timeline.resolve_display("09:30"), Some("写代码"));
        assert_eq!(timeline.resolve_display("10:00"), Some("写代码"));
        assert_eq!(timeline.resolve_display("09:00"), Some("写代码"));
    }

    #[test]
    fn test_resolve_display_prefers_own_content() {
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![entry("09:00", "写代码", false), entry("09:30", "开会", false)],
        );
        assert_eq!(timeline.resolve_display("09:30"), Some("开会"));
        assert_eq!(timeline.resolve_display("10:00"), None);
    }

    #[test]
    fn test_plan_save_blank_deletes_existing() {
        let e = entry("09:00", "写代码", false);
        let id = e.id.clone();
        let timeline = DayTimeline::from_entries(DATE, vec![e]);
        assert_eq!(
            timeline.plan_save(&slot("09:00"), "", None, false),
            SavePlan::Delete { id }
        );
    }

    #[test]
    fn test_plan_save_blank_on_empty_slot_is_noop() {
        let timeline = DayTimeline::new(DATE);
        assert_eq!(
            timeline.plan_save(&slot("09:00"), " ", Some("  "), false),
            SavePlan::Noop
        );
    }

    #[test]
    fn test_plan_save_blank_marker_survives() {
        // A same-as-previous marker has no own content but is not deleted.
        let e = entry("09:30", "", true);
        let id = e.id.clone();
        let timeline = DayTimeline::from_entries(DATE, vec![e]);
        match timeline.plan_save(&slot("09:30"), "", None, true) {
            SavePlan::Update { id: got, .. } => assert_eq!(got, id),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_save_creates_then_updates() {
        let mut timeline = DayTimeline::new(DATE);
        let plan = timeline.plan_save(&slot("09:00"), "写代码", Some("专注"), false);
        let SavePlan::Create { entry: new_entry } = plan else {
            panic!("expected create");
        };
        assert_eq!(new_entry.start_time, "09:00");
        assert_eq!(new_entry.thought.as_deref(), Some("专注"));

        timeline.upsert(entry("09:00", "写代码", false));
        match timeline.plan_save(&slot("09:00"), "改设计", None, false) {
            SavePlan::Update { patch, .. } => {
                assert_eq!(patch.activity.as_deref(), Some("改设计"));
                assert_eq!(patch.is_same_as_previous, Some(false));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_copy_previous_marks_without_duplicating_text() {
        let timeline =
            DayTimeline::from_entries(DATE, vec![entry("09:00", "写代码", false)]);
        let CopyPreviousPlan::Apply { writes } =
            timeline.plan_copy_previous("09:30", false)
        else {
            panic!("expected apply");
        };
        assert_eq!(writes.len(), 1);
        let SavePlan::Create { entry: marker } = &writes[0] else {
            panic!("expected create");
        };
        assert!(marker.is_same_as_previous);
        assert!(marker.activity.is_empty());
    }

    #[test]
    fn test_copy_previous_backfills_empty_gap() {
        let timeline =
            DayTimeline::from_entries(DATE, vec![entry("09:00", "写代码", false)]);
        // 09:30 and 10:00 are empty; copying at 10:30 backfills both.
        let CopyPreviousPlan::Apply { writes } =
            timeline.plan_copy_previous("10:30", false)
        else {
            panic!("expected apply");
        };
        let starts: Vec<_> = writes
            .iter()
            .map(|w| match w {
                SavePlan::Create { entry } => entry.start_time.clone(),
                other => panic!("expected creates, got {other:?}"),
            })
            .collect();
        assert_eq!(starts, ["09:30", "10:00", "10:30"]);
    }

    #[test]
    fn test_copy_previous_without_anchor() {
        let timeline = DayTimeline::new(DATE);
        assert_eq!(
            timeline.plan_copy_previous("00:00", false),
            CopyPreviousPlan::NothingToCopy
        );
        assert_eq!(
            timeline.plan_copy_previous("10:00", false),
            CopyPreviousPlan::NothingToCopy
        );
    }

    #[test]
    fn test_copy_previous_requires_confirmation_over_content() {
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![entry("09:00", "写代码", false), entry("09:30", "开会", false)],
        );
        assert_eq!(
            timeline.plan_copy_previous("09:30", false),
            CopyPreviousPlan::NeedsConfirm
        );
        match timeline.plan_copy_previous("09:30", true) {
            CopyPreviousPlan::Apply { writes } => assert_eq!(writes.len(), 1),
            other => panic!("expected apply, got {other:?}"),
        }
    }

    #[test]
    fn test_copy_previous_anchors_on_existing_marker() {
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![entry("09:00", "写代码", false), entry("09:30", "", true)],
        );
        let CopyPreviousPlan::Apply { writes } =
            timeline.plan_copy_previous("10:00", false)
        else {
            panic!("expected apply");
        };
        // The 09:30 marker is already chained; only 10:00 is written.
        assert_eq!(writes.len(), 1);
    }

    #[test]
    fn test_chain_break_cascades_contiguous_markers() {
        let n1 = entry("09:30", "", true);
        let n2 = entry("10:00", "", true);
        let expected = vec![n1.id.clone(), n2.id.clone()];
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![
                entry("09:00", "写代码", false),
                n1,
                n2,
                entry("10:30", "午饭", false),
                entry("11:00", "", true),
            ],
        );
        // Breaking at 09:00 stops at the non-chained 10:30 entry.
        assert_eq!(timeline.plan_chain_break("09:00"), expected);
    }

    #[test]
    fn test_chain_break_stops_at_gap() {
        let timeline = DayTimeline::from_entries(
            DATE,
            vec![entry("09:00", "写代码", false), entry("10:00", "", true)],
        );
        // 09:30 has no entry, so the 10:00 marker is not contiguous.
        assert!(timeline.plan_chain_break("09:00").is_empty());
    }

    #[test]
    fn test_edit_then_chain_unaffected_after_break() {
        // Once a slot has been individually edited it no longer inherits.
        let mut timeline = DayTimeline::from_entries(
            DATE,
            vec![entry("09:00", "写代码", false), entry("09:30", "", true)],
        );
        timeline.upsert(entry("09:30", "自己的内容", false));
        timeline.upsert(entry("09:00", "改方案", false));
        assert_eq!(timeline.resolve_display("09:30"), Some("自己的内容"));
    }

    #[test]
    fn test_plan_batch_mixes_creates_and_updates() {
        let timeline =
            DayTimeline::from_entries(DATE, vec![entry("09:30", "旧内容", true)]);
        let range = vec!["09:00".to_string(), "09:30".to_string()];
        let plans = timeline.plan_batch(&range, " 专注写作 ");

        assert_eq!(plans.len(), 2);
        match &plans[0] {
            SavePlan::Create { entry } => {
                assert_eq!(entry.activity, "专注写作");
                assert!(!entry.is_same_as_previous);
            }
            other => panic!("expected create, got {other:?}"),
        }
        match &plans[1] {
            SavePlan::Update { patch, .. } => {
                assert_eq!(patch.activity.as_deref(), Some("专注写作"));
                assert_eq!(patch.is_same_as_previous, Some(false));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_batch_blank_activity_is_empty() {
        let timeline = DayTimeline::new(DATE);
        assert!(timeline.plan_batch(&["09:00".to_string()], "  ").is_empty());
    }

    #[test]
    fn test_select_range_both_directions() {
        let grid = slots::day_slots();
        assert_eq!(select_range(&grid, 2, 4), ["01:00", "01:30", "02:00"]);
        assert_eq!(select_range(&grid, 4, 2), ["01:00", "01:30", "02:00"]);
        assert_eq!(select_range(&grid, 3, 3), ["01:30"]);
    }
}
