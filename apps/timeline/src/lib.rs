//! Client core for the half-hour time tracker: the fixed slot grid, the
//! day timeline reconciler with its "same as previous" chain rules, the
//! optimistic sync session, the local-first entry cache, and the typed
//! HTTP client for the entry API.

pub mod api;
pub mod cache;
pub mod editor;
pub mod markdown;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod slots;

pub use api::{ClientError, EntryApi, HttpEntryApi};
pub use cache::{EntryCache, MemoryEntryCache};
pub use editor::DebouncedSaver;
pub use markdown::{parse_sections, Section};
pub use model::{EntryId, EntryPatch, NewEntry, TimeEntry};
pub use reconcile::{select_range, CopyPreviousPlan, DayTimeline, SavePlan, TimeSlot};
pub use session::{CopyPreviousOutcome, TimelineSession};
pub use slots::{day_slots, SlotStatus, SlotTime};
