//! # Used-Recipe Memory
//!
//! ## Responsibility
//! Rolling exclusion list of recipe ids served in the current week, persisted
//! write-through to a [`KeyValueStore`].
//!
//! ## Guarantees
//! - Time-windowed: on initialization, state older than [`RESET_WINDOW_MS`]
//!   (or with no readable reset timestamp) is discarded and the reset is
//!   persisted immediately
//! - Append-only within a window: ids are never deduplicated or removed
//! - Write-through: every `record` persists the full id list
//! - Non-failing: malformed or unreadable state reads as empty; write failures
//!   are logged and the in-memory list still advances
//!
//! ## NOT Responsible For
//! - Explicit resets (only the time-triggered one exists)
//! - Refreshing the window mid-session

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::recipe::RecipeId;
use crate::store::KeyValueStore;

/// Key holding the JSON array of served ids.
pub const KEY_USED_IDS: &str = "usedIds";
/// Key holding the last reset time, decimal milliseconds since the Unix epoch.
pub const KEY_LAST_RESET: &str = "lastReset";
/// Seven days in milliseconds.
pub const RESET_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct UsedRecipeMemory {
    store: Box<dyn KeyValueStore>,
    ids: Vec<RecipeId>,
    last_reset_ms: u64,
}

impl std::fmt::Debug for UsedRecipeMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsedRecipeMemory")
            .field("ids", &self.ids)
            .field("last_reset_ms", &self.last_reset_ms)
            .finish_non_exhaustive()
    }
}

impl UsedRecipeMemory {
    /// Load persisted state using the system clock.
    pub fn initialize(store: impl KeyValueStore + 'static) -> Self {
        Self::initialize_at(store, now_ms())
    }

    /// Load persisted state as of `now` (milliseconds since the Unix epoch).
    pub fn initialize_at(store: impl KeyValueStore + 'static, now: u64) -> Self {
        let mut store: Box<dyn KeyValueStore> = Box::new(store);

        let last_reset = read_key(store.as_ref(), KEY_LAST_RESET)
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(ts) => Some(ts),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring malformed reset timestamp");
                    None
                }
            });

        let expired = match last_reset {
            None => true,
            Some(ts) => now.saturating_sub(ts) > RESET_WINDOW_MS,
        };

        if expired {
            info!(last_reset = ?last_reset, now, "Resetting used-recipe memory");
            persist(store.as_mut(), KEY_LAST_RESET, &now.to_string());
            persist(store.as_mut(), KEY_USED_IDS, "[]");
            return Self { store, ids: Vec::new(), last_reset_ms: now };
        }

        let ids = read_key(store.as_ref(), KEY_USED_IDS)
            .map(|raw| match serde_json::from_str::<Vec<RecipeId>>(&raw) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed used-recipe list");
                    Vec::new()
                }
            })
            .unwrap_or_default();

        debug!(count = ids.len(), last_reset = last_reset.unwrap_or(now), "Loaded used-recipe memory");
        Self {
            store,
            ids,
            last_reset_ms: last_reset.unwrap_or(now),
        }
    }

    /// Append `id` (duplicates allowed) and persist the whole list.
    pub fn record(&mut self, id: RecipeId) {
        self.ids.push(id);
        match serde_json::to_string(&self.ids) {
            Ok(json) => persist(self.store.as_mut(), KEY_USED_IDS, &json),
            Err(e) => warn!(error = %e, "Failed to serialize used-recipe list"),
        }
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.ids.contains(&id)
    }

    /// Served ids in recording order.
    pub fn ids(&self) -> &[RecipeId] {
        &self.ids
    }

    pub fn last_reset_ms(&self) -> u64 {
        self.last_reset_ms
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Hand back the underlying store.
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "Store read failed, treating as absent");
            None
        }
    }
}

fn persist(store: &mut dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!(key, error = %e, "Store write failed, keeping in-memory state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    const NOW: u64 = 1_760_000_000_000;

    fn seeded(ids: &str, last_reset: u64) -> MemoryStore {
        MemoryStore::with_entries([
            (KEY_USED_IDS, ids.to_string()),
            (KEY_LAST_RESET, last_reset.to_string()),
        ])
    }

    /// Store whose writes always fail; reads come from a fixed map.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        }
    }

    #[test]
    fn test_window_is_seven_days() {
        assert_eq!(RESET_WINDOW_MS, 604_800_000);
    }

    #[test]
    fn test_fresh_store_resets_and_persists() {
        let memory = UsedRecipeMemory::initialize_at(MemoryStore::new(), NOW);
        assert!(memory.is_empty());
        assert_eq!(memory.last_reset_ms(), NOW);
        let store = memory.into_store();
        assert_eq!(store.get(KEY_LAST_RESET).expect("get"), Some(NOW.to_string()));
        assert_eq!(store.get(KEY_USED_IDS).expect("get").as_deref(), Some("[]"));
    }

    #[test]
    fn test_within_window_keeps_ids() {
        let memory = UsedRecipeMemory::initialize_at(seeded("[2,5]", NOW - 1_000), NOW);
        assert_eq!(memory.ids(), &[RecipeId(2), RecipeId(5)]);
        assert_eq!(memory.last_reset_ms(), NOW - 1_000);
    }

    #[test]
    fn test_exactly_at_window_boundary_keeps_ids() {
        let memory = UsedRecipeMemory::initialize_at(seeded("[2]", NOW - RESET_WINDOW_MS), NOW);
        assert_eq!(memory.ids(), &[RecipeId(2)]);
    }

    #[test]
    fn test_one_ms_past_window_resets() {
        let memory = UsedRecipeMemory::initialize_at(seeded("[2]", NOW - RESET_WINDOW_MS - 1), NOW);
        assert!(memory.is_empty());
        assert_eq!(memory.last_reset_ms(), NOW);
    }

    #[test]
    fn test_future_timestamp_does_not_reset() {
        let memory = UsedRecipeMemory::initialize_at(seeded("[4]", NOW + 60_000), NOW);
        assert_eq!(memory.ids(), &[RecipeId(4)]);
    }

    #[test]
    fn test_malformed_ids_read_as_empty() {
        let memory = UsedRecipeMemory::initialize_at(seeded("not json", NOW - 10), NOW);
        assert!(memory.is_empty());
        assert_eq!(memory.last_reset_ms(), NOW - 10);
    }

    #[test]
    fn test_missing_ids_within_window_read_as_empty() {
        let store = MemoryStore::with_entries([(KEY_LAST_RESET, (NOW - 10).to_string())]);
        let memory = UsedRecipeMemory::initialize_at(store, NOW);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_malformed_timestamp_is_treated_as_absent() {
        let store = MemoryStore::with_entries([(KEY_USED_IDS, "[1]"), (KEY_LAST_RESET, "soon")]);
        let memory = UsedRecipeMemory::initialize_at(store, NOW);
        assert!(memory.is_empty());
        assert_eq!(memory.last_reset_ms(), NOW);
    }

    #[test]
    fn test_record_appends_without_dedup_and_persists() {
        let mut memory = UsedRecipeMemory::initialize_at(MemoryStore::new(), NOW);
        memory.record(RecipeId(7));
        memory.record(RecipeId(7));
        assert_eq!(memory.len(), 2);
        assert!(memory.contains(RecipeId(7)));
        assert!(!memory.contains(RecipeId(8)));
        let store = memory.into_store();
        assert_eq!(store.get(KEY_USED_IDS).expect("get").as_deref(), Some("[7,7]"));
        assert_eq!(store.get(KEY_LAST_RESET).expect("get"), Some(NOW.to_string()));
    }

    #[test]
    fn test_write_failures_do_not_stop_recording() {
        let store = ReadOnlyStore(seeded("[1]", NOW - 5));
        let mut memory = UsedRecipeMemory::initialize_at(store, NOW);
        memory.record(RecipeId(2));
        assert_eq!(memory.ids(), &[RecipeId(1), RecipeId(2)]);
    }

    #[test]
    fn test_reset_with_failing_writes_still_clears() {
        let store = ReadOnlyStore(seeded("[1]", NOW - RESET_WINDOW_MS - 5));
        let memory = UsedRecipeMemory::initialize_at(store, NOW);
        assert!(memory.is_empty());
        assert_eq!(memory.last_reset_ms(), NOW);
    }
}
