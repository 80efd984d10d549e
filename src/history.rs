//! Generation history
//!
//! Bounded, newest-first record of completed generations. The in-memory list
//! is authoritative; every mutation is written through to a `HistoryBackend`,
//! and persistence failures are logged rather than returned.

pub mod export;
pub mod persistence;

pub use export::{export_filename, export_text, format_execution_time};
pub use persistence::{HistoryBackend, MemoryHistoryBackend, SledHistoryBackend, STORAGE_KEY};

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::types::{GenerationRequest, GenerationResult};

/// Maximum number of items kept.
pub const HISTORY_CAPACITY: usize = 50;

static ITEM_COUNTER: AtomicU64 = AtomicU64::new(1);

/// One persisted generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
    pub request: GenerationRequest,
    pub response: GenerationResult,
}

impl HistoryItem {
    pub fn new(request: GenerationRequest, response: GenerationResult, at: DateTime<Utc>) -> Self {
        Self {
            id: new_item_id(at),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            request,
            response,
        }
    }

    /// Record a result produced just now.
    pub fn from_result(request: GenerationRequest, response: GenerationResult) -> Self {
        Self::new(request, response, Utc::now())
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Plain-text report of this item.
    pub fn export_text(&self) -> String {
        export_text(&self.response, &self.timestamp)
    }

    /// Download name for `export_text`, stamped with the current time.
    pub fn export_filename(&self) -> String {
        export_filename(&self.request.topic, Utc::now().timestamp_millis())
    }
}

/// Ids are unique per process: millisecond clock, pid and a counter.
pub fn new_item_id(at: DateTime<Utc>) -> String {
    let seq = ITEM_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "gen-{}-{}-{}",
        at.timestamp_millis(),
        std::process::id(),
        seq
    )
}

pub struct HistoryCache<B: HistoryBackend> {
    backend: B,
    items: Vec<HistoryItem>,
    capacity: usize,
}

impl<B: HistoryBackend> HistoryCache<B> {
    /// Empty cache over `backend`; call `load` to pick up persisted items.
    pub fn new(backend: B) -> Self {
        Self::with_capacity(backend, HISTORY_CAPACITY)
    }

    /// Cache keeping at most `capacity` items, clamped to `1..=HISTORY_CAPACITY`.
    pub fn with_capacity(backend: B, capacity: usize) -> Self {
        Self {
            backend,
            items: Vec::new(),
            capacity: capacity.clamp(1, HISTORY_CAPACITY),
        }
    }

    /// Create a cache and load whatever the backend holds.
    pub fn open(backend: B) -> Self {
        let mut cache = Self::new(backend);
        cache.load();
        cache
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Prepend `item`, evicting the oldest entries beyond capacity.
    pub fn add(&mut self, item: HistoryItem) {
        debug!(id = %item.id, topic = %item.request.topic, "Adding history item");
        self.items.insert(0, item);
        if self.items.len() > self.capacity {
            let evicted = self.items.len() - self.capacity;
            self.items.truncate(self.capacity);
            debug!(evicted, "Evicted oldest history items");
        }
        self.persist();
    }

    /// Remove the item with `id`. Absent ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Drop every item and erase persisted storage.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.backend.erase() {
            error!(error = %e, "Failed to erase persisted history");
        }
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Unreadable or corrupt storage is logged and treated as empty history.
    pub fn load(&mut self) {
        let raw = match self.backend.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.items.clear();
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to read persisted history");
                self.items.clear();
                return;
            }
        };
        match serde_json::from_slice::<Vec<HistoryItem>>(&raw) {
            Ok(mut items) => {
                if items.len() > self.capacity {
                    warn!(
                        count = items.len(),
                        "Persisted history exceeds capacity, keeping newest items"
                    );
                    items.truncate(self.capacity);
                }
                debug!(count = items.len(), "Loaded history");
                self.items = items;
            }
            Err(e) => {
                error!(error = %e, "Persisted history is corrupt, starting empty");
                self.items.clear();
            }
        }
    }

    /// Write the in-memory list to the backend. Failures are logged only.
    pub fn persist(&self) {
        let encoded = match serde_json::to_vec(&self.items) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, "Failed to serialize history");
                return;
            }
        };
        if let Err(e) = self.backend.write(&encoded) {
            error!(error = %e, "Failed to persist history");
        }
    }
}
