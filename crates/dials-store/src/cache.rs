use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dials_schema::{SchemaData, SchemaError, SchemaInput, schema_data};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

/// Next identity handed out by [`SchemaId::unique`]. Starts high so it does
/// not collide with small caller-chosen ids.
static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(1 << 63);

/// Stable identity of a schema. Two lookups with the same id reuse the same
/// resolved [`SchemaData`] for as long as it stays cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(u64);

impl SchemaId {
    /// Caller-chosen identity.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// A fresh identity, distinct from every other `unique` id.
    pub fn unique() -> Self {
        Self(NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Size-bounded cache of resolved schemas keyed by identity.
pub(crate) struct SchemaCache {
    /// Resolved data, most recently used first.
    map: Mutex<LruCache<SchemaId, Arc<SchemaData>>>,
}

impl SchemaCache {
    /// Create a cache holding at most `capacity` schemas (minimum one).
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            map: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Resolved data for `id`, normalizing and flattening `input` on a miss.
    pub(crate) fn get_or_resolve(
        &self,
        id: SchemaId,
        input: &SchemaInput,
    ) -> Result<Arc<SchemaData>, SchemaError> {
        if let Some(found) = self.map.lock().get(&id).cloned() {
            trace!(id = id.get(), "schema cache hit");
            return Ok(found);
        }

        // Resolve outside the lock.
        let resolved = Arc::new(schema_data(input)?);

        let mut guard = self.map.lock();
        if let Some(found) = guard.get(&id).cloned() {
            return Ok(found);
        }
        guard.put(id, resolved.clone());
        Ok(resolved)
    }

    /// Number of cached schemas.
    pub(crate) fn len(&self) -> usize {
        self.map.lock().len()
    }
}
