use std::{
    collections::HashMap,
    fmt,
    mem,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

use dials_schema::{
    FolderSettings, Input, Path, SchemaData, SchemaInput, SchemaTree, ValidationError, Value,
    flatten,
};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, trace, warn};

use crate::{
    Values,
    cache::{SchemaCache, SchemaId},
    config::StoreConfig,
    error::{Error, Result},
};

/// Callback invoked with a path's value on subscribe and on every change.
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Notifications collected under the lock, delivered after it is released.
type Pending = Vec<(Callback, Value)>;

/// A mounted path.
struct Entry {
    /// Current committed value; always satisfies `input`.
    value: Value,
    /// Descriptor from the first mount.
    input: Input,
    /// Number of live mounts.
    ref_count: usize,
    /// Display position, stable across remounts.
    order: usize,
}

/// A mounted folder.
struct FolderEntry {
    /// Presentation settings from the first mount.
    settings: FolderSettings,
    /// Number of live mounts.
    ref_count: usize,
}

/// How a subscription was registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Origin {
    /// Via `subscribe`; released when the entry is deleted.
    Live,
    /// Via `subscribe_with_fallback`; the owner mounts the path itself.
    Fallback,
}

/// One registered callback.
struct Subscriber {
    /// Unique id within the store.
    id: u64,
    /// User callback.
    callback: Callback,
    /// Registration kind.
    origin: Origin,
    /// Last value handed out while the path was unmounted.
    seed: Option<Value>,
}

/// Store tables. Only ever touched under the store lock.
#[derive(Default)]
struct State {
    /// Mounted paths.
    entries: HashMap<Path, Entry>,
    /// Mounted folders.
    folders: HashMap<Path, FolderEntry>,
    /// Subscribers per path, in registration order.
    subscribers: HashMap<Path, Vec<Subscriber>>,
    /// Earliest display position assigned to each path ever seen.
    seen_order: HashMap<Path, usize>,
    /// Next unused display position.
    next_order: usize,
    /// Next subscriber id.
    next_subscriber: u64,
}

impl State {
    /// Display position for `path`, assigning the next one on first sight.
    fn order_for(&mut self, path: &Path) -> usize {
        if let Some(order) = self.seen_order.get(path) {
            return *order;
        }
        let order = self.next_order;
        self.next_order += 1;
        self.seen_order.insert(path.clone(), order);
        order
    }

    /// Callbacks for every subscriber of `path`.
    fn fan_out(&self, path: &Path, value: &Value, pending: &mut Pending) {
        if let Some(subs) = self.subscribers.get(path) {
            for sub in subs {
                pending.push((sub.callback.clone(), value.clone()));
            }
        }
    }

    /// Settle fallback subscribers of freshly created entries. Any whose seed
    /// differs from the committed value is told about it once.
    fn reconcile(&mut self, created: &[Path], pending: &mut Pending) {
        for path in created {
            let (Some(entry), Some(subs)) = (self.entries.get(path), self.subscribers.get_mut(path))
            else {
                continue;
            };
            for sub in subs {
                if let Some(seed) = sub.seed.take()
                    && seed != entry.value
                {
                    trace!(path = %path, id = sub.id, "reconciling seeded subscriber");
                    pending.push((sub.callback.clone(), entry.value.clone()));
                }
            }
        }
    }

    /// Drop an entry that reached zero mounts, releasing its live subscribers.
    fn remove_entry(&mut self, path: &Path) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };
        let mut released = 0;
        if let Some(subs) = self.subscribers.get_mut(path) {
            let before = subs.len();
            subs.retain(|s| s.origin == Origin::Fallback);
            released = before - subs.len();
            for sub in subs.iter_mut() {
                sub.seed = Some(entry.value.clone());
            }
            if subs.is_empty() {
                self.subscribers.remove(path);
            }
        }
        debug!(path = %path, released, "entry unmounted");
    }
}

/// Shared store body.
struct Shared {
    /// Held from commit through delivery so notifications arrive in commit
    /// order. Reentrant so a callback may write back on the same thread.
    delivery: ReentrantMutex<()>,
    /// Entry, folder and subscription tables.
    state: Mutex<State>,
    /// Resolved schemas by identity.
    schemas: SchemaCache,
    /// Tuning.
    config: StoreConfig,
}

/// Handle to a reactive value store.
///
/// Cloning is cheap; all clones address the same store. Every mutating
/// operation completes under one lock acquisition, and subscriber callbacks
/// run after the lock is released, so a callback may freely read or write
/// the store. Commits that notify are serialized with their delivery: a
/// writer on another thread waits until earlier notifications have run.
#[derive(Clone)]
pub struct Store {
    /// Shared state.
    shared: Arc<Shared>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Store")
            .field("entries", &state.entries.len())
            .field("folders", &state.folders.len())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryInfo {
    /// Path of the entry.
    pub path: Path,
    /// Current value.
    pub value: Value,
    /// Descriptor in force.
    pub input: Input,
    /// Number of live mounts.
    pub ref_count: usize,
    /// Display position.
    pub order: usize,
}

impl Store {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                delivery: ReentrantMutex::new(()),
                state: Mutex::new(State::default()),
                schemas: SchemaCache::with_capacity(config.schema_cache_capacity),
                config,
            }),
        }
    }

    /// Configuration in force.
    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Flatten a normalized tree. Does not touch the store.
    pub fn get_data_from_schema(&self, tree: &SchemaTree) -> SchemaData {
        flatten(tree)
    }

    /// Ordered input paths of `data`.
    pub fn order_paths_from_data(&self, data: &SchemaData) -> Vec<Path> {
        data.ordered_paths()
    }

    /// Resolve `input` once per `id`, reusing the cached result afterwards.
    pub fn resolve_schema(&self, id: SchemaId, input: &SchemaInput) -> Result<Arc<SchemaData>> {
        Ok(self.shared.schemas.get_or_resolve(id, input)?)
    }

    /// Mount every input and folder in `data`.
    ///
    /// Declared values are validated first; on any failure nothing changes.
    /// Paths already mounted gain a reference and keep their value. New paths
    /// start at their declared value. Subscribers that were handed a fallback
    /// before their path existed are notified once if the committed value
    /// differs.
    pub fn set_data(&self, data: &SchemaData) -> Result<()> {
        for (path, input) in data.inputs() {
            input
                .validate(input.value.clone())
                .map_err(|e| Error::invalid(path, e))?;
        }

        let _delivery = self.shared.delivery.lock();
        let mut pending = Pending::new();
        let mut created = Vec::new();
        {
            let mut guard = self.shared.state.lock();
            let st = &mut *guard;
            for (path, input) in data.inputs() {
                match st.entries.get_mut(path) {
                    Some(entry) => {
                        entry.ref_count += 1;
                        if entry.input.kind.name() != input.kind.name() {
                            warn!(
                                path = %path,
                                existing = entry.input.kind.name(),
                                incoming = input.kind.name(),
                                "conflicting descriptor; keeping the mounted one"
                            );
                        }
                    }
                    None => {
                        let order = st.order_for(path);
                        st.entries.insert(
                            path.clone(),
                            Entry {
                                value: input.value.clone(),
                                input: input.clone(),
                                ref_count: 1,
                                order,
                            },
                        );
                        created.push(path.clone());
                    }
                }
            }
            for (path, settings) in data.folders() {
                st.folders
                    .entry(path.clone())
                    .and_modify(|f| f.ref_count += 1)
                    .or_insert_with(|| FolderEntry {
                        settings: settings.clone(),
                        ref_count: 1,
                    });
            }
            st.reconcile(&created, &mut pending);
        }
        debug!(
            inputs = data.len(),
            created = created.len(),
            "schema data mounted"
        );
        deliver(pending);
        Ok(())
    }

    /// Release one mount of each path. Entries reaching zero are deleted and
    /// their subscriptions stop firing. Unknown paths are ignored.
    pub fn dispose_paths(&self, paths: &[Path]) {
        let mut st = self.shared.state.lock();
        for path in paths {
            let Some(entry) = st.entries.get_mut(path) else {
                continue;
            };
            entry.ref_count = entry.ref_count.saturating_sub(1);
            if entry.ref_count == 0 {
                st.remove_entry(path);
            }
        }
    }

    /// Release one mount of each folder.
    pub fn dispose_folders(&self, paths: &[Path]) {
        let mut st = self.shared.state.lock();
        for path in paths {
            let Some(folder) = st.folders.get_mut(path) else {
                continue;
            };
            folder.ref_count = folder.ref_count.saturating_sub(1);
            if folder.ref_count == 0 {
                st.folders.remove(path);
                debug!(path = %path, "folder unmounted");
            }
        }
    }

    /// Subscribe to a mounted path. The callback runs once immediately with
    /// the current value, then after every committed change.
    pub fn subscribe(
        &self,
        path: &Path,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Result<Unsubscribe> {
        let callback: Callback = Arc::new(callback);
        let _delivery = self.shared.delivery.lock();
        let (id, value) = {
            let mut guard = self.shared.state.lock();
            let st = &mut *guard;
            let value = st
                .entries
                .get(path)
                .map(|e| e.value.clone())
                .ok_or_else(|| Error::unknown(path))?;
            let id = register(st, path, callback.clone(), Origin::Live, None);
            (id, value)
        };
        callback(&value);
        Ok(self.handle(path, id))
    }

    /// Subscribe to a path that may not be mounted yet.
    ///
    /// The callback runs immediately with the mounted value, or with
    /// `fallback` when the path is absent. If the path is later mounted with a
    /// different value the callback hears about it.
    pub fn subscribe_with_fallback(
        &self,
        path: &Path,
        fallback: Value,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Unsubscribe {
        let callback: Callback = Arc::new(callback);
        let _delivery = self.shared.delivery.lock();
        let (id, value) = {
            let mut guard = self.shared.state.lock();
            let st = &mut *guard;
            let (value, seed) = match st.entries.get(path) {
                Some(entry) => (entry.value.clone(), None),
                None => (fallback.clone(), Some(fallback)),
            };
            let id = register(st, path, callback.clone(), Origin::Fallback, seed);
            (id, value)
        };
        callback(&value);
        self.handle(path, id)
    }

    /// Validate, commit and broadcast a write.
    ///
    /// Readonly inputs reject the write. Invalid values leave the previous
    /// value in place and notify nobody.
    pub fn set_value_at_path(&self, path: &Path, value: Value) -> Result<()> {
        self.write(path, value, false)
    }

    /// Write a readonly input. Other inputs behave as with
    /// [`set_value_at_path`](Self::set_value_at_path).
    pub fn set_derived_value(&self, path: &Path, value: Value) -> Result<()> {
        self.write(path, value, true)
    }

    /// Shared write path.
    fn write(&self, path: &Path, value: Value, allow_readonly: bool) -> Result<()> {
        let _delivery = self.shared.delivery.lock();
        let mut pending = Pending::new();
        {
            let mut guard = self.shared.state.lock();
            let st = &mut *guard;
            let entry = st.entries.get_mut(path).ok_or_else(|| Error::unknown(path))?;
            let value = check_write(entry, path, value, allow_readonly)?;
            if value == entry.value && !self.shared.config.notify_unchanged {
                trace!(path = %path, "unchanged write ignored");
                return Ok(());
            }
            entry.value = value.clone();
            st.fan_out(path, &value, &mut pending);
        }
        trace!(path = %path, subscribers = pending.len(), "value committed");
        deliver(pending);
        Ok(())
    }

    /// Write several paths at once. Every value is validated before any is
    /// committed; a single failure leaves the store untouched.
    pub fn set_values<I>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (Path, Value)>,
    {
        let _delivery = self.shared.delivery.lock();
        let mut pending = Pending::new();
        {
            let mut guard = self.shared.state.lock();
            let st = &mut *guard;
            let mut accepted = Vec::new();
            for (path, value) in values {
                let entry = st.entries.get(&path).ok_or_else(|| Error::unknown(&path))?;
                let value = check_write(entry, &path, value, false)?;
                accepted.push((path, value));
            }
            for (path, value) in accepted {
                let Some(entry) = st.entries.get_mut(&path) else {
                    continue;
                };
                if value == entry.value && !self.shared.config.notify_unchanged {
                    continue;
                }
                entry.value = value.clone();
                st.fan_out(&path, &value, &mut pending);
            }
        }
        debug!(notifications = pending.len(), "batch committed");
        deliver(pending);
        Ok(())
    }

    /// Current value at `path`.
    pub fn get(&self, path: &Path) -> Result<Value> {
        self.shared
            .state
            .lock()
            .entries
            .get(path)
            .map(|e| e.value.clone())
            .ok_or_else(|| Error::unknown(path))
    }

    /// Snapshot of the entry at `path`, if mounted.
    pub fn entry(&self, path: &Path) -> Option<EntryInfo> {
        self.shared
            .state
            .lock()
            .entries
            .get(path)
            .map(|e| EntryInfo {
                path: path.clone(),
                value: e.value.clone(),
                input: e.input.clone(),
                ref_count: e.ref_count,
                order: e.order,
            })
    }

    /// Number of live mounts of `path`; zero when absent.
    pub fn ref_count(&self, path: &Path) -> usize {
        self.shared
            .state
            .lock()
            .entries
            .get(path)
            .map_or(0, |e| e.ref_count)
    }

    /// True when `path` is mounted.
    pub fn contains(&self, path: &Path) -> bool {
        self.shared.state.lock().entries.contains_key(path)
    }

    /// Number of mounted entries.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// True when nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of subscriptions registered on `path`.
    pub fn subscriber_count(&self, path: &Path) -> usize {
        self.shared
            .state
            .lock()
            .subscribers
            .get(path)
            .map_or(0, Vec::len)
    }

    /// Every mounted path, in display order.
    pub fn ordered_paths(&self) -> Vec<Path> {
        let st = self.shared.state.lock();
        let mut paths: Vec<(usize, &Path)> = st.entries.iter().map(|(p, e)| (e.order, p)).collect();
        paths.sort_unstable_by_key(|(order, _)| *order);
        paths.into_iter().map(|(_, p)| p.clone()).collect()
    }

    /// Settings of a mounted folder.
    pub fn folder_settings(&self, path: &Path) -> Option<FolderSettings> {
        self.shared
            .state
            .lock()
            .folders
            .get(path)
            .map(|f| f.settings.clone())
    }

    /// Collapse or expand a mounted folder.
    pub fn set_folder_collapsed(&self, path: &Path, collapsed: bool) -> Result<()> {
        let mut st = self.shared.state.lock();
        let folder = st.folders.get_mut(path).ok_or_else(|| Error::unknown(path))?;
        folder.settings.collapsed = collapsed;
        Ok(())
    }

    /// Enable or disable a mounted input.
    pub fn set_disabled(&self, path: &Path, disabled: bool) -> Result<()> {
        let mut st = self.shared.state.lock();
        let entry = st.entries.get_mut(path).ok_or_else(|| Error::unknown(path))?;
        entry.input.settings.disabled = disabled;
        Ok(())
    }

    /// Consumer value shape for `paths`: the mounted value where one exists,
    /// else the value declared in `data`. Inputs without a value are skipped.
    pub fn values_for_paths(&self, paths: &[Path], data: &SchemaData) -> Values {
        let st = self.shared.state.lock();
        let mut values = Values::new();
        for path in paths {
            let Some(input) = data.input(path.as_str()) else {
                continue;
            };
            if !input.has_value() {
                continue;
            }
            let value = st
                .entries
                .get(path)
                .map_or_else(|| input.value.clone(), |e| e.value.clone());
            values.insert(path.leaf_name().to_string(), value);
        }
        values
    }

    /// Number of schemas held by the resolution cache.
    pub fn cached_schemas(&self) -> usize {
        self.shared.schemas.len()
    }

    /// Build the handle for subscription `id` on `path`.
    fn handle(&self, path: &Path, id: u64) -> Unsubscribe {
        Unsubscribe {
            shared: Arc::downgrade(&self.shared),
            path: path.clone(),
            id,
            done: AtomicBool::new(false),
        }
    }
}

/// Add a subscriber to `path` and return its id.
fn register(
    st: &mut State,
    path: &Path,
    callback: Callback,
    origin: Origin,
    seed: Option<Value>,
) -> u64 {
    let id = st.next_subscriber;
    st.next_subscriber += 1;
    st.subscribers.entry(path.clone()).or_default().push(Subscriber {
        id,
        callback,
        origin,
        seed,
    });
    trace!(path = %path, id, ?origin, "subscribed");
    id
}

/// Apply readonly and descriptor checks to a write.
fn check_write(entry: &Entry, path: &Path, value: Value, allow_readonly: bool) -> Result<Value> {
    if entry.input.settings.readonly && !allow_readonly {
        return Err(Error::invalid(path, ValidationError::ReadOnly));
    }
    entry.input.validate(value).map_err(|e| Error::invalid(path, e))
}

/// Run collected callbacks in order. Must be called with no lock held.
fn deliver(pending: Pending) {
    for (callback, value) in pending {
        callback(&value);
    }
}

/// Handle that cancels one subscription.
///
/// Dropping the handle does not unsubscribe. Calling
/// [`unsubscribe`](Self::unsubscribe) more than once is harmless.
pub struct Unsubscribe {
    /// Store the subscription lives in.
    shared: Weak<Shared>,
    /// Subscribed path.
    path: Path,
    /// Subscriber id.
    id: u64,
    /// Set once cancelled.
    done: AtomicBool,
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("path", &self.path)
            .field("id", &self.id)
            .field("done", &self.done.load(Ordering::Acquire))
            .finish()
    }
}

impl Unsubscribe {
    /// Remove exactly this subscription.
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let mut st = shared.state.lock();
        if let Some(subs) = st.subscribers.get_mut(&self.path) {
            subs.retain(|s| s.id != self.id);
            if subs.is_empty() {
                st.subscribers.remove(&self.path);
            }
        }
        trace!(path = %self.path, id = self.id, "unsubscribed");
    }

    /// Path this subscription watches.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once [`unsubscribe`](Self::unsubscribe) has run.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Take the subscriptions out of `list` and cancel them all.
pub(crate) fn unsubscribe_all(list: &mut Vec<Unsubscribe>) {
    for sub in mem::take(list) {
        sub.unsubscribe();
    }
}
