use std::{
    fmt, mem,
    sync::{Arc, Weak},
};

use dials_schema::{Path, SchemaData, SchemaInput, Value};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{
    Values,
    cache::SchemaId,
    error::{Error, Result},
    lifecycle::Lifecycle,
    store::{Store, Unsubscribe, unsubscribe_all},
};

/// Listener receiving the full value shape after every change.
type Listener = Arc<dyn Fn(&Values) + Send + Sync>;

/// Where a binding is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    /// Subscriptions are being registered.
    Uninitialized,
    /// Subscribed; the mount may or may not have run yet.
    Bound,
    /// Released. Terminal.
    Disposed,
}

/// Mutable binding state shared with its callbacks and hooks.
struct Inner {
    /// Lifecycle position.
    state: BindingState,
    /// True while this binding holds a mount in the store.
    mounted: bool,
    /// Consumer value shape.
    values: Values,
    /// Registered subscriptions.
    subscriptions: Vec<Unsubscribe>,
    /// Optional change listener.
    listener: Option<Listener>,
    /// Failure of the deferred mount, if any.
    mount_error: Option<Error>,
}

/// One consumer's view of a schema in a [`Store`].
///
/// Binding reads a first snapshot synchronously, subscribes to every
/// value-bearing path, and leaves the mount to the lifecycle's commit hook.
/// Teardown (or [`dispose`](Self::dispose)) releases everything it holds.
pub struct Binding {
    /// Store the schema lives in.
    store: Store,
    /// Resolved schema.
    data: Arc<SchemaData>,
    /// Input paths in display order.
    paths: Arc<[Path]>,
    /// Value-bearing path behind each leaf name. When leaves repeat across
    /// folders, the last path in display order wins.
    leaves: Arc<IndexMap<String, Path>>,
    /// Shared state.
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Binding")
            .field("paths", &self.paths)
            .field("state", &inner.state)
            .field("mounted", &inner.mounted)
            .field("values", &inner.values)
            .finish_non_exhaustive()
    }
}

impl Binding {
    /// Attach a schema to `store` for one consumer.
    ///
    /// Schema and validation errors are returned before anything is
    /// registered. The mount runs from `lifecycle`'s commit hook; the release
    /// from its teardown hook.
    pub fn bind(
        store: &Store,
        id: SchemaId,
        input: &SchemaInput,
        lifecycle: &dyn Lifecycle,
    ) -> Result<Self> {
        let data = store.resolve_schema(id, input)?;
        let paths: Arc<[Path]> = store.order_paths_from_data(&data).into();
        let inner = Arc::new(Mutex::new(Inner {
            state: BindingState::Uninitialized,
            mounted: false,
            values: store.values_for_paths(&paths, &data),
            subscriptions: Vec::new(),
            listener: None,
            mount_error: None,
        }));

        let leaves: Arc<IndexMap<String, Path>> = Arc::new(
            paths
                .iter()
                .filter(|p| data.input(p.as_str()).is_some_and(|i| i.has_value()))
                .map(|p| (p.leaf_name().to_string(), p.clone()))
                .collect(),
        );
        let mut subscriptions = Vec::new();
        for (key, path) in leaves.iter() {
            let Some(leaf) = data.input(path.as_str()) else {
                continue;
            };
            let weak = Arc::downgrade(&inner);
            let key = key.clone();
            subscriptions.push(store.subscribe_with_fallback(
                path,
                leaf.value.clone(),
                move |value| apply(&weak, &key, value),
            ));
        }
        {
            let mut g = inner.lock();
            g.subscriptions = subscriptions;
            g.state = BindingState::Bound;
        }
        debug!(paths = paths.len(), id = id.get(), "binding created");

        let binding = Self {
            store: store.clone(),
            data,
            paths,
            leaves,
            inner,
        };
        let mount = binding.clone_parts();
        lifecycle.after_commit(Box::new(move || mount.mount()));
        let release = binding.clone_parts();
        lifecycle.on_teardown(Box::new(move || release.release()));
        Ok(binding)
    }

    /// Another handle onto the same binding, for the lifecycle hooks.
    fn clone_parts(&self) -> Self {
        Self {
            store: self.store.clone(),
            data: self.data.clone(),
            paths: self.paths.clone(),
            leaves: self.leaves.clone(),
            inner: self.inner.clone(),
        }
    }

    /// Deferred mount. Skipped once disposed or already mounted.
    fn mount(&self) {
        {
            let mut g = self.inner.lock();
            if g.state != BindingState::Bound || g.mounted {
                return;
            }
            g.mounted = true;
        }
        if let Err(e) = self.store.set_data(&self.data) {
            error!(error = %e, "deferred mount failed");
            let mut g = self.inner.lock();
            g.mounted = false;
            unsubscribe_all(&mut g.subscriptions);
            g.mount_error = Some(e);
        }
    }

    /// Release subscriptions and, if mounted, the mount. Runs once.
    fn release(&self) {
        let mounted = {
            let mut g = self.inner.lock();
            if g.state == BindingState::Disposed {
                return;
            }
            g.state = BindingState::Disposed;
            g.listener = None;
            unsubscribe_all(&mut g.subscriptions);
            mem::replace(&mut g.mounted, false)
        };
        if mounted {
            self.store.dispose_paths(&self.paths);
            self.store.dispose_folders(&self.data.folder_paths());
        }
        debug!(paths = self.paths.len(), mounted, "binding released");
    }

    /// Current consumer value shape, keyed by leaf name in declaration order.
    pub fn values(&self) -> Values {
        self.inner.lock().values.clone()
    }

    /// Current value of one leaf.
    pub fn value(&self, leaf: &str) -> Option<Value> {
        self.inner.lock().values.get(leaf).cloned()
    }

    /// Install a listener that receives the value shape after every change.
    /// Replaces any previous listener.
    pub fn listen(&self, listener: impl Fn(&Values) + Send + Sync + 'static) {
        let mut g = self.inner.lock();
        if g.state != BindingState::Disposed {
            g.listener = Some(Arc::new(listener));
        }
    }

    /// Write the leaf named `leaf` through the store. A repeated leaf name
    /// addresses the path the value shape shows.
    pub fn set(&self, leaf: &str, value: Value) -> Result<()> {
        let path = self
            .leaves
            .get(leaf)
            .ok_or_else(|| Error::unknown(&Path::from(leaf)))?;
        self.store.set_value_at_path(path, value)
    }

    /// Release everything this binding holds. Idempotent.
    pub fn dispose(&self) {
        self.release();
    }

    /// Lifecycle position.
    pub fn state(&self) -> BindingState {
        self.inner.lock().state
    }

    /// True while the binding holds a mount in the store.
    pub fn is_mounted(&self) -> bool {
        self.inner.lock().mounted
    }

    /// Error raised by the deferred mount, if it failed.
    pub fn mount_error(&self) -> Option<Error> {
        self.inner.lock().mount_error.clone()
    }

    /// Input paths in display order.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Resolved schema.
    pub fn data(&self) -> &SchemaData {
        &self.data
    }
}

/// Fold a store notification into the value shape and tell the listener.
fn apply(inner: &Weak<Mutex<Inner>>, key: &str, value: &Value) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let (values, listener) = {
        let mut g = inner.lock();
        if g.state == BindingState::Disposed || g.values.get(key) == Some(value) {
            return;
        }
        g.values.insert(key.to_string(), value.clone());
        (g.values.clone(), g.listener.clone())
    };
    if let Some(listener) = listener {
        listener(&values);
    }
}

#[cfg(test)]
mod tests {
    use dials_schema::{Input, Schema};

    use super::*;
    use crate::ScopedLifecycle;

    #[test]
    fn snapshot_before_mount() {
        let store = Store::new();
        let scope = ScopedLifecycle::new();
        let b = Binding::bind(
            &store,
            SchemaId::new(1),
            &SchemaInput::root(Schema::new().value("x", 1.0)),
            &scope,
        )
        .unwrap();
        assert_eq!(b.state(), BindingState::Bound);
        assert_eq!(b.value("x"), Some(Value::Number(1.0)));
        assert!(store.is_empty());
        scope.commit();
        assert!(b.is_mounted());
        assert_eq!(store.ref_count(&Path::from("x")), 1);
    }

    #[test]
    fn buttons_are_not_part_of_the_shape() {
        let store = Store::new();
        let scope = ScopedLifecycle::new();
        let b = Binding::bind(
            &store,
            SchemaId::new(1),
            &SchemaInput::root(Schema::new().input("go", Input::button()).value("n", 2.0)),
            &scope,
        )
        .unwrap();
        let keys = b.values().keys().cloned().collect::<Vec<String>>();
        assert_eq!(keys, vec!["n"]);
        scope.commit();
        assert!(store.contains(&Path::from("go")));
        assert_eq!(store.subscriber_count(&Path::from("go")), 0);
    }

    #[test]
    fn set_by_leaf_name() {
        let store = Store::new();
        let scope = ScopedLifecycle::new();
        let b = Binding::bind(
            &store,
            SchemaId::new(1),
            &SchemaInput::named("panel", Schema::new().value("x", 1.0)),
            &scope,
        )
        .unwrap();
        scope.commit();
        b.set("x", Value::Number(3.0)).unwrap();
        assert_eq!(store.get(&Path::from("panel.x")).unwrap(), Value::Number(3.0));
        assert_eq!(b.value("x"), Some(Value::Number(3.0)));
        assert!(matches!(
            b.set("missing", Value::Number(1.0)),
            Err(Error::UnknownPath { .. })
        ));
    }

    #[test]
    fn repeated_leaf_tracks_last_path() {
        let store = Store::new();
        let scope = ScopedLifecycle::new();
        let b = Binding::bind(
            &store,
            SchemaId::new(1),
            &SchemaInput::root(
                Schema::new()
                    .folder("a", Schema::new().value("x", 1.0))
                    .folder("b", Schema::new().value("x", 2.0)),
            ),
            &scope,
        )
        .unwrap();
        assert_eq!(b.value("x"), Some(Value::Number(2.0)));
        scope.commit();

        b.set("x", Value::Number(5.0)).unwrap();
        assert_eq!(store.get(&Path::from("b.x")).unwrap(), Value::Number(5.0));
        assert_eq!(store.get(&Path::from("a.x")).unwrap(), Value::Number(1.0));
        assert_eq!(b.value("x"), Some(Value::Number(5.0)));

        store
            .set_value_at_path(&Path::from("a.x"), Value::Number(9.0))
            .unwrap();
        assert_eq!(b.value("x"), Some(Value::Number(5.0)));
        assert_eq!(store.subscriber_count(&Path::from("a.x")), 0);
    }

    #[test]
    fn schema_errors_register_nothing() {
        let store = Store::new();
        let scope = ScopedLifecycle::new();
        let err = Binding::bind(
            &store,
            SchemaId::new(1),
            &SchemaInput::root(Schema::new().value("a.b", 1.0)),
            &scope,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(scope.pending_commits(), 0);
        assert_eq!(store.subscriber_count(&Path::from("a.b")), 0);
    }
}
