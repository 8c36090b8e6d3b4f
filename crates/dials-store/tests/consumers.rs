//! Multi-consumer scenarios driven through bindings and scoped lifecycles.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use dials_schema::{Input, Path, Schema, SchemaInput, Value};
    use dials_store::{Binding, BindingState, Error, SchemaId, ScopedLifecycle, Store, Values};

    fn bind(store: &Store, id: u64, input: SchemaInput) -> (Binding, ScopedLifecycle) {
        let scope = ScopedLifecycle::new();
        let binding = Binding::bind(store, SchemaId::new(id), &input, &scope).unwrap();
        (binding, scope)
    }

    fn x_schema(initial: f64) -> SchemaInput {
        SchemaInput::root(Schema::new().value("x", initial))
    }

    #[test]
    fn shared_path_is_reference_counted() {
        let store = Store::new();
        let x = Path::from("x");
        let (a, scope_a) = bind(&store, 1, x_schema(1.0));
        let (b, scope_b) = bind(&store, 2, x_schema(1.0));
        scope_a.commit();
        scope_b.commit();
        assert_eq!(store.ref_count(&x), 2);

        a.set("x", Value::Number(5.0)).unwrap();
        scope_a.teardown();
        assert_eq!(store.ref_count(&x), 1);
        assert_eq!(store.get(&x).unwrap(), Value::Number(5.0));
        assert_eq!(b.value("x"), Some(Value::Number(5.0)));

        scope_b.teardown();
        assert!(!store.contains(&x));
        assert_eq!(store.subscriber_count(&x), 0);
    }

    #[test]
    fn writes_reach_other_consumers() {
        let store = Store::new();
        let (a, scope_a) = bind(&store, 1, x_schema(1.0));
        let (b, scope_b) = bind(&store, 2, x_schema(1.0));
        scope_a.commit();
        scope_b.commit();

        let seen: Arc<Mutex<Vec<Values>>> = Arc::default();
        let sink = seen.clone();
        b.listen(move |v| sink.lock().unwrap().push(v.clone()));

        a.set("x", Value::Number(5.0)).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("x"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn late_joiner_sees_current_value() {
        let store = Store::new();
        let (a, scope_a) = bind(&store, 1, x_schema(1.0));
        scope_a.commit();
        a.set("x", Value::Number(9.0)).unwrap();

        let (b, scope_b) = bind(&store, 2, x_schema(1.0));
        assert_eq!(b.value("x"), Some(Value::Number(9.0)));
        scope_b.commit();
        assert_eq!(store.get(&Path::from("x")).unwrap(), Value::Number(9.0));
        assert_eq!(store.ref_count(&Path::from("x")), 2);
    }

    #[test]
    fn first_mount_wins_and_others_reconcile() {
        let store = Store::new();
        let (a, scope_a) = bind(&store, 1, x_schema(1.0));
        let (b, scope_b) = bind(&store, 2, x_schema(2.0));
        assert_eq!(a.value("x"), Some(Value::Number(1.0)));
        assert_eq!(b.value("x"), Some(Value::Number(2.0)));

        scope_a.commit();
        assert_eq!(b.value("x"), Some(Value::Number(1.0)));
        scope_b.commit();
        assert_eq!(store.get(&Path::from("x")).unwrap(), Value::Number(1.0));
        assert_eq!(a.value("x"), b.value("x"));
    }

    #[test]
    fn pending_consumer_survives_other_unmount() {
        let store = Store::new();
        let (_a, scope_a) = bind(&store, 1, x_schema(1.0));
        scope_a.commit();
        let (b, scope_b) = bind(&store, 2, x_schema(1.0));
        scope_a.teardown();
        assert!(store.is_empty());

        scope_b.commit();
        store
            .set_value_at_path(&Path::from("x"), Value::Number(4.0))
            .unwrap();
        assert_eq!(b.value("x"), Some(Value::Number(4.0)));
    }

    #[test]
    fn teardown_before_commit_leaves_nothing() {
        let store = Store::new();
        let (b, scope) = bind(
            &store,
            1,
            SchemaInput::named("panel", Schema::new().value("x", 1.0).value("y", true)),
        );
        assert_eq!(store.subscriber_count(&Path::from("panel.x")), 1);
        scope.teardown();
        scope.commit();
        assert_eq!(b.state(), BindingState::Disposed);
        assert!(store.is_empty());
        assert_eq!(store.subscriber_count(&Path::from("panel.x")), 0);
        assert_eq!(store.subscriber_count(&Path::from("panel.y")), 0);
        assert!(store.folder_settings(&Path::from("panel")).is_none());
    }

    #[test]
    fn dispose_is_idempotent() {
        let store = Store::new();
        let (a, scope_a) = bind(&store, 1, x_schema(1.0));
        let (_b, scope_b) = bind(&store, 2, x_schema(1.0));
        scope_a.commit();
        scope_b.commit();
        a.dispose();
        a.dispose();
        scope_a.teardown();
        assert_eq!(store.ref_count(&Path::from("x")), 1);
    }

    #[test]
    fn out_of_range_write_changes_nothing() {
        let store = Store::new();
        let input =
            SchemaInput::root(Schema::new().input("n", Input::number(3.0).min(0.0).max(10.0)));
        let (a, scope_a) = bind(&store, 1, input.clone());
        let (b, scope_b) = bind(&store, 1, input);
        scope_a.commit();
        scope_b.commit();

        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        b.listen(move |_| *counter.lock().unwrap() += 1);

        assert!(matches!(
            a.set("n", Value::Number(42.0)),
            Err(Error::Validation { .. })
        ));
        assert_eq!(b.value("n"), Some(Value::Number(3.0)));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(store.cached_schemas(), 1);
    }

    #[test]
    fn folder_schema_shapes_by_leaf() {
        let store = Store::new();
        let (b, scope) = bind(
            &store,
            1,
            SchemaInput::root(Schema::new().folder("f", Schema::new().value("x", 1.0))),
        );
        assert_eq!(b.paths(), &[Path::from("f.x")]);
        assert_eq!(b.values().get("x"), Some(&Value::Number(1.0)));
        scope.commit();
        assert_eq!(store.get(&Path::from("f.x")).unwrap(), Value::Number(1.0));
        assert!(store.folder_settings(&Path::from("f")).is_some());
    }

    #[test]
    fn conflicting_kind_keeps_first_descriptor() {
        let store = Store::new();
        let (_a, scope_a) = bind(&store, 1, x_schema(1.0));
        scope_a.commit();
        let (b, scope_b) = bind(&store, 2, SchemaInput::root(Schema::new().value("x", "hi")));
        scope_b.commit();
        assert!(b.mount_error().is_none());
        assert_eq!(store.ref_count(&Path::from("x")), 2);
        assert_eq!(
            store.entry(&Path::from("x")).unwrap().input.kind.name(),
            "number"
        );
    }
}
