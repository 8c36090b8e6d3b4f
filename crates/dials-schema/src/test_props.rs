#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{Path, Schema, SchemaInput, schema_data};

    /// Names that never contain the separator.
    fn name_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    /// Nested schemas up to three folders deep with unique sibling names.
    fn schema_strategy() -> impl Strategy<Value = Schema> {
        let leaf = prop::collection::btree_map(name_strategy(), -100.0f64..100.0, 0..5)
            .prop_map(|m| {
                m.into_iter()
                    .fold(Schema::new(), |s, (name, v)| s.value(name, v))
            });
        leaf.prop_recursive(3, 32, 4, |inner| {
            (
                prop::collection::btree_map(name_strategy(), -100.0f64..100.0, 0..4),
                prop::collection::btree_map("[A-Z][a-z]{0,4}", inner, 0..3),
            )
                .prop_map(|(values, folders)| {
                    let s = values
                        .into_iter()
                        .fold(Schema::new(), |s, (name, v)| s.value(name, v));
                    folders
                        .into_iter()
                        .fold(s, |s, (name, sub)| s.folder(name, sub))
                })
        })
    }

    proptest! {
        #[test]
        fn flattening_is_deterministic(schema in schema_strategy()) {
            let input = SchemaInput::root(schema);
            let a = schema_data(&input).unwrap();
            let b = schema_data(&input).unwrap();
            prop_assert_eq!(a.ordered_paths(), b.ordered_paths());
            prop_assert_eq!(a.initial_values(), b.initial_values());
        }

        #[test]
        fn paths_strip_back_to_leaf_names(schema in schema_strategy(), prefix in "[a-z]{1,4}") {
            let data = schema_data(&SchemaInput::named(prefix.clone(), schema)).unwrap();
            for (path, _) in data.inputs() {
                let parent = path.parent().unwrap_or_default();
                let rebuilt = parent.join(path.leaf_name());
                prop_assert_eq!(&rebuilt, path);
                prop_assert!(!path.leaf_name().contains(crate::SEPARATOR));
                prop_assert!(path.is_within(&Path::from(prefix.as_str())));
            }
        }
    }
}
