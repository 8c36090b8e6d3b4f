//! Integration tests for parsing the demo RON schemas.

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use dials::{load_schema, mount_values};
    use dials_schema::schema_data;
    use dials_store::Store;

    #[test]
    fn parse_all_demo_rons() {
        let demos_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent() // crates
            .and_then(|p| p.parent()) // workspace root
            .expect("workspace root")
            .join("demos");

        let mut found = 0usize;
        for entry in fs::read_dir(&demos_dir).expect("read demos dir") {
            let path = entry.unwrap().path();
            if path.extension().and_then(|s| s.to_str()) != Some("ron") {
                continue;
            }
            found += 1;
            let input = load_schema(&path, None)
                .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
            let data = schema_data(&input)
                .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
            assert!(!data.is_empty(), "{} has no inputs", path.display());

            let store = Store::new();
            mount_values(&store, &input, &[])
                .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
            assert!(store.is_empty());
        }
        assert!(found > 0, "no demo schemas found in {}", demos_dir.display());
    }

    #[test]
    fn scene_demo_orders_readonly_first() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../demos/scene.ron");
        let data = schema_data(&load_schema(&path, Some("scene")).unwrap()).unwrap();
        let paths = data.ordered_paths();
        assert_eq!(paths[0].as_str(), "scene.fps");
        assert!(data.input("scene.fps").unwrap().settings.readonly);
        assert_eq!(
            paths.last().map(|p| p.as_str()),
            Some("scene.lights.sun.direction")
        );
    }
}
