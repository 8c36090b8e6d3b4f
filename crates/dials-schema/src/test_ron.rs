#[cfg(test)]
mod tests {
    use crate::{
        Color, InputKind, Path, Schema, SchemaError, SchemaInput, SchemaItem, Value, schema_data,
    };

    #[test]
    fn parse_inputs_and_folders() {
        let schema = Schema::from_ron(
            r##"(
                entries: [
                    (name: "speed", input: number(value: 2.0, min: 0.0, max: 10.0), label: "Speed"),
                    (name: "visible", input: value(true)),
                    (name: "tint", input: color("#ff8800")),
                    (name: "camera", folder: (collapsed: true, entries: [
                        (name: "fov", input: value(45.0), hint: "vertical"),
                        (name: "pos", input: vector(value: [0.0, 1.0, 2.0])),
                    ])),
                    (name: "go", input: button),
                ],
            )"##,
        )
        .unwrap();
        assert_eq!(schema.len(), 5);
        match &schema.entries()[0].1 {
            SchemaItem::Input(input) => {
                assert_eq!(
                    input.kind,
                    InputKind::Number {
                        min: Some(0.0),
                        max: Some(10.0),
                        step: None
                    }
                );
                assert_eq!(input.settings.label.as_deref(), Some("Speed"));
            }
            other => panic!("{:?}", other),
        }
        match &schema.entries()[3].1 {
            SchemaItem::Folder(folder) => {
                assert!(folder.settings.collapsed);
                assert_eq!(folder.schema.len(), 2);
            }
            other => panic!("{:?}", other),
        }

        let data = schema_data(&SchemaInput::root(schema)).unwrap();
        let paths: Vec<&str> = data.inputs().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec!["speed", "visible", "tint", "camera.fov", "camera.pos", "go"]
        );
        assert_eq!(
            data.initial_value("tint"),
            Some(&Value::Color(Color::rgb(255, 136, 0)))
        );
        assert_eq!(
            data.input("camera.fov").unwrap().settings.hint.as_deref(),
            Some("vertical")
        );
        assert_eq!(data.folder_paths(), vec![Path::from("camera")]);
    }

    #[test]
    fn select_and_interval() {
        let schema = Schema::from_ron(
            r#"(entries: [
                (name: "mode", input: select(value: "fast", options: ["fast", "slow"])),
                (name: "range", input: interval(value: (2.0, 4.0), min: 0.0, max: 10.0)),
            ])"#,
        )
        .unwrap();
        let data = schema_data(&schema.into()).unwrap();
        assert_eq!(data.initial_value("mode"), Some(&Value::from("fast")));
        assert_eq!(
            data.initial_value("range"),
            Some(&Value::Vector(vec![2.0, 4.0]))
        );
    }

    #[test]
    fn entry_without_input_or_folder_is_rejected() {
        let err = Schema::from_ron(r#"(entries: [(name: "x")])"#).unwrap_err();
        assert!(matches!(err, SchemaError::Unrecognized { .. }));
        let err = Schema::from_ron(
            r#"(entries: [(name: "x", input: value(1.0), folder: (entries: []))])"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Unrecognized { .. }));
    }

    #[test]
    fn input_settings_on_folders_are_rejected() {
        for field in ["hint: \"h\"", "readonly: true", "disabled: false"] {
            let source = format!(r#"(entries: [(name: "f", folder: (entries: []), {})])"#, field);
            match Schema::from_ron(&source).unwrap_err() {
                SchemaError::Unrecognized { name, reason } => {
                    assert_eq!(name, "f");
                    assert!(reason.contains("not folders"), "{}", reason);
                }
                other => panic!("{:?}", other),
            }
        }
        // Label and order are shared by inputs and folders.
        assert!(
            Schema::from_ron(r#"(entries: [(name: "f", folder: (entries: []), label: "F", order: 2)])"#)
                .is_ok()
        );
    }

    #[test]
    fn empty_list_value_is_rejected() {
        let err = Schema::from_ron(r#"(entries: [(name: "v", input: value([]))])"#).unwrap_err();
        assert!(matches!(err, SchemaError::Unrecognized { .. }));
    }

    #[test]
    fn syntax_errors_carry_location() {
        let err = Schema::from_ron("(entries: [\n  (name: \"x\", input: nope(1)),\n])").unwrap_err();
        match err {
            SchemaError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn initial_values_are_validated_after_parse() {
        let schema =
            Schema::from_ron(r#"(entries: [(name: "n", input: number(value: 11.0, max: 10.0))])"#)
                .unwrap();
        assert!(matches!(
            schema_data(&schema.into()),
            Err(SchemaError::InvalidInitial { .. })
        ));
    }
}
