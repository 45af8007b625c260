use kpitree_core::{Document, Error, Position};
use serde_json::{Value, json};

const CANONICAL: &str = r#"{
  "topMetrics": [
    { "id": "m", "label": "Margin", "factors": [
      { "id": "f", "label": "Cost", "levers": [ { "id": "l", "label": "Sourcing" } ] }
    ] }
  ],
  "positions": { "f": { "x": 12.5, "y": -3 } }
}"#;

const LEGACY: &str = r#"{
  "kpis": [
    { "id": "m", "name": "Margin", "drivers": [
      { "id": "f", "name": "Cost", "levers": [ { "id": "l", "name": "Sourcing" } ] }
    ] }
  ],
  "positions": { "f": { "x": 12.5, "y": -3 } }
}"#;

#[test]
fn reads_canonical_documents() {
    let doc = Document::from_json_str(CANONICAL).unwrap();
    assert_eq!(doc.hierarchy.top_metrics.len(), 1);
    assert_eq!(doc.hierarchy.top_metrics[0].factors[0].levers[0].label, "Sourcing");
    assert_eq!(doc.positions.get("f"), Some(Position::new(12.5, -3.0)));
}

#[test]
fn legacy_spelling_reads_the_same() {
    let canonical = Document::from_json_str(CANONICAL).unwrap();
    let legacy = Document::from_json_str(LEGACY).unwrap();
    assert_eq!(canonical, legacy);
}

#[test]
fn overrides_alias_is_accepted() {
    let doc = Document::from_json_str(r#"{ "topMetrics": [], "overrides": { "x": { "x": 1, "y": 2 } } }"#)
        .unwrap();
    assert_eq!(doc.positions.get("x"), Some(Position::new(1.0, 2.0)));
}

#[test]
fn missing_sections_default_to_empty() {
    let doc = Document::from_json_str(r#"{ "topMetrics": [ { "id": "m" } ] }"#).unwrap();
    assert!(doc.positions.is_empty());
    assert_eq!(doc.hierarchy.top_metrics[0].label, "");
    assert!(doc.hierarchy.top_metrics[0].factors.is_empty());
}

#[test]
fn writes_canonical_spelling() {
    let doc = Document::from_json_str(LEGACY).unwrap();
    let value: Value = serde_json::from_str(&doc.to_json_string(false).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "topMetrics": [
                { "id": "m", "label": "Margin", "factors": [
                    { "id": "f", "label": "Cost", "levers": [ { "id": "l", "label": "Sourcing" } ] }
                ] }
            ],
            "positions": { "f": { "x": 12.5, "y": -3.0 } }
        })
    );

    let pretty = doc.to_json_string(true).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(Document::from_json_str(&pretty).unwrap(), doc);
}

#[test]
fn duplicate_ids_are_rejected() {
    let text = r#"{ "topMetrics": [
        { "id": "a", "factors": [ { "id": "b", "levers": [ { "id": "a" } ] } ] }
    ] }"#;
    match Document::from_json_str(text) {
        Err(Error::InvalidDocument { message }) => assert!(message.contains("`a`"), "{message}"),
        other => panic!("expected InvalidDocument, got {other:?}"),
    }
}

#[test]
fn empty_ids_are_rejected() {
    let text = r#"{ "topMetrics": [ { "id": "a", "factors": [ { "id": "" } ] } ] }"#;
    match Document::from_json_str(text) {
        Err(Error::InvalidDocument { message }) => assert!(message.contains("factor"), "{message}"),
        other => panic!("expected InvalidDocument, got {other:?}"),
    }
}

#[test]
fn broken_json_is_a_json_error() {
    assert!(matches!(Document::from_json_str("{ nope"), Err(Error::Json(_))));
    assert!(matches!(
        Document::from_json_str(r#"{ "topMetrics": [ { "label": "no id" } ] }"#),
        Err(Error::Json(_))
    ));
}

#[test]
fn lenient_reader_skips_what_it_cannot_read() {
    let value = json!({
        "topMetrics": [
            { "id": "good", "factors": [] },
            { "label": "missing id" },
            "not an object",
            { "id": "also-good", "factors": [ { "id": "f" } ] }
        ],
        "positions": {
            "good": { "x": 1, "y": 2 },
            "bad": { "x": 1 },
            "worse": [1, 2]
        }
    });
    let doc = Document::from_value_lenient(&value);
    let ids: Vec<&str> = doc.hierarchy.walk().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["good", "also-good", "f"]);
    assert_eq!(doc.positions.len(), 1);
    assert_eq!(doc.positions.get("good"), Some(Position::new(1.0, 2.0)));
}

#[test]
fn lenient_reader_returns_empty_for_non_documents() {
    for value in [json!([1, 2, 3]), json!("text"), json!({ "kpis": {} })] {
        let doc = Document::from_value_lenient(&value);
        assert!(doc.hierarchy.is_empty());
        assert!(doc.positions.is_empty());
    }
}

#[test]
fn prune_drops_positions_of_deleted_nodes() {
    let mut doc = Document::from_json_str(
        r#"{ "topMetrics": [ { "id": "m" } ],
             "positions": { "m": { "x": 0, "y": 0 }, "gone": { "x": 1, "y": 1 } } }"#,
    )
    .unwrap();
    assert_eq!(doc.prune(), vec!["gone".to_string()]);
    assert_eq!(doc.positions.len(), 1);
    assert!(doc.positions.contains("m"));
}
