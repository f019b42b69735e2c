use serde_json::json;

use super::*;

#[test]
fn static_scalar_and_vector() {
    let p: Property<f64> = Property::from_json(&json!({"a": 0, "k": 42})).unwrap();
    assert_eq!(p.sample(0.0), 42.0);
    assert_eq!(p.sample(1000.0), 42.0);

    let v: Property<Vec<f64>> = Property::from_json(&json!({"a": 0, "k": [1, 2, 3]})).unwrap();
    assert_eq!(v.sample(5.0), vec![1.0, 2.0, 3.0]);
}

#[test]
fn linear_keyframes_interpolate_and_clamp() {
    let p: Property<f64> = Property::from_json(&json!({
        "a": 1,
        "k": [
            {"t": 0, "s": [0], "o": {"x": [0], "y": [0]}, "i": {"x": [1], "y": [1]}},
            {"t": 10, "s": [100]}
        ]
    }))
    .unwrap();
    assert_eq!(p.sample(-5.0), 0.0);
    assert!((p.sample(5.0) - 50.0).abs() < 1e-6);
    assert_eq!(p.sample(10.0), 100.0);
    assert_eq!(p.sample(99.0), 100.0);
}

#[test]
fn hold_keyframes_step() {
    let p: Property<f64> = Property::from_json(&json!({
        "a": 1,
        "k": [
            {"t": 0, "s": [1], "h": 1},
            {"t": 10, "s": [3]}
        ]
    }))
    .unwrap();
    assert_eq!(p.sample(9.9), 1.0);
    assert_eq!(p.sample(10.0), 3.0);
}

#[test]
fn legacy_end_values_are_used() {
    let p: Property<Vec<f64>> = Property::from_json(&json!({
        "a": 1,
        "k": [
            {"t": 0, "s": [0, 0], "e": [10, 20]},
            {"t": 10}
        ]
    }))
    .unwrap();
    let mid = p.sample(5.0);
    assert!((mid[0] - 5.0).abs() < 1e-6);
    assert!((mid[1] - 10.0).abs() < 1e-6);
    assert_eq!(p.sample(10.0), vec![10.0, 20.0]);
}

#[test]
fn unsorted_keyframes_are_rejected() {
    let err = Property::<f64>::from_json(&json!({
        "a": 1,
        "k": [{"t": 10, "s": [0]}, {"t": 0, "s": [1]}]
    }))
    .unwrap_err();
    assert!(err.contains("sorted"));
}

#[test]
fn shape_path_parses_tangents() {
    let p: Property<ShapePath> = Property::from_json(&json!({
        "a": 0,
        "k": {"c": true, "v": [[0, 0], [10, 0], [10, 10]], "i": [[0, 0]], "o": []}
    }))
    .unwrap();
    let shape = p.sample(0.0);
    assert!(shape.closed);
    assert_eq!(shape.vertices.len(), 3);
    assert_eq!(shape.in_tangents.len(), 3);
    assert_eq!(shape.out_tangents.len(), 3);
}
