use serde_json::json;

use super::*;

fn doc_json() -> Value {
    json!({"fr": 30, "ip": 0, "op": 150, "w": 200, "h": 100, "layers": []})
}

#[test]
fn inline_document_timing() {
    let doc = load_document(&DocumentSource::Inline(doc_json())).unwrap();
    let t = doc.timing();
    assert_eq!(t.frame_rate.as_f64(), 30.0);
    assert_eq!(t.total_frames, 150);
    assert_eq!(t.last_frame(), FrameIndex(149));
    assert!((t.duration_secs() - 5.0).abs() < 1e-9);
    assert!(doc.base_dir().is_none());
}

#[test]
fn fractional_out_point_rounds_up() {
    let doc = AnimationDocument::from_value(
        &json!({"fr": 24, "ip": 10, "op": 20.5, "layers": []}),
        None,
    )
    .unwrap();
    assert_eq!(doc.timing().total_frames, 11);
    assert_eq!(doc.timing().document_frame(FrameIndex(3)), 13.0);
}

#[test]
fn inline_json_string_is_parsed() {
    let text = serde_json::to_string(&doc_json()).unwrap();
    let doc = load_document(&DocumentSource::Inline(Value::String(text))).unwrap();
    assert_eq!(doc.timing().width, 200.0);
}

#[test]
fn missing_frame_rate_is_malformed() {
    let err = load_document(&DocumentSource::Inline(json!({"op": 10, "layers": []}))).unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));
}

#[test]
fn missing_graph_is_malformed() {
    let err = load_document(&DocumentSource::Inline(json!({"fr": 30, "op": 10}))).unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));
}

#[test]
fn empty_span_is_malformed() {
    let err = load_document(&DocumentSource::Inline(
        json!({"fr": 30, "ip": 10, "op": 10, "layers": []}),
    ))
    .unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));
}

#[test]
fn missing_file_is_not_found() {
    let err = load_document(&DocumentSource::File(PathBuf::from(
        "definitely/not/here/anim.json",
    )))
    .unwrap_err();
    assert!(matches!(err, LottieError::DocumentNotFound { .. }));
}

#[test]
fn unparsable_file_is_malformed_and_file_sets_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, b"{ not json").unwrap();
    let err = load_document(&DocumentSource::File(bad)).unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));

    let good = dir.path().join("good.json");
    std::fs::write(&good, serde_json::to_vec(&doc_json()).unwrap()).unwrap();
    let doc = load_document(&DocumentSource::File(good)).unwrap();
    assert_eq!(doc.base_dir(), Some(dir.path()));
}
