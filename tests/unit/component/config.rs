use serde_json::json;

use super::*;

#[test]
fn defaults_match_documented_options() {
    let cfg = AnimationConfig::default();
    assert_eq!((cfg.width, cfg.height), (500, 500));
    assert!(!cfg.looping);
    assert!(cfg.system_fonts);
    assert_eq!(cfg.backend, BackendKind::Raster);
    assert_eq!(cfg.frame_policy, FramePolicy::TimeDriven);
    assert_eq!(cfg.rasterizer, RasterizerKind::FileRoundTrip);
}

#[test]
fn parses_source_option_names() {
    let cfg = AnimationConfig::from_json(
        r#"{"filepath": "anim.json", "loop": true, "width": 64, "backend": "markup",
            "frame_policy": "tick_driven", "rasterizer": "in_memory"}"#,
    )
    .unwrap();
    assert_eq!(cfg.file, Some(PathBuf::from("anim.json")));
    assert!(cfg.looping);
    assert_eq!((cfg.width, cfg.height), (64, 500));
    assert_eq!(cfg.backend, BackendKind::Markup);
    assert_eq!(cfg.frame_policy, FramePolicy::TickDriven);
    assert_eq!(cfg.rasterizer, RasterizerKind::InMemory);
}

#[test]
fn bad_json_is_a_validation_error() {
    let err = AnimationConfig::from_json(r#"{"width": "wide"}"#).unwrap_err();
    assert!(matches!(err, LottieError::Validation(_)));
}

#[test]
fn missing_document_is_malformed() {
    let err = AnimationConfig::default().validate().unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));

    let null_data = AnimationConfig::from_json(r#"{"data": null}"#).unwrap();
    assert!(matches!(
        null_data.document_source(),
        Err(LottieError::MalformedDocument(_))
    ));
}

#[test]
fn bad_size_is_a_validation_error() {
    for (w, h) in [(0, 10), (10, 0), (70_000, 10)] {
        let cfg = AnimationConfig::default()
            .with_data(json!({"fr": 30}))
            .with_size(w, h);
        assert!(matches!(cfg.validate(), Err(LottieError::Validation(_))));
    }
}

#[test]
fn inline_data_wins_over_file() {
    let cfg = AnimationConfig::default()
        .with_file("a.json")
        .with_data(json!({"fr": 30}));
    assert!(matches!(cfg.document_source(), Ok(DocumentSource::Inline(_))));
    let cfg = AnimationConfig::default().with_file("a.json");
    assert!(matches!(cfg.document_source(), Ok(DocumentSource::File(p)) if p == PathBuf::from("a.json")));
}

#[test]
fn explicit_temp_dir_wins() {
    let cfg = AnimationConfig::default().with_temp_dir("/scratch");
    assert_eq!(cfg.resolved_temp_dir(), PathBuf::from("/scratch"));
}

#[test]
fn backend_opts_carry_font_and_clear_settings() {
    let cfg = AnimationConfig::default()
        .with_system_fonts(false)
        .with_clear_rgba(Some([1, 2, 3, 4]));
    assert_eq!(
        cfg.backend_opts(),
        BackendOpts {
            system_fonts: false,
            clear_rgba: Some([1, 2, 3, 4]),
        }
    );
}
