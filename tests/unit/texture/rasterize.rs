use std::sync::Arc;

use super::*;

fn frame(markup: &str) -> MarkupFrame {
    MarkupFrame {
        markup: markup.to_owned(),
        width: 8,
        height: 8,
        fonts: Arc::new(usvg::fontdb::Database::new()),
    }
}

const RED_SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8" viewBox="0 0 4 4" preserveAspectRatio="none"><rect x="0" y="0" width="2" height="4" fill="rgb(255,0,0)"/></svg>"#;

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[test]
fn file_round_trip_decodes_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let r = FileRoundTripRasterizer::new(dir.path());
    let tex = r.rasterize(&frame(RED_SQUARE)).unwrap();
    assert_eq!((tex.width, tex.height), (8, 8));
    assert_eq!(tex.pixel(1, 4), Some([255, 0, 0, 255]));
    assert_eq!(tex.pixel(6, 4), Some([0, 0, 0, 0]));
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn decode_failure_still_removes_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let r = FileRoundTripRasterizer::new(dir.path());
    let err = r.rasterize(&frame("<svg not closed")).unwrap_err();
    assert!(matches!(err, LottieError::TextureDecodeFailed(_)));
    assert_eq!(entries(dir.path()), 0);
}

#[test]
fn missing_directory_is_a_transient_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let r = FileRoundTripRasterizer::new(dir.path().join("gone"));
    let err = r.rasterize(&frame(RED_SQUARE)).unwrap_err();
    assert!(matches!(err, LottieError::TransientArtifactIo(_)));
}

#[test]
fn in_memory_matches_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let via_file = FileRoundTripRasterizer::new(dir.path())
        .rasterize(&frame(RED_SQUARE))
        .unwrap();
    let in_memory = InMemoryRasterizer.rasterize(&frame(RED_SQUARE)).unwrap();
    assert_eq!(via_file, in_memory);
}

#[test]
fn in_memory_reports_decode_failures() {
    let err = InMemoryRasterizer.rasterize(&frame("not markup")).unwrap_err();
    assert!(matches!(err, LottieError::TextureDecodeFailed(_)));
}
