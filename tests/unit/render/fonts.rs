use super::*;

#[test]
fn empty_registry_without_system_fonts() {
    let fonts = FontRegistry::new(false);
    assert_eq!(fonts.face_count(), 0);
}

#[test]
fn unreadable_font_is_a_validation_error() {
    let mut fonts = FontRegistry::new(false);
    let err = fonts.load_file(Path::new("/no/such/font.ttf")).unwrap_err();
    assert!(matches!(err, LottieError::Validation(_)));
}

#[test]
fn garbage_font_is_rejected_and_database_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();

    let mut fonts = FontRegistry::new(false);
    let shared = fonts.database();
    assert!(fonts.load_file(&path).is_err());
    assert_eq!(fonts.face_count(), 0);
    assert_eq!(shared.len(), 0);
}
