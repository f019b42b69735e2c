use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LottieError::not_found("a.json", "missing")
            .to_string()
            .contains("document not found: 'a.json'")
    );
    assert!(
        LottieError::malformed("x")
            .to_string()
            .contains("malformed document:")
    );
    assert!(
        LottieError::backend_init("x")
            .to_string()
            .contains("backend init failed:")
    );
    assert!(LottieError::not_ready("x").to_string().contains("not ready:"));
    assert!(
        LottieError::texture_decode("x")
            .to_string()
            .contains("texture decode failed:")
    );
    assert!(
        LottieError::transient_io("x")
            .to_string()
            .contains("transient artifact io error:")
    );
    assert!(
        LottieError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LottieError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn not_ready_is_detectable() {
    assert!(LottieError::not_ready("x").is_not_ready());
    assert!(!LottieError::malformed("x").is_not_ready());
}
