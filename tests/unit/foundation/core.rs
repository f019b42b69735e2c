use super::*;

#[test]
fn frame_rate_validation() {
    assert!(FrameRate::new(30.0).is_ok());
    assert!(FrameRate::new(0.0).is_err());
    assert!(FrameRate::new(-1.0).is_err());
    assert!(FrameRate::new(f64::NAN).is_err());
}

#[test]
fn secs_to_frames_keeps_exact_boundaries() {
    let fr = FrameRate::new(30.0).unwrap();
    for k in 0..300u64 {
        let t = (k as f64) / 30.0;
        assert_eq!(fr.secs_to_frames_floor(t), k);
    }
    assert_eq!(fr.secs_to_frames_floor(-1.0), 0);
}

#[test]
fn frames_between_scales_tolerance_with_clock_magnitude() {
    let fr = FrameRate::new(30.0).unwrap();
    let origin = 1.0e6;
    for k in 0..300u64 {
        assert_eq!(fr.frames_between_floor(origin, origin + k as f64 / 30.0), k);
    }
    assert_eq!(fr.frames_between_floor(origin, origin - 1.0), 0);
    assert_eq!(fr.frames_between_floor(origin, origin + 0.5 / 30.0), 0);
}

#[test]
fn canvas_bounds() {
    assert!(Canvas::new(500, 500).is_ok());
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(Canvas::new(2, 3).unwrap().rgba8_len(), 24);
}

#[test]
fn colors_from_unit_and_hex() {
    assert_eq!(
        Rgba8::from_unit_components(&[1.0, 0.0, 0.5]),
        Rgba8::new(255, 0, 128, 255)
    );
    assert_eq!(
        Rgba8::from_unit_components(&[255.0, 0.0, 0.0]),
        Rgba8::new(255, 0, 0, 255)
    );
    assert_eq!(Rgba8::from_hex("#ff8000").unwrap(), Rgba8::new(255, 128, 0, 255));
    assert!(Rgba8::from_hex("#zz").is_err());
    assert_eq!(Rgba8::new(1, 2, 3, 200).with_opacity(0.5).a, 100);
}
