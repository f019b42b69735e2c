use serde_json::json;

use super::*;

fn document() -> AnimationDocument {
    let value = json!({
        "fr": 30, "op": 30, "w": 200, "h": 100,
        "layers": [
            {"ty": 5, "t": {"d": {"k": [{"t": 0, "s": {"t": "A & B", "s": 12, "fc": [0, 0, 0]}}]}}},
            {"ty": 4, "shapes": [
                {"ty": "rc", "p": {"a": 0, "k": [10, 10]}, "s": {"a": 0, "k": [10, 10]}},
                {"ty": "fl", "c": {"a": 0, "k": [1, 0, 0]}, "r": 2}
            ], "ks": {"p": {"a": 1, "k": [
                {"t": 0, "s": [0, 0]}, {"t": 29, "s": [29, 0]}
            ]}}}
        ]
    });
    AnimationDocument::from_value(&value, None).unwrap()
}

fn ready_backend() -> MarkupBackend {
    let mut backend = MarkupBackend::new(BackendOpts {
        system_fonts: false,
        clear_rgba: None,
    });
    backend
        .initialize(&document(), Canvas::new(400, 200).unwrap())
        .unwrap();
    backend
}

fn markup_of(frame: RenderedFrame) -> String {
    match frame {
        RenderedFrame::Markup(m) => m.markup,
        RenderedFrame::Raster(_) => panic!("markup backend produced a raster frame"),
    }
}

#[test]
fn render_before_initialize_is_not_ready() {
    let mut backend = MarkupBackend::new(BackendOpts::default());
    let err = backend.render_frame(FrameIndex(0)).unwrap_err();
    assert!(err.is_not_ready());
    assert!(backend.replace_text("a", "b").unwrap_err().is_not_ready());
}

#[test]
fn emits_scaled_svg_root_and_items() {
    let mut backend = ready_backend();
    let markup = markup_of(backend.render_frame(FrameIndex(0)).unwrap());
    assert!(markup.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(markup.contains("width=\"400\" height=\"200\" viewBox=\"0 0 200 100\""));
    assert!(markup.contains("fill=\"rgb(255,0,0)\""));
    assert!(markup.contains("fill-rule=\"evenodd\""));
    assert!(markup.contains("A &amp; B"));
}

#[test]
fn frame_size_follows_the_environment_window() {
    let mut backend = ready_backend();
    let window = backend.environment().unwrap().window();
    assert_eq!((window.inner_width, window.inner_height), (400, 200));
    match backend.render_frame(FrameIndex(0)).unwrap() {
        RenderedFrame::Markup(m) => assert_eq!((m.width, m.height), (400, 200)),
        RenderedFrame::Raster(_) => panic!("markup backend produced a raster frame"),
    }
}

#[test]
fn same_frame_yields_identical_markup() {
    let mut backend = ready_backend();
    let a = markup_of(backend.render_frame(FrameIndex(7)).unwrap());
    let _ = backend.render_frame(FrameIndex(12)).unwrap();
    let b = markup_of(backend.render_frame(FrameIndex(7)).unwrap());
    assert_eq!(a, b);
    assert_ne!(a, markup_of(backend.render_frame(FrameIndex(12)).unwrap()));
}

#[test]
fn environment_holds_only_the_latest_frame() {
    let mut backend = ready_backend();
    backend.render_frame(FrameIndex(0)).unwrap();
    backend.render_frame(FrameIndex(1)).unwrap();
    let env = backend.environment().unwrap();
    assert_eq!(env.document().find_by_tag("svg").len(), 1);
}

#[test]
fn initialize_twice_fails_and_dispose_is_idempotent() {
    let mut backend = ready_backend();
    let err = backend
        .initialize(&document(), Canvas::new(10, 10).unwrap())
        .unwrap_err();
    assert!(matches!(err, LottieError::BackendInitFailed(_)));

    backend.dispose();
    backend.dispose();
    assert!(!backend.is_ready());
    assert!(backend.render_frame(FrameIndex(0)).unwrap_err().is_not_ready());
}

#[test]
fn markup_backend_subscribes_on_ready() {
    let backend = MarkupBackend::new(BackendOpts::default());
    assert_eq!(backend.clock_policy(), crate::render::backend::ClockPolicy::OnReady);
}

#[test]
fn number_formatting_is_compact() {
    assert_eq!(num(1.0), "1");
    assert_eq!(num(0.123456), "0.1235");
    assert_eq!(num(-0.00001), "0");
    assert_eq!(
        matrix(Affine::translate((5.0, 2.5))),
        "matrix(1 0 0 1 5 2.5)"
    );
}
