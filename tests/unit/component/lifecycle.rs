use serde_json::{Value, json};

use super::*;

const WAIT: Duration = Duration::from_secs(10);

fn doc() -> Value {
    json!({
        "fr": 30, "op": 30, "w": 10, "h": 10,
        "layers": [
            {"ty": 1, "nm": "Bg", "sc": "#ff0000", "sw": 10, "sh": 10},
            {"ty": 5, "nm": "Label", "t": {"d": {"k": [{"t": 0, "s": {"t": "Hi", "s": 4}}]}}}
        ]
    })
}

fn config(backend: BackendKind) -> AnimationConfig {
    AnimationConfig::default()
        .with_data(doc())
        .with_size(10, 10)
        .with_backend(backend)
        .with_system_fonts(false)
        .with_rasterizer(RasterizerKind::InMemory)
}

fn ready(backend: BackendKind) -> (AnimationComponent, FrameClock, DisplayNode) {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let component = AnimationComponent::new(config(backend), &clock, &node).unwrap();
    assert!(matches!(component.wait_ready(WAIT), Some(ComponentEvent::Ready)));
    (component, clock, node)
}

#[test]
fn missing_document_fails_at_construction() {
    let clock = FrameClock::new();
    let err = AnimationComponent::new(AnimationConfig::default(), &clock, &DisplayNode::new())
        .unwrap_err();
    assert!(matches!(err, LottieError::MalformedDocument(_)));
}

#[test]
fn construction_enters_loading() {
    let clock = FrameClock::new();
    let component = AnimationComponent::new(config(BackendKind::Raster), &clock, &DisplayNode::new())
        .unwrap();
    assert_eq!(component.state(), ComponentState::Loading);
    assert!(component.timing().is_none());
    assert!(component.find_elements("Bg").unwrap_err().is_not_ready());
}

#[test]
fn ready_event_is_reported_once() {
    let (component, _clock, _node) = ready(BackendKind::Raster);
    assert_eq!(component.state(), ComponentState::Ready);
    assert!(component.poll().is_none());
    assert!(component.wait_ready(WAIT).is_none());
    assert_eq!(component.timing().map(|t| t.total_frames), Some(30));
}

#[test]
fn raster_subscribes_on_start() {
    let (component, clock, node) = ready(BackendKind::Raster);
    assert!(!component.is_subscribed());
    clock.tick(0.0);
    assert_eq!(node.generation(), 0);

    node.set_scale(3.0);
    component.start().unwrap();
    assert_eq!(component.state(), ComponentState::Playing);
    assert!(component.is_subscribed());
    assert_eq!(node.display_size(), Some((10, 10)));
    assert_eq!(node.scale(), 3.0);

    clock.tick(1.0);
    assert_eq!(node.generation(), 1);
    assert_eq!(node.texture().and_then(|t| t.pixel(5, 5)), Some([255, 0, 0, 255]));
    component.start().unwrap();
    assert_eq!(clock.subscriber_count(), 1);
}

#[test]
fn markup_subscribes_on_ready() {
    let (component, clock, node) = ready(BackendKind::Markup);
    assert_eq!(component.state(), ComponentState::Ready);
    assert!(component.is_subscribed());
    clock.tick(0.0);
    assert_eq!(node.generation(), 1);
    assert_eq!(node.texture().and_then(|t| t.pixel(5, 5)), Some([255, 0, 0, 255]));
}

fn tick_until(clock: &FrameClock, done: impl Fn() -> bool) -> u32 {
    let mut k = 0;
    while !done() && k < 500 {
        clock.tick(f64::from(k) / 30.0);
        std::thread::sleep(Duration::from_millis(20));
        k += 1;
    }
    k
}

#[test]
fn clock_ticks_alone_bring_markup_to_ready() {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let component = AnimationComponent::new(config(BackendKind::Markup), &clock, &node).unwrap();
    assert_eq!(clock.subscriber_count(), 1);
    assert!(!component.is_subscribed());

    tick_until(&clock, || node.generation() > 0);
    assert_eq!(component.state(), ComponentState::Ready);
    assert!(component.is_subscribed());
    assert_eq!(clock.subscriber_count(), 1);
    assert_eq!(node.texture().and_then(|t| t.pixel(5, 5)), Some([255, 0, 0, 255]));

    assert!(matches!(component.poll(), Some(ComponentEvent::Ready)));
    assert!(component.poll().is_none());
    assert!(component.wait_ready(WAIT).is_none());
}

#[test]
fn clock_ticks_alone_apply_a_pending_start() {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let component = AnimationComponent::new(config(BackendKind::Raster), &clock, &node).unwrap();
    component.start().unwrap();

    tick_until(&clock, || node.generation() > 0);
    assert_eq!(component.state(), ComponentState::Playing);
    assert_eq!(clock.subscriber_count(), 1);
    assert!(matches!(component.poll(), Some(ComponentEvent::Ready)));
}

#[test]
fn clock_ticks_alone_observe_failure() {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let cfg = config(BackendKind::Markup).with_data(json!({"fr": 30, "op": 30}));
    let component = AnimationComponent::new(cfg, &clock, &node).unwrap();

    tick_until(&clock, || component.state() != ComponentState::Loading);
    assert_eq!(component.state(), ComponentState::Failed);
    assert_eq!(clock.subscriber_count(), 0);
    clock.tick(100.0);
    assert_eq!(node.generation(), 0);
    assert!(matches!(
        component.poll(),
        Some(ComponentEvent::Failed(LottieError::MalformedDocument(_)))
    ));
    assert!(component.poll().is_none());
}

#[test]
fn destroy_while_loading_removes_the_readiness_watch() {
    let clock = FrameClock::new();
    let component = AnimationComponent::new(config(BackendKind::Markup), &clock, &DisplayNode::new())
        .unwrap();
    assert_eq!(clock.subscriber_count(), 1);
    component.destroy();
    assert_eq!(clock.subscriber_count(), 0);
    assert!(component.poll().is_none());
}

#[test]
fn start_while_loading_is_applied_at_ready() {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let component = AnimationComponent::new(config(BackendKind::Raster), &clock, &node).unwrap();
    component.start().unwrap();
    assert_eq!(component.state(), ComponentState::Loading);
    assert!(!component.is_subscribed());
    assert!(matches!(component.wait_ready(WAIT), Some(ComponentEvent::Ready)));
    assert_eq!(component.state(), ComponentState::Playing);
    assert!(component.is_subscribed());
}

#[test]
fn unchanged_frames_are_not_republished() {
    let (component, clock, node) = ready(BackendKind::Raster);
    component.start().unwrap();
    clock.tick(0.0);
    clock.tick(0.01);
    assert_eq!(node.generation(), 1);
    assert_eq!(
        component.stats(),
        TickStats {
            ticks: 2,
            rendered: 1,
            skipped: 1,
            failed: 0
        }
    );

    assert_eq!(component.replace_text("Label", "Yo").unwrap(), 1);
    clock.tick(0.02);
    assert_eq!(node.generation(), 2);
    clock.tick(0.04);
    assert_eq!(component.current_frame(), FrameIndex(1));
    assert_eq!(node.generation(), 3);
}

#[test]
fn failed_initialization_never_ticks() {
    let clock = FrameClock::new();
    let node = DisplayNode::new();
    let cfg = config(BackendKind::Markup).with_data(json!({"fr": 30, "op": 30}));
    let component = AnimationComponent::new(cfg, &clock, &node).unwrap();
    component.start().unwrap();

    let event = component.wait_ready(WAIT);
    assert!(matches!(
        event,
        Some(ComponentEvent::Failed(LottieError::MalformedDocument(_)))
    ));
    assert_eq!(component.state(), ComponentState::Failed);
    assert!(!component.is_subscribed());
    assert_eq!(clock.subscriber_count(), 0);
    assert!(component.start().is_err());
    assert!(
        component
            .replace_asset("img", "/x.png", true)
            .unwrap_err()
            .is_not_ready()
    );
    component.destroy();
    assert_eq!(component.state(), ComponentState::Stopped);
}

#[test]
fn fonts_queued_while_loading_do_not_block_readiness() {
    let clock = FrameClock::new();
    let component = AnimationComponent::new(config(BackendKind::Raster), &clock, &DisplayNode::new())
        .unwrap();
    assert_eq!(component.set_font("/no/such/font.ttf").unwrap(), None);
    assert!(matches!(component.wait_ready(WAIT), Some(ComponentEvent::Ready)));
    assert!(matches!(
        component.set_font("/no/such/font.ttf"),
        Err(LottieError::Validation(_))
    ));
}

#[test]
fn with_api_exposes_the_animation() {
    let (component, _clock, _node) = ready(BackendKind::Raster);
    let names = component.with_api(|anim| anim.layer_names()).unwrap();
    assert_eq!(names, vec!["Bg".to_string(), "Label".to_string()]);
    component.destroy();
    assert!(component.with_api(|anim| anim.revision()).unwrap_err().is_not_ready());
}

#[test]
fn destroy_unsubscribes_and_is_idempotent() {
    let (component, clock, node) = ready(BackendKind::Markup);
    clock.tick(0.0);
    component.destroy();
    component.destroy();
    assert_eq!(component.state(), ComponentState::Stopped);
    assert_eq!(clock.subscriber_count(), 0);
    clock.tick(1.0);
    assert_eq!(node.generation(), 1);
    assert!(component.start().is_err());
    assert!(component.set_font("/x.ttf").unwrap_err().is_not_ready());
}

#[test]
fn dropping_the_component_unsubscribes() {
    let (component, clock, _node) = ready(BackendKind::Markup);
    assert_eq!(clock.subscriber_count(), 1);
    drop(component);
    assert_eq!(clock.subscriber_count(), 0);
}
