use std::path::PathBuf;

use serde_json::json;

use super::*;
use crate::engine::scene::{DrawItem, ImageSource};

fn document() -> AnimationDocument {
    let value = json!({
        "fr": 30, "ip": 0, "op": 150, "w": 100, "h": 100,
        "fonts": {"list": [{"fName": "Main", "fFamily": "Roboto"}]},
        "assets": [
            {"id": "img_0", "w": 10, "h": 10, "u": "images/", "p": "a.png"},
            {"id": 17, "u": "", "p": "b.png"},
            {"id": "comp_0", "layers": [
                {"ty": 1, "nm": "Box", "sc": "#00ff00", "sw": 10, "sh": 10}
            ]}
        ],
        "layers": [
            {"ty": 5, "nm": "Title", "t": {"d": {"k": [
                {"t": 0, "s": {"t": "Hello", "s": 20, "f": "Main", "fc": [1, 1, 1], "j": 2}}
            ]}}},
            {"ty": 4, "nm": "Box", "ln": "box", "shapes": []},
            {"ty": 2, "refId": "img_0"},
            {"ty": 0, "nm": "Inner", "refId": "comp_0"}
        ]
    });
    AnimationDocument::from_value(&value, Some(PathBuf::from("/doc"))).unwrap()
}

fn image_sources(anim: &LottieAnimation) -> Vec<ImageSource> {
    anim.scene()
        .items
        .into_iter()
        .filter_map(|i| match i {
            DrawItem::Image { source, .. } => Some(source),
            _ => None,
        })
        .collect()
}

#[test]
fn seek_clamps_to_last_frame() {
    let mut anim = LottieAnimation::new(&document());
    assert_eq!(anim.seek(FrameIndex(1000)), FrameIndex(149));
    assert_eq!(anim.current_frame(), FrameIndex(149));
    assert_eq!(anim.scene_at(FrameIndex(3)).frame, FrameIndex(3));
}

#[test]
fn replace_asset_absolute_stores_path_verbatim() {
    let mut anim = LottieAnimation::new(&document());
    assert_eq!(
        image_sources(&anim),
        vec![ImageSource::File(PathBuf::from("/doc/images/a.png"))]
    );
    anim.replace_asset("img_0", "/abs/x.png", true).unwrap();
    assert_eq!(
        image_sources(&anim),
        vec![ImageSource::File(PathBuf::from("/abs/x.png"))]
    );
    assert_eq!(anim.revision(), 1);
}

#[test]
fn replace_asset_relative_resolves_against_document_dir() {
    let mut anim = LottieAnimation::new(&document());
    anim.replace_asset("img_0", "new.png", false).unwrap();
    assert_eq!(
        image_sources(&anim),
        vec![ImageSource::File(PathBuf::from("/doc/new.png"))]
    );
}

#[test]
fn replace_asset_matches_numeric_ids_and_rejects_unknown() {
    let mut anim = LottieAnimation::new(&document());
    anim.replace_asset("17", "/abs/y.png", true).unwrap();

    let err = anim.replace_asset("missing", "/x.png", true).unwrap_err();
    assert!(matches!(err, LottieError::Validation(_)));
    let err = anim.replace_asset("comp_0", "/x.png", true).unwrap_err();
    assert!(matches!(err, LottieError::Validation(_)));
    assert_eq!(anim.revision(), 1);
}

#[test]
fn replace_text_by_content_and_by_layer_name() {
    let mut anim = LottieAnimation::new(&document());
    assert_eq!(anim.replace_text("nope", "x"), 0);
    assert_eq!(anim.revision(), 0);

    assert_eq!(anim.replace_text("Hello", "Bonjour"), 1);
    assert_eq!(anim.replace_text("Title", "Hallo"), 1);
    let text = anim.scene().items.into_iter().find_map(|i| match i {
        DrawItem::Text(run) => Some(run),
        _ => None,
    });
    assert_eq!(text.unwrap().lines, vec!["Hallo".to_string()]);
}

#[test]
fn find_elements_recurses_into_precomps() {
    let anim = LottieAnimation::new(&document());
    let found = anim.find_elements("Box");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].composition, None);
    assert_eq!(found[0].layer_index, 1);
    assert_eq!(found[1].composition.as_deref(), Some("comp_0"));
    assert_eq!(found[1].kind, LayerKind::Solid);

    let by_id = anim.find_elements("box");
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].kind, LayerKind::Shape);
    assert!(anim.find_elements("absent").is_empty());
}

#[test]
fn font_override_applies_to_text_runs() {
    let mut anim = LottieAnimation::new(&document());
    anim.set_font_family(Some("Custom Sans".to_string()));
    assert_eq!(anim.font_family(), Some("Custom Sans"));
    let family = anim.scene().items.into_iter().find_map(|i| match i {
        DrawItem::Text(run) => Some(run.font_family),
        _ => None,
    });
    assert_eq!(family.as_deref(), Some("Custom Sans"));
}

#[test]
fn mutations_do_not_touch_the_loaded_document() {
    let doc = document();
    let mut anim = LottieAnimation::new(&doc);
    anim.replace_text("Hello", "Changed");
    let original = doc.model().layers[0].t.as_ref().unwrap().d.k[0].s.t.clone();
    assert_eq!(original, "Hello");
    assert_eq!(anim.layer_names()[0], "Title");
    assert_eq!(anim.layer_names()[2], "layer 2");
}
