use super::*;

fn empty_db() -> Arc<usvg::fontdb::Database> {
    Arc::new(usvg::fontdb::Database::new())
}

#[test]
fn rasterizes_and_stretches_to_requested_size() {
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2" viewBox="0 0 2 2">
        <rect x="0" y="0" width="2" height="2" fill="rgb(255,0,0)"/></svg>"#;
    let tree = parse_svg(svg, empty_db()).unwrap();
    let rgba = rasterize_svg_to_premul_rgba8(&tree, 4, 4).unwrap();
    assert_eq!(rgba.len(), 4 * 4 * 4);
    assert!(rgba.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn invalid_markup_is_an_error() {
    assert!(parse_svg(b"<not-svg", empty_db()).is_err());
}
