use super::*;

#[test]
fn serializes_with_escaping() {
    let el = Element::new("text")
        .attr("font-family", "A \"quoted\" & font")
        .text("1 < 2 & 3 > 2");
    assert_eq!(
        el.outer_html().unwrap(),
        "<text font-family=\"A &quot;quoted&quot; &amp; font\">1 &lt; 2 &amp; 3 &gt; 2</text>"
    );
}

#[test]
fn set_attr_replaces_in_place() {
    let mut el = Element::new("g").attr("a", 1).attr("b", 2);
    el.set_attr("a", 3);
    assert_eq!(el.get_attr("a"), Some("3"));
    assert_eq!(el.outer_html().unwrap(), "<g a=\"3\" b=\"2\"/>");
}

#[test]
fn inner_html_and_search() {
    let mut root = Element::new("div");
    root.append(Element::new("svg").child(Element::new("path")).child(Element::new("path")));
    assert_eq!(root.inner_html().unwrap(), "<svg><path/><path/></svg>");
    assert_eq!(root.find_by_tag("path").len(), 2);
    root.clear_children();
    assert!(root.children().is_empty());
}

#[test]
fn environments_are_independent() {
    let canvas = Canvas::new(320, 240).unwrap();
    let mut a = MarkupEnvironment::new(canvas, FontRegistry::new(false));
    let b = MarkupEnvironment::new(canvas, FontRegistry::new(false));

    a.document_mut().append(Element::new("svg"));
    assert_eq!(a.document().children().len(), 1);
    assert!(b.document().children().is_empty());
    assert_eq!(b.window().inner_width, 320);
}

#[test]
fn text_and_attributes_survive_a_reparse() {
    let el = Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .child(Element::new("text").attr("font-family", "O'Neil <Sans>").text("a'b\"c"));
    let markup = el.outer_html().unwrap();
    let tree = usvg::Tree::from_str(&markup, &usvg::Options::default());
    assert!(tree.is_ok(), "{markup}");
    assert!(!markup.contains("<Sans>"));
}
