use anyhow::Context as _;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::foundation::core::Canvas;
use crate::foundation::error::LottieResult;
use crate::render::fonts::FontRegistry;

/// Markup tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Nested element.
    Element(Element),
    /// Character data.
    Text(String),
}

/// A minimal DOM element: tag, ordered attributes and children.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    /// Attribute value, if set.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Builder form of [`Element::append`].
    pub fn child(mut self, el: Element) -> Self {
        self.append(el);
        self
    }

    /// Builder: append character data.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Append a child element.
    pub fn append(&mut self, el: Element) {
        self.children.push(Node::Element(el));
    }

    /// Remove every child.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Depth-first search for descendants (including `self`) with `tag`.
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.walk(&mut |el| {
            if el.tag == tag {
                out.push(el);
            }
        });
        out
    }

    fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for child in &self.children {
            if let Node::Element(el) = child {
                el.walk(f);
            }
        }
    }

    /// Serialize this element and its subtree.
    pub fn outer_html(&self) -> LottieResult<String> {
        serialize(|writer| self.write_xml(writer))
    }

    /// Serialize the children only.
    pub fn inner_html(&self) -> LottieResult<String> {
        serialize(|writer| {
            self.children
                .iter()
                .try_for_each(|child| write_node(child, writer))
        })
    }

    fn write_xml(&self, writer: &mut Writer<Vec<u8>>) -> anyhow::Result<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (name, value) in &self.attrs {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            write_node(child, writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        Ok(())
    }
}

fn write_node(node: &Node, writer: &mut Writer<Vec<u8>>) -> anyhow::Result<()> {
    match node {
        Node::Element(el) => el.write_xml(writer),
        Node::Text(t) => {
            writer.write_event(Event::Text(BytesText::new(t)))?;
            Ok(())
        }
    }
}

fn serialize(
    write: impl FnOnce(&mut Writer<Vec<u8>>) -> anyhow::Result<()>,
) -> LottieResult<String> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer).context("serialize markup tree")?;
    let markup = String::from_utf8(writer.into_inner()).context("markup is not UTF-8")?;
    Ok(markup)
}

/// Viewport the markup renderer lays its root element out in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    /// Viewport width in pixels.
    pub inner_width: u32,
    /// Viewport height in pixels.
    pub inner_height: u32,
}

/// Emulated document and window owned by a single markup backend, plus its font database.
///
/// Every markup backend builds its own environment and threads it through rendering explicitly;
/// nothing here is process-wide, so concurrent instances cannot observe each other.
#[derive(Clone, Debug)]
pub struct MarkupEnvironment {
    document: Element,
    window: WindowInfo,
    fonts: FontRegistry,
}

impl MarkupEnvironment {
    /// Build an environment sized to `canvas`.
    pub fn new(canvas: Canvas, fonts: FontRegistry) -> Self {
        Self {
            document: Element::new("div").attr("class", "lottie-container"),
            window: WindowInfo {
                inner_width: canvas.width,
                inner_height: canvas.height,
            },
            fonts,
        }
    }

    /// Container element the renderer mounts into.
    pub fn document(&self) -> &Element {
        &self.document
    }

    /// Mutable container element.
    pub fn document_mut(&mut self) -> &mut Element {
        &mut self.document
    }

    /// Viewport the next frame is laid out in.
    pub fn window(&self) -> WindowInfo {
        self.window
    }

    /// Instance font database.
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Mutable instance font database.
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dom.rs"]
mod tests;
