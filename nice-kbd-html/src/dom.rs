//! HTML rewriting (rendered HTML → HTML with `<kbd>` elements)
//!
//! Pipeline: HTML string → RcDom → rewrite text runs → HTML string
//!
//! Text runs are handled one text node at a time, so a combo never spans
//! sibling elements. Code-like elements, existing `<kbd>` elements and
//! anything classed as a tag or comment are left exactly as parsed.

use crate::error::RenderError;
use crate::renderer::{Segment, StaticRenderer};
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope,
    Attribute, LocalName, ParseOpts, QualName,
};
use log::debug;
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const PASS_THROUGH_TAGS: &[&str] = &[
    "code", "pre", "s", "del", "strike", "kbd", "script", "style", "textarea", "title",
];

const PASS_THROUGH_CLASSES: &[&str] = &["tag", "comment"];

/// Opens the body before the fragment starts, so leading comments and
/// head-only elements (`<style>`, `<meta>`, `<title>`) stay in the body.
const FRAGMENT_PREFIX: &str = "<!DOCTYPE html><html><head></head><body>";

impl StaticRenderer {
    /// Rewrite every qualifying text run of an HTML fragment.
    pub fn render_html(&self, html: &str) -> Result<String, RenderError> {
        if !self.is_enabled() {
            return Ok(html.to_string());
        }

        let document = format!("{FRAGMENT_PREFIX}{html}");
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut document.as_bytes())
            .map_err(RenderError::Parse)?;
        let body = find_element(&dom.document, "body").ok_or(RenderError::MissingBody)?;

        let rewritten = self.rewrite_children(&body);
        debug!("rewrote {rewritten} text runs");

        serialize_children(&body)
    }

    /// Returns how many text runs were replaced below `parent`.
    fn rewrite_children(&self, parent: &Handle) -> usize {
        let children: Vec<Handle> = parent.children.borrow().clone();
        let mut replacement = Vec::with_capacity(children.len());
        let mut rewritten = 0;

        for child in children {
            let text = match &child.data {
                NodeData::Text { contents } => Some(contents.borrow().to_string()),
                NodeData::Element { .. } => {
                    if !passes_through(&child) {
                        rewritten += self.rewrite_children(&child);
                    }
                    None
                }
                _ => None,
            };

            let Some(text) = text else {
                replacement.push(child);
                continue;
            };
            let segments = self.segments(&text);
            if !segments.iter().any(|segment| matches!(segment, Segment::Kbd(_))) {
                replacement.push(child);
                continue;
            }

            rewritten += 1;
            for segment in segments {
                let node = match segment {
                    Segment::Text(text) => create_text(text),
                    Segment::Kbd(key) => self.create_kbd(key),
                };
                node.parent.set(Some(Rc::downgrade(parent)));
                replacement.push(node);
            }
        }

        if rewritten > 0 {
            *parent.children.borrow_mut() = replacement;
        }
        rewritten
    }

    fn create_kbd(&self, key: &str) -> Handle {
        let attrs = match self.class() {
            Some(class) => vec![("class", class)],
            None => vec![],
        };
        let kbd = create_element("kbd", attrs);
        let text = create_text(key);
        text.parent.set(Some(Rc::downgrade(&kbd)));
        kbd.children.borrow_mut().push(text);
        kbd
    }
}

fn passes_through(element: &Handle) -> bool {
    let NodeData::Element { name, attrs, .. } = &element.data else {
        return false;
    };
    if PASS_THROUGH_TAGS.contains(&&*name.local) {
        return true;
    }
    attrs.borrow().iter().any(|attr| {
        &*attr.name.local == "class"
            && attr
                .value
                .split_whitespace()
                .any(|class| PASS_THROUGH_CLASSES.contains(&class))
    })
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &node.data {
        if &*name.local == tag {
            return Some(node.clone());
        }
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize the children of `parent` (not `parent` itself)
fn serialize_children(parent: &Handle) -> Result<String, RenderError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    serialize(&mut output, &SerializableHandle::from(parent.clone()), opts)
        .map_err(RenderError::Serialize)?;
    Ok(String::from_utf8(output)?)
}
