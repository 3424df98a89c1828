//! In-memory structural index.
//!
//! A plain tree of named spans over a source string. Hosts with their own
//! syntax tree implement [`StructuralIndex`] directly; this one backs tests
//! and the CLI, which reads it from JSON:
//!
//! ```json
//! { "source": "Use `⌘S`", "nodes": [ { "name": "inline-code", "from": 4, "to": 10 } ] }
//! ```

use super::{StructuralIndex, ViewMode};
use serde::{Deserialize, Serialize};
use std::ops::Range;

const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Syntax tag; empty when the host could not classify the node.
    pub name: String,
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(name: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            name: name.into(),
            from,
            to,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.children.push(child);
        self
    }
}

/// On-disk form of a [`SyntaxTree`].
#[derive(Debug, Clone, Deserialize)]
pub struct SyntaxTreeFile {
    pub source: String,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub nodes: Vec<SyntaxNode>,
}

#[derive(Debug, Clone)]
struct FlatNode {
    name: Option<String>,
    span: Range<usize>,
    children: Vec<usize>,
}

/// Arena-backed tree. Region handles are indices; the root (index 0) spans
/// the whole source and is unclassified.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    view_mode: ViewMode,
    nodes: Vec<FlatNode>,
}

impl SyntaxTree {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let root = FlatNode {
            name: None,
            span: 0..source.len(),
            children: Vec::new(),
        };
        Self {
            source,
            view_mode: ViewMode::LivePreview,
            nodes: vec![root],
        }
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    /// Attach `node` (and its descendants) as the next child of the root.
    pub fn with_node(mut self, node: SyntaxNode) -> Self {
        let id = self.insert(node);
        self.nodes[ROOT].children.push(id);
        self
    }

    fn insert(&mut self, node: SyntaxNode) -> usize {
        let to = node.to.min(self.source.len());
        let from = node.from.min(to);
        let id = self.nodes.len();
        self.nodes.push(FlatNode {
            name: Some(node.name).filter(|name| !name.is_empty()),
            span: from..to,
            children: Vec::new(),
        });
        for child in node.children {
            let child_id = self.insert(child);
            self.nodes[id].children.push(child_id);
        }
        id
    }
}

impl From<SyntaxTreeFile> for SyntaxTree {
    fn from(file: SyntaxTreeFile) -> Self {
        file.nodes.into_iter().fold(
            SyntaxTree::new(file.source).with_view_mode(file.view_mode),
            SyntaxTree::with_node,
        )
    }
}

impl StructuralIndex for SyntaxTree {
    type Region = usize;

    fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    fn root(&self) -> usize {
        ROOT
    }

    fn children(&self, region: usize) -> Vec<usize> {
        self.nodes
            .get(region)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn classify(&self, region: usize) -> Option<&str> {
        self.nodes.get(region)?.name.as_deref()
    }

    fn span(&self, region: usize) -> Range<usize> {
        self.nodes
            .get(region)
            .map(|node| node.span.clone())
            .unwrap_or(0..0)
    }

    fn text_of(&self, region: usize) -> &str {
        self.source.get(self.span(region)).unwrap_or("")
    }
}
