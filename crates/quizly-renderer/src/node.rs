//! Document tree produced by the parse phase.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

/// Where a directive appeared in its source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file, if known.
    pub path: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl SourceLocation {
    /// Create a location with a file path.
    #[must_use]
    pub fn new(path: Option<PathBuf>, line: usize) -> Self {
        Self { path, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// A render-ready node created by a directive handler.
///
/// Visitors receive nodes as `&dyn Node` and recover their concrete type with
/// [`downcast_ref`](trait.Node.html#method.downcast_ref).
pub trait Node: Any + Send + Sync + fmt::Debug {
    /// Key used to find the node's visitor in the [`Registry`](crate::Registry).
    fn node_type(&self) -> &'static str;

    /// Where the originating directive appeared.
    fn source(&self) -> &SourceLocation;
}

impl dyn Node {
    /// Downcast to a concrete node type.
    #[must_use]
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }
}

/// One piece of a parsed document, in source order.
#[derive(Debug)]
pub enum Segment {
    /// Markdown text between directives, rendered by the backend.
    Markdown(String),
    /// Node produced by a directive handler.
    Node(Box<dyn Node>),
}

/// A parsed source document.
#[derive(Debug, Default)]
pub struct Document {
    /// Document name: source path relative to the source root, without
    /// extension, `/`-separated (e.g. `unit1/intro`).
    pub docname: String,
    /// Source file, if known.
    pub source_path: Option<PathBuf>,
    /// Segments in source order.
    pub segments: Vec<Segment>,
}

impl Document {
    /// Iterate over the nodes of the document.
    pub fn nodes(&self) -> impl Iterator<Item = &dyn Node> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Node(node) => Some(node.as_ref()),
            Segment::Markdown(_) => None,
        })
    }
}
