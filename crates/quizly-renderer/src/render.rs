//! Render pass over a parsed document.

use std::marker::PhantomData;

use crate::backend::RenderBackend;
use crate::body::Body;
use crate::node::{Document, Node, Segment, SourceLocation};
use crate::registry::Registry;
use crate::template::TemplateError;

/// Error raised while rendering a node.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No visitor is registered for the node type in the active format.
    #[error("{location}: no {format} visitor registered for node type \"{node_type}\"")]
    NoVisitor {
        /// Node type of the unrenderable node.
        node_type: &'static str,
        /// Active output format.
        format: &'static str,
        /// Where the node's directive appeared.
        location: SourceLocation,
    },
    /// A visitor received a node of a type it does not handle.
    #[error("{location}: visitor cannot render node type \"{node_type}\"")]
    UnexpectedNode {
        /// Node type that was received.
        node_type: &'static str,
        /// Where the node's directive appeared.
        location: SourceLocation,
    },
    /// `depart` ran without a capture opened by `visit`.
    #[error("{location}: depart called without a matching visit")]
    CaptureNotStarted {
        /// Where the node's directive appeared.
        location: SourceLocation,
    },
    /// Template formatting failed.
    #[error("{location}: {source}")]
    Template {
        /// Where the node's directive appeared.
        location: SourceLocation,
        /// Underlying template error.
        #[source]
        source: TemplateError,
    },
    /// A visitor side effect (asset copy, database write) failed.
    #[error("{location}: {source}")]
    Visitor {
        /// Where the node's directive appeared.
        location: SourceLocation,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RenderError {
    /// Wrap a visitor side-effect error with the node's location.
    pub fn visitor(
        node: &dyn Node,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Visitor {
            location: node.source().clone(),
            source: source.into(),
        }
    }
}

/// Per-format render callbacks for one node type.
///
/// For each node the renderer calls [`visit`](Self::visit) and then
/// [`depart`](Self::depart) with the same body.
pub trait NodeVisitor: Send {
    /// Called when the renderer enters the node.
    fn visit(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError>;

    /// Called when the renderer leaves the node.
    fn depart(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError>;
}

/// Renders documents to backend `B`, dispatching nodes through a [`Registry`].
pub struct DocumentRenderer<'r, B: RenderBackend> {
    registry: &'r mut Registry,
    _backend: PhantomData<B>,
}

impl<'r, B: RenderBackend> DocumentRenderer<'r, B> {
    /// Create a renderer using the visitors in `registry`.
    pub fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            _backend: PhantomData,
        }
    }

    /// Render a whole document to a string.
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`] raised by a node; rendering stops there.
    pub fn render(&mut self, document: &Document) -> Result<String, RenderError> {
        let mut body = Body::new();
        self.render_into(document, &mut body)?;
        Ok(body.to_html())
    }

    /// Render a document, appending to an existing body.
    ///
    /// # Errors
    ///
    /// Returns the first [`RenderError`] raised by a node.
    pub fn render_into(&mut self, document: &Document, body: &mut Body) -> Result<(), RenderError> {
        let mut nodes = 0usize;
        for segment in &document.segments {
            match segment {
                Segment::Markdown(markdown) => {
                    let mut out = String::new();
                    B::render_markdown(markdown, &mut out);
                    body.push(out);
                }
                Segment::Node(node) => {
                    self.render_node(node.as_ref(), body)?;
                    nodes += 1;
                }
            }
        }

        tracing::debug!(
            docname = %document.docname,
            format = B::FORMAT,
            nodes,
            "Rendered document"
        );
        Ok(())
    }

    fn render_node(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError> {
        let visitor = self
            .registry
            .visitor_mut(node.node_type(), B::FORMAT)
            .ok_or_else(|| RenderError::NoVisitor {
                node_type: node.node_type(),
                format: B::FORMAT,
                location: node.source().clone(),
            })?;

        visitor.visit(node, body)?;
        visitor.depart(node, body)
    }
}
