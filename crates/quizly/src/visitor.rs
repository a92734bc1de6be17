//! HTML rendering of quizly nodes.

use std::sync::Arc;

use quizly_assets::AssetInstaller;
use quizly_db::QuestionDb;
use quizly_renderer::{Body, Capture, Node, NodeVisitor, RenderError};

use crate::node::QuizlyNode;

/// Renders [`QuizlyNode`]s to HTML.
///
/// `visit` appends the filled template and makes sure the player resources are
/// installed. `depart` collects everything appended since the matching
/// `visit` and records it as the question's HTML.
pub struct QuizlyHtmlVisitor {
    assets: Arc<AssetInstaller>,
    db: Arc<dyn QuestionDb>,
    captures: Vec<Capture>,
}

impl QuizlyHtmlVisitor {
    /// Create a visitor installing resources with `assets` and recording
    /// fragments into `db`.
    #[must_use]
    pub fn new(assets: Arc<AssetInstaller>, db: Arc<dyn QuestionDb>) -> Self {
        Self {
            assets,
            db,
            captures: Vec::new(),
        }
    }

    fn quizly_node(node: &dyn Node) -> Result<&QuizlyNode, RenderError> {
        node.downcast_ref::<QuizlyNode>()
            .ok_or_else(|| RenderError::UnexpectedNode {
                node_type: node.node_type(),
                location: node.source().clone(),
            })
    }
}

impl NodeVisitor for QuizlyHtmlVisitor {
    fn visit(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError> {
        let quiz = Self::quizly_node(node)?;
        let capture = body.begin_capture();

        let html = quiz.render().map_err(|source| RenderError::Template {
            location: node.source().clone(),
            source,
        })?;
        self.assets
            .ensure_installed()
            .map_err(|e| RenderError::visitor(node, e))?;

        tracing::debug!(divid = %quiz.divid(), quizname = %quiz.quizname, "Rendered quizly node");
        body.push(html);
        self.captures.push(capture);
        Ok(())
    }

    fn depart(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError> {
        let quiz = Self::quizly_node(node)?;
        let capture = self
            .captures
            .pop()
            .ok_or_else(|| RenderError::CaptureNotStarted {
                location: node.source().clone(),
            })?;

        let fragment = body.end_capture(capture);
        self.db
            .record_html(quiz.divid(), quiz.basecourse(), &fragment)
            .map_err(|e| RenderError::visitor(node, e))
    }
}
