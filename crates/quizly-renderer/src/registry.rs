//! Directive and node registration.

use std::collections::HashMap;

use crate::backend::RenderBackend;
use crate::directive::BlockDirective;
use crate::render::NodeVisitor;

/// Dispatch table for directives and node visitors.
///
/// Components register themselves once at startup: a directive handler under
/// its name, and one visitor per output format under the node type the handler
/// produces.
///
/// ```
/// use quizly_renderer::{Body, HtmlBackend, Node, NodeVisitor, Registry, RenderError};
///
/// struct Noop;
///
/// impl NodeVisitor for Noop {
///     fn visit(&mut self, _: &dyn Node, _: &mut Body) -> Result<(), RenderError> { Ok(()) }
///     fn depart(&mut self, _: &dyn Node, _: &mut Body) -> Result<(), RenderError> { Ok(()) }
/// }
///
/// let mut registry = Registry::new();
/// registry.add_node::<HtmlBackend>("noop", Noop);
/// assert!(registry.has_visitor("noop", "html"));
/// assert!(!registry.has_visitor("noop", "latex"));
/// ```
#[derive(Default)]
pub struct Registry {
    directives: HashMap<String, Box<dyn BlockDirective>>,
    visitors: HashMap<(&'static str, &'static str), Box<dyn NodeVisitor>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directive handler under [`BlockDirective::name`].
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn add_directive<D: BlockDirective + 'static>(&mut self, handler: D) {
        let name = handler.name().to_owned();
        if self.directives.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::warn!(directive = %name, "Directive registered twice, replacing");
        }
    }

    /// Register the visitor for `node_type` when rendering with backend `B`.
    pub fn add_node<B: RenderBackend>(
        &mut self,
        node_type: &'static str,
        visitor: impl NodeVisitor + 'static,
    ) {
        self.visitors
            .insert((node_type, B::FORMAT), Box::new(visitor));
    }

    /// Look up a directive handler by name.
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<&dyn BlockDirective> {
        self.directives.get(name).map(AsRef::as_ref)
    }

    /// Whether a visitor is registered for `node_type` in `format`.
    #[must_use]
    pub fn has_visitor(&self, node_type: &str, format: &str) -> bool {
        self.visitors
            .keys()
            .any(|(ty, fmt)| *ty == node_type && *fmt == format)
    }

    pub(crate) fn visitor_mut(
        &mut self,
        node_type: &'static str,
        format: &'static str,
    ) -> Option<&mut (dyn NodeVisitor + 'static)> {
        self.visitors
            .get_mut(&(node_type, format))
            .map(AsMut::as_mut)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut directives: Vec<_> = self.directives.keys().collect();
        directives.sort();
        let mut visitors: Vec<_> = self.visitors.keys().collect();
        visitors.sort_unstable();
        f.debug_struct("Registry")
            .field("directives", &directives)
            .field("visitors", &visitors)
            .finish()
    }
}
