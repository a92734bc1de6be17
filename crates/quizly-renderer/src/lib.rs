//! Host contracts for quizly documentation builds.
//!
//! A build has two phases:
//!
//! 1. **Parse**: [`DirectiveProcessor`](directive::DirectiveProcessor) scans a
//!    markdown document for block directives (`:::name[args]{options}` ... `:::`)
//!    and hands each one to the [`BlockDirective`](directive::BlockDirective)
//!    registered under that name. Handlers return a [`Node`].
//!
//! 2. **Render**: [`DocumentRenderer`] walks the resulting [`Document`] once per
//!    output format. Markdown segments go through the [`RenderBackend`]; nodes
//!    are dispatched to the [`NodeVisitor`] registered for their node type and
//!    the active format, which appends markup to the output [`Body`].
//!
//! # Example
//!
//! ```
//! use quizly_renderer::directive::{
//!     BlockDirective, DirectiveContext, DirectiveError, DirectiveProcessor, Invocation,
//! };
//! use quizly_renderer::{
//!     Body, DocumentRenderer, HtmlBackend, Node, NodeVisitor, Registry, RenderError,
//!     SourceLocation,
//! };
//!
//! #[derive(Debug)]
//! struct Banner {
//!     text: String,
//!     source: SourceLocation,
//! }
//!
//! impl Node for Banner {
//!     fn node_type(&self) -> &'static str { "banner" }
//!     fn source(&self) -> &SourceLocation { &self.source }
//! }
//!
//! struct BannerDirective;
//!
//! impl BlockDirective for BannerDirective {
//!     fn name(&self) -> &str { "banner" }
//!     fn required_arguments(&self) -> usize { 0 }
//!     fn has_content(&self) -> bool { true }
//!
//!     fn run(
//!         &self,
//!         inv: Invocation,
//!         ctx: &DirectiveContext,
//!     ) -> Result<Box<dyn Node>, DirectiveError> {
//!         Ok(Box::new(Banner { text: inv.content.join(" "), source: ctx.location() }))
//!     }
//! }
//!
//! struct BannerHtml;
//!
//! impl NodeVisitor for BannerHtml {
//!     fn visit(&mut self, node: &dyn Node, body: &mut Body) -> Result<(), RenderError> {
//!         if let Some(banner) = node.downcast_ref::<Banner>() {
//!             body.push(format!("<aside>{}</aside>", banner.text));
//!         }
//!         Ok(())
//!     }
//!
//!     fn depart(&mut self, _node: &dyn Node, _body: &mut Body) -> Result<(), RenderError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.add_directive(BannerDirective);
//! registry.add_node::<HtmlBackend>("banner", BannerHtml);
//!
//! let doc = DirectiveProcessor::new(&registry)
//!     .parse("# Title\n\n:::banner\nHello\n:::\n")
//!     .unwrap();
//! let html = DocumentRenderer::<HtmlBackend>::new(&mut registry)
//!     .render(&doc)
//!     .unwrap();
//! assert!(html.contains("<h1>Title</h1>"));
//! assert!(html.contains("<aside>Hello</aside>"));
//! ```

mod backend;
mod body;
pub mod directive;
mod node;
mod registry;
mod render;
pub mod template;

pub use backend::{HtmlBackend, RenderBackend};
pub use body::{Body, Capture};
pub use node::{Document, Node, Segment, SourceLocation};
pub use registry::Registry;
pub use render::{DocumentRenderer, NodeVisitor, RenderError};
