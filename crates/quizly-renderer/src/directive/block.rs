//! Block directive trait.

use super::{DirectiveArgs, DirectiveContext, DirectiveError};
use crate::node::Node;

/// One occurrence of a block directive in a source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Directive name.
    pub name: String,
    /// Arguments and options from the opener line.
    pub args: DirectiveArgs,
    /// Lines between the opener and the closing colons, verbatim.
    pub content: Vec<String>,
    /// The full directive text, opener and closer included.
    pub block_text: String,
}

/// Handler for block directives: `:::name[arguments]{options}` ... `:::`
///
/// The processor checks the declared arity before calling [`run`](Self::run):
/// the argument count must lie in
/// `required_arguments()..=required_arguments() + optional_arguments()` and
/// content is only accepted when [`has_content`](Self::has_content) is true.
///
/// # Thread Safety
///
/// Handlers are shared through the [`Registry`](crate::Registry) and take
/// `&self`; any state they record must be `Sync`.
pub trait BlockDirective: Send + Sync {
    /// Directive name matched against `:::name`.
    fn name(&self) -> &str;

    /// Number of arguments that must be supplied.
    fn required_arguments(&self) -> usize;

    /// Number of additional arguments that may be supplied.
    fn optional_arguments(&self) -> usize {
        0
    }

    /// Whether the directive accepts a content block.
    fn has_content(&self) -> bool;

    /// Build the node for one directive occurrence.
    fn run(
        &self,
        invocation: Invocation,
        ctx: &DirectiveContext,
    ) -> Result<Box<dyn Node>, DirectiveError>;
}
