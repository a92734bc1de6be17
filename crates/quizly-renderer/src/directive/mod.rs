//! Block directives: `:::name[arguments]{options}` ... `:::`.
//!
//! A block directive names a handler, passes it whitespace-separated
//! arguments and `key="value"` options, and hands over the lines between the
//! opener and the closing colons verbatim:
//!
//! ```text
//! :::quizly[quiz_eval_expression]{qnumber="1.4"}
//! :quizname: quiz_eval_expression
//! :::
//! ```
//!
//! [`DirectiveProcessor`] enforces each handler's declared arity before calling
//! [`BlockDirective::run`], so handlers never re-validate argument counts.

mod args;
mod block;
mod context;
mod fence;
mod parser;
mod processor;

pub use args::DirectiveArgs;
pub use block::{BlockDirective, Invocation};
pub use context::DirectiveContext;
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig, docname_for};

use crate::node::SourceLocation;

/// Error raised while parsing a directive.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    /// Argument count outside the handler's declared range.
    #[error("{location}: directive \"{name}\" expects {expected} argument(s), got {found}")]
    Arguments {
        /// Directive name.
        name: String,
        /// Human-readable accepted range (e.g. `1` or `1-2`).
        expected: String,
        /// Number of arguments supplied.
        found: usize,
        /// Where the directive appeared.
        location: SourceLocation,
    },
    /// Content supplied to a directive that declares none.
    #[error("{location}: directive \"{name}\" does not accept content")]
    UnexpectedContent {
        /// Directive name.
        name: String,
        /// Where the directive appeared.
        location: SourceLocation,
    },
    /// The document ended before the directive's closing colons.
    #[error("{location}: directive \"{name}\" is never closed")]
    Unclosed {
        /// Directive name.
        name: String,
        /// Where the directive appeared.
        location: SourceLocation,
    },
    /// A value the handler needs is absent (e.g. an empty content block).
    #[error("{location}: directive \"{name}\" is missing {what}")]
    Missing {
        /// Directive name.
        name: String,
        /// Description of what is missing.
        what: String,
        /// Where the directive appeared.
        location: SourceLocation,
    },
}
