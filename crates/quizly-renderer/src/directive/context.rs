//! Directive processing context.
//!
//! Provides source location and path resolution to directive handlers.

use std::path::{Path, PathBuf};

use crate::node::SourceLocation;

/// Context provided to directive handlers.
///
/// Created by [`DirectiveProcessor`](super::DirectiveProcessor) for each
/// directive.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use quizly_renderer::directive::DirectiveContext;
///
/// let ctx = DirectiveContext {
///     source_path: Some(Path::new("docs/unit1/intro.md")),
///     source_root: Path::new("docs"),
///     docname: "unit1/intro",
///     line: 7,
/// };
///
/// let (rel, abs) = ctx.relfn2path("quiz_intro");
/// assert_eq!(rel, "unit1/quiz_intro");
/// assert_eq!(abs, Path::new("docs/unit1/quiz_intro"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirectiveContext<'a> {
    /// Path to the source file being parsed (if known).
    pub source_path: Option<&'a Path>,
    /// Root of the source tree.
    pub source_root: &'a Path,
    /// Name of the document being parsed (e.g. `unit1/intro`).
    pub docname: &'a str,
    /// Line number where the directive opener appears (1-indexed).
    pub line: usize,
}

impl DirectiveContext<'_> {
    /// Source location of the directive, for error reporting and node provenance.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.source_path.map(Path::to_path_buf), self.line)
    }

    /// Resolve a directive argument naming a file.
    ///
    /// Returns `(rel, abs)` where `rel` is `/`-separated and relative to the
    /// source root:
    ///
    /// - an argument starting with `/` is already relative to the source root;
    /// - anything else is relative to the directory of the current document.
    ///
    /// ```
    /// use std::path::Path;
    /// use quizly_renderer::directive::DirectiveContext;
    ///
    /// let ctx = DirectiveContext {
    ///     source_path: None,
    ///     source_root: Path::new("/src"),
    ///     docname: "a/b/page",
    ///     line: 1,
    /// };
    ///
    /// assert_eq!(ctx.relfn2path("/top/quiz").0, "top/quiz");
    /// assert_eq!(ctx.relfn2path("quiz").0, "a/b/quiz");
    /// ```
    #[must_use]
    pub fn relfn2path(&self, filename: &str) -> (String, PathBuf) {
        let filename = filename.replace('\\', "/");
        let rel = if let Some(from_root) = filename.strip_prefix('/') {
            from_root.to_owned()
        } else {
            match self.docname.rsplit_once('/') {
                Some((dir, _)) => format!("{dir}/{filename}"),
                None => filename,
            }
        };
        let abs = self.source_root.join(&rel);
        (rel, abs)
    }
}
