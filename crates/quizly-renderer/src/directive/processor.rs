//! Parse phase: turn a markdown document into markdown segments and nodes.

use std::path::{Path, PathBuf};

use super::fence::FenceTracker;
use super::parser::{BlockLine, parse_block_line};
use super::{BlockDirective, DirectiveContext, DirectiveError, Invocation};
use crate::node::{Document, SourceLocation, Segment};
use crate::registry::Registry;

/// Configuration for the directive processor.
#[derive(Debug, Clone)]
pub struct DirectiveProcessorConfig {
    /// Root of the source tree, used for path resolution.
    pub source_root: PathBuf,
    /// Path to the source file being parsed (if known).
    pub source_path: Option<PathBuf>,
    /// Name of the document being parsed.
    ///
    /// Default: `index`
    pub docname: String,
}

impl Default for DirectiveProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectiveProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source_root: PathBuf::from("."),
            source_path: None,
            docname: "index".to_owned(),
        }
    }

    /// Set the source root.
    #[must_use]
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    /// Set the source file path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the document name.
    #[must_use]
    pub fn with_docname(mut self, docname: impl Into<String>) -> Self {
        self.docname = docname.into();
        self
    }

    fn create_context(&self, line: usize) -> DirectiveContext<'_> {
        DirectiveContext {
            source_path: self.source_path.as_deref(),
            source_root: &self.source_root,
            docname: &self.docname,
            line,
        }
    }

    fn location(&self, line: usize) -> SourceLocation {
        SourceLocation::new(self.source_path.clone(), line)
    }
}

/// Processor for block directives.
///
/// Lines that are not part of a registered directive are collected into
/// markdown segments unchanged. Directives inside fenced code blocks and
/// directives with no registered handler are left as markdown.
///
/// # Example
///
/// ```
/// use quizly_renderer::directive::{DirectiveProcessor, DirectiveProcessorConfig};
/// use quizly_renderer::{Registry, Segment};
///
/// let registry = Registry::new();
/// let config = DirectiveProcessorConfig::new().with_docname("unit1/intro");
/// let doc = DirectiveProcessor::with_config(&registry, config)
///     .parse(":::unknown\nbody\n:::\n")
///     .unwrap();
///
/// assert_eq!(doc.docname, "unit1/intro");
/// assert!(matches!(&doc.segments[..], [Segment::Markdown(_)]));
/// ```
pub struct DirectiveProcessor<'r> {
    registry: &'r Registry,
    config: DirectiveProcessorConfig,
}

impl<'r> DirectiveProcessor<'r> {
    /// Create a processor with default configuration.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_config(registry, DirectiveProcessorConfig::default())
    }

    /// Create a processor with custom configuration.
    #[must_use]
    pub fn with_config(registry: &'r Registry, config: DirectiveProcessorConfig) -> Self {
        Self { registry, config }
    }

    /// Parse a document.
    ///
    /// # Errors
    ///
    /// Returns the first [`DirectiveError`]: an arity violation, an unclosed
    /// directive, or an error raised by a handler.
    pub fn parse(&self, input: &str) -> Result<Document, DirectiveError> {
        let lines: Vec<&str> = input.lines().collect();
        let mut segments = Vec::new();
        let mut markdown = String::new();
        let mut fence = FenceTracker::default();
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            fence.update(line);

            let opener = if fence.in_fence() {
                None
            } else {
                match parse_block_line(line) {
                    Some(BlockLine::Open {
                        name,
                        args,
                        colon_count,
                    }) => self
                        .registry
                        .directive(&name)
                        .map(|handler| (handler, name, args, colon_count)),
                    _ => None,
                }
            };

            let Some((handler, name, args, colon_count)) = opener else {
                markdown.push_str(line);
                markdown.push('\n');
                idx += 1;
                continue;
            };

            let line_num = idx + 1;
            let end = find_closer(&lines, idx + 1, colon_count).ok_or_else(|| {
                DirectiveError::Unclosed {
                    name: name.clone(),
                    location: self.config.location(line_num),
                }
            })?;

            let invocation = Invocation {
                name,
                args,
                content: lines[idx + 1..end].iter().map(|l| (*l).to_owned()).collect(),
                block_text: lines[idx..=end].join("\n"),
            };

            if !markdown.is_empty() {
                segments.push(Segment::Markdown(std::mem::take(&mut markdown)));
            }
            segments.push(Segment::Node(self.run(handler, invocation, line_num)?));
            idx = end + 1;
        }

        if !markdown.is_empty() {
            segments.push(Segment::Markdown(markdown));
        }

        Ok(Document {
            docname: self.config.docname.clone(),
            source_path: self.config.source_path.clone(),
            segments,
        })
    }

    fn run(
        &self,
        handler: &dyn BlockDirective,
        invocation: Invocation,
        line: usize,
    ) -> Result<Box<dyn crate::Node>, DirectiveError> {
        let required = handler.required_arguments();
        let max = required + handler.optional_arguments();
        let found = invocation.args.arguments.len();

        if found < required || found > max {
            let expected = if max == required {
                required.to_string()
            } else {
                format!("{required}-{max}")
            };
            return Err(DirectiveError::Arguments {
                name: invocation.name,
                expected,
                found,
                location: self.config.location(line),
            });
        }

        if !handler.has_content() && invocation.content.iter().any(|l| !l.trim().is_empty()) {
            return Err(DirectiveError::UnexpectedContent {
                name: invocation.name,
                location: self.config.location(line),
            });
        }

        tracing::debug!(
            directive = %invocation.name,
            docname = %self.config.docname,
            line,
            "Running directive"
        );

        let ctx = self.config.create_context(line);
        handler.run(invocation, &ctx)
    }
}

/// Index of the line closing a block opened with `colon_count` colons.
///
/// Nested openers inside the body need their own closers first.
fn find_closer(lines: &[&str], start: usize, colon_count: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut fence = FenceTracker::default();

    for (offset, line) in lines[start..].iter().enumerate() {
        fence.update(line);
        if fence.in_fence() {
            continue;
        }
        match parse_block_line(line) {
            Some(BlockLine::Open { .. }) => depth += 1,
            Some(BlockLine::Close { colon_count: n }) if depth > 0 && n >= 3 => depth -= 1,
            Some(BlockLine::Close { colon_count: n }) if n >= colon_count => {
                return Some(start + offset);
            }
            _ => {}
        }
    }

    None
}

/// Docname for a source file: path relative to `root`, extension dropped,
/// `/`-separated.
///
/// ```
/// use std::path::Path;
/// use quizly_renderer::directive::docname_for;
///
/// assert_eq!(
///     docname_for(Path::new("/docs"), Path::new("/docs/unit1/intro.md")).as_deref(),
///     Some("unit1/intro")
/// );
/// ```
#[must_use]
pub fn docname_for(root: &Path, source: &Path) -> Option<String> {
    let rel = source.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Captured {
        invocation: Invocation,
        docname: String,
        source: SourceLocation,
    }

    impl Node for Captured {
        fn node_type(&self) -> &'static str {
            "captured"
        }

        fn source(&self) -> &SourceLocation {
            &self.source
        }
    }

    /// Echoes its invocation into a node.
    struct Echo {
        required: usize,
        optional: usize,
        has_content: bool,
    }

    impl BlockDirective for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn required_arguments(&self) -> usize {
            self.required
        }

        fn optional_arguments(&self) -> usize {
            self.optional
        }

        fn has_content(&self) -> bool {
            self.has_content
        }

        fn run(
            &self,
            invocation: Invocation,
            ctx: &DirectiveContext,
        ) -> Result<Box<dyn Node>, DirectiveError> {
            Ok(Box::new(Captured {
                invocation,
                docname: ctx.docname.to_owned(),
                source: ctx.location(),
            }))
        }
    }

    fn registry(required: usize, optional: usize, has_content: bool) -> Registry {
        let mut registry = Registry::new();
        registry.add_directive(Echo {
            required,
            optional,
            has_content,
        });
        registry
    }

    fn captured(doc: &Document) -> Vec<&Captured> {
        doc.nodes()
            .filter_map(|n| n.downcast_ref::<Captured>())
            .collect()
    }

    #[test]
    fn test_markdown_and_nodes_interleave() {
        let registry = registry(1, 0, true);
        let input = "# Title\n\n:::echo[q1]{k=v}\nline one\n  line two\n:::\n\nAfter.\n";
        let doc = DirectiveProcessor::new(&registry).parse(input).unwrap();

        assert_eq!(doc.segments.len(), 3);
        assert!(matches!(&doc.segments[0], Segment::Markdown(md) if md == "# Title\n\n"));
        assert!(matches!(&doc.segments[2], Segment::Markdown(md) if md == "\nAfter.\n"));

        let nodes = captured(&doc);
        let inv = &nodes[0].invocation;
        assert_eq!(inv.args.arguments, vec!["q1"]);
        assert_eq!(inv.args.get("k"), Some("v"));
        assert_eq!(inv.content, vec!["line one", "  line two"]);
        assert_eq!(inv.block_text, ":::echo[q1]{k=v}\nline one\n  line two\n:::");
        assert_eq!(nodes[0].source.line, 3);
    }

    #[test]
    fn test_empty_content() {
        let registry = registry(1, 0, true);
        let doc = DirectiveProcessor::new(&registry)
            .parse(":::echo[q1]\n:::")
            .unwrap();
        assert!(captured(&doc)[0].invocation.content.is_empty());
    }

    #[test]
    fn test_missing_argument() {
        let registry = registry(1, 0, true);
        let config = DirectiveProcessorConfig::new().with_source_path("docs/a.md");
        let err = DirectiveProcessor::with_config(&registry, config)
            .parse("text\n:::echo\nbody\n:::\n")
            .unwrap_err();

        assert!(matches!(
            err,
            DirectiveError::Arguments {
                found: 0,
                ref expected,
                ..
            } if expected == "1"
        ));
        assert!(err.to_string().starts_with("docs/a.md:2:"));
    }

    #[test]
    fn test_too_many_arguments() {
        let registry = registry(1, 1, true);
        let err = DirectiveProcessor::new(&registry)
            .parse(":::echo[a b c]\n:::")
            .unwrap_err();
        assert!(matches!(
            err,
            DirectiveError::Arguments { found: 3, ref expected, .. } if expected == "1-2"
        ));
    }

    #[test]
    fn test_content_rejected_when_not_declared() {
        let registry = registry(0, 0, false);
        let err = DirectiveProcessor::new(&registry)
            .parse(":::echo\nbody\n:::")
            .unwrap_err();
        assert!(matches!(err, DirectiveError::UnexpectedContent { .. }));
    }

    #[test]
    fn test_unclosed() {
        let registry = registry(1, 0, true);
        let err = DirectiveProcessor::new(&registry)
            .parse("\n:::echo[q1]\nbody\n")
            .unwrap_err();
        assert!(matches!(err, DirectiveError::Unclosed { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_longer_opener_needs_longer_closer() {
        let registry = registry(1, 0, true);
        let doc = DirectiveProcessor::new(&registry)
            .parse("::::echo[q1]\n:::\n::::\n")
            .unwrap();
        assert_eq!(captured(&doc)[0].invocation.content, vec![":::"]);
    }

    #[test]
    fn test_nested_block_stays_in_content() {
        let registry = registry(1, 0, true);
        let doc = DirectiveProcessor::new(&registry)
            .parse(":::echo[outer]\n:::note\ninner\n:::\n:::\n")
            .unwrap();
        assert_eq!(
            captured(&doc)[0].invocation.content,
            vec![":::note", "inner", ":::"]
        );
    }

    #[test]
    fn test_directive_in_code_fence_ignored() {
        let registry = registry(1, 0, true);
        let doc = DirectiveProcessor::new(&registry)
            .parse("```\n:::echo[q1]\n:::\n```\n")
            .unwrap();
        assert_eq!(doc.nodes().count(), 0);
    }

    #[test]
    fn test_unknown_directive_passes_through() {
        let registry = registry(1, 0, true);
        let input = ":::other[x]\nbody\n:::\n";
        let doc = DirectiveProcessor::new(&registry).parse(input).unwrap();
        assert!(matches!(&doc.segments[..], [Segment::Markdown(md)] if md == input));
    }

    #[test]
    fn test_context_docname() {
        let registry = registry(1, 0, true);
        let config = DirectiveProcessorConfig::new().with_docname("unit1/lesson");
        let doc = DirectiveProcessor::with_config(&registry, config)
            .parse(":::echo[q]\n:::")
            .unwrap();
        assert_eq!(captured(&doc)[0].docname, "unit1/lesson");
        assert_eq!(doc.docname, "unit1/lesson");
    }

    #[test]
    fn test_docname_for() {
        let root = Path::new("/src");
        assert_eq!(
            docname_for(root, Path::new("/src/index.md")).as_deref(),
            Some("index")
        );
        assert_eq!(
            docname_for(root, Path::new("/src/a/b/c.md")).as_deref(),
            Some("a/b/c")
        );
        assert_eq!(docname_for(root, Path::new("/elsewhere/x.md")), None);
    }
}
