//! The quizly node and its HTML template.

use std::collections::BTreeMap;

use quizly_renderer::template::{TemplateError, format_template};
use quizly_renderer::{Node, SourceLocation};

/// Node type under which quizly nodes are registered.
pub const NODE_TYPE: &str = "quizly";

/// Placeholder in [`QUIZLY_TEMPLATE`] replaced by the quiz name.
pub const QUIZNAME_MARKER: &str = "###";

/// Width of the `:quizname:` prefix skipped on the first control line.
const QUIZNAME_PREFIX_LEN: usize = 10;

/// Markup for one quiz: the player page loaded into an iframe.
///
/// `###` is replaced by the quiz name when the node is built; the `%(key)s`
/// placeholders are filled from the node options at render time.
pub const QUIZLY_TEMPLATE: &str = concat!(
    "<div class=\"runestone alert alert-warning\">\n",
    "<div data-component=\"quizly\" id=\"%(divid)s\" data-question_label=\"%(question_label)s\" style=\"visibility: visible;\">\n",
    "  <iframe height=\"595\" src=\"../_static/quizly/index.html?backpack=hidden&selector=hidden&quizname=###&hints=true&repeatable=false\" style=\"border: 0px; margin: 1px; padding: 1px;\" width=\"100%%\">\n",
    "  </iframe>\n",
    "</div>\n",
    "</div>\n",
);

/// A parsed `quizly` directive, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizlyNode {
    /// Option values substituted into the template (`divid`, `basecourse`,
    /// `question_label`, `quizlyHomePrefix`, `controls`, ...).
    pub runestone_options: BTreeMap<String, String>,
    /// Content lines of the directive.
    pub controls: Vec<String>,
    /// Quiz name taken from the first control line.
    pub quizname: String,
    /// [`QUIZLY_TEMPLATE`] with the quiz name filled in.
    pub template: String,
    /// Directive text as written in the source.
    pub rawsource: String,
    source: SourceLocation,
}

impl QuizlyNode {
    /// Build a node from its options and control lines.
    ///
    /// The quiz name is the first control line with its first ten characters
    /// (`:quizname:`) removed and surrounding whitespace trimmed. It is empty
    /// when there are no controls or the line is too short. A `%` in the name
    /// is escaped in the template so it renders literally.
    #[must_use]
    pub fn new(
        runestone_options: BTreeMap<String, String>,
        controls: Vec<String>,
        rawsource: impl Into<String>,
        source: SourceLocation,
    ) -> Self {
        let quizname = controls
            .first()
            .map(String::as_str)
            .map(quizname)
            .unwrap_or_default();
        let template = QUIZLY_TEMPLATE.replace(QUIZNAME_MARKER, &quizname.replace('%', "%%"));

        Self {
            runestone_options,
            controls,
            quizname,
            template,
            rawsource: rawsource.into(),
            source,
        }
    }

    /// Look up an option value.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.runestone_options.get(key).map(String::as_str)
    }

    /// Element id of the quiz.
    pub fn divid(&self) -> &str {
        self.option("divid").unwrap_or_default()
    }

    /// Course the quiz belongs to.
    pub fn basecourse(&self) -> &str {
        self.option("basecourse").unwrap_or_default()
    }

    /// Fill the template from the node options.
    ///
    /// # Errors
    ///
    /// Fails when the template names an option the node does not carry.
    pub fn render(&self) -> Result<String, TemplateError> {
        format_template(&self.template, &self.runestone_options)
    }
}

impl Node for QuizlyNode {
    fn node_type(&self) -> &'static str {
        NODE_TYPE
    }

    fn source(&self) -> &SourceLocation {
        &self.source
    }
}

fn quizname(control: &str) -> String {
    control
        .chars()
        .skip(QUIZNAME_PREFIX_LEN)
        .collect::<String>()
        .trim()
        .to_owned()
}
