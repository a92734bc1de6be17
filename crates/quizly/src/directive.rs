//! The `quizly` block directive.

use std::collections::BTreeMap;
use std::sync::Arc;

use quizly_db::{QuestionDb, QuestionRecord};
use quizly_renderer::Node;
use quizly_renderer::directive::{BlockDirective, DirectiveContext, DirectiveError, Invocation};

use crate::node::{NODE_TYPE, QuizlyNode};

/// Parses `:::quizly[divid]{options}` blocks into [`QuizlyNode`]s.
///
/// ```text
/// :::quizly[quiz_intro]{qnumber="1.4"}
/// :quizname: quiz_eval_expression
/// :::
/// ```
///
/// The single argument is the element id (`divid`). Options from `{...}`
/// are kept as node options; `qnumber` becomes the `question_label`.
/// Content lines are the controls, the first of which names the quiz.
pub struct QuizlyDirective {
    basecourse: String,
    db: Arc<dyn QuestionDb>,
}

impl QuizlyDirective {
    /// Create the handler for questions of `basecourse`.
    #[must_use]
    pub fn new(basecourse: impl Into<String>, db: Arc<dyn QuestionDb>) -> Self {
        Self {
            basecourse: basecourse.into(),
            db,
        }
    }

    /// Options every component carries, from the invocation and the build.
    fn component_options(&self, divid: &str, invocation: &Invocation) -> BTreeMap<String, String> {
        let mut options = invocation.args.options.clone();
        let label = options
            .get("qnumber")
            .cloned()
            .unwrap_or_else(|| divid.to_owned());
        options.insert("divid".to_owned(), divid.to_owned());
        options.insert("basecourse".to_owned(), self.basecourse.clone());
        options.insert("question_label".to_owned(), label);
        options
    }

    fn record(
        &self,
        options: &BTreeMap<String, String>,
        invocation: &Invocation,
        ctx: &DirectiveContext,
    ) {
        let mut record = QuestionRecord::new(
            options.get("divid").cloned().unwrap_or_default(),
            self.basecourse.clone(),
            NODE_TYPE,
        );
        record.docname = ctx.docname.to_owned();
        record.source_path = ctx.source_path.map(|p| p.display().to_string());
        record.line = ctx.line;
        record.question_label = options.get("question_label").cloned();
        record.rawsource.clone_from(&invocation.block_text);

        if let Err(e) = self.db.record_question(&record) {
            tracing::warn!(
                error = %e,
                divid = %record.divid,
                location = %ctx.location(),
                "Failed to record question"
            );
        }
    }
}

impl BlockDirective for QuizlyDirective {
    fn name(&self) -> &str {
        NODE_TYPE
    }

    fn required_arguments(&self) -> usize {
        1
    }

    fn has_content(&self) -> bool {
        true
    }

    fn run(
        &self,
        invocation: Invocation,
        ctx: &DirectiveContext,
    ) -> Result<Box<dyn Node>, DirectiveError> {
        let Some(divid) = invocation.args.arguments.first() else {
            return Err(DirectiveError::Missing {
                name: invocation.name,
                what: "an element id argument".to_owned(),
                location: ctx.location(),
            });
        };

        let controls = content_lines(&invocation.content);
        if controls.is_empty() {
            return Err(DirectiveError::Missing {
                name: invocation.name,
                what: "controls (a `:quizname:` line)".to_owned(),
                location: ctx.location(),
            });
        }

        let mut options = self.component_options(divid, &invocation);
        self.record(&options, &invocation, ctx);

        let (rel, _) = ctx.relfn2path(divid);
        options.insert(
            "quizlyHomePrefix".to_owned(),
            "./".repeat(rel.matches('/').count()),
        );
        options.insert("controls".to_owned(), controls.join("\n"));

        let node = QuizlyNode::new(options, controls, invocation.block_text, ctx.location());
        tracing::debug!(
            divid = %node.divid(),
            quizname = %node.quizname,
            location = %node.source(),
            "Parsed quizly directive"
        );
        Ok(Box::new(node))
    }
}

/// Content lines with leading and trailing blank lines removed and the
/// indentation common to all non-blank lines stripped.
fn content_lines(lines: &[String]) -> Vec<String> {
    let is_blank = |l: &String| l.trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);
    let block = &lines[start..end];

    let indent = block
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    block
        .iter()
        .map(|l| {
            if is_blank(l) {
                String::new()
            } else {
                l.get(indent..).unwrap_or_else(|| l.trim_start()).to_owned()
            }
        })
        .collect()
}
