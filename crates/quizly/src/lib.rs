//! Quizly: interactive quizzes embedded in course documentation.
//!
//! A quiz is written as a block directive naming its element id, with the
//! quiz name on the first content line:
//!
//! ```text
//! :::quizly[quiz_intro]{qnumber="1.4"}
//! :quizname: quiz_eval_expression
//! :::
//! ```
//!
//! It renders as an iframe loading the quizly player from
//! `_static/quizly/index.html`. The player resources are copied into the
//! build's static directory the first time a quiz is rendered.
//!
//! [`setup`] registers the directive and its HTML visitor with a
//! [`Registry`]; [`SiteBuilder`] drives a complete build from a
//! [`quizly_config::Config`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use quizly::{Services, setup};
//! use quizly_assets::AssetInstaller;
//! use quizly_db::MemoryQuestionDb;
//! use quizly_renderer::directive::DirectiveProcessor;
//! use quizly_renderer::{DocumentRenderer, HtmlBackend, Registry};
//!
//! let bundle = tempfile::tempdir().unwrap();
//! std::fs::write(bundle.path().join("index.html"), "<html></html>").unwrap();
//! let out = tempfile::tempdir().unwrap();
//! let db = Arc::new(MemoryQuestionDb::new());
//! let services = Services {
//!     basecourse: "thinkcspy".to_owned(),
//!     assets: Arc::new(AssetInstaller::new(bundle.path(), out.path().join("_static"))),
//!     db: db.clone(),
//! };
//!
//! let mut registry = Registry::new();
//! setup(&mut registry, &services);
//!
//! let doc = DirectiveProcessor::new(&registry)
//!     .parse(":::quizly[q1]\n:quizname: quiz_eval_expression\n:::\n")
//!     .unwrap();
//! let html = DocumentRenderer::<HtmlBackend>::new(&mut registry)
//!     .render(&doc)
//!     .unwrap();
//!
//! assert!(html.contains(r#"id="q1" data-question_label="q1""#));
//! assert_eq!(db.get("thinkcspy", "q1").unwrap().html.as_deref(), Some(html.as_str()));
//! assert!(out.path().join("_static/quizly/index.html").is_file());
//! ```

mod directive;
mod node;
mod site;
mod visitor;

use std::sync::Arc;

use quizly_assets::AssetInstaller;
use quizly_db::QuestionDb;
use quizly_renderer::{HtmlBackend, Registry};

pub use directive::QuizlyDirective;
pub use node::{NODE_TYPE, QUIZLY_TEMPLATE, QUIZNAME_MARKER, QuizlyNode};
pub use site::{BuildError, BuildReport, SiteBuilder, install_assets};
pub use visitor::QuizlyHtmlVisitor;

/// Collaborators shared by the quizly directive and its visitor for one build.
#[derive(Clone)]
pub struct Services {
    /// Course the questions belong to.
    pub basecourse: String,
    /// Installs the player resources; one installer per build.
    pub assets: Arc<AssetInstaller>,
    /// Receives question records and rendered fragments.
    pub db: Arc<dyn QuestionDb>,
}

/// Register the `quizly` directive and its HTML visitor.
pub fn setup(registry: &mut Registry, services: &Services) {
    registry.add_directive(QuizlyDirective::new(
        services.basecourse.clone(),
        Arc::clone(&services.db),
    ));
    registry.add_node::<HtmlBackend>(
        NODE_TYPE,
        QuizlyHtmlVisitor::new(Arc::clone(&services.assets), Arc::clone(&services.db)),
    );
}
