//! Whole-course build: markdown sources in, HTML pages out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quizly_assets::{AssetError, AssetInstaller, InstallReport};
use quizly_config::Config;
use quizly_db::{DbError, JsonQuestionDb, NullQuestionDb, QuestionDb};
use quizly_renderer::directive::{
    DirectiveError, DirectiveProcessor, DirectiveProcessorConfig, docname_for,
};
use quizly_renderer::{DocumentRenderer, HtmlBackend, Registry, RenderError};

use crate::node::NODE_TYPE;
use crate::{Services, setup};

/// Error raised by a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Reading a source or writing a page failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The source directory produced an invalid glob pattern.
    #[error("invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// A source entry could not be read.
    #[error("cannot read source: {0}")]
    Glob(#[from] glob::GlobError),
    /// A document failed to parse.
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    /// A document failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The question database could not be opened.
    #[error(transparent)]
    Database(#[from] DbError),
}

impl BuildError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages written, in source order.
    pub pages: Vec<PathBuf>,
    /// Number of quizly nodes rendered.
    pub quizzes: usize,
    /// Whether the player resources were installed.
    pub assets_installed: bool,
}

/// Builds every markdown page under the configured source directory.
///
/// Each `<source>/<docname>.md` becomes `<out>/<docname>.html`. Player
/// resources go to `<static>/quizly` once per build, and only if some page
/// contains a quiz.
///
/// The quiz iframe loads `../_static/quizly/index.html` relative to its page.
/// With the default `static_dir` (`<out>/_static`) that only resolves for pages
/// exactly one directory below `<out>`, such as `<out>/unit1/lesson.html`.
/// A quiz on a top-level page like `<out>/index.html` points outside `<out>`,
/// and so does a quiz two or more levels deep. Keep quizzes in first-level
/// section directories, or place `static_dir` to match the page depth.
///
/// # Example
///
/// ```
/// use quizly::SiteBuilder;
/// use quizly_config::Config;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(dir.path().join("docs")).unwrap();
/// std::fs::create_dir_all(dir.path().join("quizly/js")).unwrap();
/// std::fs::write(dir.path().join("quizly/js/index.html"), "<html></html>").unwrap();
/// std::fs::write(
///     dir.path().join("docs/index.md"),
///     ":::quizly[q1]\n:quizname: quiz_eval_expression\n:::\n",
/// )
/// .unwrap();
///
/// let config = Config::default_with_base(dir.path());
/// let report = SiteBuilder::new(&config).build().unwrap();
///
/// assert_eq!(report.quizzes, 1);
/// assert!(report.assets_installed);
/// assert!(dir.path().join("build/index.html").is_file());
/// ```
pub struct SiteBuilder {
    source_dir: PathBuf,
    out_dir: PathBuf,
    static_dir: PathBuf,
    assets_dir: PathBuf,
    basecourse: String,
    database: Option<PathBuf>,
    db: Option<Arc<dyn QuestionDb>>,
}

impl SiteBuilder {
    /// Create a builder from resolved configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let build = &config.build_resolved;
        Self {
            source_dir: build.source_dir.clone(),
            out_dir: build.out_dir.clone(),
            static_dir: build.static_dir.clone(),
            assets_dir: config.assets_resolved.source_dir.clone(),
            basecourse: build.basecourse.clone(),
            database: config.database_resolved.path.clone(),
            db: None,
        }
    }

    /// Use `db` instead of the database named by the configuration.
    #[must_use]
    pub fn with_question_db(mut self, db: Arc<dyn QuestionDb>) -> Self {
        self.db = Some(db);
        self
    }

    fn open_db(&self) -> Result<Arc<dyn QuestionDb>, BuildError> {
        if let Some(db) = &self.db {
            return Ok(Arc::clone(db));
        }
        let db: Arc<dyn QuestionDb> = match &self.database {
            Some(path) => Arc::new(JsonQuestionDb::open(path.clone())?),
            None => Arc::new(NullQuestionDb),
        };
        Ok(db)
    }

    /// Markdown sources under the source directory, sorted.
    fn sources(&self) -> Result<Vec<PathBuf>, BuildError> {
        let base = glob::Pattern::escape(&self.source_dir.to_string_lossy());
        let mut sources = Vec::new();
        for entry in glob::glob(&format!("{base}/**/*.md"))? {
            let path = entry?;
            if path.is_file() {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Stops at the first page that fails to read, parse, render, or write.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let assets = Arc::new(AssetInstaller::new(&self.assets_dir, &self.static_dir));
        let services = Services {
            basecourse: self.basecourse.clone(),
            assets: Arc::clone(&assets),
            db: self.open_db()?,
        };

        let mut registry = Registry::new();
        setup(&mut registry, &services);

        let mut report = BuildReport::default();
        for source in self.sources()? {
            let Some(docname) = docname_for(&self.source_dir, &source) else {
                continue;
            };
            let page = self.build_page(&mut registry, &source, &docname, &mut report)?;
            report.pages.push(page);
        }

        report.assets_installed = assets.is_installed();
        tracing::info!(
            pages = report.pages.len(),
            quizzes = report.quizzes,
            assets_installed = report.assets_installed,
            out_dir = %self.out_dir.display(),
            "Build finished"
        );
        Ok(report)
    }

    fn build_page(
        &self,
        registry: &mut Registry,
        source: &Path,
        docname: &str,
        report: &mut BuildReport,
    ) -> Result<PathBuf, BuildError> {
        let markdown = fs::read_to_string(source).map_err(|e| BuildError::io(source, e))?;

        let config = DirectiveProcessorConfig::new()
            .with_source_root(&self.source_dir)
            .with_source_path(source)
            .with_docname(docname);
        let document = DirectiveProcessor::with_config(registry, config).parse(&markdown)?;
        let body = DocumentRenderer::<HtmlBackend>::new(registry).render(&document)?;
        report.quizzes += document
            .nodes()
            .filter(|n| n.node_type() == NODE_TYPE)
            .count();

        let page = self.out_dir.join(format!("{docname}.html"));
        if let Some(parent) = page.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        fs::write(&page, page_shell(docname, &body)).map_err(|e| BuildError::io(&page, e))?;

        tracing::debug!(docname, page = %page.display(), "Wrote page");
        Ok(page)
    }
}

/// Install the player resources named by `config` without building pages.
pub fn install_assets(config: &Config) -> Result<InstallReport, AssetError> {
    AssetInstaller::new(
        &config.assets_resolved.source_dir,
        &config.build_resolved.static_dir,
    )
    .install()
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quizly_db::MemoryQuestionDb;

    const QUIZ_PAGE: &str = "# Expressions\n\n:::quizly[quiz_intro]{qnumber=\"1.4\"}\n:quizname: quiz_eval_expression\n:::\n\nDone.\n";

    fn project() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/unit1")).unwrap();
        fs::create_dir_all(root.join("quizly/js/media")).unwrap();
        fs::write(root.join("quizly/js/index.html"), "<html></html>").unwrap();
        fs::write(root.join("quizly/js/quizzes.js"), "var q;").unwrap();
        fs::write(root.join("quizly/js/media/logo.png"), [1, 2, 3]).unwrap();
        let config = Config::default_with_base(root);
        (dir, config)
    }

    #[test]
    fn test_build_writes_pages_and_assets() {
        let (dir, config) = project();
        let root = dir.path();
        fs::write(root.join("docs/index.md"), "# Home\n").unwrap();
        fs::write(root.join("docs/unit1/lesson.md"), QUIZ_PAGE).unwrap();

        let db = Arc::new(MemoryQuestionDb::new());
        let report = SiteBuilder::new(&config)
            .with_question_db(Arc::clone(&db) as _)
            .build()
            .unwrap();

        assert_eq!(
            report.pages,
            vec![
                root.join("build/index.html"),
                root.join("build/unit1/lesson.html")
            ]
        );
        assert_eq!(report.quizzes, 1);
        assert!(report.assets_installed);
        assert!(root.join("build/_static/quizly/quizzes.js").is_file());
        assert!(root.join("build/_static/quizly/media/logo.png").is_file());

        let page = fs::read_to_string(root.join("build/unit1/lesson.html")).unwrap();
        assert!(page.contains("<title>unit1/lesson</title>"));
        assert!(page.contains("<h1>Expressions</h1>"));
        assert!(page.contains("id=\"quiz_intro\" data-question_label=\"1.4\""));
        assert!(page.contains("quizname=quiz_eval_expression&hints=true"));
        assert!(page.contains("<p>Done.</p>"));

        let recorded: Vec<String> = db.snapshot().into_keys().collect();
        assert_eq!(recorded, vec!["unknown/quiz_intro".to_owned()]);

        let stored = db.get("unknown", "quiz_intro").unwrap();
        assert_eq!(stored.question.unwrap().docname, "unit1/lesson");
        let html = stored.html.unwrap();
        assert!(html.starts_with("<div class=\"runestone alert alert-warning\">"));
        assert!(page.contains(&html));
    }

    #[test]
    fn test_build_without_quizzes_skips_assets() {
        let (dir, config) = project();
        fs::write(dir.path().join("docs/index.md"), "plain\n").unwrap();

        let report = SiteBuilder::new(&config).build().unwrap();

        assert_eq!(report.quizzes, 0);
        assert!(!report.assets_installed);
        assert!(!dir.path().join("build/_static/quizly").exists());
    }

    #[test]
    fn test_build_uses_json_database() {
        let (dir, mut config) = project();
        fs::write(dir.path().join("docs/index.md"), QUIZ_PAGE).unwrap();
        config.database_resolved.path = Some(dir.path().join("build/questions.json"));

        SiteBuilder::new(&config).build().unwrap();

        let db = JsonQuestionDb::open(dir.path().join("build/questions.json")).unwrap();
        let stored = db.get("unknown", "quiz_intro").unwrap();
        assert!(stored.question.is_some());
        assert!(stored.html.is_some());
    }

    #[test]
    fn test_build_stops_on_parse_error() {
        let (dir, config) = project();
        fs::write(dir.path().join("docs/index.md"), ":::quizly[q1]\n:::\n").unwrap();

        let err = SiteBuilder::new(&config).build().unwrap_err();
        assert!(matches!(err, BuildError::Directive(DirectiveError::Missing { .. })));
        assert!(err.to_string().contains("index.md:1"));
    }

    #[test]
    fn test_multiple_quizzes_install_once() {
        let (dir, config) = project();
        let page = ":::quizly[a]\n:quizname: qa\n:::\n\n:::quizly[b]\n:quizname: qb\n:::\n";
        fs::write(dir.path().join("docs/index.md"), page).unwrap();
        let more = page.replace("[a]", "[c]").replace("[b]", "[d]");
        fs::write(dir.path().join("docs/unit1/more.md"), more).unwrap();

        let report = SiteBuilder::new(&config).build().unwrap();
        assert_eq!(report.quizzes, 4);
        assert!(report.assets_installed);
    }

    #[test]
    fn test_install_assets() {
        let (dir, config) = project();
        let report = install_assets(&config).unwrap();
        assert_eq!(report.destination, dir.path().join("build/_static/quizly"));
        assert_eq!(report.files.len(), 3);
    }

    #[test]
    fn test_page_shell_escapes_title() {
        let html = page_shell("a<b>&c", "<p>x</p>\n");
        assert!(html.contains("<title>a&lt;b&gt;&amp;c</title>"));
        assert!(html.ends_with("<body>\n<p>x</p>\n</body>\n</html>\n"));
    }
}
