//! Installation of the quizly player resources.
//!
//! The player is a static bundle of scripts, pages, stylesheets and media
//! that the rendered iframe loads from `<static>/quizly/`. [`AssetInstaller`]
//! replaces that directory with a fresh copy of the bundle:
//!
//! ```text
//! <static>/quizly/
//! ├── *.js
//! ├── *.html
//! ├── *.css
//! └── media/
//!     └── *
//! ```
//!
//! Installation is destructive: anything already under `<static>/quizly/`
//! is removed first, so stale files from earlier builds never survive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Name of the directory created under the static root.
pub const QUIZLY_DIR: &str = "quizly";

/// Name of the media subdirectory.
pub const MEDIA_DIR: &str = "media";

/// Resource categories, as (pattern relative to the source, destination
/// subdirectory relative to `<static>/quizly`).
const CATEGORIES: &[(&str, &str)] = &[
    ("*.js", ""),
    ("*.html", ""),
    ("media/*", MEDIA_DIR),
    ("*.css", ""),
];

/// Error raised while installing resources.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Source directory produced an invalid glob pattern.
    #[error("invalid resource pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// A matched entry could not be read.
    #[error("cannot read resource: {0}")]
    Glob(#[from] glob::GlobError),
}

impl AssetError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Files copied by one [`AssetInstaller::install`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Installed directory (`<static>/quizly`).
    pub destination: PathBuf,
    /// Destination paths of every copied file, in copy order.
    pub files: Vec<PathBuf>,
}

impl InstallReport {
    /// Number of files copied into `media/`.
    pub fn media_count(&self) -> usize {
        let media = self.destination.join(MEDIA_DIR);
        self.files.iter().filter(|f| f.parent() == Some(media.as_path())).count()
    }
}

/// Copies the bundled resources into a static directory.
///
/// One installer is meant to live for one build. [`ensure_installed`]
/// performs the copy the first time it succeeds and does nothing afterwards;
/// [`install`] always copies.
///
/// [`ensure_installed`]: AssetInstaller::ensure_installed
/// [`install`]: AssetInstaller::install
///
/// # Example
///
/// ```
/// use quizly_assets::AssetInstaller;
///
/// let src = tempfile::tempdir().unwrap();
/// std::fs::write(src.path().join("index.html"), "<html></html>").unwrap();
/// let out = tempfile::tempdir().unwrap();
///
/// let installer = AssetInstaller::new(src.path(), out.path().join("_static"));
/// let report = installer.install().unwrap();
///
/// assert_eq!(report.files.len(), 1);
/// assert!(out.path().join("_static/quizly/index.html").is_file());
/// assert!(out.path().join("_static/quizly/media").is_dir());
/// ```
#[derive(Debug)]
pub struct AssetInstaller {
    source_dir: PathBuf,
    static_dir: PathBuf,
    installed: Mutex<bool>,
}

impl AssetInstaller {
    /// Create an installer copying from `source_dir` into
    /// `<static_dir>/quizly`.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            static_dir: static_dir.into(),
            installed: Mutex::new(false),
        }
    }

    /// Directory resources are copied from.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory resources are installed into.
    pub fn destination(&self) -> PathBuf {
        self.static_dir.join(QUIZLY_DIR)
    }

    /// Whether an install has completed through [`Self::ensure_installed`].
    pub fn is_installed(&self) -> bool {
        *self.installed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install once for the lifetime of this installer.
    ///
    /// Returns the report of the install performed by this call, or `None`
    /// when an earlier call already installed. A failed install does not
    /// count, so the next call tries again.
    pub fn ensure_installed(&self) -> Result<Option<InstallReport>, AssetError> {
        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if *installed {
            return Ok(None);
        }
        let report = self.install()?;
        *installed = true;
        Ok(Some(report))
    }

    /// Replace `<static>/quizly` with a fresh copy of the resources.
    ///
    /// The source directory must exist; otherwise nothing is touched and the
    /// error names the source.
    pub fn install(&self) -> Result<InstallReport, AssetError> {
        if !self.source_dir.is_dir() {
            return Err(AssetError::io(
                &self.source_dir,
                io::ErrorKind::NotFound.into(),
            ));
        }
        let dest = self.destination();

        if dest.exists() {
            fs::remove_dir_all(&dest).map_err(|e| AssetError::io(&dest, e))?;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| AssetError::io(parent, e))?;
        }
        create_dir(&dest)?;
        create_dir(&dest.join(MEDIA_DIR))?;

        let mut report = InstallReport {
            destination: dest.clone(),
            files: Vec::new(),
        };

        let base = glob::Pattern::escape(&self.source_dir.to_string_lossy());
        for (pattern, subdir) in CATEGORIES {
            let target_dir = if subdir.is_empty() {
                dest.clone()
            } else {
                dest.join(subdir)
            };

            for entry in glob::glob(&format!("{base}/{pattern}"))? {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name() else {
                    continue;
                };
                let target = target_dir.join(name);
                fs::copy(&path, &target).map_err(|e| AssetError::io(&path, e))?;
                tracing::debug!(from = %path.display(), to = %target.display(), "Copied resource");
                report.files.push(target);
            }
        }

        tracing::info!(
            destination = %dest.display(),
            files = report.files.len(),
            "Installed quizly resources"
        );
        Ok(report)
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> Result<(), AssetError> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .mode(0o755)
        .create(path)
        .map_err(|e| AssetError::io(path, e))
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> Result<(), AssetError> {
    fs::create_dir(path).map_err(|e| AssetError::io(path, e))
}
