//! Markdown documents and file loading.
//!
//! This module handles:
//! - The [`Document`] text buffer and its on-disk origin
//! - Loading files without ever failing the caller (errors become an
//!   error document)
//! - Recognising markdown files for the file browser

mod types;

use std::path::{Path, PathBuf};

pub use types::{Document, FileOrigin};

/// Extensions treated as markdown by the file browser.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Stem used for exports when the document has no backing file.
pub const DEFAULT_EXPORT_STEM: &str = "markdown_export";

/// Content shown when no file is given on the command line.
pub const DEFAULT_CONTENT: &str = "# Welcome to mdlens

Please provide a markdown file as an argument:

```
mdlens <path_to_markdown_file>
```

Or press 'f' to open the file browser and pick a markdown file.";

/// Why a file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Could not read file: {}\n\nError: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the templated error document for a failed load.
pub fn error_content(message: &str) -> String {
    format!("# Error\n\n{message}")
}

impl Document {
    /// Read `path` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file does not exist or cannot be read as
    /// UTF-8 text.
    pub fn try_load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_origin(source, path.to_path_buf()))
    }

    /// Load `path`, substituting an error document on failure.
    ///
    /// The returned document has no origin when loading failed, which is how
    /// callers know not to start watching it.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(doc) => {
                tracing::info!(path = %path.display(), bytes = doc.source().len(), "loaded document");
                doc
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "load failed");
                Self::from_text(error_content(&err.to_string()))
            }
        }
    }

    /// The welcome document shown when no file was given.
    pub fn welcome() -> Self {
        Self::from_text(DEFAULT_CONTENT)
    }
}

/// Returns true if the path has a markdown extension (case-insensitive).
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
