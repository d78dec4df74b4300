//! Core document types.

use std::path::{Path, PathBuf};

/// Where a document came from on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOrigin {
    /// Path the document was read from
    pub path: PathBuf,
}

/// A markdown document: the text buffer plus its optional origin.
///
/// Documents are replaced wholesale on load and reload; nothing edits the
/// source in place. Every pipeline stage receives `source()` as a read-only
/// snapshot for the duration of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    origin: Option<FileOrigin>,
}

impl Document {
    /// Create a document that has no backing file.
    pub fn from_text(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            origin: None,
        }
    }

    /// Create a document read from `path`.
    pub fn with_origin(source: impl Into<String>, path: PathBuf) -> Self {
        Self {
            source: source.into(),
            origin: Some(FileOrigin { path }),
        }
    }

    /// Create an empty document.
    pub fn empty() -> Self {
        Self::from_text(String::new())
    }

    /// The raw markdown text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The file this document was read from, if any.
    pub const fn origin(&self) -> Option<&FileOrigin> {
        self.origin.as_ref()
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.origin.as_ref().map(|o| o.path.as_path())
    }

    /// Number of lines when the source is split on `\n`.
    ///
    /// An empty document still has one (empty) line, matching how the
    /// outline and block scanners enumerate lines.
    pub fn line_count(&self) -> usize {
        self.source.split('\n').count()
    }

    /// File name for titles, or `None` when the document has no origin.
    pub fn file_name(&self) -> Option<String> {
        self.path()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
    }

    /// File stem used to name export artifacts.
    pub fn export_stem(&self) -> String {
        self.path()
            .and_then(Path::file_stem)
            .map_or_else(
                || super::DEFAULT_EXPORT_STEM.to_string(),
                |s| s.to_string_lossy().to_string(),
            )
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
