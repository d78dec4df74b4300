//! HTML and plain-text export.
//!
//! Every export writes a pair of files named `{stem}_{YYYYMMDD_HHMMSS}` into
//! the export directory: an HTML page (rendered or raw, following the view
//! mode) and a `.txt` copy of the source. The same HTML page backs the
//! "open in browser" preview.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comrak::{Options, markdown_to_html};

use crate::diagram::DiagramBlock;
use crate::pipeline::ViewMode;

/// Default export directory, relative to the working directory.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js";

const RENDERED_STYLE: &str = "
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
        line-height: 1.6;
        color: #333;
        max-width: 800px;
        margin: 0 auto;
        padding: 20px;
        background-color: white;
    }
    pre {
        background-color: #f0f0f0;
        padding: 10px;
        border-radius: 5px;
        overflow-x: auto;
    }
    code {
        background-color: #f0f0f0;
        padding: 2px 4px;
        border-radius: 3px;
        font-family: 'Courier New', Courier, monospace;
    }
    blockquote {
        border-left: 4px solid #ddd;
        margin: 0;
        padding-left: 20px;
        color: #666;
    }
    h1, h2, h3, h4, h5, h6 { color: #111; margin-top: 24px; margin-bottom: 16px; }
    a { color: #0066cc; text-decoration: none; }
    a:hover { text-decoration: underline; }
    table { border-collapse: collapse; }
    th, td { border: 1px solid #ddd; padding: 4px 8px; }
    pre.mermaid { background-color: transparent; text-align: center; margin: 20px 0; }
    @media print {
        body { background-color: white; margin: 0; padding: 10mm; }
    }
";

const RAW_STYLE: &str = "
    body {
        font-family: 'Courier New', Courier, monospace;
        line-height: 1.6;
        color: #333;
        max-width: 900px;
        margin: 0 auto;
        padding: 20px;
        background-color: #f5f5f5;
    }
    pre {
        white-space: pre-wrap;
        word-wrap: break-word;
        background-color: white;
        padding: 20px;
        border: 1px solid #ddd;
        border-radius: 5px;
    }
";

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub html_path: PathBuf,
    pub text_path: PathBuf,
}

impl ExportArtifact {
    /// Short summary for the status toast.
    pub fn summary(&self, dir: &Path) -> String {
        let name = |p: &Path| {
            p.file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().to_string())
        };
        format!(
            "Exported {} and {} to {} (press o to open)",
            name(&self.html_path),
            name(&self.text_path),
            dir.display()
        )
    }
}

/// Writes export artifacts into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_DIR)
    }
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Export `source` as HTML plus plain text.
    ///
    /// `blocks` are the diagram blocks already detected in `source`; they are
    /// turned into `<pre class="mermaid">` blocks for the rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or either file
    /// cannot be written.
    pub fn export(
        &self,
        source: &str,
        stem: &str,
        mode: ViewMode,
        blocks: &[DiagramBlock],
    ) -> Result<ExportArtifact> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.export_with_timestamp(source, stem, mode, blocks, &timestamp)
    }

    fn export_with_timestamp(
        &self,
        source: &str,
        stem: &str,
        mode: ViewMode,
        blocks: &[DiagramBlock],
        timestamp: &str,
    ) -> Result<ExportArtifact> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create export directory {}", self.dir.display())
        })?;

        let html_path = self.dir.join(artifact_name(stem, timestamp, "html"));
        let text_path = self.dir.join(artifact_name(stem, timestamp, "txt"));

        let page = preview_html(source, stem, mode, blocks);
        std::fs::write(&html_path, page)
            .with_context(|| format!("Failed to write {}", html_path.display()))?;
        std::fs::write(&text_path, source)
            .with_context(|| format!("Failed to write {}", text_path.display()))?;

        tracing::info!(html = %html_path.display(), text = %text_path.display(), "exported");
        Ok(ExportArtifact {
            html_path,
            text_path,
        })
    }
}

/// `{stem}_{timestamp}.{ext}`
pub fn artifact_name(stem: &str, timestamp: &str, ext: &str) -> String {
    format!("{stem}_{timestamp}.{ext}")
}

/// The HTML page for `source` in the given mode.
pub fn preview_html(source: &str, title: &str, mode: ViewMode, blocks: &[DiagramBlock]) -> String {
    match mode {
        ViewMode::Raw => raw_page(source, title),
        ViewMode::Rendered => rendered_page(&markdown_with_diagrams(source, blocks), title),
    }
}

/// Write a preview page to the system temp directory and return its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_preview(
    source: &str,
    title: &str,
    mode: ViewMode,
    blocks: &[DiagramBlock],
) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("mdlens_preview_{title}.html"));
    std::fs::write(&path, preview_html(source, title, mode, blocks))
        .with_context(|| format!("Failed to write preview {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote browser preview");
    Ok(path)
}

/// Convert markdown to an HTML fragment, keeping diagrams as mermaid blocks.
///
/// Each diagram becomes a `<pre class="mermaid">` element. A `<pre>` HTML
/// block only ends at its closing tag, so blank lines and indented lines in
/// the diagram source stay inside it.
pub fn markdown_with_diagrams(source: &str, blocks: &[DiagramBlock]) -> String {
    let prepared = splice_diagram_blocks(source, blocks);

    let mut options = Options::default();
    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.shortcodes = true;
    options.extension.header_ids = Some(String::new());
    // Mermaid blocks must pass through untouched
    options.render.unsafe_ = true;

    markdown_to_html(&prepared, &options)
}

fn splice_diagram_blocks(source: &str, blocks: &[DiagramBlock]) -> String {
    if blocks.is_empty() {
        return source.to_string();
    }
    let lines: Vec<&str> = source.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for block in blocks {
        if block.start_line < cursor || block.end_line >= lines.len() {
            continue;
        }
        out.extend(lines[cursor..block.start_line].iter().map(|s| (*s).to_string()));
        out.push(format!(
            "<pre class=\"mermaid\">{}</pre>",
            html_escape::encode_text(&block.content)
        ));
        cursor = block.end_line + 1;
    }
    out.extend(lines[cursor.min(lines.len())..].iter().map(|s| (*s).to_string()));
    out.join("\n")
}

fn rendered_page(body: &str, title: &str) -> String {
    let title = html_escape::encode_text(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="{MERMAID_SCRIPT}"></script>
    <script>
        mermaid.initialize({{ startOnLoad: true, theme: 'default' }});
    </script>
    <style>
{RENDERED_STYLE}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

fn raw_page(source: &str, title: &str) -> String {
    let title = html_escape::encode_text(title);
    let escaped = html_escape::encode_text(source);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title} (Raw)</title>
    <style>
{RAW_STYLE}
    </style>
</head>
<body>
    <pre>{escaped}</pre>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::detect;
    use tempfile::tempdir;

    const DOC: &str = "# Plan\n\nSome *text*.\n\n```mermaid\ngraph TD\nA-->B\n```\n\nDone.";

    #[test]
    fn test_export_writes_timestamped_pair() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("exports");
        let exporter = Exporter::new(&out_dir);

        let artifact = exporter
            .export_with_timestamp(DOC, "plan", ViewMode::Rendered, &detect(DOC), "20240101_120000")
            .unwrap();

        assert_eq!(artifact.html_path, out_dir.join("plan_20240101_120000.html"));
        assert_eq!(artifact.text_path, out_dir.join("plan_20240101_120000.txt"));
        assert_eq!(std::fs::read_to_string(&artifact.text_path).unwrap(), DOC);

        let html = std::fs::read_to_string(&artifact.html_path).unwrap();
        assert!(html.contains("<title>plan</title>"));
        assert!(html.contains("mermaid.min.js"));
        assert!(html.contains("<pre class=\"mermaid\">graph TD\nA--&gt;B</pre>"));
        assert!(html.contains("<h1"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_export_uses_current_timestamp_format() {
        let dir = tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let artifact = exporter.export("# x", "note", ViewMode::Raw, &[]).unwrap();

        let name = artifact.html_path.file_name().unwrap().to_string_lossy().to_string();
        let ts = name
            .strip_prefix("note_")
            .and_then(|rest| rest.strip_suffix(".html"))
            .unwrap();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(char::is_ascii_digit).count() == 14);
    }

    #[test]
    fn test_raw_export_escapes_source_in_pre() {
        let html = preview_html("<b>bold</b> & more", "raw", ViewMode::Raw, &[]);
        assert!(html.contains("<title>raw (Raw)</title>"));
        assert!(html.contains("<pre>&lt;b&gt;bold&lt;/b&gt; &amp; more</pre>"));
        assert!(!html.contains("mermaid"));
    }

    #[test]
    fn test_rendered_html_replaces_fences_with_mermaid_blocks() {
        let fragment = markdown_with_diagrams(DOC, &detect(DOC));
        assert!(fragment.contains("<pre class=\"mermaid\">"));
        assert!(!fragment.contains("language-mermaid"));
    }

    #[test]
    fn test_blank_and_indented_diagram_lines_stay_in_one_block() {
        let doc = "```mermaid\nsequenceDiagram\n\n    A->>B: hi\n```\n\nAfter.";
        let fragment = markdown_with_diagrams(doc, &detect(doc));
        assert!(
            fragment.contains("<pre class=\"mermaid\">sequenceDiagram\n\n    A-&gt;&gt;B: hi</pre>"),
            "diagram split apart: {fragment}"
        );
        assert!(!fragment.contains("<code>"));
        assert!(fragment.contains("<p>After.</p>"));
    }

    #[test]
    fn test_diagram_text_cannot_close_its_block() {
        let doc = "```mermaid\ngraph TD\nA[\"</pre><b>x</b>\"]\n```";
        let fragment = markdown_with_diagrams(doc, &detect(doc));
        assert!(fragment.contains("A[\"&lt;/pre&gt;&lt;b&gt;x&lt;/b&gt;\"]</pre>"));
        assert!(!fragment.contains("<b>x</b>"));
    }

    #[test]
    fn test_rendered_html_without_blocks_is_plain_markdown() {
        let fragment = markdown_with_diagrams("## Hello", &[]);
        assert!(fragment.contains("Hello</h2>"));
    }

    #[test]
    fn test_export_fails_when_directory_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("exports");
        std::fs::write(&blocker, "not a dir").unwrap();

        let err = Exporter::new(&blocker)
            .export("# x", "x", ViewMode::Rendered, &[])
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create export directory"));
    }

    #[test]
    fn test_write_preview_creates_temp_page() {
        let path = write_preview("# Temp", "preview_test_doc", ViewMode::Rendered, &[]).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Temp</h1>"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_summary_names_both_files_and_directory() {
        let artifact = ExportArtifact {
            html_path: PathBuf::from("exports/a_1.html"),
            text_path: PathBuf::from("exports/a_1.txt"),
        };
        let msg = artifact.summary(Path::new("exports"));
        assert!(msg.contains("a_1.html"));
        assert!(msg.contains("a_1.txt"));
        assert!(msg.contains("exports"));
    }
}
