use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::config::Letterhead;
use crate::error::ExportError;
use crate::invoice::{invoice_filename, render_invoice_markdown, InvoiceView};

/// Escapes the characters HTML gives meaning to, so the text prints literally.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escapes user-entered text for the Markdown documents: HTML entities first,
/// then a backslash before every character Markdown would treat as markup.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in escape_html(text).chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '#' | '|' | '~' | '$') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Letterhead values come from configuration, so they only need HTML escaping.
pub fn escape_letterhead(letterhead: &Letterhead) -> Letterhead {
    Letterhead {
        name: escape_html(&letterhead.name),
        location: escape_html(&letterhead.location),
        address: escape_html(&letterhead.address),
        phone: escape_html(&letterhead.phone),
        website: escape_html(&letterhead.website),
        jurisdiction: escape_html(&letterhead.jurisdiction),
    }
}

/// A printable document: Markdown with inline HTML, and the file stem to save it under.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_stem: String,
    pub markdown: String,
}

impl Document {
    pub fn invoice(view: &InvoiceView) -> Self {
        Self {
            file_stem: invoice_filename(&view.invoice_number),
            markdown: render_invoice_markdown(view),
        }
    }
}

/// Turns a document into a downloadable file and returns its path.
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<PathBuf, ExportError>;
}

/// Writes the Markdown next to the PDF and converts it with pandoc
pub struct PandocRenderer {
    output_dir: PathBuf,
    program: String,
}

impl PandocRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, program: impl Into<String>) -> Result<Self, ExportError> {
        let output_dir = output_dir.into();

        // Create the output directory if it doesn't exist
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir).map_err(|source| ExportError::Io {
                path: output_dir.display().to_string(),
                source,
            })?;
        }

        Ok(Self {
            output_dir,
            program: program.into(),
        })
    }
}

impl DocumentRenderer for PandocRenderer {
    fn render(&self, document: &Document) -> Result<PathBuf, ExportError> {
        let md_path = self.output_dir.join(format!("{}.md", document.file_stem));
        let pdf_path = self.output_dir.join(format!("{}.pdf", document.file_stem));
        let markdown = md_path.display().to_string();

        fs::write(&md_path, document.markdown.as_bytes()).map_err(|source| ExportError::Io {
            path: markdown.clone(),
            source,
        })?;

        let output = Command::new(&self.program)
            .arg(&md_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
            .map_err(|source| {
                tracing::warn!(program = %self.program, error = %source, "could not run pdf renderer");
                ExportError::RendererUnavailable {
                    program: self.program.clone(),
                    markdown: markdown.clone(),
                    source,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(program = %self.program, %stderr, "pdf renderer failed");
            return Err(ExportError::RenderFailed {
                program: self.program.clone(),
                markdown,
                stderr,
            });
        }

        tracing::info!(path = %pdf_path.display(), "document exported");
        Ok(pdf_path)
    }
}
