//! Decoder services — turn PDF and DOCX bytes into text the extractor can assemble.
//!
//! The extractor only sees the `PdfDecoder` / `DocxDecoder` traits, so tests and
//! alternative backends can be swapped in without touching the pipeline.
//! Defaults: `PdfExtractDecoder` (pdf-extract) and `DocxRsDecoder` (docx-rs).

use async_trait::async_trait;
use bytes::Bytes;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("PDF decode error: {0}")]
    Pdf(String),

    #[error("DOCX decode error: {0}")]
    Docx(String),

    #[error("Decoder task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// One positioned run of text on a PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfPage {
    /// 1-based page number.
    pub number: u32,
    pub items: Vec<TextItem>,
}

impl PdfPage {
    pub fn text_items(&self) -> &[TextItem] {
        &self.items
    }
}

#[async_trait]
pub trait PdfDecoder: Send + Sync {
    async fn decode(&self, bytes: Bytes) -> Result<Vec<PdfPage>, DecodeError>;
}

#[async_trait]
pub trait DocxDecoder: Send + Sync {
    async fn extract_raw_text(&self, bytes: Bytes) -> Result<String, DecodeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// pdf-extract backend
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfExtractDecoder;

#[async_trait]
impl PdfDecoder for PdfExtractDecoder {
    async fn decode(&self, bytes: Bytes) -> Result<Vec<PdfPage>, DecodeError> {
        // pdf-extract is synchronous and may panic on malformed input.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
                .map_err(|e| DecodeError::Pdf(e.to_string()))
        })
        .await??;

        debug!("pdf-extract decoded {} pages", pages.len());
        Ok(pages
            .iter()
            .enumerate()
            .map(|(idx, text)| page_from_text(idx as u32 + 1, text))
            .collect())
    }
}

/// Every non-blank line of the page text becomes one item.
fn page_from_text(number: u32, text: &str) -> PdfPage {
    let items = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TextItem {
            text: line.to_string(),
        })
        .collect();
    PdfPage { number, items }
}

// ────────────────────────────────────────────────────────────────────────────
// docx-rs backend
// ────────────────────────────────────────────────────────────────────────────

pub struct DocxRsDecoder;

#[async_trait]
impl DocxDecoder for DocxRsDecoder {
    async fn extract_raw_text(&self, bytes: Bytes) -> Result<String, DecodeError> {
        tokio::task::spawn_blocking(move || {
            let docx = docx_rs::read_docx(&bytes).map_err(|e| DecodeError::Docx(e.to_string()))?;
            let mut out = String::new();
            for child in &docx.document.children {
                match child {
                    DocumentChild::Paragraph(p) => push_paragraph(&mut out, p),
                    DocumentChild::Table(t) => push_table(&mut out, t),
                    _ => {}
                }
            }
            Ok(out)
        })
        .await?
    }
}

/// Paragraphs end with a blank line, the way raw-text DOCX extractors emit them.
fn push_paragraph(out: &mut String, paragraph: &Paragraph) {
    push_paragraph_children(out, &paragraph.children);
    out.push_str("\n\n");
}

fn push_paragraph_children(out: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(out, &link.children),
            _ => {}
        }
    }
}

#[allow(irrefutable_let_patterns)]
fn push_table(out: &mut String, table: &Table) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row else {
            continue;
        };
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell else {
                continue;
            };
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => push_paragraph(out, p),
                    TableCellContent::Table(nested) => push_table(out, nested),
                    _ => {}
                }
            }
        }
    }
}
