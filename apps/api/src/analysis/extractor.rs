use std::sync::Arc;

use tracing::debug;

use crate::analysis::decoders::{
    DocxDecoder, DocxRsDecoder, PdfDecoder, PdfExtractDecoder, PdfPage,
};
use crate::analysis::models::{ExtractedText, MediaType, RawDocument};
use crate::errors::AnalysisError;

/// Converts a `RawDocument` into plain text via the injected decoder services.
#[derive(Clone)]
pub struct DocumentExtractor {
    pdf: Arc<dyn PdfDecoder>,
    docx: Arc<dyn DocxDecoder>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractDecoder), Arc::new(DocxRsDecoder))
    }
}

impl DocumentExtractor {
    pub fn new(pdf: Arc<dyn PdfDecoder>, docx: Arc<dyn DocxDecoder>) -> Self {
        Self { pdf, docx }
    }

    pub async fn extract(&self, doc: RawDocument) -> Result<ExtractedText, AnalysisError> {
        let media_type = MediaType::parse(&doc.media_type)?;
        debug!("Extracting {} bytes as {media_type}", doc.bytes.len());

        let text = match media_type {
            MediaType::Pdf => {
                let pages = self
                    .pdf
                    .decode(doc.bytes)
                    .await
                    .map_err(|e| AnalysisError::ExtractionFailure(e.to_string()))?;
                assemble_pages(pages)
            }
            MediaType::Docx => self
                .docx
                .extract_raw_text(doc.bytes)
                .await
                .map_err(|e| AnalysisError::ExtractionFailure(e.to_string()))?,
        };

        let text = ExtractedText::new(text);
        if text.is_blank() {
            return Err(AnalysisError::ExtractionFailure(format!(
                "{media_type} contained no extractable text"
            )));
        }
        Ok(text)
    }
}

/// Items on a page are joined by single spaces; pages by newlines, in page order.
fn assemble_pages(mut pages: Vec<PdfPage>) -> String {
    pages.sort_by_key(|p| p.number);
    pages
        .iter()
        .map(|page| {
            page.text_items()
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
