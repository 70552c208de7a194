use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Serialize, Serializer};

use crate::errors::AnalysisError;

/// Literal rendered for any field the inference engine could not find.
pub const NOT_DETECTED: &str = "Not detected";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document formats the extractor knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
}

impl MediaType {
    /// Parses a declared media type, accepting both short names and MIME strings.
    pub fn parse(declared: &str) -> Result<Self, AnalysisError> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "pdf" | "application/pdf" => Ok(MediaType::Pdf),
            "docx" | DOCX_MIME => Ok(MediaType::Docx),
            other => Err(AnalysisError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Derives the media type from an upload's file name extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        Self::parse(ext).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Pdf => "pdf",
            MediaType::Docx => "docx",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document, exactly as received. Consumed once by the extractor.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Declared type; validated by the extractor, not at construction.
    pub media_type: String,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Plain text produced by one extraction. Shared read-only with every inferrer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(Arc<str>);

impl ExtractedText {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ExtractedText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Outcome of a single field inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Detection {
    Detected(String),
    #[default]
    NotDetected,
}

impl Detection {
    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Detection::Detected(value) => Some(value),
            Detection::NotDetected => None,
        }
    }
}

impl From<Option<String>> for Detection {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => Detection::Detected(v),
            None => Detection::NotDetected,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_deref().unwrap_or(NOT_DETECTED))
    }
}

impl Serialize for Detection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_deref().unwrap_or(NOT_DETECTED))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFields {
    pub name: Detection,
    pub email: Detection,
    pub phone: Detection,
    /// Distinct ignoring case, in order of first occurrence.
    pub skills: Vec<String>,
    pub education: Detection,
    pub experience: Detection,
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub fields: ParsedFields,
    /// Always within 0..=100.
    pub score: u8,
    pub suggestions: Vec<String>,
}
