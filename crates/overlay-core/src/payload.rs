//! Analysis payload as produced by the backend
//!
//! The backend asks a language model for JSON, so the text may arrive wrapped in
//! a markdown code fence and with keys missing. Decoding strips the fence and
//! fills every missing key with the same defaults the backend uses.

use crate::coords::{lenient_or_default, Lenient};
use crate::elements::{ElementCategory, ExtractedElement};
use crate::error::OverlayError;
use serde::{Deserialize, Deserializer, Serialize};

fn default_summary() -> String {
    "No summary available".to_string()
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn low() -> String {
    "low".to_string()
}

fn deserialize_summary<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let summary = Lenient::<String>::deserialize(deserializer)?;
    Ok(summary.into_option().unwrap_or_else(default_summary))
}

/// A list that may be null or hold malformed entries
///
/// Null or a non-list reads as empty; entries that fail to decode are
/// dropped so the rest of the list survives.
fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let list = Lenient::<Vec<Lenient<T>>>::deserialize(deserializer)?;
    let entries = list.into_option().unwrap_or_default();
    let total = entries.len();
    let kept: Vec<T> = entries.into_iter().filter_map(Lenient::into_option).collect();
    if kept.len() < total {
        tracing::debug!(dropped = total - kept.len(), "skipping malformed payload entries");
    }
    Ok(kept)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default = "unknown")]
    pub document_type: String,
    #[serde(default = "unknown")]
    pub industry: String,
    #[serde(default = "low")]
    pub confidence: String,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            document_type: unknown(),
            industry: unknown(),
            confidence: low(),
        }
    }
}

/// Complete analysis result for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_summary", deserialize_with = "deserialize_summary")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub classification: Classification,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub dimension: Vec<ExtractedElement>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub annotation: Vec<ExtractedElement>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub title_block: Vec<ExtractedElement>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub others: Vec<ExtractedElement>,
    #[serde(default, deserialize_with = "deserialize_list")]
    pub key_insights: Vec<String>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            summary: default_summary(),
            classification: Classification::default(),
            dimension: Vec::new(),
            annotation: Vec::new(),
            title_block: Vec::new(),
            others: Vec::new(),
            key_insights: Vec::new(),
        }
    }
}

impl AnalysisResult {
    /// Decode model output, tolerating a surrounding markdown fence
    pub fn from_response_text(text: &str) -> Result<Self, OverlayError> {
        let body = strip_code_fence(text);
        serde_json::from_str(body).map_err(|e| OverlayError::Payload(e.to_string()))
    }

    /// Elements of one category, in payload order
    pub fn elements(&self, category: ElementCategory) -> &[ExtractedElement] {
        match category {
            ElementCategory::Dimension => &self.dimension,
            ElementCategory::Annotation => &self.annotation,
            ElementCategory::TitleBlock => &self.title_block,
            ElementCategory::Other => &self.others,
        }
    }

    /// Every element tagged with the collection it came from
    pub fn iter_categorized(&self) -> impl Iterator<Item = (ElementCategory, &ExtractedElement)> {
        ElementCategory::ALL.into_iter().flat_map(move |category| {
            self.elements(category)
                .iter()
                .map(move |element| (category, element))
        })
    }

    pub fn element_count(&self) -> usize {
        ElementCategory::ALL
            .iter()
            .map(|category| self.elements(*category).len())
            .sum()
    }
}

/// Document metadata reported alongside the analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfMetadata {
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub modification_date: String,
}

/// Upload response wrapping an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub file_id: String,
    pub filename: String,
    #[serde(default)]
    pub analysis: AnalysisResult,
    #[serde(default)]
    pub metadata: PdfMetadata,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Accept either a bare analysis or an upload envelope
pub fn decode_analysis(text: &str) -> Result<AnalysisResult, OverlayError> {
    let body = strip_code_fence(text);
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| OverlayError::Payload(e.to_string()))?;

    if !value.is_object() {
        return Err(OverlayError::Payload(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    if value.get("analysis").is_some() && value.get("file_id").is_some() {
        let envelope: AnalysisEnvelope =
            serde_json::from_value(value).map_err(|e| OverlayError::Payload(e.to_string()))?;
        return Ok(envelope.analysis);
    }

    serde_json::from_value(value).map_err(|e| OverlayError::Payload(e.to_string()))
}

/// Remove a leading ```` ```json ```` / ```` ``` ```` fence and a trailing ```` ``` ````
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}
