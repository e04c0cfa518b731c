use crate::coords::{deserialize_scalar_text, DocumentBox};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which collection an element arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    Dimension,
    Annotation,
    TitleBlock,
    Other,
}

impl ElementCategory {
    pub const ALL: [ElementCategory; 4] = [
        ElementCategory::Dimension,
        ElementCategory::Annotation,
        ElementCategory::TitleBlock,
        ElementCategory::Other,
    ];

    /// Key of this category's list in the analysis payload
    pub fn payload_key(&self) -> &'static str {
        match self {
            ElementCategory::Dimension => "dimension",
            ElementCategory::Annotation => "annotation",
            ElementCategory::TitleBlock => "title_block",
            ElementCategory::Other => "others",
        }
    }

    /// Categories whose display text is the English translation
    pub fn is_translated(&self) -> bool {
        matches!(
            self,
            ElementCategory::Annotation | ElementCategory::TitleBlock
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElementCategory::Dimension => "Dimension",
            ElementCategory::Annotation => "Annotation",
            ElementCategory::TitleBlock => "Title block",
            ElementCategory::Other => "Other",
        }
    }

    /// Parse a category name as used in config files and payload keys
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dimension" | "dimensions" => Some(ElementCategory::Dimension),
            "annotation" | "annotations" => Some(ElementCategory::Annotation),
            "title_block" | "titleblock" => Some(ElementCategory::TitleBlock),
            "other" | "others" => Some(ElementCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payload_key())
    }
}

/// One extracted annotation with its bounding region
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedElement {
    /// Text in the drawing's original language
    #[serde(default, deserialize_with = "deserialize_value")]
    pub value: String,
    /// English translation, only sent for annotation and title-block entries
    #[serde(
        rename = "value_en",
        alias = "translated_value",
        default,
        deserialize_with = "deserialize_scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub translated_value: Option<String>,
    #[serde(rename = "coordinate", default)]
    pub doc_box: DocumentBox,
}

/// Null or non-text values read as empty text
fn deserialize_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_scalar_text(deserializer)?.unwrap_or_default())
}

impl ExtractedElement {
    pub fn new(value: impl Into<String>, doc_box: DocumentBox) -> Self {
        Self {
            value: value.into(),
            translated_value: None,
            doc_box,
        }
    }

    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated_value = Some(translated.into());
        self
    }

    /// Translation, if present and not blank
    pub fn translation(&self) -> Option<&str> {
        self.translated_value
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
