//! Chooses which extracted elements are eligible to become overlays
//!
//! An element is shown when its box parses and it has something to display.
//! Everything else is excluded quietly; the exclusions are returned so the
//! caller can report them, never raised as errors.

use crate::coords::{InvalidBox, ParsedBox};
use crate::elements::{ElementCategory, ExtractedElement};
use crate::payload::AnalysisResult;
use crate::units::convert_dimension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of categories currently being displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<ElementCategory>);

impl CategorySet {
    pub fn all() -> Self {
        Self(ElementCategory::ALL.into_iter().collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn only(categories: &[ElementCategory]) -> Self {
        Self(categories.iter().copied().collect())
    }

    pub fn contains(&self, category: ElementCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn insert(&mut self, category: ElementCategory) -> bool {
        self.0.insert(category)
    }

    pub fn remove(&mut self, category: ElementCategory) -> bool {
        self.0.remove(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementCategory> + '_ {
        self.0.iter().copied()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::all()
    }
}

/// An element that passed selection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedElement<'a> {
    pub category: ElementCategory,
    pub element: &'a ExtractedElement,
    pub parsed: ParsedBox,
    /// Converted or translated text shown on the overlay
    pub display_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    InvalidBox { detail: InvalidBox },
    NoDisplayText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub category: ElementCategory,
    pub value: String,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub selected: Vec<SelectedElement<'a>>,
    pub excluded: Vec<Exclusion>,
}

/// Text an element would show, or `None` when it has nothing displayable
pub fn display_text(category: ElementCategory, element: &ExtractedElement) -> Option<String> {
    match category {
        ElementCategory::Dimension => {
            convert_dimension(&element.value).filter(|text| !text.trim().is_empty())
        }
        ElementCategory::Annotation | ElementCategory::TitleBlock => {
            element.translation().map(str::to_string)
        }
        ElementCategory::Other => {
            let value = element.value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
    }
}

/// Select eligible elements of the active categories, in payload order
pub fn select_overlays<'a>(analysis: &'a AnalysisResult, active: &CategorySet) -> Selection<'a> {
    select_from(
        analysis
            .iter_categorized()
            .filter(|(category, _)| active.contains(*category)),
    )
}

pub fn select_from<'a>(
    elements: impl IntoIterator<Item = (ElementCategory, &'a ExtractedElement)>,
) -> Selection<'a> {
    let mut selection = Selection::default();

    for (category, element) in elements {
        let parsed = match element.doc_box.parse() {
            Ok(parsed) => parsed,
            Err(detail) => {
                selection.excluded.push(Exclusion {
                    category,
                    value: element.value.clone(),
                    reason: ExclusionReason::InvalidBox { detail },
                });
                continue;
            }
        };

        match display_text(category, element) {
            Some(display_text) => selection.selected.push(SelectedElement {
                category,
                element,
                parsed,
                display_text,
            }),
            None => selection.excluded.push(Exclusion {
                category,
                value: element.value.clone(),
                reason: ExclusionReason::NoDisplayText,
            }),
        }
    }

    selection
}
