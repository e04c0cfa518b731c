//! Composes the overlay layer for one render cycle
//!
//! A frame is a pure function of the selected elements, the published
//! geometry, and the display mode. The rendering surface (DOM, canvas, ...)
//! only has to draw what the frame describes.

use crate::coords::ScreenRect;
use crate::elements::ElementCategory;
use crate::selector::SelectedElement;
use crate::transform::Transformer;
use crate::viewport::GeometrySnapshot;
use serde::{Deserialize, Serialize};

/// Whether overlays are drawn on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayDisplayMode {
    #[default]
    Visible,
    Hidden,
}

impl OverlayDisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            OverlayDisplayMode::Visible => OverlayDisplayMode::Hidden,
            OverlayDisplayMode::Hidden => OverlayDisplayMode::Visible,
        }
    }

    pub fn is_visible(self) -> bool {
        self == OverlayDisplayMode::Visible
    }
}

/// The show/hide control, present in every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleControl {
    pub label: String,
    pub pressed: bool,
}

impl ToggleControl {
    fn for_mode(mode: OverlayDisplayMode) -> Self {
        match mode {
            OverlayDisplayMode::Visible => Self {
                label: "Hide overlays".to_string(),
                pressed: true,
            },
            OverlayDisplayMode::Hidden => Self {
                label: "Show overlays".to_string(),
                pressed: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    /// Text as it appears on the drawing
    pub original: String,
    /// Converted or translated text
    pub display: String,
}

/// One box drawn over the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    pub category: ElementCategory,
    pub rect: ScreenRect,
    pub text: String,
    pub tooltip: Tooltip,
    pub out_of_bounds: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub generation: u64,
    pub mode: OverlayDisplayMode,
    pub toggle: ToggleControl,
    pub boxes: Vec<OverlayBox>,
}

impl OverlayFrame {
    /// Same frame gated by `mode`: hidden frames keep only the toggle
    pub fn with_mode(mut self, mode: OverlayDisplayMode) -> Self {
        self.mode = mode;
        self.toggle = ToggleControl::for_mode(mode);
        if !mode.is_visible() {
            self.boxes.clear();
        }
        self
    }

    /// Topmost box under a screen point, for pointer hit-testing
    pub fn box_at(&self, x: f64, y: f64) -> Option<&OverlayBox> {
        self.boxes.iter().rev().find(|b| b.rect.contains(x, y))
    }
}

#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    transformer: Transformer,
}

impl OverlayRenderer {
    pub fn new(transformer: Transformer) -> Self {
        Self { transformer }
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    pub fn render(
        &self,
        selected: &[SelectedElement<'_>],
        snapshot: &GeometrySnapshot,
        mode: OverlayDisplayMode,
    ) -> OverlayFrame {
        let frame = OverlayFrame {
            generation: snapshot.generation,
            mode,
            toggle: ToggleControl::for_mode(mode),
            boxes: Vec::new(),
        };
        if !mode.is_visible() {
            return frame;
        }

        let boxes = selected
            .iter()
            .filter_map(|item| {
                let placement = self
                    .transformer
                    .place(&item.element.value, &item.parsed, &snapshot.geometry)
                    .ok()?;
                Some(OverlayBox {
                    category: item.category,
                    rect: placement.rect,
                    text: item.display_text.clone(),
                    tooltip: Tooltip {
                        original: item.element.value.clone(),
                        display: item.display_text.clone(),
                    },
                    out_of_bounds: placement.out_of_bounds,
                })
            })
            .collect();

        OverlayFrame { boxes, ..frame }
    }
}
