//! Document box -> screen rectangle transformation
//!
//! The transformer is configured once with a [`CoordinateConvention`] and a
//! minimum visible size. Placing a box is a pure function of the box and the
//! current [`ViewportGeometry`]; the only side channel is the diagnostics sink.

use crate::coords::{
    CoordinateConvention, DocumentBox, InvalidBox, ParsedBox, ScreenRect, ViewportGeometry,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Default minimum overlay width in pixels
pub const MIN_VISIBLE_WIDTH: f64 = 50.0;
/// Default minimum overlay height in pixels
pub const MIN_VISIBLE_HEIGHT: f64 = 20.0;

/// Floor applied to every placed rectangle so tooltips stay reachable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimumSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MinimumSize {
    fn default() -> Self {
        Self {
            width: MIN_VISIBLE_WIDTH,
            height: MIN_VISIBLE_HEIGHT,
        }
    }
}

/// Result of placing one box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub rect: ScreenRect,
    /// Origin fell outside the rendered page before clamping
    pub out_of_bounds: bool,
}

#[derive(Clone)]
pub struct Transformer {
    convention: CoordinateConvention,
    minimum: MinimumSize,
    sink: Rc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("convention", &self.convention)
            .field("minimum", &self.minimum)
            .finish_non_exhaustive()
    }
}

impl Transformer {
    /// Create a transformer that reports to `tracing`
    pub fn new(convention: CoordinateConvention) -> Self {
        Self {
            convention,
            minimum: MinimumSize::default(),
            sink: Rc::new(TracingSink),
        }
    }

    pub fn with_minimum_size(mut self, minimum: MinimumSize) -> Self {
        self.minimum = minimum;
        self
    }

    pub fn with_sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn convention(&self) -> CoordinateConvention {
        self.convention
    }

    pub fn minimum_size(&self) -> MinimumSize {
        self.minimum
    }

    /// Document point under a screen point, in this transformer's convention
    ///
    /// Inverts the origin mapping of [`Transformer::place`]: normalized
    /// geometry yields unit coordinates with a top-left origin, absolute
    /// geometry yields document units with the vertical axis flipped back.
    /// `None` when the geometry cannot serve as a scale basis.
    pub fn document_point(
        &self,
        screen_x: f64,
        screen_y: f64,
        geometry: &ViewportGeometry,
    ) -> Option<(f64, f64)> {
        if !geometry.is_usable_for(self.convention) {
            return None;
        }
        let point = match self.convention {
            CoordinateConvention::Normalized => (
                screen_x / geometry.rendered_width,
                screen_y / geometry.rendered_height,
            ),
            CoordinateConvention::AbsoluteBottomOrigin => (
                screen_x / geometry.scale_x(),
                geometry.original_height - screen_y / geometry.scale_y(),
            ),
        };
        Some(point)
    }

    /// Parse and place a raw box, reporting a rejection if it cannot be placed
    pub fn place_box(
        &self,
        subject: &str,
        doc_box: &DocumentBox,
        geometry: &ViewportGeometry,
    ) -> Result<Placement, InvalidBox> {
        let parsed = match doc_box.parse() {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.reject(subject, reason.clone());
                return Err(reason);
            }
        };
        self.place(subject, &parsed, geometry)
    }

    /// Place an already-parsed box
    pub fn place(
        &self,
        subject: &str,
        parsed: &ParsedBox,
        geometry: &ViewportGeometry,
    ) -> Result<Placement, InvalidBox> {
        if !geometry.is_usable_for(self.convention) {
            self.reject(subject, InvalidBox::Geometry);
            return Err(InvalidBox::Geometry);
        }

        let raw = match self.convention {
            CoordinateConvention::Normalized => normalized_rect(parsed, geometry),
            CoordinateConvention::AbsoluteBottomOrigin => bottom_origin_rect(parsed, geometry),
        };

        let out_of_bounds = raw.left < 0.0
            || raw.top < 0.0
            || raw.left > geometry.rendered_width
            || raw.top > geometry.rendered_height;
        if out_of_bounds {
            self.sink.record(Diagnostic::OutOfBounds {
                subject: subject.to_string(),
                left: raw.left,
                top: raw.top,
                rendered_width: geometry.rendered_width,
                rendered_height: geometry.rendered_height,
            });
        }

        // Floor after scaling, never before
        let rect = ScreenRect {
            left: raw.left.max(0.0),
            top: raw.top.max(0.0),
            width: raw.width.max(self.minimum.width),
            height: raw.height.max(self.minimum.height),
        };
        if rect.width != raw.width || rect.height != raw.height {
            self.sink.record(Diagnostic::Clamped {
                subject: subject.to_string(),
                raw_width: raw.width,
                raw_height: raw.height,
                width: rect.width,
                height: rect.height,
            });
        }

        self.sink.record(Diagnostic::Placed {
            subject: subject.to_string(),
            rect,
        });

        Ok(Placement {
            rect,
            out_of_bounds,
        })
    }

    fn reject(&self, subject: &str, reason: InvalidBox) {
        self.sink.record(Diagnostic::Rejected {
            subject: subject.to_string(),
            reason,
        });
    }
}

/// Top-origin unit box: no vertical flip
fn normalized_rect(parsed: &ParsedBox, geometry: &ViewportGeometry) -> ScreenRect {
    ScreenRect {
        left: parsed.left_x * geometry.rendered_width,
        top: parsed.upper_y * geometry.rendered_height,
        width: (parsed.right_x - parsed.left_x) * geometry.rendered_width,
        height: (parsed.lower_y - parsed.upper_y) * geometry.rendered_height,
    }
}

/// Bottom-origin document units: scale, then flip the vertical axis
fn bottom_origin_rect(parsed: &ParsedBox, geometry: &ViewportGeometry) -> ScreenRect {
    let scale_x = geometry.scale_x();
    let scale_y = geometry.scale_y();
    ScreenRect {
        left: parsed.left_x * scale_x,
        top: (geometry.original_height - parsed.upper_y) * scale_y,
        width: (parsed.right_x - parsed.left_x) * scale_x,
        height: (parsed.upper_y - parsed.lower_y) * scale_y,
    }
}
