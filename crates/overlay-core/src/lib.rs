//! Overlay placement for analyzed engineering drawings
//!
//! Takes the elements an analysis backend extracted from a drawing (dimensions,
//! annotations, title-block entries) and places them as boxes over the rendered
//! page, re-placing them whenever the page is re-rendered at a new size.

pub mod config;
pub mod coords;
pub mod diagnostics;
pub mod elements;
pub mod error;
pub mod page;
pub mod payload;
pub mod render;
pub mod selector;
pub mod session;
pub mod transform;
pub mod units;
pub mod viewport;

pub use config::{DisplayConfig, OverlayConfig, PlacementConfig};
pub use coords::{
    CoordinateConvention, DocumentBox, Edge, InvalidBox, ParsedBox, ScreenRect, ViewportGeometry,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, RecordingSink, TracingSink};
pub use elements::{ElementCategory, ExtractedElement};
pub use error::OverlayError;
pub use page::{PageMetadata, PageSizeReader, ScaledDimensions};
pub use payload::{decode_analysis, AnalysisEnvelope, AnalysisResult, Classification};
pub use render::{
    OverlayBox, OverlayDisplayMode, OverlayFrame, OverlayRenderer, ToggleControl, Tooltip,
};
pub use selector::{select_overlays, CategorySet, Selection};
pub use session::PageViewSession;
pub use transform::{MinimumSize, Placement, Transformer};
pub use units::convert_dimension;
pub use viewport::{GeometrySnapshot, TrackerState, ViewportTracker};
