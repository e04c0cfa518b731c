//! Per-page-view state
//!
//! A [`PageViewSession`] owns the current analysis, the viewport tracker and
//! the display mode. Frames are recomputed lazily: geometry changes and data
//! changes mark the cached frame stale, mode changes only re-gate it.

use crate::config::OverlayConfig;
use crate::coords::ViewportGeometry;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::OverlayError;
use crate::payload::{decode_analysis, AnalysisResult};
use crate::render::{OverlayDisplayMode, OverlayFrame, OverlayRenderer};
use crate::selector::{select_overlays, CategorySet, ExclusionReason};
use crate::viewport::{GeometrySnapshot, TrackerState, ViewportTracker};
use std::rc::Rc;

pub struct PageViewSession {
    renderer: OverlayRenderer,
    sink: Rc<dyn DiagnosticSink>,
    categories: CategorySet,
    initial_mode: OverlayDisplayMode,
    mode: OverlayDisplayMode,
    analysis: Option<AnalysisResult>,
    tracker: ViewportTracker,
    /// Visible frame for the tracker's current generation
    cached: Option<OverlayFrame>,
}

impl std::fmt::Debug for PageViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageViewSession")
            .field("mode", &self.mode)
            .field("categories", &self.categories)
            .field("tracker", &self.tracker)
            .field("has_analysis", &self.analysis.is_some())
            .finish_non_exhaustive()
    }
}

impl PageViewSession {
    pub fn new(config: &OverlayConfig) -> Self {
        Self::with_sink(config, Rc::new(TracingSink))
    }

    pub fn with_sink(config: &OverlayConfig, sink: Rc<dyn DiagnosticSink>) -> Self {
        let transformer = config.transformer().with_sink(Rc::clone(&sink));
        Self {
            renderer: OverlayRenderer::new(transformer),
            sink,
            categories: config.display.categories.clone(),
            initial_mode: config.display.initial_mode,
            mode: config.display.initial_mode,
            analysis: None,
            tracker: ViewportTracker::new(),
            cached: None,
        }
    }

    /// Replace every element with those of `analysis`
    pub fn load_analysis(&mut self, analysis: AnalysisResult) {
        tracing::debug!(elements = analysis.element_count(), "analysis loaded");
        self.analysis = Some(analysis);
        self.data_changed();
    }

    /// Decode and load backend output
    ///
    /// On failure the previous analysis is dropped: an undecodable payload
    /// means zero overlays, not stale ones.
    pub fn load_payload(&mut self, text: &str) -> Result<(), OverlayError> {
        match decode_analysis(text) {
            Ok(analysis) => {
                self.load_analysis(analysis);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("discarding analysis payload: {}", e);
                self.analysis = None;
                self.data_changed();
                Err(e)
            }
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Forget the analysis, the page geometry and the mode
    pub fn reset(&mut self) {
        self.analysis = None;
        self.tracker.clear();
        self.cached = None;
        self.mode = self.initial_mode;
    }

    /// Record a completed page render
    pub fn on_page_rendered(&mut self, geometry: ViewportGeometry) -> GeometrySnapshot {
        self.cached = None;
        self.tracker.publish(geometry)
    }

    pub fn mode(&self) -> OverlayDisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OverlayDisplayMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> OverlayDisplayMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn set_categories(&mut self, categories: CategorySet) {
        if categories != self.categories {
            self.categories = categories;
            self.data_changed();
        }
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Frame for the current geometry, or `None` before the first render
    pub fn frame(&mut self) -> Option<OverlayFrame> {
        let snapshot = self.tracker.current()?;

        let fresh = self
            .cached
            .as_ref()
            .is_some_and(|frame| frame.generation == snapshot.generation);
        if !fresh || self.tracker.needs_recompute() {
            let frame = self.compute(&snapshot);
            self.tracker.mark_computed(snapshot.generation);
            self.cached = Some(frame);
        }

        self.cached.clone().map(|frame| frame.with_mode(self.mode))
    }

    /// Document coordinates under a point on the rendered page
    ///
    /// Uses the latest published geometry; `None` before the first render or
    /// when that geometry cannot be inverted.
    pub fn document_point_at(&self, screen_x: f64, screen_y: f64) -> Option<(f64, f64)> {
        let snapshot = self.tracker.current()?;
        self.renderer
            .transformer()
            .document_point(screen_x, screen_y, &snapshot.geometry)
    }

    /// Whether `frame` was computed against the latest geometry and data
    pub fn is_current(&self, frame: &OverlayFrame) -> bool {
        self.tracker.is_current(frame.generation)
    }

    fn compute(&self, snapshot: &GeometrySnapshot) -> OverlayFrame {
        let empty = AnalysisResult::default();
        let analysis = self.analysis.as_ref().unwrap_or(&empty);
        let selection = select_overlays(analysis, &self.categories);

        for exclusion in &selection.excluded {
            match &exclusion.reason {
                ExclusionReason::InvalidBox { detail } => self.sink.record(Diagnostic::Rejected {
                    subject: exclusion.value.clone(),
                    reason: detail.clone(),
                }),
                ExclusionReason::NoDisplayText => tracing::trace!(
                    category = %exclusion.category,
                    "no display text for {:?}",
                    exclusion.value
                ),
            }
        }

        let frame = self.renderer.render(
            &selection.selected,
            snapshot,
            OverlayDisplayMode::Visible,
        );
        tracing::debug!(
            generation = snapshot.generation,
            shown = frame.boxes.len(),
            excluded = selection.excluded.len(),
            "overlay frame computed"
        );
        frame
    }

    /// New data invalidates frames already handed out, so republish the
    /// current geometry under a fresh generation
    fn data_changed(&mut self) {
        self.cached = None;
        if let Some(snapshot) = self.tracker.current() {
            self.tracker.publish(snapshot.geometry);
        }
    }
}
