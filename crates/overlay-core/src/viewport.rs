//! Tracks the rendered page geometry across render cycles
//!
//! Every completed page render publishes a fresh [`ViewportGeometry`] tagged
//! with a new generation. Anything computed against an older generation is
//! stale and must be discarded.

use crate::coords::ViewportGeometry;
use serde::{Deserialize, Serialize};

/// Geometry published by one render cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub generation: u64,
    pub geometry: ViewportGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerState {
    NoGeometry,
    GeometryKnown(GeometrySnapshot),
    OverlaysComputed(GeometrySnapshot),
}

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    state: TrackerState,
    generation: u64,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::NoGeometry,
            generation: 0,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Publish the geometry of a just-completed render (navigation, zoom, resize)
    pub fn publish(&mut self, geometry: ViewportGeometry) -> GeometrySnapshot {
        self.generation += 1;
        let snapshot = GeometrySnapshot {
            generation: self.generation,
            geometry,
        };

        if let Some(previous) = self.current() {
            if previous.geometry.original_width != geometry.original_width
                || previous.geometry.original_height != geometry.original_height
            {
                tracing::debug!(
                    generation = snapshot.generation,
                    "page size changed: {}x{} -> {}x{}",
                    previous.geometry.original_width,
                    previous.geometry.original_height,
                    geometry.original_width,
                    geometry.original_height
                );
            }
        }

        self.state = TrackerState::GeometryKnown(snapshot);
        snapshot
    }

    /// Most recently published geometry
    pub fn current(&self) -> Option<GeometrySnapshot> {
        match self.state {
            TrackerState::NoGeometry => None,
            TrackerState::GeometryKnown(snapshot) | TrackerState::OverlaysComputed(snapshot) => {
                Some(snapshot)
            }
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current()
            .is_some_and(|snapshot| snapshot.generation == generation)
    }

    /// True when geometry is known but overlays have not been computed for it
    pub fn needs_recompute(&self) -> bool {
        matches!(self.state, TrackerState::GeometryKnown(_))
    }

    /// Record that overlays were computed for `generation`
    ///
    /// Returns `false` (and changes nothing) when that generation has been superseded.
    pub fn mark_computed(&mut self, generation: u64) -> bool {
        match self.state {
            TrackerState::GeometryKnown(snapshot) | TrackerState::OverlaysComputed(snapshot)
                if snapshot.generation == generation =>
            {
                self.state = TrackerState::OverlaysComputed(snapshot);
                true
            }
            _ => false,
        }
    }

    /// Force recomputation against the current geometry (new data arrived)
    pub fn invalidate(&mut self) {
        if let TrackerState::OverlaysComputed(snapshot) = self.state {
            self.state = TrackerState::GeometryKnown(snapshot);
        }
    }

    /// Forget the page entirely
    pub fn clear(&mut self) {
        self.state = TrackerState::NoGeometry;
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new()
    }
}
