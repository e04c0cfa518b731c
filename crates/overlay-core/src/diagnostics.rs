//! Diagnostic events emitted while placing overlays
//!
//! The engine never logs geometry inline. Everything goes through a
//! [`DiagnosticSink`] so the host decides where traces end up (tracing, the
//! browser console, or an in-memory buffer in tests).

use crate::coords::{InvalidBox, ScreenRect};
use serde::Serialize;
use std::cell::RefCell;

/// One observation made by the transformer or session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A box was placed on screen
    Placed { subject: String, rect: ScreenRect },
    /// The computed origin lies outside the rendered page; the box is still shown
    OutOfBounds {
        subject: String,
        left: f64,
        top: f64,
        rendered_width: f64,
        rendered_height: f64,
    },
    /// Width or height was raised to the minimum visible size
    Clamped {
        subject: String,
        raw_width: f64,
        raw_height: f64,
        width: f64,
        height: f64,
    },
    /// The box could not be placed at all
    Rejected { subject: String, reason: InvalidBox },
}

impl Diagnostic {
    pub fn subject(&self) -> &str {
        match self {
            Diagnostic::Placed { subject, .. }
            | Diagnostic::OutOfBounds { subject, .. }
            | Diagnostic::Clamped { subject, .. }
            | Diagnostic::Rejected { subject, .. } => subject,
        }
    }
}

/// Receives diagnostics from the engine
pub trait DiagnosticSink {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Placed { subject, rect } => tracing::trace!(
                subject = %subject,
                left = rect.left,
                top = rect.top,
                width = rect.width,
                height = rect.height,
                "overlay placed"
            ),
            Diagnostic::OutOfBounds {
                subject,
                left,
                top,
                rendered_width,
                rendered_height,
            } => tracing::warn!(
                subject = %subject,
                left,
                top,
                rendered_width,
                rendered_height,
                "overlay origin outside rendered page"
            ),
            Diagnostic::Clamped {
                subject,
                raw_width,
                raw_height,
                ..
            } => tracing::debug!(
                subject = %subject,
                raw_width,
                raw_height,
                "overlay raised to minimum visible size"
            ),
            Diagnostic::Rejected { subject, reason } => {
                tracing::debug!(subject = %subject, "overlay rejected: {}", reason)
            }
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory so callers can inspect them
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<Diagnostic> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn count_where(&self, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
        self.events.borrow().iter().filter(|d| predicate(d)).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, diagnostic: Diagnostic) {
        self.events.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_collects_and_drains() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.record(Diagnostic::Placed {
            subject: "100mm".to_string(),
            rect: ScreenRect::new(0.0, 0.0, 50.0, 20.0),
        });
        sink.record(Diagnostic::Rejected {
            subject: "R5".to_string(),
            reason: InvalidBox::Geometry,
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.count_where(|d| matches!(d, Diagnostic::Rejected { .. })),
            1
        );

        let drained = sink.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].subject(), "100mm");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_diagnostic_serializes_with_event_tag() {
        let json = serde_json::to_value(Diagnostic::Rejected {
            subject: "x".to_string(),
            reason: InvalidBox::Geometry,
        })
        .unwrap();
        assert_eq!(json["event"], "rejected");
        assert_eq!(json["reason"]["kind"], "geometry");
    }
}
