//! Browser console diagnostics

use overlay_core::{Diagnostic, DiagnosticSink};

/// Sends engine diagnostics to the browser console
///
/// Out-of-bounds boxes go to `console.warn`, everything else to
/// `console.debug`. Per-box placement events are only logged when `verbose`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink {
    pub verbose: bool,
}

impl ConsoleSink {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

/// Console log line for a diagnostic, or `None` if it should be skipped
pub fn console_message(diagnostic: &Diagnostic, verbose: bool) -> Option<String> {
    let message = match diagnostic {
        Diagnostic::Placed { subject, rect } if verbose => format!(
            "[overlay] placed {:?} at ({:.1}, {:.1}) {:.1}x{:.1}",
            subject, rect.left, rect.top, rect.width, rect.height
        ),
        Diagnostic::Placed { .. } => return None,
        Diagnostic::OutOfBounds {
            subject,
            left,
            top,
            rendered_width,
            rendered_height,
        } => format!(
            "[overlay] {:?} origin ({:.1}, {:.1}) outside {}x{} page",
            subject, left, top, rendered_width, rendered_height
        ),
        Diagnostic::Clamped {
            subject,
            raw_width,
            raw_height,
            width,
            height,
        } => format!(
            "[overlay] {:?} raised from {:.1}x{:.1} to {:.1}x{:.1}",
            subject, raw_width, raw_height, width, height
        ),
        Diagnostic::Rejected { subject, reason } => {
            format!("[overlay] {:?} rejected: {}", subject, reason)
        }
    };
    Some(message)
}

impl DiagnosticSink for ConsoleSink {
    fn record(&self, diagnostic: Diagnostic) {
        let Some(message) = console_message(&diagnostic, self.verbose) else {
            return;
        };
        match diagnostic {
            Diagnostic::OutOfBounds { .. } => web_sys::console::warn_1(&message.into()),
            _ => web_sys::console::debug_1(&message.into()),
        }
    }
}
