//! Offline overlay inspection
//!
//! Runs an analysis payload through the same session the browser uses and
//! reports where every overlay lands, plus the elements that were left out.

use anyhow::{bail, Context, Result};
use overlay_core::selector::Exclusion;
use overlay_core::{
    select_overlays, CoordinateConvention, OverlayConfig, OverlayDisplayMode,
    OverlayFrame, PageMetadata, PageSizeReader, PageViewSession, ViewportGeometry,
};
use serde::Serialize;
use std::path::Path;

/// Sizes given on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeArgs {
    pub original_width: Option<f64>,
    pub original_height: Option<f64>,
    pub rendered_width: Option<f64>,
    pub rendered_height: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub convention: CoordinateConvention,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMetadata>,
    pub geometry: ViewportGeometry,
    pub frame: OverlayFrame,
    pub excluded: Vec<Exclusion>,
}

/// Read the page size of `page_num` from a PDF file
pub fn read_page(pdf: &Path, page_num: u32) -> Result<PageMetadata> {
    let bytes =
        std::fs::read(pdf).with_context(|| format!("Failed to read PDF: {}", pdf.display()))?;
    let reader = PageSizeReader::load(&bytes)?;
    let page = reader.page_metadata(page_num)?;
    tracing::info!(
        "{}: page {} of {} is {}x{} pt",
        pdf.display(),
        page_num,
        reader.page_count(),
        page.width,
        page.height
    );
    Ok(page)
}

/// Combine explicit sizes with the PDF page size
///
/// Explicit original sizes win over the PDF. A missing rendered dimension is
/// derived from the page aspect ratio.
pub fn resolve_geometry(page: Option<&PageMetadata>, sizes: SizeArgs) -> Result<ViewportGeometry> {
    let original_width = sizes
        .original_width
        .or(page.map(|p| p.width))
        .unwrap_or(0.0);
    let original_height = sizes
        .original_height
        .or(page.map(|p| p.height))
        .unwrap_or(0.0);
    let original = PageMetadata {
        page_num: page.map(|p| p.page_num).unwrap_or(1),
        width: original_width,
        height: original_height,
        x: 0.0,
        y: 0.0,
    };
    let has_original = original_width > 0.0 && original_height > 0.0;

    let (rendered_width, rendered_height) = match (sizes.rendered_width, sizes.rendered_height) {
        (Some(width), Some(height)) => (width, height),
        (Some(width), None) if has_original => {
            let scaled = original.scale_to_width(width);
            (scaled.width, scaled.height)
        }
        (None, Some(height)) if has_original => {
            let scaled = original.scale_to_height(height);
            (scaled.width, scaled.height)
        }
        (None, None) if has_original => (original_width, original_height),
        _ => bail!("Rendered size is required unless the original page size is known"),
    };

    Ok(original.viewport_at(rendered_width, rendered_height))
}

pub fn inspect(
    analysis_text: &str,
    config: &OverlayConfig,
    page: Option<PageMetadata>,
    geometry: ViewportGeometry,
    mode: OverlayDisplayMode,
) -> Result<InspectReport> {
    let mut session = PageViewSession::new(config);
    session
        .load_payload(analysis_text)
        .context("Analysis payload could not be decoded")?;
    session.set_mode(mode);
    session.on_page_rendered(geometry);

    let frame = match session.frame() {
        Some(frame) => frame,
        None => bail!("No frame produced for the rendered page"),
    };

    let excluded = match session.analysis() {
        Some(analysis) => select_overlays(analysis, session.categories()).excluded,
        None => Vec::new(),
    };

    if frame.boxes.iter().any(|b| b.out_of_bounds) {
        tracing::warn!("some overlays fall outside the rendered page");
    }

    Ok(InspectReport {
        convention: config.placement.convention,
        page,
        geometry,
        frame,
        excluded,
    })
}
