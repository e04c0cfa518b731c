//! Browser bindings for drawing overlays
//!
//! [`WasmOverlaySession`] wraps a [`PageViewSession`] for the host page, which
//! reports every completed render and lets the session draw into a
//! [`DomOverlayLayer`] stacked on the page element.

use overlay_core::{
    DiagnosticSink, OverlayConfig, OverlayDisplayMode, OverlayFrame, PageViewSession,
    TracingSink, ViewportGeometry,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub mod console;
pub mod overlay;

pub use console::ConsoleSink;
pub use overlay::DomOverlayLayer;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// Console on the web, `tracing` when running natively (tests)
fn default_sink() -> Rc<dyn DiagnosticSink> {
    if cfg!(target_arch = "wasm32") {
        Rc::new(ConsoleSink::default())
    } else {
        Rc::new(TracingSink)
    }
}

/// Overlay state for one page view, driven by the host page
#[wasm_bindgen]
pub struct WasmOverlaySession {
    session: PageViewSession,
    layer: Option<DomOverlayLayer>,
}

impl Default for WasmOverlaySession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmOverlaySession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_config(&OverlayConfig::default())
    }

    /// Create a session from TOML configuration text
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(toml: &str) -> Result<WasmOverlaySession, JsValue> {
        let config = OverlayConfig::from_toml_str(toml)
            .map_err(|e| JsValue::from_str(&format!("Invalid overlay config: {:#}", e)))?;
        Ok(Self::from_config(&config))
    }

    /// Replace the analysis; returns the number of extracted elements
    ///
    /// An undecodable payload clears the overlays and returns an error.
    #[wasm_bindgen(js_name = loadAnalysis)]
    pub fn load_analysis(&mut self, json: &str) -> Result<usize, JsValue> {
        self.session
            .load_payload(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self
            .session
            .analysis()
            .map(|analysis| analysis.element_count())
            .unwrap_or(0))
    }

    /// Call after every completed page render (navigation, zoom, resize)
    #[wasm_bindgen(js_name = onPageRendered)]
    pub fn on_page_rendered(
        &mut self,
        rendered_width: f64,
        rendered_height: f64,
        original_width: f64,
        original_height: f64,
    ) {
        self.session.on_page_rendered(ViewportGeometry::new(
            rendered_width,
            rendered_height,
            original_width,
            original_height,
        ));
    }

    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, visible: bool) {
        self.session.set_mode(if visible {
            OverlayDisplayMode::Visible
        } else {
            OverlayDisplayMode::Hidden
        });
    }

    /// Flip the display mode; returns whether overlays are now visible
    #[wasm_bindgen]
    pub fn toggle(&mut self) -> bool {
        self.session.toggle_mode().is_visible()
    }

    #[wasm_bindgen(js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.session.mode().is_visible()
    }

    /// Current frame as JSON, or `None` before the first page render
    #[wasm_bindgen(js_name = frameJson)]
    pub fn frame_json(&mut self) -> Result<Option<String>, JsValue> {
        self.session
            .frame()
            .map(|frame| {
                serde_json::to_string(&frame)
                    .map_err(|e| JsValue::from_str(&format!("Failed to serialize frame: {}", e)))
            })
            .transpose()
    }

    /// Current frame as a plain JS object
    #[wasm_bindgen(js_name = frameObject)]
    pub fn frame_object(&mut self) -> Result<JsValue, JsValue> {
        match self.frame_json()? {
            Some(json) => js_sys::JSON::parse(&json),
            None => Ok(JsValue::NULL),
        }
    }

    /// `[x, y]` in document coordinates under a pointer position on the page
    ///
    /// `None` before the first render or when the page size is unknown under
    /// the absolute convention.
    #[wasm_bindgen(js_name = documentPointAt)]
    pub fn document_point_at(&self, screen_x: f64, screen_y: f64) -> Option<Box<[f64]>> {
        self.session
            .document_point_at(screen_x, screen_y)
            .map(|(x, y)| vec![x, y].into_boxed_slice())
    }

    /// Create the DOM layer for `page_num` on top of `page_element`
    #[wasm_bindgen(js_name = attachTo)]
    pub fn attach_to(&mut self, page_element: &web_sys::Element, page_num: u32) -> Result<(), JsValue> {
        if let Some(previous) = self.layer.take() {
            previous.detach();
        }
        let layer = DomOverlayLayer::new(page_num)?;
        layer.attach(page_element)?;
        self.layer = Some(layer);
        Ok(())
    }

    /// Draw the current frame into the attached layer
    #[wasm_bindgen]
    pub fn render(&mut self) -> Result<(), JsValue> {
        let Some(frame) = self.session.frame() else {
            return Ok(());
        };
        match &self.layer {
            Some(layer) => layer.render(&frame),
            None => Err(JsValue::from_str("No overlay layer attached")),
        }
    }

    /// Forget the analysis and page geometry (new upload)
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.session.reset();
        if let Some(layer) = &self.layer {
            layer.container().set_inner_html("");
        }
    }
}

impl WasmOverlaySession {
    fn from_config(config: &OverlayConfig) -> Self {
        Self {
            session: PageViewSession::with_sink(config, default_sink()),
            layer: None,
        }
    }

    pub fn frame(&mut self) -> Option<OverlayFrame> {
        self.session.frame()
    }
}

/// Millimetre dimension to inches, e.g. `"25.4mm"` -> `1.00"`
#[wasm_bindgen(js_name = convertDimension)]
pub fn convert_dimension(value: &str) -> Option<String> {
    overlay_core::convert_dimension(value)
}
