//! DOM rendering of overlay frames
//!
//! The `DomOverlayLayer` owns an absolutely-positioned container stacked on top
//! of the page canvas and redraws one `div` per overlay box from each frame.

use overlay_core::{ElementCategory, OverlayBox, OverlayFrame, ScreenRect, ToggleControl, Tooltip};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

pub const CONTAINER_CLASS: &str = "overlay-container";

/// Class list for one overlay box
pub fn box_class_name(overlay: &OverlayBox) -> String {
    let mut class = format!("overlay-box {}", category_class(overlay.category));
    if overlay.out_of_bounds {
        class.push_str(" overlay-box--out-of-bounds");
    }
    class
}

pub fn category_class(category: ElementCategory) -> String {
    format!("overlay-box--{}", category.payload_key().replace('_', "-"))
}

/// Hover text: original value, then the converted/translated value when it differs
pub fn tooltip_text(tooltip: &Tooltip) -> String {
    if tooltip.original.trim() == tooltip.display.trim() {
        tooltip.display.clone()
    } else {
        format!("{}\n{}", tooltip.original, tooltip.display)
    }
}

/// CSS `left`/`top`/`width`/`height` for a rectangle
pub fn rect_style(rect: &ScreenRect) -> [(&'static str, String); 4] {
    [
        ("left", format!("{}px", rect.left)),
        ("top", format!("{}px", rect.top)),
        ("width", format!("{}px", rect.width)),
        ("height", format!("{}px", rect.height)),
    ]
}

pub struct DomOverlayLayer {
    document: Document,
    container: Element,
    page_num: u32,
}

impl DomOverlayLayer {
    /// Create the overlay container for a page
    ///
    /// # Errors
    /// Returns JsValue error if unable to access the document or create the element
    pub fn new(page_num: u32) -> Result<Self, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;

        let container = document.create_element("div")?;
        container.set_class_name(CONTAINER_CLASS);
        container.set_id(&format!("overlay-page-{}", page_num));

        if let Some(html_element) = container.dyn_ref::<HtmlElement>() {
            let style = html_element.style();
            style.set_property("position", "absolute")?;
            style.set_property("top", "0")?;
            style.set_property("left", "0")?;
            style.set_property("width", "100%")?;
            style.set_property("height", "100%")?;
            style.set_property("pointer-events", "none")?;
        }

        Ok(Self {
            document,
            container,
            page_num,
        })
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn container(&self) -> &Element {
        &self.container
    }

    /// Stack the container on top of `page_element`
    pub fn attach(&self, page_element: &Element) -> Result<(), JsValue> {
        page_element.append_child(&self.container)?;
        Ok(())
    }

    pub fn detach(&self) {
        self.container.remove();
    }

    /// Replace the container's contents with `frame`
    pub fn render(&self, frame: &OverlayFrame) -> Result<(), JsValue> {
        self.container.set_inner_html("");
        self.container
            .set_attribute("data-generation", &frame.generation.to_string())?;

        for overlay in &frame.boxes {
            let element = self.create_box(overlay)?;
            self.container.append_child(&element)?;
        }

        let toggle = self.create_toggle(&frame.toggle)?;
        self.container.append_child(&toggle)?;
        Ok(())
    }

    fn create_box(&self, overlay: &OverlayBox) -> Result<Element, JsValue> {
        let element = self.document.create_element("div")?;
        element.set_class_name(&box_class_name(overlay));
        element.set_attribute("title", &tooltip_text(&overlay.tooltip))?;
        element.set_attribute("data-category", overlay.category.payload_key())?;
        element.set_text_content(Some(&overlay.text));

        if let Some(html_element) = element.dyn_ref::<HtmlElement>() {
            let style = html_element.style();
            style.set_property("position", "absolute")?;
            for (property, value) in rect_style(&overlay.rect) {
                style.set_property(property, &value)?;
            }
            style.set_property("pointer-events", "auto")?;
        }

        Ok(element)
    }

    fn create_toggle(&self, toggle: &ToggleControl) -> Result<Element, JsValue> {
        let button = self.document.create_element("button")?;
        button.set_class_name("overlay-toggle");
        button.set_attribute("type", "button")?;
        button.set_attribute("aria-pressed", if toggle.pressed { "true" } else { "false" })?;
        button.set_text_content(Some(&toggle.label));

        if let Some(html_element) = button.dyn_ref::<HtmlElement>() {
            let style = html_element.style();
            style.set_property("position", "absolute")?;
            style.set_property("top", "8px")?;
            style.set_property("right", "8px")?;
            style.set_property("pointer-events", "auto")?;
        }

        Ok(button)
    }
}
