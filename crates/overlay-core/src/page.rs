//! Intrinsic page sizes read from the PDF
//!
//! Absolute boxes are scaled against the page's MediaBox, so the viewport
//! needs the original width and height of every page.

use crate::coords::ViewportGeometry;
use crate::error::OverlayError;
use serde::{Deserialize, Serialize};

/// US Letter in points, used when no MediaBox is found
pub const LETTER_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page tree nodes may inherit MediaBox; stop following Parent links after this many hops
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page metadata for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Page width in PDF points (1 point = 1/72 inch)
    pub width: f64,
    /// Page height in PDF points
    pub height: f64,
    /// X offset (usually 0)
    pub x: f64,
    /// Y offset (usually 0)
    pub y: f64,
}

impl PageMetadata {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Calculate scaled dimensions given a target width
    pub fn scale_to_width(&self, target_width: f64) -> ScaledDimensions {
        let scale = target_width / self.width;
        ScaledDimensions {
            width: target_width,
            height: self.height * scale,
            scale,
        }
    }

    /// Calculate scaled dimensions given a target height
    pub fn scale_to_height(&self, target_height: f64) -> ScaledDimensions {
        let scale = target_height / self.height;
        ScaledDimensions {
            width: self.width * scale,
            height: target_height,
            scale,
        }
    }

    /// Viewport geometry for this page rendered at the given pixel size
    pub fn viewport_at(&self, rendered_width: f64, rendered_height: f64) -> ViewportGeometry {
        ViewportGeometry::new(rendered_width, rendered_height, self.width, self.height)
    }
}

/// Scaled dimensions with scale factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledDimensions {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl ScaledDimensions {
    pub fn viewport_for(&self, page: &PageMetadata) -> ViewportGeometry {
        page.viewport_at(self.width, self.height)
    }
}

pub struct PageSizeReader {
    doc: lopdf::Document,
}

impl PageSizeReader {
    pub fn load(data: &[u8]) -> Result<Self, OverlayError> {
        let doc =
            lopdf::Document::load_mem(data).map_err(|e| OverlayError::ParseError(e.to_string()))?;
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Metadata for a specific page (1-indexed)
    pub fn page_metadata(&self, page_num: u32) -> Result<PageMetadata, OverlayError> {
        let page_id = self
            .doc
            .get_pages()
            .get(&page_num)
            .copied()
            .ok_or(OverlayError::PageNotFound(page_num))?;

        let page_dict = self
            .doc
            .get_object(page_id)
            .and_then(|page| page.as_dict())
            .map_err(|e| OverlayError::ParseError(format!("page {}: {}", page_num, e)))?;

        let media_box = self.media_box(page_dict)?;
        tracing::debug!(page = page_num, ?media_box, "page size resolved");

        Ok(PageMetadata {
            page_num,
            x: media_box[0],
            y: media_box[1],
            width: media_box[2],
            height: media_box[3],
        })
    }

    pub fn all_page_metadata(&self) -> Result<Vec<PageMetadata>, OverlayError> {
        (1..=self.page_count())
            .map(|page_num| self.page_metadata(page_num))
            .collect()
    }

    /// MediaBox of the page, or of the nearest ancestor that declares one
    fn media_box(&self, page_dict: &lopdf::Dictionary) -> Result<[f64; 4], OverlayError> {
        let mut node = page_dict;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(media_box) = node.get(b"MediaBox") {
                return self.parse_rect(media_box);
            }

            let parent = node
                .get(b"Parent")
                .and_then(|parent| parent.as_reference())
                .and_then(|parent_id| self.doc.get_object(parent_id))
                .and_then(|parent| parent.as_dict());
            match parent {
                Ok(parent) => node = parent,
                Err(_) => break,
            }
        }

        tracing::debug!("no MediaBox in page tree, defaulting to US Letter");
        Ok(LETTER_MEDIA_BOX)
    }

    /// Parse a PDF rectangle array into [x, y, width, height]
    fn parse_rect(&self, obj: &lopdf::Object) -> Result<[f64; 4], OverlayError> {
        let arr = match obj {
            lopdf::Object::Array(a) => a,
            lopdf::Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(|resolved| resolved.as_array())
                .map_err(|e| OverlayError::MediaBox(format!("unresolvable reference: {}", e)))?,
            _ => return Err(OverlayError::MediaBox("not an array".to_string())),
        };

        if arr.len() != 4 {
            return Err(OverlayError::MediaBox(format!(
                "{} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (value, obj) in values.iter_mut().zip(arr) {
            *value = self.extract_number(obj)?;
        }

        // [x1, y1, x2, y2] -> [x, y, width, height]; corners may come in any order
        let x = values[0].min(values[2]);
        let y = values[1].min(values[3]);
        Ok([
            x,
            y,
            (values[2] - values[0]).abs(),
            (values[3] - values[1]).abs(),
        ])
    }

    fn extract_number(&self, obj: &lopdf::Object) -> Result<f64, OverlayError> {
        match obj {
            lopdf::Object::Integer(i) => Ok(*i as f64),
            lopdf::Object::Real(r) => Ok(*r as f64),
            lopdf::Object::Reference(id) => {
                let resolved = self
                    .doc
                    .get_object(*id)
                    .map_err(|e| OverlayError::MediaBox(format!("unresolvable number: {}", e)))?;
                self.extract_number(resolved)
            }
            _ => Err(OverlayError::MediaBox(
                "expected number in rectangle".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    /// Page 1 declares Letter, page 2 declares A4, page 3 inherits from the Pages node
    fn create_test_pdf(pages_media_box: Option<Vec<Object>>) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let page1_id = doc.new_object_id();
        let page2_id = doc.new_object_id();
        let page3_id = doc.new_object_id();

        let page1 = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(page1_id, Object::Dictionary(page1));

        let page2 = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(page2_id, Object::Dictionary(page2));

        let page3 = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        doc.objects.insert(page3_id, Object::Dictionary(page3));

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page1_id.into(), page2_id.into(), page3_id.into()],
            "Count" => 3,
        };
        if let Some(media_box) = pages_media_box {
            pages.set("MediaBox", media_box);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_reads_page_media_boxes() {
        let reader = PageSizeReader::load(&create_test_pdf(None)).unwrap();
        assert_eq!(reader.page_count(), 3);

        let letter = reader.page_metadata(1).unwrap();
        assert_eq!((letter.width, letter.height), (612.0, 792.0));

        let a4 = reader.page_metadata(2).unwrap();
        assert_eq!((a4.width, a4.height), (595.0, 842.0));
    }

    #[test]
    fn test_media_box_inherited_from_parent() {
        let tabloid = vec![0.into(), 0.into(), 792.into(), 1224.into()];
        let reader = PageSizeReader::load(&create_test_pdf(Some(tabloid))).unwrap();
        let page = reader.page_metadata(3).unwrap();
        assert_eq!((page.width, page.height), (792.0, 1224.0));
    }

    #[test]
    fn test_missing_media_box_defaults_to_letter() {
        let reader = PageSizeReader::load(&create_test_pdf(None)).unwrap();
        let page = reader.page_metadata(3).unwrap();
        assert_eq!(
            [page.x, page.y, page.width, page.height],
            LETTER_MEDIA_BOX
        );
    }

    #[test]
    fn test_all_page_metadata() {
        let reader = PageSizeReader::load(&create_test_pdf(None)).unwrap();
        let pages = reader.all_page_metadata().unwrap();
        let numbers: Vec<_> = pages.iter().map(|p| p.page_num).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_page_not_found() {
        let reader = PageSizeReader::load(&create_test_pdf(None)).unwrap();
        assert!(matches!(
            reader.page_metadata(9),
            Err(OverlayError::PageNotFound(9))
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            PageSizeReader::load(b"not a pdf"),
            Err(OverlayError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_rect_offset_and_reversed_corners() {
        let reader = PageSizeReader::load(&create_test_pdf(None)).unwrap();
        let rect = Object::Array(vec![
            Object::Integer(612),
            Object::Integer(792),
            Object::Integer(0),
            Object::Real(0.0),
        ]);
        assert_eq!(reader.parse_rect(&rect).unwrap(), [0.0, 0.0, 612.0, 792.0]);

        let short = Object::Array(vec![Object::Integer(0), Object::Integer(0)]);
        assert!(matches!(
            reader.parse_rect(&short),
            Err(OverlayError::MediaBox(_))
        ));
    }

    #[test]
    fn test_scale_to_width() {
        let metadata = PageMetadata {
            page_num: 1,
            width: 612.0,
            height: 792.0,
            x: 0.0,
            y: 0.0,
        };

        let scaled = metadata.scale_to_width(800.0);
        assert_eq!(scaled.width, 800.0);
        assert!((scaled.height - 1035.29).abs() < 0.01);
        assert!((scaled.scale - 1.307).abs() < 0.001);

        let geometry = scaled.viewport_for(&metadata);
        assert_eq!(geometry.original_height, 792.0);
        assert_eq!(geometry.rendered_width, 800.0);
    }

    #[test]
    fn test_scale_to_height() {
        let metadata = PageMetadata {
            page_num: 1,
            width: 612.0,
            height: 792.0,
            x: 0.0,
            y: 0.0,
        };

        let scaled = metadata.scale_to_height(1000.0);
        assert!((scaled.width - 772.73).abs() < 0.01);
        assert_eq!(scaled.height, 1000.0);
        assert!((metadata.aspect_ratio() - 0.7727).abs() < 0.001);
    }
}
