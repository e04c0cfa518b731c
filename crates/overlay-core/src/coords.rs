//! Coordinate model for document-relative boxes and viewport geometry
//!
//! Boxes come from the analysis backend with each edge as a string that may be
//! a decimal or a placeholder such as `"unknown"`. They are only usable once all
//! four edges parse, see [`DocumentBox::parse`].

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which coordinate system the upstream boxes are expressed in.
///
/// This is a deployment-wide decision, never a per-element one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateConvention {
    /// Edges in `[0, 1]`, origin at the top-left of the page, Y grows downward
    #[default]
    Normalized,
    /// Edges in document units, origin at the bottom-left, Y grows upward
    AbsoluteBottomOrigin,
}

impl CoordinateConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateConvention::Normalized => "normalized",
            CoordinateConvention::AbsoluteBottomOrigin => "absolute_bottom_origin",
        }
    }
}

impl FromStr for CoordinateConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "normalized" | "normalised" => Ok(CoordinateConvention::Normalized),
            "absolute" | "absolute_bottom_origin" | "bottom_origin" | "pdf" => {
                Ok(CoordinateConvention::AbsoluteBottomOrigin)
            }
            other => Err(format!("Unknown coordinate convention: {}", other)),
        }
    }
}

impl fmt::Display for CoordinateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the four edges of a [`DocumentBox`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    LeftX,
    RightX,
    LowerY,
    UpperY,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::LeftX => "left_x",
            Edge::RightX => "right_x",
            Edge::LowerY => "lower_y",
            Edge::UpperY => "upper_y",
        };
        f.write_str(name)
    }
}

/// Why a box could not be placed on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidBox {
    /// An edge is not a finite number
    Edge { edge: Edge, raw: String },
    /// The viewport cannot be used as a scale basis (zero, negative or non-finite size)
    Geometry,
}

impl fmt::Display for InvalidBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidBox::Edge { edge, raw } => write!(f, "{} is not numeric: '{}'", edge, raw),
            InvalidBox::Geometry => write!(f, "viewport geometry is not usable"),
        }
    }
}

impl std::error::Error for InvalidBox {}

const UNKNOWN_EDGE: &str = "unknown";

/// A bounding region in document-relative units, edges kept as supplied
///
/// Decoding never fails: a coordinate that is null or not an object becomes
/// [`DocumentBox::default`], which is never placeable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "WireCoordinate")]
pub struct DocumentBox {
    pub left_x: String,
    pub right_x: String,
    pub lower_y: String,
    pub upper_y: String,
}

impl DocumentBox {
    pub fn new(
        left_x: impl Into<String>,
        right_x: impl Into<String>,
        lower_y: impl Into<String>,
        upper_y: impl Into<String>,
    ) -> Self {
        Self {
            left_x: left_x.into(),
            right_x: right_x.into(),
            lower_y: lower_y.into(),
            upper_y: upper_y.into(),
        }
    }

    /// Build a box from already-numeric edges
    pub fn from_edges(left_x: f64, right_x: f64, lower_y: f64, upper_y: f64) -> Self {
        Self::new(
            left_x.to_string(),
            right_x.to_string(),
            lower_y.to_string(),
            upper_y.to_string(),
        )
    }

    /// Parse all four edges, failing on the first one that is not a finite number
    pub fn parse(&self) -> Result<ParsedBox, InvalidBox> {
        Ok(ParsedBox {
            left_x: parse_edge(Edge::LeftX, &self.left_x)?,
            right_x: parse_edge(Edge::RightX, &self.right_x)?,
            lower_y: parse_edge(Edge::LowerY, &self.lower_y)?,
            upper_y: parse_edge(Edge::UpperY, &self.upper_y)?,
        })
    }

    pub fn is_parseable(&self) -> bool {
        self.parse().is_ok()
    }
}

impl Default for DocumentBox {
    fn default() -> Self {
        Self::new(UNKNOWN_EDGE, UNKNOWN_EDGE, UNKNOWN_EDGE, UNKNOWN_EDGE)
    }
}

fn parse_edge(edge: Edge, raw: &str) -> Result<f64, InvalidBox> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InvalidBox::Edge {
            edge,
            raw: raw.to_string(),
        }),
    }
}

/// A [`DocumentBox`] whose edges all parsed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedBox {
    pub left_x: f64,
    pub right_x: f64,
    pub lower_y: f64,
    pub upper_y: f64,
}

// Wire shape: {"x": {"left_x", "right_x"}, "y": {"lower_y", "upper_y"}}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireCoordinate {
    #[serde(default, deserialize_with = "lenient_or_default")]
    x: WireHorizontal,
    #[serde(default, deserialize_with = "lenient_or_default")]
    y: WireVertical,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireHorizontal {
    #[serde(default, deserialize_with = "deserialize_scalar_text")]
    left_x: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar_text")]
    right_x: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireVertical {
    #[serde(default, deserialize_with = "deserialize_scalar_text")]
    lower_y: Option<String>,
    #[serde(default, deserialize_with = "deserialize_scalar_text")]
    upper_y: Option<String>,
}

/// A value of type `T`, or whatever else the backend put in its place
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Lenient<T> {
    Value(T),
    Malformed(IgnoredAny),
}

impl<T> Lenient<T> {
    pub(crate) fn into_option(self) -> Option<T> {
        match self {
            Lenient::Value(value) => Some(value),
            Lenient::Malformed(_) => None,
        }
    }
}

/// Field decoder that turns null or a wrongly-shaped value into `T::default()`
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Lenient::<T>::deserialize(deserializer)?;
    Ok(value.into_option().unwrap_or_default())
}

/// Edges and element text are usually strings, but the model sometimes emits
/// bare numbers, null or nested values
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(f64),
    Malformed(IgnoredAny),
}

/// Strings as-is, numbers in decimal form, `None` for null or anything non-scalar
pub(crate) fn deserialize_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawScalar> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|scalar| match scalar {
        RawScalar::Text(text) => Some(text),
        RawScalar::Number(number) => Some(number.to_string()),
        RawScalar::Malformed(_) => None,
    }))
}

impl<'de> Deserialize<'de> for DocumentBox {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = Lenient::<WireCoordinate>::deserialize(deserializer)?;
        Ok(wire.into_option().unwrap_or_default().into())
    }
}

impl From<WireCoordinate> for DocumentBox {
    fn from(wire: WireCoordinate) -> Self {
        let edge = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN_EDGE.to_string());
        Self {
            left_x: edge(wire.x.left_x),
            right_x: edge(wire.x.right_x),
            lower_y: edge(wire.y.lower_y),
            upper_y: edge(wire.y.upper_y),
        }
    }
}

impl From<DocumentBox> for WireCoordinate {
    fn from(doc_box: DocumentBox) -> Self {
        Self {
            x: WireHorizontal {
                left_x: Some(doc_box.left_x),
                right_x: Some(doc_box.right_x),
            },
            y: WireVertical {
                lower_y: Some(doc_box.lower_y),
                upper_y: Some(doc_box.upper_y),
            },
        }
    }
}

/// Current rendering state of one page
///
/// Recreated on every render; never keep one across render cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportGeometry {
    /// On-screen width in pixels
    pub rendered_width: f64,
    /// On-screen height in pixels
    pub rendered_height: f64,
    /// Intrinsic page width in document units
    pub original_width: f64,
    /// Intrinsic page height in document units
    pub original_height: f64,
}

impl ViewportGeometry {
    pub fn new(
        rendered_width: f64,
        rendered_height: f64,
        original_width: f64,
        original_height: f64,
    ) -> Self {
        Self {
            rendered_width,
            rendered_height,
            original_width,
            original_height,
        }
    }

    pub fn scale_x(&self) -> f64 {
        self.rendered_width / self.original_width
    }

    pub fn scale_y(&self) -> f64 {
        self.rendered_height / self.original_height
    }

    /// Whether this geometry can scale boxes of the given convention
    ///
    /// Normalized boxes only need the rendered size; absolute boxes also need
    /// the original page size.
    pub fn is_usable_for(&self, convention: CoordinateConvention) -> bool {
        let rendered = is_positive(self.rendered_width) && is_positive(self.rendered_height);
        match convention {
            CoordinateConvention::Normalized => rendered,
            CoordinateConvention::AbsoluteBottomOrigin => {
                rendered && is_positive(self.original_width) && is_positive(self.original_height)
            }
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// A rectangle in on-screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Numeric edges survive the string representation unchanged
        #[test]
        fn numeric_edges_parse_back(
            left in -1000.0f64..1000.0,
            right in -1000.0f64..1000.0,
            lower in -1000.0f64..1000.0,
            upper in -1000.0f64..1000.0,
        ) {
            let parsed = DocumentBox::from_edges(left, right, lower, upper).parse().unwrap();
            prop_assert_eq!(parsed, ParsedBox { left_x: left, right_x: right, lower_y: lower, upper_y: upper });
        }
    }
}
