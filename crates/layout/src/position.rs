//! Placement of a single text field

use crate::validation::{ValidationError, Violations};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TOP_RANGE: (i32, i32) = (0, 1000);
pub const LEFT_RANGE: (i32, i32) = (0, 1000);
pub const FONT_SIZE_RANGE: (i32, i32) = (6, 30);
pub const MAX_HEIGHT_RANGE: (i32, i32) = (10, 100);

/// Horizontal alignment of a field relative to its `Left` offset
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "Left",
            TextAlign::Center => "Center",
            TextAlign::Right => "Right",
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised alignment name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlign(pub String);

impl fmt::Display for UnknownAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown text alignment {:?}", self.0)
    }
}

impl std::error::Error for UnknownAlign {}

impl FromStr for TextAlign {
    type Err = UnknownAlign;

    /// Case-insensitive: `left`, `LEFT` and `Left` are the same
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(TextAlign::Left),
            "center" => Ok(TextAlign::Center),
            "right" => Ok(TextAlign::Right),
            _ => Err(UnknownAlign(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for TextAlign {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Where and how one field is drawn
///
/// `top` and `left` are points from the top-left page corner. `max_height`
/// bounds the vertical extent of the text box; text below it is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutPosition {
    #[serde(default)]
    pub top: i32,

    #[serde(default)]
    pub left: i32,

    #[serde(default = "default_font_size")]
    pub font_size: i32,

    #[serde(default)]
    pub text_align: TextAlign,

    #[serde(rename = "IsBold", default)]
    pub bold: bool,

    #[serde(default = "default_max_height")]
    pub max_height: i32,
}

fn default_font_size() -> i32 {
    10
}

fn default_max_height() -> i32 {
    15
}

impl Default for LayoutPosition {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            font_size: default_font_size(),
            text_align: TextAlign::Left,
            bold: false,
            max_height: default_max_height(),
        }
    }
}

impl LayoutPosition {
    /// Left-aligned, regular weight position with default height
    pub fn at(top: i32, left: i32, font_size: i32) -> Self {
        Self {
            top,
            left,
            font_size,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    pub fn with_max_height(mut self, max_height: i32) -> Self {
        self.max_height = max_height;
        self
    }

    /// Record every out-of-range value into `violations`
    pub fn collect_violations(&self, violations: &mut Violations) {
        violations.check_range("Top", self.top, TOP_RANGE.0, TOP_RANGE.1);
        violations.check_range("Left", self.left, LEFT_RANGE.0, LEFT_RANGE.1);
        violations.check_range(
            "FontSize",
            self.font_size,
            FONT_SIZE_RANGE.0,
            FONT_SIZE_RANGE.1,
        );
        violations.check_range(
            "MaxHeight",
            self.max_height,
            MAX_HEIGHT_RANGE.0,
            MAX_HEIGHT_RANGE.1,
        );
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();
        self.collect_violations(&mut violations);
        violations.into_result()
    }
}

/// Unvalidated position as it arrives from a caller
///
/// Alignment stays a free string so a bad value is reported together
/// with any range violations instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PositionInput {
    #[serde(default)]
    pub top: i64,

    #[serde(default)]
    pub left: i64,

    #[serde(default = "default_font_size_input")]
    pub font_size: i64,

    #[serde(default = "default_align_input")]
    pub text_align: String,

    #[serde(rename = "IsBold", default)]
    pub bold: bool,

    #[serde(default = "default_max_height_input")]
    pub max_height: i64,
}

fn default_font_size_input() -> i64 {
    i64::from(default_font_size())
}

fn default_max_height_input() -> i64 {
    i64::from(default_max_height())
}

fn default_align_input() -> String {
    TextAlign::Left.as_str().to_string()
}

impl Default for PositionInput {
    fn default() -> Self {
        LayoutPosition::default().into()
    }
}

impl From<LayoutPosition> for PositionInput {
    fn from(position: LayoutPosition) -> Self {
        Self {
            top: i64::from(position.top),
            left: i64::from(position.left),
            font_size: i64::from(position.font_size),
            text_align: position.text_align.as_str().to_string(),
            bold: position.bold,
            max_height: i64::from(position.max_height),
        }
    }
}

impl PositionInput {
    /// Validate into a position, adding violations to `violations`
    ///
    /// Returns `None` when anything was rejected.
    pub fn check(&self, violations: &mut Violations) -> Option<LayoutPosition> {
        let before = violations.len();

        let top = range_i32(violations, "Top", self.top, TOP_RANGE);
        let left = range_i32(violations, "Left", self.left, LEFT_RANGE);
        let font_size = range_i32(violations, "FontSize", self.font_size, FONT_SIZE_RANGE);
        let max_height = range_i32(violations, "MaxHeight", self.max_height, MAX_HEIGHT_RANGE);
        let text_align = match self.text_align.parse::<TextAlign>() {
            Ok(align) => Some(align),
            Err(_) => {
                violations.push(
                    "TextAlign",
                    format!("must be Left, Center or Right (got {:?})", self.text_align),
                );
                None
            }
        };

        if violations.len() > before {
            return None;
        }
        Some(LayoutPosition {
            top: top?,
            left: left?,
            font_size: font_size?,
            text_align: text_align?,
            bold: self.bold,
            max_height: max_height?,
        })
    }

    /// Validate a standalone position
    pub fn into_position(self) -> Result<LayoutPosition, ValidationError> {
        let mut violations = Violations::new();
        let position = self.check(&mut violations);
        violations.into_result()?;
        Ok(position.unwrap_or_default())
    }
}

fn range_i32(violations: &mut Violations, field: &str, value: i64, range: (i32, i32)) -> Option<i32> {
    let (min, max) = (i64::from(range.0), i64::from(range.1));
    if value < min || value > max {
        violations.check_range(field, value, min, max);
        None
    } else {
        i32::try_from(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_align_parse_is_case_insensitive() {
        assert_eq!("left".parse::<TextAlign>().unwrap(), TextAlign::Left);
        assert_eq!("CENTER".parse::<TextAlign>().unwrap(), TextAlign::Center);
        assert_eq!(" Right ".parse::<TextAlign>().unwrap(), TextAlign::Right);
        assert!("justify".parse::<TextAlign>().is_err());
    }

    #[test]
    fn test_position_serialized_shape() {
        let position = LayoutPosition::at(400, 500, 10).bold();
        assert_eq!(
            serde_json::to_value(position).unwrap(),
            json!({
                "Top": 400,
                "Left": 500,
                "FontSize": 10,
                "TextAlign": "Left",
                "IsBold": true,
                "MaxHeight": 15
            })
        );
    }

    #[test]
    fn test_position_missing_keys_use_defaults() {
        let position: LayoutPosition =
            serde_json::from_value(json!({ "Top": 12, "TextAlign": "center", "Extra": 1 }))
                .unwrap();
        assert_eq!(
            position,
            LayoutPosition::at(12, 0, 10).aligned(TextAlign::Center)
        );
    }

    #[test]
    fn test_validation_boundaries() {
        assert!(LayoutPosition::at(1000, 0, 6).validate().is_ok());
        assert!(LayoutPosition::at(0, 1000, 30).validate().is_ok());
        assert!(LayoutPosition::at(1001, 0, 10).validate().is_err());
        assert!(LayoutPosition::at(-1, 0, 10).validate().is_err());
        assert!(LayoutPosition::at(0, 0, 5).validate().is_err());
        assert!(LayoutPosition::at(0, 0, 31).validate().is_err());
        assert!(LayoutPosition::at(0, 0, 10).with_max_height(9).validate().is_err());
        assert!(LayoutPosition::at(0, 0, 10).with_max_height(100).validate().is_ok());
        assert!(LayoutPosition::at(0, 0, 10).with_max_height(101).validate().is_err());
    }

    #[test]
    fn test_input_reports_every_violation() {
        let input = PositionInput {
            top: 5000,
            font_size: 2,
            text_align: "justify".to_string(),
            ..PositionInput::default()
        };
        let err = input.into_position().unwrap_err();

        assert_eq!(err.violations().len(), 3);
        assert!(err.mentions("Top"));
        assert!(err.mentions("FontSize"));
        assert!(err.mentions("TextAlign"));
    }

    #[test]
    fn test_input_accepts_lowercase_align() {
        let input: PositionInput =
            serde_json::from_value(json!({ "Top": 20, "Left": 30, "TextAlign": "right" })).unwrap();
        assert_eq!(
            input.into_position().unwrap(),
            LayoutPosition::at(20, 30, 10).aligned(TextAlign::Right)
        );
    }

    #[test]
    fn test_input_rejects_values_beyond_i32() {
        let input = PositionInput {
            left: i64::from(i32::MAX) + 1,
            ..PositionInput::default()
        };
        assert!(input.into_position().unwrap_err().mentions("Left"));
    }
}
