//! Document presets and request options.

use std::fmt;
use std::str::FromStr;

use image::Rgb;
use serde::Deserialize;

use crate::crop::{mm_to_px, TargetSpec};
use crate::error::IdSheetError;
use crate::sheet::SheetLayout;

/// Gap between photos and around the sheet edge.
const SHEET_MARGIN_MM: f64 = 3.0;

/// Identity document the photo is made for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentType {
    /// National identity card.
    #[default]
    Cin,
    /// Passport.
    Passport,
    /// Visa application.
    Visa,
    /// Driving licence.
    Permis,
}

impl DocumentType {
    /// Physical photo size as `(width_mm, height_mm)`.
    pub fn size_mm(&self) -> (f64, f64) {
        match self {
            DocumentType::Cin
            | DocumentType::Passport
            | DocumentType::Visa
            | DocumentType::Permis => (35.0, 45.0),
        }
    }

    /// Pixel target for this document at `dpi`.
    pub fn target(&self, dpi: Dpi) -> TargetSpec {
        let (w, h) = self.size_mm();
        TargetSpec::from_mm(w, h, dpi.value())
    }

    /// Lowercase name used in options and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cin => "cin",
            DocumentType::Passport => "passport",
            DocumentType::Visa => "visa",
            DocumentType::Permis => "permis",
        }
    }
}

impl FromStr for DocumentType {
    type Err = IdSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cin" => Ok(DocumentType::Cin),
            "passport" => Ok(DocumentType::Passport),
            "visa" => Ok(DocumentType::Visa),
            "permis" => Ok(DocumentType::Permis),
            _ => Err(IdSheetError::UnsupportedDocument(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Print resolution. Only 150, 300 and 600 dpi are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dpi(u32);

impl Dpi {
    /// 150 dpi, for previews.
    pub const LOW: Dpi = Dpi(150);
    /// 300 dpi, the usual photo-lab resolution.
    pub const STANDARD: Dpi = Dpi(300);
    /// 600 dpi.
    pub const HIGH: Dpi = Dpi(600);

    /// Validate a raw dpi value.
    pub fn new(value: u32) -> Result<Self, IdSheetError> {
        match value {
            150 | 300 | 600 => Ok(Dpi(value)),
            other => Err(IdSheetError::UnsupportedDpi(other)),
        }
    }

    /// Dots per inch.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Dpi::STANDARD
    }
}

/// Solid color the cutout is flattened onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackgroundColor {
    /// Light gray, `#D2D2D2`.
    #[default]
    Gray,
    /// Pure white.
    White,
    /// Light blue, `#ADD8E6`.
    Blue,
}

impl BackgroundColor {
    /// Fill color.
    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            BackgroundColor::Gray => Rgb([210, 210, 210]),
            BackgroundColor::White => Rgb([255, 255, 255]),
            BackgroundColor::Blue => Rgb([173, 216, 230]),
        }
    }
}

impl FromStr for BackgroundColor {
    type Err = IdSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gray" => Ok(BackgroundColor::Gray),
            "white" => Ok(BackgroundColor::White),
            "blue" => Ok(BackgroundColor::Blue),
            _ => Err(IdSheetError::UnsupportedBackground(s.to_string())),
        }
    }
}

/// Supported sheet grids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutPreset {
    /// 4 columns × 2 rows.
    #[default]
    FourByTwo,
    /// 3 × 3.
    ThreeByThree,
    /// 2 × 2.
    TwoByTwo,
}

impl LayoutPreset {
    /// `(cols, rows)`.
    pub fn grid(&self) -> (u32, u32) {
        match self {
            LayoutPreset::FourByTwo => (4, 2),
            LayoutPreset::ThreeByThree => (3, 3),
            LayoutPreset::TwoByTwo => (2, 2),
        }
    }

    /// Layout with a 3 mm margin at `dpi`.
    pub fn layout(&self, dpi: Dpi) -> SheetLayout {
        let (cols, rows) = self.grid();
        SheetLayout {
            cols,
            rows,
            margin_px: mm_to_px(SHEET_MARGIN_MM, dpi.value()),
        }
    }

    /// Name as `COLSxROWS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutPreset::FourByTwo => "4x2",
            LayoutPreset::ThreeByThree => "3x3",
            LayoutPreset::TwoByTwo => "2x2",
        }
    }
}

impl FromStr for LayoutPreset {
    type Err = IdSheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4x2" => Ok(LayoutPreset::FourByTwo),
            "3x3" => Ok(LayoutPreset::ThreeByThree),
            "2x2" => Ok(LayoutPreset::TwoByTwo),
            _ => Err(IdSheetError::UnsupportedLayout(s.to_string())),
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request options as they arrive from a form or JSON body.
///
/// All fields are optional; missing ones keep the request defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetOptions {
    /// `cin`, `passport`, `visa` or `permis`.
    pub doc_type: Option<String>,
    /// `gray`, `white` or `blue`.
    pub bg_color: Option<String>,
    /// `4x2`, `3x3` or `2x2`.
    pub layout: Option<String>,
    /// 150, 300 or 600.
    pub dpi: Option<u32>,
    /// Strictly positive framing zoom.
    pub zoom: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_document_is_35_by_45() {
        for doc in ["cin", "passport", "visa", "permis"] {
            let doc: DocumentType = doc.parse().unwrap();
            assert_eq!(
                doc.target(Dpi::STANDARD),
                TargetSpec {
                    width_px: 413,
                    height_px: 531
                }
            );
        }
    }

    #[test]
    fn unknown_values_are_validation_errors() {
        let err = "driver".parse::<DocumentType>().unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_DOCUMENT");
        assert!("5x5".parse::<LayoutPreset>().is_err());
        assert!("green".parse::<BackgroundColor>().is_err());
        assert!(matches!(Dpi::new(72), Err(IdSheetError::UnsupportedDpi(72))));
    }

    #[test]
    fn margin_scales_with_dpi() {
        assert_eq!(LayoutPreset::FourByTwo.layout(Dpi::LOW).margin_px, 17);
        assert_eq!(LayoutPreset::FourByTwo.layout(Dpi::STANDARD).margin_px, 35);
        assert_eq!(LayoutPreset::ThreeByThree.layout(Dpi::HIGH).margin_px, 70);
    }

    #[test]
    fn layout_names_round_trip() {
        for name in ["4x2", "3x3", "2x2"] {
            assert_eq!(name.parse::<LayoutPreset>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let opts: SheetOptions =
            serde_json::from_str(r#"{"docType":"visa","bgColor":"blue","dpi":600}"#).unwrap();
        assert_eq!(opts.doc_type.as_deref(), Some("visa"));
        assert_eq!(opts.bg_color.as_deref(), Some("blue"));
        assert_eq!(opts.dpi, Some(600));
        assert!(opts.layout.is_none());
        assert!(opts.zoom.is_none());
    }
}
