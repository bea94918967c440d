use image::{Rgb, RgbImage};

use crate::error::IdSheetError;

/// Sheet background.
const SHEET_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Grid of identical photos with a uniform margin, outer edges included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Photos per row.
    pub cols: u32,
    /// Photos per column.
    pub rows: u32,
    /// Gap between photos and around the edge, in pixels.
    pub margin_px: u32,
}

impl SheetLayout {
    /// Validated layout; zero columns or rows is rejected.
    pub fn new(cols: u32, rows: u32, margin_px: u32) -> Result<Self, IdSheetError> {
        if cols == 0 || rows == 0 {
            return Err(IdSheetError::InvalidLayoutGrid { cols, rows });
        }
        Ok(Self {
            cols,
            rows,
            margin_px,
        })
    }

    /// Canvas size for photos of `photo_width` × `photo_height`.
    pub fn canvas_size(&self, photo_width: u32, photo_height: u32) -> (u32, u32) {
        (
            photo_width * self.cols + self.margin_px * (self.cols + 1),
            photo_height * self.rows + self.margin_px * (self.rows + 1),
        )
    }

    /// Number of copies on the sheet.
    pub fn copies(&self) -> u32 {
        self.cols * self.rows
    }
}

/// Tile `cols × rows` copies of `photo` onto a white canvas, row by row.
pub fn compose(photo: &RgbImage, layout: &SheetLayout) -> RgbImage {
    let (photo_w, photo_h) = photo.dimensions();
    let (width, height) = layout.canvas_size(photo_w, photo_h);
    let mut sheet = RgbImage::from_pixel(width, height, SHEET_BACKGROUND);

    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let x = layout.margin_px + col * (photo_w + layout.margin_px);
            let y = layout.margin_px + row * (photo_h + layout.margin_px);
            image::imageops::replace(&mut sheet, photo, x as i64, y as i64);
        }
    }

    sheet
}
