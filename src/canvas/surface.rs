//! The persistent RGBA drawing surface.
//!
//! Strokes accumulate on the surface until a recognition call or reset clears
//! it. Pixels start fully transparent; the bounding-box scan treats any
//! non-zero alpha as "drawn".

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Cursor;

use super::font::{glyph, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

/// MIME prefix of an encoded PNG snapshot.
pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A drawing surface backed by a raw RGBA pixel buffer
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    /// Raw RGBA pixel data, row-major
    data: Vec<u8>,
    /// Surface width in pixels
    width: u32,
    /// Surface height in pixels
    height: u32,
}

impl CanvasSurface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    /// Surface dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Clear every pixel back to transparent
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Set a single pixel, ignoring out-of-bounds coordinates
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx..idx + 4].copy_from_slice(&color);
    }

    /// Alpha channel value at a pixel, or 0 when out of bounds
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.data[idx + 3]
    }

    /// Whether no pixel has been drawn
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Draw a stroke segment between two points with the given thickness.
    ///
    /// Walks the segment with Bresenham and stamps a filled disc at each step
    /// so consecutive pointer-move segments join without gaps.
    pub fn draw_line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgba, thickness: u32) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp_disc(x0, y0, color, thickness);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Fill a disc of the given diameter centered on (cx, cy)
    fn stamp_disc(&mut self, cx: i64, cy: i64, color: Rgba, diameter: u32) {
        let r = (diameter.max(1) / 2) as i64;
        let r2 = r * r;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Stamp text centered on (cx, cy) using the built-in 5x7 glyphs.
    ///
    /// Used by the transcription path, which replaces the current drawing with
    /// the spoken phrase the same way the pointer strokes would have.
    pub fn draw_text(&mut self, text: &str, cx: i64, cy: i64, scale: u32, color: Rgba) {
        let scale = scale.max(1) as i64;
        let advance = GLYPH_ADVANCE as i64 * scale;
        let total_width = text.chars().count() as i64 * advance;
        let mut pen_x = cx - total_width / 2;
        let top = cy - (GLYPH_HEIGHT as i64 * scale) / 2;

        for c in text.chars() {
            if let Some(rows) = glyph(c) {
                for (row, &bits) in rows.iter().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        if bits & (1u8 << (GLYPH_WIDTH - 1 - col)) != 0 {
                            // scale each cell to a scale x scale block
                            for sy in 0..scale {
                                for sx in 0..scale {
                                    self.set_pixel(
                                        pen_x + col as i64 * scale + sx,
                                        top + row as i64 * scale + sy,
                                        color,
                                    );
                                }
                            }
                        }
                    }
                }
            }
            pen_x += advance;
        }
    }

    /// Encode the surface as a PNG
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .context("Pixel buffer does not match surface dimensions")?;
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png)
            .context("Failed to encode PNG snapshot")?;
        Ok(buf.into_inner())
    }

    /// Encode the surface as a `data:image/png;base64,` URI
    pub fn to_data_uri(&self) -> Result<String> {
        let png = self.encode_png()?;
        Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(png)))
    }
}

/// Strip the data-URI prefix from a snapshot, returning the bare base64
/// payload. Falls back to splitting at the first comma for other image MIME
/// types, and passes bare payloads through untouched.
pub fn strip_data_uri(image: &str) -> &str {
    if let Some(payload) = image.strip_prefix(DATA_URI_PREFIX) {
        return payload;
    }
    match image.split_once(',') {
        Some((head, payload)) if head.starts_with("data:") => payload,
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba = [255, 255, 255, 255];

    #[test]
    fn test_new_surface_is_blank() {
        let surface = CanvasSurface::new(16, 16);
        assert!(surface.is_blank());
        assert_eq!(surface.dimensions(), (16, 16));
    }

    #[test]
    fn test_set_pixel_and_alpha() {
        let mut surface = CanvasSurface::new(8, 8);
        surface.set_pixel(3, 5, WHITE);
        assert_eq!(surface.alpha_at(3, 5), 255);
        assert_eq!(surface.alpha_at(0, 0), 0);
        assert!(!surface.is_blank());
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut surface = CanvasSurface::new(8, 8);
        surface.set_pixel(-1, 0, WHITE);
        surface.set_pixel(8, 8, WHITE);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_clear_resets_all_pixels() {
        let mut surface = CanvasSurface::new(8, 8);
        surface.draw_line((0, 0), (7, 7), WHITE, 3);
        assert!(!surface.is_blank());
        surface.clear();
        assert!(surface.is_blank());
    }

    #[test]
    fn test_draw_line_covers_endpoints() {
        let mut surface = CanvasSurface::new(32, 32);
        surface.draw_line((2, 2), (20, 11), WHITE, 1);
        assert_eq!(surface.alpha_at(2, 2), 255);
        assert_eq!(surface.alpha_at(20, 11), 255);
    }

    #[test]
    fn test_draw_text_leaves_opaque_pixels() {
        let mut surface = CanvasSurface::new(64, 64);
        surface.draw_text("2+2", 32, 32, 2, WHITE);
        assert!(!surface.is_blank());
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let mut surface = CanvasSurface::new(4, 4);
        surface.set_pixel(1, 1, WHITE);

        let uri = surface.to_data_uri().unwrap();
        assert!(uri.starts_with(DATA_URI_PREFIX));

        // Stripping the prefix must yield exactly the payload the gateway
        // forwards to the model.
        let payload = strip_data_uri(&uri);
        let decoded = STANDARD.decode(payload).unwrap();
        assert_eq!(decoded, surface.encode_png().unwrap());
    }

    #[test]
    fn test_strip_data_uri_passthrough() {
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("data:image/jpeg;base64,BBBB"), "BBBB");
    }
}
