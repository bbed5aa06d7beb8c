//! Bounding-box scan over drawn pixels.
//!
//! The minimal axis-aligned rectangle containing every pixel with non-zero
//! alpha anchors the next result overlay. A blank surface collapses to the
//! canvas center so callers never see an inverted rectangle.

use super::surface::CanvasSurface;

/// Minimal rectangle enclosing all drawn pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// A degenerate box covering a single point
    pub fn point(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Geometric center of the box
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) as f32 / 2.0,
            (self.min_y + self.max_y) as f32 / 2.0,
        )
    }

    /// Box dimensions as (width, height), inclusive of both edges
    pub fn size(&self) -> (u32, u32) {
        (self.max_x - self.min_x + 1, self.max_y - self.min_y + 1)
    }
}

/// Scan the full surface and return the bounding box of drawn pixels.
///
/// Linear in canvas area; run once per recognition call, not per stroke.
/// Returns the canvas center as a single-point box when nothing is drawn.
pub fn drawn_bounds(surface: &CanvasSurface) -> BoundingBox {
    let (width, height) = surface.dimensions();
    let data = surface.data();

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for y in 0..height {
        for x in 0..width {
            let idx = (y as usize * width as usize + x as usize) * 4;
            if data[idx + 3] > 0 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                any = true;
            }
        }
    }

    if !any {
        return BoundingBox::point(width / 2, height / 2);
    }

    BoundingBox {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_blank_surface_collapses_to_center() {
        let surface = CanvasSurface::new(100, 60);
        let bounds = drawn_bounds(&surface);
        assert_eq!(bounds, BoundingBox::point(50, 30));
        assert_eq!(bounds.center(), (50.0, 30.0));
    }

    #[test]
    fn test_single_pixel_box() {
        let mut surface = CanvasSurface::new(100, 60);
        surface.set_pixel(17, 42, WHITE);
        let bounds = drawn_bounds(&surface);
        assert_eq!(bounds, BoundingBox::point(17, 42));
        assert_eq!(bounds.size(), (1, 1));
    }

    #[test]
    fn test_two_pixels_span() {
        let mut surface = CanvasSurface::new(100, 60);
        surface.set_pixel(10, 5, WHITE);
        surface.set_pixel(80, 50, WHITE);
        let bounds = drawn_bounds(&surface);
        assert_eq!(
            bounds,
            BoundingBox {
                min_x: 10,
                min_y: 5,
                max_x: 80,
                max_y: 50,
            }
        );
        assert_eq!(bounds.center(), (45.0, 27.5));
    }

    #[test]
    fn test_faint_alpha_still_counts() {
        let mut surface = CanvasSurface::new(20, 20);
        surface.set_pixel(3, 3, [0, 0, 0, 1]);
        let bounds = drawn_bounds(&surface);
        assert_eq!(bounds, BoundingBox::point(3, 3));
    }

    #[test]
    fn test_never_inverted() {
        let surface = CanvasSurface::new(9, 9);
        let bounds = drawn_bounds(&surface);
        assert!(bounds.min_x <= bounds.max_x);
        assert!(bounds.min_y <= bounds.max_y);
    }
}
