//! RGBA pixel grids for the track border and car sprites, and the pixel masks derived from them.

use crate::{geometry::Point, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single pixel. Field names serialize as `R`, `G`, `B`, `A`, which is how track configs spell
/// the transparent pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
    #[serde(rename = "A")]
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether a sprite mask would count this pixel as solid
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.a > MASK_ALPHA_THRESHOLD
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

const MASK_ALPHA_THRESHOLD: u8 = 127;

#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Build from tightly packed rgba8 rows
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let want = width as usize * height as usize * 4;
        if bytes.len() != want {
            return Err(Error::Config(format!(
                "bitmap of {width}x{height} needs {want} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Self {
            width,
            height,
            pixels: bytes
                .chunks_exact(4)
                .map(|px| Rgba::new(px[0], px[1], px[2], px[3]))
                .collect(),
        })
    }

    /// Decode an image file. Images are used at their native size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| Error::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba8(width, height, img.as_raw())
    }

    /// A border with an elliptical ring of open track, `thickness` pixels wide, inset a few
    /// pixels from the bitmap edges. Everything else is wall.
    pub fn oval_track(width: u32, height: u32, thickness: u32, open: Rgba, wall: Rgba) -> Self {
        const INSET: f64 = 4.;
        let mut bitmap = Self::new(width, height, wall);
        let (cx, cy) = (width as f64 / 2., height as f64 / 2.);
        let (outer_x, outer_y) = (cx - INSET, cy - INSET);
        let (inner_x, inner_y) = (outer_x - thickness as f64, outer_y - thickness as f64);

        let inside = |rx: f64, ry: f64, dx: f64, dy: f64| {
            rx > 0. && ry > 0. && (dx / rx).powi(2) + (dy / ry).powi(2) <= 1.
        };

        for y in 0..height {
            for x in 0..width {
                let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
                if inside(outer_x, outer_y, dx, dy) && !inside(inner_x, inner_y, dx, dy) {
                    bitmap.set(x, y, open);
                }
            }
        }
        bitmap
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel at `(x, y)`, or None if it falls outside the bitmap
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Overwrite a pixel. Panics if `(x, y)` is out of bounds
    pub fn set(&mut self, x: u32, y: u32, px: Rgba) {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside bitmap");
        self.pixels[y as usize * self.width as usize + x as usize] = px;
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }
}

/// One bit per pixel, set where something solid is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    pub fn from_bitmap(bitmap: &Bitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            bits: bitmap.pixels.iter().map(Rgba::is_solid).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `(x, y)` is set. Out of bounds is never set
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> bool {
        x >= 0
            && y >= 0
            && x < self.width as i64
            && y < self.height as i64
            && self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside mask");
        self.bits[y as usize * self.width as usize + x as usize] = value;
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// First pixel, in our coordinates, set in both us and `other`, where `other` is placed at
    /// `offset` relative to our top-left corner. Scans row-major.
    pub fn overlap(&self, other: &Mask, offset: Point) -> Option<Point> {
        let x_lo = offset.x.max(0);
        let y_lo = offset.y.max(0);
        let x_hi = (offset.x + other.width as i64).min(self.width as i64);
        let y_hi = (offset.y + other.height as i64).min(self.height as i64);

        for y in y_lo..y_hi {
            for x in x_lo..x_hi {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return Some(Point::new(x, y));
                }
            }
        }
        None
    }

    /// This mask rotated counter-clockwise by `angle` degrees about its centre. The result is
    /// sized to the rotated bounding box, so it grows for angles off the axes.
    pub fn rotated(&self, angle: f64) -> Mask {
        let angle = angle.rem_euclid(360.);
        if angle == 0. {
            return self.clone();
        }

        let (sin, cos) = angle.to_radians().sin_cos();
        let (w, h) = (self.width as f64, self.height as f64);
        let span = |v: f64| (v - 1e-9).ceil().max(1.) as u32;
        let rw = span(w * cos.abs() + h * sin.abs());
        let rh = span(w * sin.abs() + h * cos.abs());

        let mut out = Mask::new(rw, rh);
        for dy in 0..rh {
            for dx in 0..rw {
                let px = dx as f64 + 0.5 - rw as f64 / 2.;
                let py = dy as f64 + 0.5 - rh as f64 / 2.;
                let sx = px * cos - py * sin + w / 2.;
                let sy = px * sin + py * cos + h / 2.;
                if self.get(sx.floor() as i64, sy.floor() as i64) {
                    out.set(dx, dy, true);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const OPEN: Rgba = Rgba::new(255, 255, 255, 0);
    const WALL: Rgba = Rgba::new(0, 90, 0, 255);

    #[test]
    fn test_bitmap_bounds() {
        let bitmap = Bitmap::new(4, 3, OPEN);
        assert_eq!(bitmap.get(0, 0), Some(OPEN));
        assert_eq!(bitmap.get(3, 2), Some(OPEN));
        assert_eq!(bitmap.get(4, 0), None);
        assert_eq!(bitmap.get(0, 3), None);
        assert_eq!(bitmap.get(-1, 1), None);
    }

    #[test]
    fn test_from_rgba8() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let bitmap = Bitmap::from_rgba8(2, 1, &bytes).unwrap();
        assert_eq!(bitmap.get(1, 0), Some(Rgba::new(5, 6, 7, 8)));
        assert!(Bitmap::from_rgba8(2, 2, &bytes).is_err());
    }

    #[test]
    fn test_rgba_serde_keys() {
        let px: Rgba = serde_json::from_str(r#"{"R": 255, "G": 255, "B": 255, "A": 0}"#).unwrap();
        assert_eq!(px, OPEN);
    }

    #[test]
    fn test_oval_track_ring() {
        let bitmap = Bitmap::oval_track(200, 100, 20, OPEN, WALL);
        // corners and centre are wall
        assert_eq!(bitmap.get(0, 0), Some(WALL));
        assert_eq!(bitmap.get(100, 50), Some(WALL));
        // top of the ring, just inside the inset
        assert_eq!(bitmap.get(100, 10), Some(OPEN));
        // left side of the ring
        assert_eq!(bitmap.get(10, 50), Some(OPEN));
    }

    #[test]
    fn test_mask_from_bitmap() {
        let mut bitmap = Bitmap::new(3, 3, OPEN);
        bitmap.set(1, 1, WALL);
        bitmap.set(2, 0, Rgba::new(0, 0, 0, 128));
        bitmap.set(0, 2, Rgba::new(0, 0, 0, 127));
        let mask = Mask::from_bitmap(&bitmap);
        assert_eq!(mask.count(), 2);
        assert!(mask.get(1, 1));
        assert!(mask.get(2, 0));
        assert!(!mask.get(0, 2));
    }

    #[test]
    fn test_overlap_offsets() {
        let car = Mask::filled(2, 2);
        let mut wall = Mask::new(10, 10);
        wall.set(5, 5, true);

        // wall placed so its (5, 5) lands on our (1, 1)
        assert_eq!(car.overlap(&wall, Point::new(-4, -4)), Some(Point::new(1, 1)));
        assert_eq!(car.overlap(&wall, Point::new(-5, -5)), Some(Point::new(0, 0)));
        // one pixel further, it misses
        assert_eq!(car.overlap(&wall, Point::new(-6, -6)), None);
        assert_eq!(car.overlap(&wall, Point::new(5, 5)), None);
    }

    #[test]
    fn test_overlap_first_hit_row_major() {
        let me = Mask::filled(3, 3);
        let mut other = Mask::new(3, 3);
        other.set(2, 0, true);
        other.set(0, 1, true);
        assert_eq!(me.overlap(&other, Point::new(0, 0)), Some(Point::new(2, 0)));
    }

    #[test]
    fn test_rotate_quarter_turns() {
        let mask = Mask::filled(4, 2);
        let turned = mask.rotated(90.);
        assert_eq!((turned.width(), turned.height()), (2, 4));
        assert_eq!(turned.count(), 8);

        let back = mask.rotated(-270.);
        assert_eq!((back.width(), back.height()), (2, 4));
        assert_eq!(mask.rotated(360.), mask);
    }

    #[test]
    fn test_rotate_half_turn_mirrors() {
        let mut mask = Mask::new(3, 1);
        mask.set(0, 0, true);
        let turned = mask.rotated(180.);
        assert_eq!((turned.width(), turned.height()), (3, 1));
        assert!(turned.get(2, 0));
        assert!(!turned.get(0, 0));
    }

    #[test]
    fn test_rotate_grows_bounding_box() {
        let turned = Mask::filled(10, 10).rotated(45.);
        assert_eq!((turned.width(), turned.height()), (15, 15));
        assert!(turned.get(7, 7));
        assert!(!turned.get(0, 0));
    }
}
