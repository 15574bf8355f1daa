use crate::{
    bitmap::{Bitmap, Mask, Rgba},
    geometry::Point,
};

/// The track boundary: a bitmap placed at `origin`, where every pixel other than the transparent
/// one is wall. Built once and only ever read after that, so it is shared freely between cars.
#[derive(Debug, Clone)]
pub struct Border {
    origin: Point,
    bitmap: Bitmap,
    mask: Mask,
    transparent: Rgba,
}

impl Border {
    pub fn new(origin: Point, bitmap: Bitmap, transparent: Rgba) -> Self {
        let mask = Mask::from_bitmap(&bitmap);
        Self {
            origin,
            bitmap,
            mask,
            transparent,
        }
    }

    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[inline]
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[inline]
    pub fn transparent(&self) -> Rgba {
        self.transparent
    }

    /// Pixel at a world position, None off the bitmap
    #[inline]
    pub fn pixel(&self, at: Point) -> Option<Rgba> {
        let local = at - self.origin;
        self.bitmap.get(local.x, local.y)
    }

    /// Whether a world position is open track
    #[inline]
    pub fn is_open(&self, at: Point) -> bool {
        self.pixel(at) == Some(self.transparent)
    }
}
