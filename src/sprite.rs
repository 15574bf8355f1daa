use crate::{
    bitmap::{Bitmap, Mask},
    config::CarConfig,
    Result,
};
use std::sync::Arc;

/// A car's look: which visual variant it is, and the solid pixels of its unrotated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    variant: usize,
    mask: Mask,
}

impl Sprite {
    pub fn new(variant: usize, mask: Mask) -> Self {
        Self { variant, mask }
    }

    /// A fully solid rectangle
    pub fn solid(variant: usize, width: u32, height: u32) -> Self {
        Self::new(variant, Mask::filled(width, height))
    }

    pub fn from_bitmap(variant: usize, bitmap: &Bitmap) -> Self {
        Self::new(variant, Mask::from_bitmap(bitmap))
    }

    #[inline]
    pub fn variant(&self) -> usize {
        self.variant
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Mask of this sprite drawn at `heading` degrees
    pub fn rotated(&self, heading: f64) -> Mask {
        self.mask.rotated(heading)
    }
}

/// The car sprites to sample from. Image files when configured, otherwise one solid rectangle
/// per variant.
pub fn car_set(config: &CarConfig) -> Result<Vec<Arc<Sprite>>> {
    if config.sprites.is_empty() {
        let [w, h] = config.size;
        return Ok((0..config.variants.max(1))
            .map(|variant| Arc::new(Sprite::solid(variant, w, h)))
            .collect());
    }

    config
        .sprites
        .iter()
        .enumerate()
        .map(|(variant, path)| Ok(Arc::new(Sprite::from_bitmap(variant, &Bitmap::open(path)?))))
        .collect()
}
