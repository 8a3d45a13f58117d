//! CPU-side RGBA images handed to the sprite renderer.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Error returned when pixel data does not match the declared dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapError {
    pub width: u32,
    pub height: u32,
    pub len: usize,
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bitmap error: {}x{} RGBA needs {} bytes, got {}",
            self.width,
            self.height,
            self.width as usize * self.height as usize * 4,
            self.len
        )
    }
}

impl std::error::Error for BitmapError {}

/// Stable identity of a [`Bitmap`]; the sprite renderer caches textures by it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BitmapId(u64);

/// Immutable premultiplied RGBA8 image.
///
/// Clones share the pixel buffer and the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    id: BitmapId,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Wraps pixels that are already premultiplied.
    pub fn from_premultiplied_rgba(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(BitmapError { width, height, len: pixels.len() });
        }
        Ok(Self {
            id: BitmapId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Premultiplies straight-alpha RGBA8 pixels and wraps them.
    pub fn from_straight_rgba(
        width: u32,
        height: u32,
        mut pixels: Vec<u8>,
    ) -> Result<Self, BitmapError> {
        for px in pixels.chunks_exact_mut(4) {
            let a = px[3] as u32;
            for c in &mut px[..3] {
                *c = ((*c as u32 * a + 127) / 255) as u8;
            }
        }
        Self::from_premultiplied_rgba(width, height, pixels)
    }

    #[inline]
    pub fn id(&self) -> BitmapId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
