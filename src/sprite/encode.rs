use image::{ImageBuffer, Pixel, Primitive, Rgba, RgbaImage};

use super::catalog::Catalog;
use super::normalize::{to_canonical, to_palette_canonical, AlphaMode, Color};

/// Packs a palette index and an alpha value into one index texture pixel.
///
/// Red holds the low byte of the index, green the high byte, blue is
/// unused for now and alpha is carried as is.
pub fn pack_index(index: u16, alpha: u8) -> Color {
	let [lo, hi] = index.to_le_bytes();
	Rgba([lo, hi, 0, alpha])
}

/// Inverse of `pack_index`.
pub fn unpack_index(px: &Color) -> (u16, u8) {
	(u16::from_le_bytes([px.0[0], px.0[1]]), px.0[3])
}

/// An encoded index texture.
#[derive(Clone, Debug)]
pub struct IndexTexture {
	pub image: RgbaImage,
	/// Pixels whose color was missing from the catalog and were left zeroed.
	pub misses: usize,
}

/// Replaces every pixel of `img` by its catalog index.
///
/// The catalog must have been built from the same image with the same
/// `mode`. Pixels it doesn't know are skipped rather than failing the
/// whole texture.
pub fn encode_indices<T, C>(
	img: &ImageBuffer<Rgba<T>, C>,
	catalog: &Catalog,
	mode: AlphaMode
) -> IndexTexture
where
	T: Primitive + 'static,
	Rgba<T>: Pixel<Subpixel = T>,
	C: std::ops::Deref<Target = [T]>,
{
	let mut out = RgbaImage::new(img.width(), img.height());
	let mut misses = 0;
	for (x, y, px) in img.enumerate_pixels() {
		match catalog.index_of(&to_palette_canonical(px, mode)) {
			Some(index) => out.put_pixel(x, y, pack_index(index, to_canonical(px, mode).0[3])),
			None => misses += 1,
		}
	}
	if misses > 0 {
		tracing::warn!(misses, "Pixels missing from color catalog were left blank");
	}
	IndexTexture { image: out, misses }
}
