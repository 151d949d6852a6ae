use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use image::{ImageBuffer, Pixel, Primitive, Rgba};

use super::error::RecolourError;
use super::normalize::{to_palette_canonical, AlphaMode, Color};

/// Most entries a catalog may hold; indices must fit in 16 bits.
pub const MAX_COLORS: usize = 1 << 16;

/// Tolerance under which two hue or saturation values count as equal.
pub const EPSILON: f64 = 0.00000001;

/// One distinct color of a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniqueColor {
	pub color: Color,
	pub hue: f64,
	pub saturation: f64,
	pub value: f64,
	/// Position in the sorted catalog.
	pub index: u16,
}

impl UniqueColor {
	fn new(color: Color) -> Self {
		let (hue, saturation, value) = rgb_to_hsv(color);
		UniqueColor { color, hue, saturation, value, index: 0 }
	}
}

/// Converts the RGB part of a color to hue in degrees `[0, 360)` and
/// saturation and value in `[0, 1]`.
///
/// Hue is 0 for grays rather than undefined.
pub fn rgb_to_hsv(color: Color) -> (f64, f64, f64) {
	let r = color.0[0] as f64 / 255.0;
	let g = color.0[1] as f64 / 255.0;
	let b = color.0[2] as f64 / 255.0;
	let min = r.min(g).min(b);
	let v = r.max(g).max(b);
	let chroma = v - min;

	let s = if v != 0.0 { chroma / v } else { 0.0 };
	let mut h = 0.0;
	if min != v {
		// Later channels win ties, so yellow (r == g) takes the green sector.
		if v == r {
			h = ((g - b) / chroma) % 6.0;
		}
		if v == g {
			h = (b - r) / chroma + 2.0;
		}
		if v == b {
			h = (r - g) / chroma + 4.0;
		}
		h *= 60.0;
		if h < 0.0 {
			h += 360.0;
		}
	}
	(h, s, v)
}

fn float_equals(a: f64, b: f64) -> bool {
	(a - b) < EPSILON && (b - a) < EPSILON
}

/// Orders entries by hue, then saturation, then value.
///
/// Hue and saturation are compared with `EPSILON` tolerance; value is
/// compared exactly.
pub fn hsv_order(a: &UniqueColor, b: &UniqueColor) -> Ordering {
	fn exact(x: f64, y: f64) -> Ordering {
		x.partial_cmp(&y).unwrap_or(Ordering::Equal)
	}
	if !float_equals(a.hue, b.hue) {
		exact(a.hue, b.hue)
	} else if !float_equals(a.saturation, b.saturation) {
		exact(a.saturation, b.saturation)
	} else {
		exact(a.value, b.value)
	}
}

/// The distinct colors of a sprite, sorted for easy editing.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
	entries: Vec<UniqueColor>,
	lookup: HashMap<Color, u16>,
}

impl Catalog {
	/// Scans every pixel once and collects its palette color.
	///
	/// Fails as soon as a color beyond `MAX_COLORS` turns up, without
	/// scanning the rest of the image.
	pub fn build<T, C>(
		img: &ImageBuffer<Rgba<T>, C>,
		mode: AlphaMode
	) -> Result<Catalog, RecolourError>
	where
		T: Primitive + 'static,
		Rgba<T>: Pixel<Subpixel = T>,
		C: std::ops::Deref<Target = [T]>,
	{
		let mut seen = HashSet::new();
		let mut entries = Vec::new();
		for px in img.pixels() {
			let color = to_palette_canonical(px, mode);
			if seen.insert(color) {
				if entries.len() == MAX_COLORS {
					return Err(RecolourError::CapacityExceeded {
						count: seen.len(),
						max: MAX_COLORS,
					});
				}
				entries.push(UniqueColor::new(color));
			}
		}
		Ok(Catalog::from_unsorted(entries))
	}

	/// Sorts entries into HSV order and numbers them by position.
	fn from_unsorted(mut entries: Vec<UniqueColor>) -> Catalog {
		entries.sort_by(hsv_order);
		let mut lookup = HashMap::with_capacity(entries.len());
		for (n, entry) in entries.iter_mut().enumerate() {
			entry.index = n as u16;
			lookup.insert(entry.color, entry.index);
		}
		tracing::debug!(colors = entries.len(), "Built color catalog");
		Catalog { entries, lookup }
	}

	/// Entries in index order.
	pub fn entries(&self) -> &[UniqueColor] {
		&self.entries
	}

	/// Final index of a palette color, if the sprite uses it.
	pub fn index_of(&self, color: &Color) -> Option<u16> {
		self.lookup.get(color).copied()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// The solid palette colors in index order.
	pub fn palette(&self) -> Vec<Color> {
		self.entries.iter().map(|e| e.color).collect()
	}
}
