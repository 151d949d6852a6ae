use image::RgbaImage;

use super::normalize::Color;

/// Widest a palette texture gets before it grows rows.
pub const MAX_PALETTE_WIDTH: u32 = 256;

/// Smallest power of two not below `v`; 1 for 0.
pub fn next_power_of_two(v: u32) -> u32 {
	v.next_power_of_two()
}

/// Texture dimensions for a palette of `colors` entries.
///
/// Small palettes get a single power-of-two-wide row, anything above 128
/// entries a full 256-wide row, and anything above 256 entries a
/// power-of-two number of 256-wide rows.
pub fn palette_dimensions(colors: usize) -> (u32, u32) {
	let colors = colors as u32;
	if colors > MAX_PALETTE_WIDTH {
		(MAX_PALETTE_WIDTH, next_power_of_two((colors + MAX_PALETTE_WIDTH - 1) / MAX_PALETTE_WIDTH))
	} else if colors <= 128 {
		(next_power_of_two(colors), 1)
	} else {
		(MAX_PALETTE_WIDTH, 1)
	}
}

/// Lays out palette colors row by row in index order.
///
/// Cells past the last entry stay fully transparent.
pub fn layout_palette(palette: &[Color]) -> RgbaImage {
	let (width, height) = palette_dimensions(palette.len());
	let mut out = RgbaImage::new(width, height);
	for (n, color) in palette.iter().enumerate() {
		let n = n as u32;
		out.put_pixel(n % width, n / width, *color);
	}
	tracing::debug!(width, height, colors = palette.len(), "Laid out palette texture");
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::Rgba;

	#[test]
	fn test_next_power_of_two() {
		assert_eq!(next_power_of_two(1), 1);
		assert_eq!(next_power_of_two(2), 2);
		assert_eq!(next_power_of_two(3), 4);
		assert_eq!(next_power_of_two(5), 8);
		assert_eq!(next_power_of_two(256), 256);
		assert_eq!(next_power_of_two(257), 512);
	}

	#[test]
	fn test_palette_dimensions() {
		assert_eq!(palette_dimensions(0), (1, 1));
		assert_eq!(palette_dimensions(1), (1, 1));
		assert_eq!(palette_dimensions(3), (4, 1));
		assert_eq!(palette_dimensions(128), (128, 1));
		assert_eq!(palette_dimensions(129), (256, 1));
		assert_eq!(palette_dimensions(256), (256, 1));
		assert_eq!(palette_dimensions(257), (256, 2));
		assert_eq!(palette_dimensions(513), (256, 4));
		assert_eq!(palette_dimensions(1024), (256, 4));
		assert_eq!(palette_dimensions(1025), (256, 8));
		assert_eq!(palette_dimensions(65536), (256, 256));
	}

	#[test]
	fn test_layout_row_major() {
		let palette = (0..300u32)
			.map(|n| Rgba([n as u8, (n >> 8) as u8, 7, 255]))
			.collect::<Vec<_>>();
		let img = layout_palette(&palette);
		assert_eq!(img.dimensions(), (256, 2));
		assert_eq!(*img.get_pixel(0, 0), palette[0]);
		assert_eq!(*img.get_pixel(255, 0), palette[255]);
		assert_eq!(*img.get_pixel(0, 1), palette[256]);
		assert_eq!(*img.get_pixel(43, 1), palette[299]);
		assert_eq!(*img.get_pixel(44, 1), Rgba([0, 0, 0, 0]));
	}

	#[test]
	fn test_layout_small_palette() {
		let palette = vec![Rgba([1, 2, 3, 255]); 5];
		let img = layout_palette(&palette);
		assert_eq!(img.dimensions(), (8, 1));
		assert_eq!(*img.get_pixel(4, 0), Rgba([1, 2, 3, 255]));
		assert_eq!(*img.get_pixel(5, 0), Rgba([0, 0, 0, 0]));
	}
}
