use image::{Primitive, Rgba};

/// An 8-bit, non-premultiplied RGBA color.
pub type Color = Rgba<u8>;

/// How the color channels of a source sample relate to its alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
	/// Color channels are stored independently of alpha.
	#[default]
	Straight,
	/// Color channels have already been multiplied by alpha.
	Premultiplied,
}

/// Scales one channel from `0..=max` to `0..=255`, truncating.
fn scale_channel(v: f64, max: f64) -> u8 {
	((v / max) * 255.0) as u8
}

/// Converts a sample of any channel depth into an 8-bit,
/// non-premultiplied color.
///
/// Channels are scaled linearly from `T::DEFAULT_MAX_VALUE` to 255 and
/// rounded toward zero. Premultiplied samples are divided by their alpha in
/// the native range first; a fully transparent premultiplied sample has
/// nothing left to recover and comes out black.
pub fn to_canonical<T: Primitive>(px: &Rgba<T>, mode: AlphaMode) -> Color {
	let max = T::DEFAULT_MAX_VALUE.to_f64().unwrap_or(1.0);
	let ch = px.0.map(|c| c.to_f64().unwrap_or(0.0).clamp(0.0, max));
	let alpha = ch[3];
	let color = |c: f64| match mode {
		AlphaMode::Straight => scale_channel(c, max),
		AlphaMode::Premultiplied if alpha > 0.0 => scale_channel((c * max / alpha).min(max), max),
		AlphaMode::Premultiplied => 0,
	};
	Rgba([color(ch[0]), color(ch[1]), color(ch[2]), scale_channel(alpha, max)])
}

/// Like `to_canonical`, but with alpha forced to 255.
///
/// Palette entries are always solid; this is also the deduplication key, so
/// two pixels that only differ in alpha share a palette entry.
pub fn to_palette_canonical<T: Primitive>(px: &Rgba<T>, mode: AlphaMode) -> Color {
	let mut c = to_canonical(px, mode);
	c.0[3] = 255;
	c
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_8bit_is_identity() {
		for v in 0..=255u8 {
			let c = to_canonical(&Rgba([v, v, v, v]), AlphaMode::Straight);
			assert_eq!(c, Rgba([v, v, v, v]));
		}
	}

	#[test]
	fn test_16bit_truncates() {
		// 32767 / 65535 * 255 = 127.498..., 257 * 200 maps back exactly
		let c = to_canonical(&Rgba([32767u16, 65535, 0, 257 * 200]), AlphaMode::Straight);
		assert_eq!(c, Rgba([127, 255, 0, 200]));
		// just below the next step still truncates down
		let c = to_canonical(&Rgba([257u16 * 10 - 1, 0, 0, 0]), AlphaMode::Straight);
		assert_eq!(c.0[0], 9);
	}

	#[test]
	fn test_float_samples() {
		let c = to_canonical(&Rgba([1.0f32, 0.5, 0.0, 2.0]), AlphaMode::Straight);
		assert_eq!(c, Rgba([255, 127, 0, 255]));
	}

	#[test]
	fn test_straight_alpha_is_default() {
		assert_eq!(AlphaMode::default(), AlphaMode::Straight);
	}

	#[test]
	fn test_palette_variant_is_opaque() {
		let c = to_palette_canonical(&Rgba([10u8, 20, 30, 0]), AlphaMode::Straight);
		assert_eq!(c, Rgba([10, 20, 30, 255]));
	}

	#[test]
	fn test_premultiplied_is_unpremultiplied() {
		let c = to_canonical(&Rgba([100u8, 50, 0, 128]), AlphaMode::Premultiplied);
		assert_eq!(c, Rgba([199, 99, 0, 128]));
		let c = to_canonical(&Rgba([0u8, 0, 0, 0]), AlphaMode::Premultiplied);
		assert_eq!(c, Rgba([0, 0, 0, 0]));
		let c = to_canonical(&Rgba([255u8, 255, 255, 255]), AlphaMode::Premultiplied);
		assert_eq!(c, Rgba([255, 255, 255, 255]));
	}
}
