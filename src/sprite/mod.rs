pub mod catalog;
pub mod codec;
pub mod encode;
pub mod error;
pub mod layout;
pub mod normalize;

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Pixel, Primitive, Rgba, RgbaImage};

use catalog::Catalog;
use codec::{Codecs, FileSink};
use error::RecolourError;
use normalize::{AlphaMode, Color};

/// Which of the two generated textures is being handed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
	/// Per-pixel palette indices plus the source alpha.
	Index,
	/// The palette colors laid out in index order.
	Palette,
}

/// Receives finished textures, e.g. to store them.
pub trait TextureSink {
	fn write(&mut self, kind: TextureKind, texture: &RgbaImage) -> Result<(), RecolourError>;
}

/// A `TextureSink` that just keeps the textures in memory.
#[derive(Clone, Debug, Default)]
pub struct TextureBuffers {
	pub index: Option<RgbaImage>,
	pub palette: Option<RgbaImage>,
}

impl TextureSink for TextureBuffers {
	fn write(&mut self, kind: TextureKind, texture: &RgbaImage) -> Result<(), RecolourError> {
		let slot = match kind {
			TextureKind::Index => &mut self.index,
			TextureKind::Palette => &mut self.palette,
		};
		*slot = Some(texture.clone());
		Ok(())
	}
}

/// What `generate_from_image` produces and how it reads its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateOptions {
	pub emit_index: bool,
	pub emit_palette: bool,
	pub alpha: AlphaMode,
}

impl Default for GenerateOptions {
	fn default() -> Self {
		GenerateOptions {
			emit_index: true,
			emit_palette: true,
			alpha: AlphaMode::Straight,
		}
	}
}

/// Converts a sprite into an index texture and a palette texture.
///
/// Every distinct color of `img` (alpha ignored) becomes one palette entry,
/// ordered by hue, saturation and value. Each pixel of the index texture
/// holds its color's palette index in red (low byte) and green (high byte)
/// and the pixel's own alpha.
///
/// Requested textures are handed to `sink` only once both are complete,
/// so a failure never leaves partial output behind. The ordered palette is
/// returned whether or not any texture was requested.
pub fn generate_from_image<T, C, S>(
	img: &ImageBuffer<Rgba<T>, C>,
	options: &GenerateOptions,
	sink: &mut S
) -> Result<Vec<Color>, RecolourError>
where
	T: Primitive + 'static,
	Rgba<T>: Pixel<Subpixel = T>,
	C: std::ops::Deref<Target = [T]>,
	S: TextureSink + ?Sized,
{
	let catalog = Catalog::build(img, options.alpha)?;
	let palette = catalog.palette();

	let index = if options.emit_index {
		Some(encode::encode_indices(img, &catalog, options.alpha).image)
	} else {
		None
	};
	let palette_texture = if options.emit_palette {
		Some(layout::layout_palette(&palette))
	} else {
		None
	};

	if let Some(texture) = index {
		sink.write(TextureKind::Index, &texture)?;
	}
	if let Some(texture) = palette_texture {
		sink.write(TextureKind::Palette, &texture)?;
	}
	Ok(palette)
}

/// Like `generate_from_image`, keeping the decoded image's channel depth.
///
/// Images decoded from files always have straight alpha, so
/// `options.alpha` is ignored.
pub fn generate_from_dynamic<S>(
	img: &DynamicImage,
	options: &GenerateOptions,
	sink: &mut S
) -> Result<Vec<Color>, RecolourError>
where
	S: TextureSink + ?Sized,
{
	let options = GenerateOptions { alpha: AlphaMode::Straight, ..*options };
	match img {
		DynamicImage::ImageLuma16(_) |
		DynamicImage::ImageLumaA16(_) |
		DynamicImage::ImageRgb16(_) |
		DynamicImage::ImageRgba16(_) => generate_from_image(&img.to_rgba16(), &options, sink),
		DynamicImage::ImageRgb32F(_) |
		DynamicImage::ImageRgba32F(_) => generate_from_image(&img.to_rgba32f(), &options, sink),
		_ => generate_from_image(&img.to_rgba8(), &options, sink),
	}
}

/// Reads a sprite file and writes its index texture and/or palette texture.
///
/// Output formats are picked from the output paths' extensions and checked
/// before any work is done.
pub fn generate(
	input: &Path,
	index_out: Option<&Path>,
	palette_out: Option<&Path>,
	codecs: &Codecs
) -> Result<Vec<Color>, RecolourError> {
	for path in index_out.iter().chain(palette_out.iter()) {
		codecs.encoder_for(path)?;
	}
	if let (Some(index), Some(palette)) = (index_out, palette_out) {
		if index == palette {
			return Err(RecolourError::OutputClash(index.to_path_buf()));
		}
	}
	let img = codecs.read(input)?;
	let options = GenerateOptions {
		emit_index: index_out.is_some(),
		emit_palette: palette_out.is_some(),
		..Default::default()
	};
	let mut sink = FileSink::new(codecs, index_out, palette_out);
	generate_from_dynamic(&img, &options, &mut sink)
}
