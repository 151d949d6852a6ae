use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use super::error::RecolourError;
use super::{TextureKind, TextureSink};

/// Converts between encoded bytes of one raster format and pixel buffers.
pub trait Codec {
	/// Short name used in messages.
	fn name(&self) -> &str;
	/// Lower-case file extensions this codec is chosen for.
	fn extensions(&self) -> &[&'static str];
	/// Whether `encode` stores RGBA channels exactly as given.
	///
	/// Index textures hold numbers, not colors, so lossy or palette-limited
	/// formats must not be used for output.
	fn can_encode(&self) -> bool;
	fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, RecolourError>;
	fn encode(&self, texture: &RgbaImage) -> Result<Vec<u8>, RecolourError>;
}

/// A `Codec` backed by one of `image`'s built-in formats.
#[derive(Clone, Copy, Debug)]
pub struct ImageCodec {
	format: ImageFormat,
	extensions: &'static [&'static str],
	encodes: bool,
}

impl ImageCodec {
	pub const PNG: ImageCodec = ImageCodec {
		format: ImageFormat::Png,
		extensions: &["png"],
		encodes: true,
	};
	pub const GIF: ImageCodec = ImageCodec {
		format: ImageFormat::Gif,
		extensions: &["gif"],
		encodes: false,
	};
	pub const JPEG: ImageCodec = ImageCodec {
		format: ImageFormat::Jpeg,
		extensions: &["jpg", "jpeg", "jfif"],
		encodes: false,
	};
}

impl Codec for ImageCodec {
	fn name(&self) -> &str {
		self.extensions[0]
	}

	fn extensions(&self) -> &[&'static str] {
		self.extensions
	}

	fn can_encode(&self) -> bool {
		self.encodes
	}

	fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, RecolourError> {
		image::load_from_memory_with_format(bytes, self.format).map_err(RecolourError::Decode)
	}

	fn encode(&self, texture: &RgbaImage) -> Result<Vec<u8>, RecolourError> {
		if !self.encodes {
			return Err(RecolourError::UnsupportedFormat(format!(
				"{} cannot store index textures", self.name()
			)));
		}
		let mut buffer = Cursor::new(Vec::new());
		texture.write_to(&mut buffer, self.format).map_err(RecolourError::Encode)?;
		Ok(buffer.into_inner())
	}
}

/// The set of codecs available for reading sources and writing textures.
///
/// Nothing is registered implicitly; callers start from `with_defaults`
/// or an empty set and add what they need.
#[derive(Default)]
pub struct Codecs {
	codecs: Vec<Box<dyn Codec>>,
}

impl Codecs {
	pub fn new() -> Self {
		Codecs::default()
	}

	/// PNG for reading and writing, GIF and JPEG for reading only.
	pub fn with_defaults() -> Self {
		let mut codecs = Codecs::new();
		codecs.register(ImageCodec::PNG);
		codecs.register(ImageCodec::GIF);
		codecs.register(ImageCodec::JPEG);
		codecs
	}

	pub fn register<C: Codec + 'static>(&mut self, codec: C) {
		self.codecs.push(Box::new(codec));
	}

	/// Finds the codec for a file by its extension.
	pub fn for_path(&self, path: &Path) -> Option<&dyn Codec> {
		let ext = path.extension()?.to_str()?.to_ascii_lowercase();
		self.codecs.iter()
			.find(|c| c.extensions().iter().any(|e| *e == ext))
			.map(|c| c.as_ref())
	}

	/// Finds the codec for encoded bytes by sniffing their header.
	pub fn for_content(&self, bytes: &[u8]) -> Option<&dyn Codec> {
		let format = image::guess_format(bytes).ok()?;
		let ext = format.extensions_str().first()?;
		self.codecs.iter()
			.find(|c| c.extensions().contains(ext))
			.map(|c| c.as_ref())
	}

	/// Decodes `bytes`, trusting their header over `path`'s extension.
	///
	/// The extension only decides for content that can't be sniffed.
	pub fn decode(&self, path: &Path, bytes: &[u8]) -> Result<DynamicImage, RecolourError> {
		let codec = self.for_content(bytes)
			.or_else(|| self.for_path(path))
			.ok_or_else(|| RecolourError::UnsupportedFormat(path.display().to_string()))?;
		tracing::debug!(path = %path.display(), codec = codec.name(), "Decoding source image");
		codec.decode(bytes)
	}

	/// Finds a codec able to write textures to `path`.
	pub fn encoder_for(&self, path: &Path) -> Result<&dyn Codec, RecolourError> {
		let codec = self.for_path(path)
			.ok_or_else(|| RecolourError::UnsupportedFormat(path.display().to_string()))?;
		if !codec.can_encode() {
			return Err(RecolourError::UnsupportedFormat(format!(
				"{} cannot store index textures", codec.name()
			)));
		}
		Ok(codec)
	}

	/// Encodes a texture in the format named by `path`'s extension.
	pub fn encode(&self, path: &Path, texture: &RgbaImage) -> Result<Vec<u8>, RecolourError> {
		self.encoder_for(path)?.encode(texture)
	}

	/// Reads and decodes an image file.
	pub fn read(&self, path: &Path) -> Result<DynamicImage, RecolourError> {
		let bytes = fs::read(path).map_err(|source| RecolourError::SourceRead {
			path: path.to_path_buf(),
			source,
		})?;
		self.decode(path, &bytes)
	}
}

/// Writes each kind of texture to its own file.
pub struct FileSink<'a> {
	codecs: &'a Codecs,
	index: Option<PathBuf>,
	palette: Option<PathBuf>,
}

impl<'a> FileSink<'a> {
	pub fn new(codecs: &'a Codecs, index: Option<&Path>, palette: Option<&Path>) -> Self {
		FileSink {
			codecs,
			index: index.map(Path::to_path_buf),
			palette: palette.map(Path::to_path_buf),
		}
	}

	pub fn path(&self, kind: TextureKind) -> Option<&Path> {
		match kind {
			TextureKind::Index => self.index.as_deref(),
			TextureKind::Palette => self.palette.as_deref(),
		}
	}
}

impl TextureSink for FileSink<'_> {
	fn write(&mut self, kind: TextureKind, texture: &RgbaImage) -> Result<(), RecolourError> {
		let path = match self.path(kind) {
			Some(p) => p,
			None => return Ok(()),
		};
		let bytes = self.codecs.encode(path, texture)?;
		fs::write(path, bytes).map_err(|source| RecolourError::OutputWrite {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), ?kind, "Wrote texture");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::Rgba;

	#[test]
	fn test_for_path_by_extension() {
		let codecs = Codecs::with_defaults();
		assert_eq!(codecs.for_path(Path::new("a/sprite.png")).map(|c| c.name()), Some("png"));
		assert_eq!(codecs.for_path(Path::new("sprite.JPEG")).map(|c| c.name()), Some("jpg"));
		assert_eq!(codecs.for_path(Path::new("sprite.gif")).map(|c| c.name()), Some("gif"));
		assert!(codecs.for_path(Path::new("sprite.bmp")).is_none());
		assert!(codecs.for_path(Path::new("sprite")).is_none());
		assert!(Codecs::new().for_path(Path::new("sprite.png")).is_none());
	}

	#[test]
	fn test_png_keeps_channels_literal() {
		let texture = RgbaImage::from_fn(3, 1, |x, _| Rgba([x as u8 * 100, 1, 0, x as u8 * 60]));
		let bytes = ImageCodec::PNG.encode(&texture).unwrap();
		let decoded = ImageCodec::PNG.decode(&bytes).unwrap().into_rgba8();
		assert_eq!(decoded, texture);
	}

	#[test]
	fn test_decode_sniffs_content() {
		let texture = RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 255]));
		let bytes = ImageCodec::PNG.encode(&texture).unwrap();
		let codecs = Codecs::with_defaults();
		assert_eq!(codecs.for_content(&bytes).map(|c| c.name()), Some("png"));
		let decoded = codecs.decode(Path::new("sprite.dat"), &bytes).unwrap();
		assert_eq!(decoded.into_rgba8(), texture);
	}

	#[test]
	fn test_decode_ignores_misleading_extension() {
		let texture = RgbaImage::from_pixel(2, 2, Rgba([200, 10, 60, 255]));
		let mut gif = Cursor::new(Vec::new());
		texture.write_to(&mut gif, ImageFormat::Gif).unwrap();
		let codecs = Codecs::with_defaults();
		let decoded = codecs.decode(Path::new("sprite.png"), gif.get_ref()).unwrap().into_rgba8();
		assert_eq!(decoded.dimensions(), (2, 2));
		assert_eq!(*decoded.get_pixel(1, 1), Rgba([200, 10, 60, 255]));
	}

	#[test]
	fn test_decode_only_formats_refuse_to_encode() {
		let texture = RgbaImage::new(1, 1);
		let codecs = Codecs::with_defaults();
		match codecs.encode(Path::new("out.jpg"), &texture) {
			Err(RecolourError::UnsupportedFormat(msg)) => assert_eq!(msg, "jpg cannot store index textures"),
			other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|b| b.len())),
		}
		assert!(ImageCodec::GIF.encode(&texture).is_err());
		match codecs.encode(Path::new("out.tga"), &texture) {
			Err(RecolourError::UnsupportedFormat(msg)) => assert_eq!(msg, "out.tga"),
			other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|b| b.len())),
		}
	}

	#[test]
	fn test_garbage_is_unsupported() {
		let codecs = Codecs::with_defaults();
		match codecs.decode(Path::new("noise.bin"), &[1, 2, 3, 4]) {
			Err(RecolourError::UnsupportedFormat(_)) => {}
			other => panic!("Expected UnsupportedFormat, got {:?}", other.map(|i| i.width())),
		}
	}
}
