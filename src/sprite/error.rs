use std::path::PathBuf;

use thiserror::Error;

/// Reason why a sprite couldn't be turned into an index texture and palette.
#[derive(Debug, Error)]
pub enum RecolourError {
	/// The sprite uses more distinct colors than a 16-bit index can address.
	#[error("sprite contains too many colours: {count} (max {max})")]
	CapacityExceeded { count: usize, max: usize },
	/// The source file could not be read.
	#[error("could not read {}: {source}", .path.display())]
	SourceRead { path: PathBuf, source: std::io::Error },
	/// The source bytes are not a valid image.
	#[error("invalid image data: {0}")]
	Decode(#[source] image::ImageError),
	/// An output file could not be written.
	#[error("could not write {}: {source}", .path.display())]
	OutputWrite { path: PathBuf, source: std::io::Error },
	/// A texture could not be encoded.
	#[error("could not encode texture: {0}")]
	Encode(#[source] image::ImageError),
	/// The index and palette textures were both sent to the same file.
	#[error("index and palette textures would both be written to {}", .0.display())]
	OutputClash(PathBuf),
	/// No registered codec handles the requested format.
	#[error("unsupported image format: {0}")]
	UnsupportedFormat(String),
}
