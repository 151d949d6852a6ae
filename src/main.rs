use recolour::codec::Codecs;
use recolour::RecolourError;

use std::path::{Path, PathBuf};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// `sprite.png` becomes `sprite_index.png` next to it.
fn default_index_path(input: &Path) -> PathBuf {
	let stem = input.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
	input.with_file_name(format!("{}_index.png", stem))
}

/// Process exit code for a failed conversion.
fn exit_code(e: &RecolourError) -> i32 {
	match e {
		RecolourError::SourceRead { .. } |
		RecolourError::OutputWrite { .. } |
		RecolourError::Encode(_) => 3,
		RecolourError::OutputClash(_) => 2,
		RecolourError::Decode(_) |
		RecolourError::UnsupportedFormat(_) => 4,
		RecolourError::CapacityExceeded { .. } => 5,
	}
}

/// `clap`-based CLI for turning sprites into index and palette textures.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data or unsupported format
///
/// 5: too many colors in the sprite
fn main() {
	let clap_matches = clap::App::new("recolour")
		.version(env!("CARGO_PKG_VERSION"))
		.author("vkcz")
		.about("Converts a sprite into an index texture and an HSV-ordered palette texture.")
		.arg_from_usage("-p, --palette=[PALETTE] 'Also write the palette texture to PALETTE (PNG)'")
		.arg_from_usage("-n, --no-index 'Do not write the index texture'")
		.arg_from_usage("-l, --list 'Print the ordered palette to stdout'")
		.arg_from_usage("-v, --verbose 'Log what is being done'")
		.arg_from_usage("<INPUT> 'Path to input sprite (PNG, GIF or JPEG)'")
		.arg_from_usage("[OUTPUT] 'Path to index texture; defaults to INPUT with an _index.png suffix'")
		.get_matches();

	let default_filter = if clap_matches.is_present("verbose") { "recolour=debug" } else { "recolour=warn" };
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
		.with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
		.init();

	let input = match clap_matches.value_of("INPUT") {
		Some(p) => PathBuf::from(p),
		None => error_exit("Missing input path", 2),
	};
	let no_index = clap_matches.is_present("no-index");
	if no_index && clap_matches.is_present("OUTPUT") {
		error_exit("OUTPUT cannot be combined with -n/--no-index", 2);
	}
	let index_out = if no_index {
		None
	} else {
		Some(clap_matches.value_of("OUTPUT")
			.map(PathBuf::from)
			.unwrap_or_else(|| default_index_path(&input)))
	};
	let palette_out = clap_matches.value_of("palette").map(PathBuf::from);
	let list = clap_matches.is_present("list");
	if index_out.is_none() && palette_out.is_none() && !list {
		error_exit("Nothing to do: -n/--no-index needs -p/--palette or -l/--list", 2);
	}

	let codecs = Codecs::with_defaults();
	let palette = match recolour::generate(&input, index_out.as_deref(), palette_out.as_deref(), &codecs) {
		Ok(p) => p,
		Err(e) => error_exit(&e.to_string(), exit_code(&e)),
	};
	eprintln!("{} colors in generated palette", palette.len());
	if list {
		for (n, c) in palette.iter().enumerate() {
			println!("{} #{:02x}{:02x}{:02x}", n, c.0[0], c.0[1], c.0[2]);
		}
	}
}
