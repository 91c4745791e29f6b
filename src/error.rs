use thiserror::Error;

/// Fatal decode errors. A decode that hits one of these returns no level.
#[derive(Error, Debug)]
pub enum Error {
	#[error("unsupported level version {0:#010x}")]
	UnsupportedVersion(u32),
	#[error("stream truncated at offset {offset:#x}: needed {needed} bytes, {available} available")]
	TruncatedStream {
		offset: u64,
		needed: u64,
		available: u64,
	},
	#[error("decompression failed: {0}")]
	DecompressionFailure(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
