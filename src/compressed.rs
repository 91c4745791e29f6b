use std::io::{Cursor, Read, Seek};
use compress::{zlib::Decoder, Adler32};
use log::{debug, trace};
use crate::{ByteCursor, Error, Result};

/// A zlib-compressed block: `uncompressed_size u32`, `compressed_size u32`, then the payload.
pub struct CompressedSection {
	uncompressed_size: u32,
	payload: Vec<u8>,
}

fn has_zlib_header(payload: &[u8]) -> bool {
	match payload {
		[cmf, flg, ..] => cmf & 0x0F == 8 && (*cmf as u16 * 256 + *flg as u16) % 31 == 0,
		_ => false,
	}
}

impl CompressedSection {
	pub fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		let uncompressed_size = cursor.read_u32()?;
		let compressed_size = cursor.read_u32()?;
		trace!("compressed section at {:#x}: {} -> {} bytes", cursor.tell(), compressed_size, uncompressed_size);
		let payload = cursor.read_bytes(compressed_size as usize)?;
		Ok(Self { uncompressed_size, payload })
	}
	
	pub fn uncompressed_size(&self) -> usize {
		self.uncompressed_size as usize
	}
	
	/// Inflates the payload, which must produce exactly the declared number of bytes.
	pub fn decompress(&self) -> Result<Vec<u8>> {
		let expected = self.uncompressed_size();
		if self.payload.is_empty() {
			return Err(Error::DecompressionFailure(format!("empty payload for {} declared bytes", expected)));
		}
		let mut bytes = Vec::with_capacity(expected);
		Decoder::new(Cursor::new(&self.payload[..]))
			.take(expected as u64 + 1)
			.read_to_end(&mut bytes)
			.map_err(|e| Error::DecompressionFailure(e.to_string()))?;
		if bytes.len() != expected {
			return Err(Error::DecompressionFailure(format!(
				"inflated to {}{} bytes, {} declared",
				if bytes.len() > expected { "over " } else { "" },
				bytes.len().min(expected),
				expected,
			)));
		}
		//stream trailer is the big-endian adler32 of the output
		let trailer = match self.payload.len().checked_sub(4).map(|at| &self.payload[at..]) {
			Some(&[a, b, c, d]) => u32::from_be_bytes([a, b, c, d]),
			_ => return Err(Error::DecompressionFailure("payload shorter than its trailer".to_string())),
		};
		let mut checksum = Adler32::new();
		checksum.feed(&bytes);
		if trailer != checksum.result() {
			return Err(Error::DecompressionFailure("checksum mismatch".to_string()));
		}
		Ok(bytes)
	}
	
	/// Like `decompress`, but accepts a payload stored raw: equal sizes and no zlib header.
	pub fn decompress_or_stored(self) -> Result<Vec<u8>> {
		if self.payload.len() == self.uncompressed_size() && !has_zlib_header(&self.payload) {
			debug!("section of {} bytes stored uncompressed", self.payload.len());
			return Ok(self.payload);
		}
		self.decompress()
	}
	
	pub fn into_cursor(self) -> Result<ByteCursor<Cursor<Vec<u8>>>> {
		Ok(ByteCursor::from_bytes(self.decompress()?))
	}
}
