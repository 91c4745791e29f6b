use std::io::{Cursor, Read, Seek, SeekFrom};
use byteorder::{ReadBytesExt, LE};
use crate::{Error, Result};

/// Little-endian reader over a seekable source with bounds checks against the source size.
/// Every read fails with `TruncatedStream` rather than reading partially.
pub struct ByteCursor<R> {
	inner: R,
	pos: u64,
	size: u64,
}

macro_rules! read_le {
	($name:ident, $type:ty, $width:expr) => {
		pub fn $name(&mut self) -> Result<$type> {
			self.ensure($width)?;
			let value = self.inner.$name::<LE>()?;
			self.pos += $width;
			Ok(value)
		}
	};
}

impl ByteCursor<Cursor<Vec<u8>>> {
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		let size = bytes.len() as u64;
		Self { inner: Cursor::new(bytes), pos: 0, size }
	}
}

impl<R: Read + Seek> ByteCursor<R> {
	/// Wraps `inner`, starting at its current position.
	pub fn new(mut inner: R) -> Result<Self> {
		let pos = inner.stream_position()?;
		let size = inner.seek(SeekFrom::End(0))?;
		inner.seek(SeekFrom::Start(pos))?;
		Ok(Self { inner, pos, size })
	}
	
	fn ensure(&self, needed: u64) -> Result<()> {
		let available = self.remaining();
		if needed > available {
			return Err(Error::TruncatedStream { offset: self.pos, needed, available });
		}
		Ok(())
	}
	
	pub fn read_u8(&mut self) -> Result<u8> {
		self.ensure(1)?;
		let value = self.inner.read_u8()?;
		self.pos += 1;
		Ok(value)
	}
	
	pub fn read_i8(&mut self) -> Result<i8> {
		Ok(self.read_u8()? as i8)
	}
	
	read_le!(read_u16, u16, 2);
	read_le!(read_i16, i16, 2);
	read_le!(read_u32, u32, 4);
	read_le!(read_i32, i32, 4);
	read_le!(read_f32, f32, 4);
	
	/// Signed 16-bit integer part followed by an unsigned 16-bit fraction of 65535.
	pub fn read_mixed_float(&mut self) -> Result<f32> {
		let int = self.read_i16()?;
		let frac = self.read_u16()?;
		Ok(int as f32 + frac as f32 / 65535.0)
	}
	
	pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
		self.ensure(len as u64)?;
		let mut bytes = vec![0; len];
		self.inner.read_exact(&mut bytes)?;
		self.pos += len as u64;
		Ok(bytes)
	}
	
	/// Everything from the current position to the end.
	pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
		self.read_bytes(self.remaining() as usize)
	}
	
	pub fn skip(&mut self, len: u64) -> Result<()> {
		self.ensure(len)?;
		self.seek(self.pos + len)
	}
	
	pub fn seek(&mut self, pos: u64) -> Result<()> {
		if pos > self.size {
			return Err(Error::TruncatedStream { offset: pos, needed: 0, available: 0 });
		}
		self.inner.seek(SeekFrom::Start(pos))?;
		self.pos = pos;
		Ok(())
	}
	
	pub fn tell(&self) -> u64 {
		self.pos
	}
	
	pub fn size(&self) -> u64 {
		self.size
	}
	
	pub fn remaining(&self) -> u64 {
		self.size.saturating_sub(self.pos)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	
	fn cursor(bytes: &[u8]) -> ByteCursor<Cursor<Vec<u8>>> {
		ByteCursor::from_bytes(bytes.to_vec())
	}
	
	#[test]
	fn mixed_float() {
		let mut c = cursor(&[10, 0, 0x00, 0x80, 0xFF, 0xFF, 0, 0]);
		let a = c.read_mixed_float().unwrap();
		assert!((a - 10.5).abs() <= 1.0 / 65535.0);
		assert_eq!(c.read_mixed_float().unwrap(), -1.0);
		assert_eq!(c.remaining(), 0);
	}
	
	#[test]
	fn little_endian_widths() {
		let mut c = cursor(&[0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFE]);
		assert_eq!(c.read_u16().unwrap(), 0x1234);
		assert_eq!(c.read_i32().unwrap(), 0x12345678);
		assert_eq!(c.read_i8().unwrap(), -2);
		assert_eq!(c.tell(), 7);
	}
	
	#[test]
	fn truncated_read_fails_without_advancing() {
		let mut c = cursor(&[1, 2, 3]);
		c.skip(1).unwrap();
		match c.read_u32() {
			Err(Error::TruncatedStream { offset: 1, needed: 4, available: 2 }) => {},
			other => panic!("unexpected {:?}", other),
		}
		assert_eq!(c.tell(), 1);
		assert_eq!(c.read_u16().unwrap(), 0x0302);
	}
	
	#[test]
	fn seek_bounds() {
		let mut c = cursor(&[0; 8]);
		c.seek(8).unwrap();
		assert_eq!(c.remaining(), 0);
		assert!(matches!(c.seek(9), Err(Error::TruncatedStream { .. })));
		assert!(matches!(c.read_bytes(1), Err(Error::TruncatedStream { .. })));
	}
	
	#[test]
	fn starts_at_current_position() {
		let mut inner = Cursor::new(vec![0u8, 0, 5, 0]);
		inner.set_position(2);
		let mut c = ByteCursor::new(inner).unwrap();
		assert_eq!(c.tell(), 2);
		assert_eq!(c.read_u16().unwrap(), 5);
	}
}
