use std::io::{Read, Seek};
use log::debug;
use crate::{color::{Argb1555, Rgba}, version::tr4_family_version, ByteCursor, CompressedSection, Error, Result, Version};

pub const TEXTILE_SIDE: usize = 256;
pub const TEXTILE_PIXELS: usize = TEXTILE_SIDE * TEXTILE_SIDE;

/// A 256x256 texture page, row-major.
#[derive(Clone, Debug)]
pub struct Textile<P> {
	pub pixels: Box<[P]>,
}

impl<P> Textile<P> {
	pub fn pixel(&self, x: usize, y: usize) -> &P {
		&self.pixels[y * TEXTILE_SIDE + x]
	}
}

/// 8-bit palette indices.
pub type Textile8 = Textile<u8>;
pub type Textile16 = Textile<Argb1555>;
pub type Textile32 = Textile<Rgba>;

/// TR4/5 textile groups, in the order they appear in `Textiles::tiles32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextileCounts {
	pub room: u16,
	pub object: u16,
	pub bump: u16,
	pub misc: u16,
}

#[derive(Clone, Debug, Default)]
pub struct Textiles {
	pub tiles8: Box<[Textile8]>,
	pub tiles16: Box<[Textile16]>,
	pub tiles32: Box<[Textile32]>,
	pub counts: TextileCounts,
}

fn split_tiles<P>(bytes: &[u8], bytes_per_pixel: usize, pixel: impl Fn(&[u8]) -> P) -> Box<[Textile<P>]> {
	bytes
		.chunks_exact(TEXTILE_PIXELS * bytes_per_pixel)
		.map(|tile| Textile { pixels: tile.chunks_exact(bytes_per_pixel).map(&pixel).collect() })
		.collect()
}

fn tiles8(bytes: &[u8]) -> Box<[Textile8]> {
	split_tiles(bytes, 1, |p| p[0])
}

fn tiles16(bytes: &[u8]) -> Box<[Textile16]> {
	split_tiles(bytes, 2, |p| Argb1555::from_raw(u16::from_le_bytes([p[0], p[1]])))
}

/// Pixels are stored B, G, R, A; red and blue swap places.
fn tiles32(bytes: &[u8]) -> Box<[Textile32]> {
	split_tiles(bytes, 4, |p| Rgba { r: p[2], g: p[1], b: p[0], a: p[3] })
}

fn read_raw<R: Read + Seek>(cursor: &mut ByteCursor<R>, count: usize, bytes_per_pixel: usize) -> Result<Vec<u8>> {
	cursor.read_bytes(count * TEXTILE_PIXELS * bytes_per_pixel)
}

fn inflate_tiles(section: &CompressedSection, count: usize, bytes_per_pixel: usize) -> Result<Vec<u8>> {
	let expected = count * TEXTILE_PIXELS * bytes_per_pixel;
	if section.uncompressed_size() != expected {
		return Err(Error::DecompressionFailure(format!(
			"textile block declares {} bytes, {} textiles of {}-byte pixels need {}",
			section.uncompressed_size(),
			count,
			bytes_per_pixel,
			expected,
		)));
	}
	section.decompress()
}

/// TR1: `u32` count of 8-bit textiles.
pub(crate) fn read_tr1<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Textiles> {
	let count = cursor.read_u32()? as usize;
	debug!("{} 8-bit textiles", count);
	let tiles8 = tiles8(&read_raw(cursor, count, 1)?);
	Ok(Textiles { tiles8, ..Default::default() })
}

/// TR2/3: `u32` count, then that many 8-bit textiles followed by that many 16-bit textiles.
pub(crate) fn read_tr2<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Textiles> {
	let count = cursor.read_u32()? as usize;
	debug!("{} 8-bit and 16-bit textiles", count);
	let tiles8 = tiles8(&read_raw(cursor, count, 1)?);
	let tiles16 = tiles16(&read_raw(cursor, count, 2)?);
	Ok(Textiles { tiles8, tiles16, ..Default::default() })
}

/// TR4/5: counts, then compressed 32-bit, 16-bit and misc 32-bit blocks.
/// The misc block decides the version.
pub(crate) fn read_tr4_family<R: Read + Seek>(cursor: &mut ByteCursor<R>, magic: u32) -> Result<(Version, Textiles)> {
	let room = cursor.read_u16()?;
	let object = cursor.read_u16()?;
	let bump = cursor.read_u16()?;
	let count = room as usize + object as usize + bump as usize;
	let block32 = CompressedSection::read(cursor)?;
	let block16 = CompressedSection::read(cursor)?;
	let misc_block = CompressedSection::read(cursor)?;
	let version = tr4_family_version(magic, misc_block.uncompressed_size())?;
	let misc = version.num_misc_textiles();
	debug!("{:?}: {} room, {} object, {} bump, {} misc textiles", version, room, object, bump, misc);
	let mut all32 = inflate_tiles(&block32, count, 4)?;
	all32.extend(inflate_tiles(&misc_block, misc, 4)?);
	let tiles16 = tiles16(&inflate_tiles(&block16, count, 2)?);
	let textiles = Textiles {
		tiles8: Box::new([]),
		tiles16,
		tiles32: tiles32(&all32),
		counts: TextileCounts { room, object, bump, misc: misc as u16 },
	};
	Ok((version, textiles))
}
