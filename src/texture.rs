use std::io::{Read, Seek};
use glam::U16Vec2;
use crate::{ByteCursor, Diagnostics, Readable, Result, Version};

pub mod blend_mode {
	pub const OPAQUE: u16 = 0;
	pub const TEST: u16 = 1;
	pub const ADD: u16 = 2;
	pub const SUBTRACT: u16 = 3;
}

/// TR4/5 trailer describing the texture's original placement.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectTextureSize {
	pub original_u: u32,
	pub original_v: u32,
	pub width: u32,
	pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectTexture {
	/// See `blend_mode`
	pub blend_mode: u16,
	/// Index into textiles
	pub tile: u16,
	/// Quad textures use all four `uvs`, triangle textures the first three. Always false before TR4.
	pub triangle: bool,
	/// TR4/5 only
	pub flags: u16,
	/// Units are 1/256th of a pixel
	pub uvs: [U16Vec2; 4],
	/// TR4/5 only
	pub size: Option<ObjectTextureSize>,
}

impl ObjectTexture {
	pub(crate) fn read<R: Read + Seek>(
		cursor: &mut ByteCursor<R>,
		version: Version,
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		let blend_mode = cursor.read_u16()?;
		let tile_and_flag = cursor.read_u16()?;
		let modern = version >= Version::Tr4;
		let flags = match modern {
			true => cursor.read_u16()?,
			false => 0,
		};
		let uvs = <[U16Vec2; 4]>::read(cursor)?;
		let size = match modern {
			true => Some(ObjectTextureSize::read(cursor)?),
			false => None,
		};
		if version == Version::Tr5 {
			diagnostics.expect_value("object texture", "filler", cursor.read_u16()?, &[0]);
		}
		Ok(ObjectTexture {
			blend_mode,
			tile: tile_and_flag & 0x7FFF,
			triangle: modern && tile_and_flag & 0x8000 != 0,
			flags,
			uvs,
			size,
		})
	}
	
	/// Texture coordinates of one corner, rounded down to whole pixels.
	pub fn pixel(&self, corner: usize) -> U16Vec2 {
		let uv = self.uvs[corner];
		U16Vec2::new(uv.x >> 8, uv.y >> 8)
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteTexture {
	/// Index into textiles
	pub tile: u16,
	pub x: u8,
	pub y: u8,
	pub width: u16,
	pub height: u16,
	pub left: i16,
	pub top: i16,
	pub right: i16,
	pub bottom: i16,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSequence {
	pub object_id: i32,
	/// Negated number of sprites in the sequence
	pub negative_length: i16,
	/// Index into sprite_textures
	pub offset: i16,
}

impl SpriteSequence {
	pub fn len(&self) -> usize {
		self.negative_length.unsigned_abs() as usize
	}
	
	pub fn is_empty(&self) -> bool {
		self.negative_length == 0
	}
}
