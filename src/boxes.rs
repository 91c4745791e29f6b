use std::io::{Read, Seek};
use shared::{MinMax, ScalarMinMax};
use crate::{read_boxed_slice, ByteCursor, Result, Version};

/// Pathfinding area. Coordinates are world units in TR1 and sectors (1024 units) after.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrBox {
	pub z: MinMax<i32>,
	pub x: MinMax<i32>,
	pub true_floor: i16,
	/// Index into overlaps, top bits are flags
	pub overlap_index: u16,
}

impl TrBox {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let (z, x) = match version {
			Version::Tr1 => (
				MinMax { min: cursor.read_i32()?, max: cursor.read_i32()? },
				MinMax { min: cursor.read_i32()?, max: cursor.read_i32()? },
			),
			_ => (
				MinMax { min: cursor.read_u8()? as i32, max: cursor.read_u8()? as i32 },
				MinMax { min: cursor.read_u8()? as i32, max: cursor.read_u8()? as i32 },
			),
		};
		Ok(TrBox { z, x, true_floor: cursor.read_i16()?, overlap_index: cursor.read_u16()? })
	}
	
	/// Whether the point lies in the box, in the box's own units.
	pub fn contains(&self, x: i32, z: i32) -> bool {
		self.x.contains(&MinMax::new(x)) && self.z.contains(&MinMax::new(z))
	}
}

#[derive(Clone, Debug, Default)]
pub struct BoxData {
	pub boxes: Box<[TrBox]>,
	pub overlaps: Box<[u16]>,
	/// `zones_per_box` words per box, grouped by zone kind
	pub zones: Box<[u16]>,
}

impl BoxData {
	pub fn zones_per_box(version: Version) -> usize {
		match version {
			Version::Tr1 => 6,
			_ => 10,
		}
	}
	
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let num_boxes = cursor.read_u32()? as usize;
		let boxes = (0..num_boxes).map(|_| TrBox::read(cursor, version)).collect::<Result<_>>()?;
		let num_overlaps = cursor.read_u32()? as usize;
		let overlaps = read_boxed_slice(cursor, num_overlaps)?;
		let zones = read_boxed_slice(cursor, num_boxes * Self::zones_per_box(version))?;
		Ok(BoxData { boxes, overlaps, zones })
	}
}
