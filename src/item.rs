use std::io::{Read, Seek};
use glam::IVec3;
use crate::{ByteCursor, Readable, Result, Version};

/// An object instance placed in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Item {
	/// Id of a moveable or sprite sequence
	pub object_id: i16,
	/// Index into rooms
	pub room: i16,
	/// World coords
	pub pos: IVec3,
	/// Units are 1/65536th of a rotation
	pub rotation: i16,
	pub intensity1: i16,
	/// Equal to `intensity1` in TR1 and TR4/5
	pub intensity2: i16,
	/// Object code bits, TR4/5 only
	pub ocb: Option<i16>,
	pub flags: u16,
}

impl Item {
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let object_id = cursor.read_i16()?;
		let room = cursor.read_i16()?;
		let pos = IVec3::read(cursor)?;
		let rotation = cursor.read_i16()?;
		let intensity1 = cursor.read_i16()?;
		let (intensity2, ocb) = match version {
			Version::Tr1 => (intensity1, None),
			Version::Tr2 | Version::Tr3 => (cursor.read_i16()?, None),
			Version::Tr4 | Version::Tr5 => (intensity1, Some(cursor.read_i16()?)),
		};
		let flags = cursor.read_u16()?;
		Ok(Item { object_id, room, pos, rotation, intensity1, intensity2, ocb, flags })
	}
	
	/// TR1/2 intensities are inverted 13-bit values where negative means "use mesh lighting";
	/// those become a 0-1 brightness or `None`. Later versions pass the raw intensity through.
	pub fn brightness(&self, version: Version) -> Option<f32> {
		match version {
			Version::Tr1 | Version::Tr2 => match self.intensity1 {
				i if i < 0 => None,
				i => Some(1.0 - i.min(8191) as f32 / 8191.0),
			},
			_ => Some(self.intensity1 as f32),
		}
	}
	
	/// Flag bits 9-13
	pub fn activation_mask(&self) -> u16 {
		(self.flags >> 9) & 0x1F
	}
	
	pub fn invisible(&self) -> bool {
		self.flags & 0x100 != 0
	}
}

/// TR4/5 AI navigation marker.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiObject {
	pub object_id: u16,
	/// Index into rooms
	pub room: u16,
	/// World coords
	pub pos: IVec3,
	pub ocb: i16,
	pub flags: u16,
	pub angle: i32,
}

#[cfg(test)]
mod tests {
	use super::*;
	
	fn item_bytes(words_after_intensity: &[i16]) -> Vec<u8> {
		let mut bytes = vec![];
		for word in [5i16, 2] {
			bytes.extend(word.to_le_bytes());
		}
		for value in [1024i32, -256, 2048] {
			bytes.extend(value.to_le_bytes());
		}
		for word in [16384i16, 4095].iter().chain(words_after_intensity) {
			bytes.extend(word.to_le_bytes());
		}
		bytes
	}
	
	#[test]
	fn layouts_by_version() {
		let tr1 = Item::read(&mut ByteCursor::from_bytes(item_bytes(&[0x3E00])), Version::Tr1).unwrap();
		assert_eq!(tr1.intensity2, 4095);
		assert_eq!(tr1.activation_mask(), 31);
		assert_eq!(tr1.ocb, None);
		let tr2 = Item::read(&mut ByteCursor::from_bytes(item_bytes(&[-1, 0x100])), Version::Tr2).unwrap();
		assert_eq!(tr2.intensity2, -1);
		assert!(tr2.invisible());
		let tr4 = Item::read(&mut ByteCursor::from_bytes(item_bytes(&[12, 0])), Version::Tr4).unwrap();
		assert_eq!(tr4.pos, IVec3::new(1024, -256, 2048));
		assert_eq!(tr4.ocb, Some(12));
		assert_eq!(tr4.intensity2, 4095);
	}
	
	#[test]
	fn inverted_brightness() {
		let mut item = Item::read(&mut ByteCursor::from_bytes(item_bytes(&[0])), Version::Tr1).unwrap();
		assert!((item.brightness(Version::Tr1).unwrap() - 0.5).abs() < 0.001);
		item.intensity1 = -1;
		assert_eq!(item.brightness(Version::Tr2), None);
		assert_eq!(item.brightness(Version::Tr3), Some(-1.0));
	}
}
