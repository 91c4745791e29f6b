use std::io::{Read, Seek};
use log::debug;
use crate::{
	animation::{Frame, Moveable, RawMoveable}, mesh::Mesh, read_list, ByteCursor, Diagnostics, Result, Version,
};

/// Dense indices for a table of byte offsets. Distinct offsets get consecutive indices in ascending
/// offset order, so equal offsets share an index.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct OffsetRemap {
	/// Distinct offsets, ascending; position is the dense index
	pub offsets: Vec<u32>,
	/// Dense index of each table slot
	pub indices: Vec<usize>,
}

impl OffsetRemap {
	pub fn new(table: &[u32]) -> Self {
		let mut offsets = table.to_vec();
		offsets.sort_unstable();
		offsets.dedup();
		let indices = table.iter().map(|offset| offsets.partition_point(|o| o < offset)).collect();
		OffsetRemap { offsets, indices }
	}
}

/// Mesh blob and pointer table. Returns one mesh per distinct pointer, and the dense index of each
/// pointer slot.
pub(crate) fn read_meshes<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	version: Version,
) -> Result<(Box<[Mesh]>, Box<[usize]>)> {
	let num_words = cursor.read_u32()? as usize;
	let blob = cursor.read_bytes(num_words * 2)?;
	let pointers = read_list::<_, u32, u32>(cursor)?;
	let remap = OffsetRemap::new(&pointers);
	debug!("{} mesh pointers, {} distinct meshes", pointers.len(), remap.offsets.len());
	let mut blob = ByteCursor::from_bytes(blob);
	let meshes = remap
		.offsets
		.iter()
		.map(|&offset| {
			blob.seek(offset as u64)?;
			Mesh::read(&mut blob, version)
		})
		.collect::<Result<_>>()?;
	Ok((meshes, remap.indices.into_boxed_slice()))
}

/// Decodes one frame per distinct moveable frame offset and points each moveable at its frame.
pub(crate) fn resolve_frames(
	raw_moveables: &[RawMoveable],
	frame_data: &[u16],
	version: Version,
	diagnostics: &mut Diagnostics,
) -> (Box<[Moveable]>, Box<[Frame]>) {
	let table = raw_moveables.iter().map(|moveable| moveable.frame_offset).collect::<Vec<_>>();
	let remap = OffsetRemap::new(&table);
	let mut first_slot = vec![None; remap.offsets.len()];
	for (slot, &index) in remap.indices.iter().enumerate() {
		first_slot[index].get_or_insert(slot);
	}
	let frames = remap
		.offsets
		.iter()
		.zip(first_slot)
		.map(|(&offset, slot)| {
			if offset % 2 != 0 {
				diagnostics.violation("frame", format!("frame offset {:#x} is not word aligned", offset));
			}
			let num_meshes = slot.map_or(0, |slot| raw_moveables[slot].num_meshes);
			Frame::decode(frame_data, offset as usize / 2, num_meshes, version, diagnostics)
		})
		.collect();
	let moveables = raw_moveables
		.iter()
		.zip(remap.indices)
		.map(|(moveable, frame_index)| moveable.resolve(frame_index))
		.collect();
	(moveables, frames)
}

#[cfg(test)]
mod tests {
	use nonmax::NonMaxU16;
	use super::*;
	
	#[test]
	fn equal_offsets_share_index() {
		let remap = OffsetRemap::new(&[40, 0, 40, 12, 0]);
		assert_eq!(remap.offsets, [0, 12, 40]);
		assert_eq!(remap.indices, [2, 0, 2, 1, 0]);
	}
	
	#[test]
	fn empty_table() {
		let remap = OffsetRemap::new(&[]);
		assert!(remap.offsets.is_empty() && remap.indices.is_empty());
	}
	
	fn words(words: &[i16]) -> Vec<u8> {
		words.iter().flat_map(|w| w.to_le_bytes()).collect()
	}
	
	#[test]
	fn shared_pointer_decodes_mesh_once() {
		//two meshes with no vertices, lighting or faces: 5 + 1 + 1 + 4 words each
		let mut mesh_words = vec![0i16; 22];
		mesh_words[11] = 7;//second mesh center.x
		let mut bytes = 22u32.to_le_bytes().to_vec();
		bytes.extend(words(&mesh_words));
		bytes.extend(3u32.to_le_bytes());
		for pointer in [22u32, 0, 22] {
			bytes.extend(pointer.to_le_bytes());
		}
		let (meshes, indices) = read_meshes(&mut ByteCursor::from_bytes(bytes), Version::Tr2).unwrap();
		assert_eq!(meshes.len(), 2);
		assert_eq!(&indices[..], &[1, 0, 1]);
		assert_eq!(meshes[indices[0]].center.x, 7);
		assert_eq!(meshes[indices[1]].center.x, 0);
	}
	
	#[test]
	fn frames_follow_offset_order() {
		let raw = |frame_offset, num_meshes| RawMoveable {
			object_id: 0,
			num_meshes,
			starting_mesh: 0,
			mesh_tree_index: 0,
			frame_offset,
			animation_index: NonMaxU16::new(0),
		};
		let raw_moveables = [raw(20, 1), raw(0, 1), raw(20, 1)];
		let mut frame_data = vec![0u16; 20];
		frame_data[9] = 0x4000 | 1;
		frame_data[10 + 9] = 0x8000 | 2;
		let mut diagnostics = Diagnostics::new();
		let (moveables, frames) = resolve_frames(&raw_moveables, &frame_data, Version::Tr2, &mut diagnostics);
		assert!(diagnostics.is_empty());
		assert_eq!(frames.len(), 2);
		assert_eq!(moveables.iter().map(|m| m.frame_index).collect::<Vec<_>>(), [1, 0, 1]);
		assert_eq!(frames[0].frame_data_index, 0);
		assert_eq!(frames[1].frame_data_index, 10);
		assert_eq!(frames[1].rotations[0], crate::animation::FrameRotation::Y(2));
	}
}
