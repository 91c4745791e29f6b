use std::io::{Read, Seek};
use glam::{I16Vec3, U16Vec3};
use nonmax::NonMaxU16;
use shared::MinMax;
use crate::{ByteCursor, Diagnostics, Readable, Result, Version};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Animation {
	/// Byte offset into frame_data
	pub frame_offset: u32,
	/// Engine ticks per frame
	pub frame_rate: u8,
	/// Words per frame
	pub frame_size: u16,
	pub state_id: u16,
	pub speed: f32,
	pub accel: f32,
	/// TR4/5 only
	pub speed_lateral: f32,
	/// TR4/5 only
	pub accel_lateral: f32,
	pub frame_start: u16,
	pub frame_end: u16,
	/// Index into animations
	pub next_animation: u16,
	pub next_frame: u16,
	pub num_state_changes: u16,
	/// Index into state_changes
	pub state_change_offset: u16,
	pub num_anim_commands: u16,
	/// Index into anim_commands
	pub anim_command: u16,
}

impl Animation {
	/// TR1-3 store speeds as mixed fixed point, TR4/5 as floats with lateral components.
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let frame_offset = cursor.read_u32()?;
		let frame_rate = cursor.read_u8()?;
		let frame_size = cursor.read_u8()? as u16;
		let state_id = cursor.read_u16()?;
		let (speed, accel, speed_lateral, accel_lateral) = match version {
			Version::Tr4 | Version::Tr5 => (cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?),
			_ => (cursor.read_mixed_float()?, cursor.read_mixed_float()?, 0.0, 0.0),
		};
		Ok(Animation {
			frame_offset,
			frame_rate,
			frame_size,
			state_id,
			speed,
			accel,
			speed_lateral,
			accel_lateral,
			frame_start: cursor.read_u16()?,
			frame_end: cursor.read_u16()?,
			next_animation: cursor.read_u16()?,
			next_frame: cursor.read_u16()?,
			num_state_changes: cursor.read_u16()?,
			state_change_offset: cursor.read_u16()?,
			num_anim_commands: cursor.read_u16()?,
			anim_command: cursor.read_u16()?,
		})
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
	pub state_id: u16,
	pub num_anim_dispatches: u16,
	/// Index into anim_dispatches
	pub anim_dispatch: u16,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimDispatch {
	pub low_frame: i16,
	pub high_frame: i16,
	/// Index into animations
	pub next_animation: i16,
	pub next_frame: i16,
}

/// Animated object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Moveable {
	pub object_id: u32,
	pub num_meshes: u16,
	/// Mesh table slot of the first mesh
	pub starting_mesh: u16,
	/// Offset into mesh_tree_data
	pub mesh_tree_index: u32,
	/// Index into frames
	pub frame_index: usize,
	/// Index into animations
	pub animation_index: Option<NonMaxU16>,
}

/// Moveable as stored, before its frame offset is resolved.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawMoveable {
	pub object_id: u32,
	pub num_meshes: u16,
	pub starting_mesh: u16,
	pub mesh_tree_index: u32,
	pub frame_offset: u32,
	pub animation_index: Option<NonMaxU16>,
}

impl RawMoveable {
	pub(crate) fn read<R: Read + Seek>(
		cursor: &mut ByteCursor<R>,
		version: Version,
		diagnostics: &mut Diagnostics,
	) -> Result<Self> {
		let moveable = RawMoveable {
			object_id: cursor.read_u32()?,
			num_meshes: cursor.read_u16()?,
			starting_mesh: cursor.read_u16()?,
			mesh_tree_index: cursor.read_u32()?,
			frame_offset: cursor.read_u32()?,
			animation_index: Option::<NonMaxU16>::read(cursor)?,
		};
		if version == Version::Tr5 {
			diagnostics.expect_value("moveable", "filler", cursor.read_u16()?, &[0xFFEF]);
		}
		Ok(moveable)
	}
	
	pub(crate) fn resolve(self, frame_index: usize) -> Moveable {
		Moveable {
			object_id: self.object_id,
			num_meshes: self.num_meshes,
			starting_mesh: self.starting_mesh,
			mesh_tree_index: self.mesh_tree_index,
			frame_index,
			animation_index: self.animation_index,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRotation {
	X(u16),
	Y(u16),
	Z(u16),
	/// Units are 1/1024th of a rotation
	All(U16Vec3),
}

/// Keyframe at the start of a moveable's animation data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
	pub bound_box: MinMax<I16Vec3>,
	pub offset: I16Vec3,
	/// One per mesh, in mesh order
	pub rotations: Box<[FrameRotation]>,
	/// Word index into frame_data
	pub frame_data_index: usize,
}

const FRAME_HEADER_WORDS: usize = 9;

fn all_axes(word1: u16, word2: u16) -> FrameRotation {
	FrameRotation::All(U16Vec3 {
		x: (word1 >> 4) & 1023,
		y: ((word1 & 15) << 6) | (word2 >> 10),
		z: word2 & 1023,
	})
}

impl Frame {
	/// Decodes the frame starting at word `start`. Data running past `frame_data` is reported and
	/// the frame keeps what was read.
	pub(crate) fn decode(
		frame_data: &[u16],
		start: usize,
		num_meshes: u16,
		version: Version,
		diagnostics: &mut Diagnostics,
	) -> Self {
		let mut frame = Frame {
			bound_box: MinMax { min: I16Vec3::ZERO, max: I16Vec3::ZERO },
			offset: I16Vec3::ZERO,
			rotations: Box::default(),
			frame_data_index: start,
		};
		let header = match frame_data.get(start..start + FRAME_HEADER_WORDS) {
			Some(header) => header,
			None => {
				diagnostics.violation("frame", format!("header at word {} past {} words", start, frame_data.len()));
				return frame;
			},
		};
		let vec = |i: usize| I16Vec3::new(header[i] as i16, header[i + 1] as i16, header[i + 2] as i16);
		frame.bound_box = MinMax { min: vec(0), max: vec(3) };
		frame.offset = vec(6);
		let mut pos = start + FRAME_HEADER_WORDS;
		let mut num_rotations = num_meshes as usize;
		if version == Version::Tr1 {
			match frame_data.get(pos) {
				Some(&count) => {
					if count != num_meshes {
						diagnostics.violation("frame", format!("{} rotations for {} meshes", count, num_meshes));
					}
					num_rotations = count as usize;
					pos += 1;
				},
				None => num_rotations = 0,
			}
		}
		let mut rotations = Vec::with_capacity(num_rotations.min(frame_data.len()));
		for _ in 0..num_rotations {
			let rotation = match (version, frame_data.get(pos), frame_data.get(pos + 1)) {
				(Version::Tr1, Some(&low), Some(&high)) => {
					pos += 2;
					all_axes(high, low)
				},
				(Version::Tr1, ..) | (_, None, _) => break,
				(_, Some(&word), next) => match word >> 14 {
					0 => match next {
						Some(&word2) => {
							pos += 2;
							all_axes(word, word2)
						},
						None => break,
					},
					axis => {
						pos += 1;
						let angle = word & version.single_rotation_mask();
						match axis {
							1 => FrameRotation::X(angle),
							2 => FrameRotation::Y(angle),
							_ => FrameRotation::Z(angle),
						}
					},
				},
			};
			rotations.push(rotation);
		}
		if rotations.len() < num_rotations {
			diagnostics.violation(
				"frame",
				format!("frame at word {} has {} of {} rotations", start, rotations.len(), num_rotations),
			);
		}
		frame.rotations = rotations.into_boxed_slice();
		frame
	}
}

/// TR3 frame sizes are unreliable; derive them from the rotation count word after each frame header.
pub(crate) fn correct_tr3_frame_sizes(animations: &mut [Animation], frame_data: &[u16], diagnostics: &mut Diagnostics) {
	for (index, animation) in animations.iter_mut().enumerate() {
		let word = animation.frame_offset as usize / 2 + FRAME_HEADER_WORDS;
		match frame_data.get(word) {
			Some(&count) => animation.frame_size = count.wrapping_mul(2).wrapping_add(10),
			None => diagnostics.violation(
				"animation",
				format!("animation {} frame offset {:#x} past frame data", index, animation.frame_offset),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	
	const HEADER: [u16; 9] = [0xFFF6, 0xFFEC, 0xFFE2, 10, 20, 30, 1, 2, 3];
	
	#[test]
	fn tr2_mixed_rotations() {
		let mut data = HEADER.to_vec();
		data.extend([0x0123, 0x4567, 0x4000 | 1000, 0x8000 | 2047, 0xC000 | 5]);
		let mut diagnostics = Diagnostics::new();
		let frame = Frame::decode(&data, 0, 4, Version::Tr2, &mut diagnostics);
		assert!(diagnostics.is_empty());
		assert_eq!(frame.bound_box.min, I16Vec3::new(-10, -20, -30));
		assert_eq!(frame.offset, I16Vec3::new(1, 2, 3));
		assert_eq!(&frame.rotations[..], &[
			FrameRotation::All(U16Vec3::new(0x012, (3 << 6) | (0x4567 >> 10), 0x4567 & 1023)),
			FrameRotation::X(1000),
			FrameRotation::Y(1023),
			FrameRotation::Z(5),
		]);
	}
	
	#[test]
	fn tr4_single_axis_mask_is_wider() {
		let mut data = HEADER.to_vec();
		data.push(0x8000 | 4000);
		let frame = Frame::decode(&data, 0, 1, Version::Tr4, &mut Diagnostics::new());
		assert_eq!(&frame.rotations[..], &[FrameRotation::Y(4000)]);
	}
	
	#[test]
	fn tr1_swaps_words_and_reads_count() {
		let mut data = vec![0; 2];
		data.extend(HEADER);
		data.extend([1, 0x4567, 0x0123]);
		let mut diagnostics = Diagnostics::new();
		let frame = Frame::decode(&data, 2, 1, Version::Tr1, &mut diagnostics);
		assert!(diagnostics.is_empty());
		assert_eq!(frame.frame_data_index, 2);
		assert_eq!(&frame.rotations[..], &[all_axes(0x0123, 0x4567)]);
	}
	
	#[test]
	fn short_frame_keeps_what_was_read() {
		let mut data = HEADER.to_vec();
		data.push(0x4000 | 7);
		let mut diagnostics = Diagnostics::new();
		let frame = Frame::decode(&data, 0, 3, Version::Tr3, &mut diagnostics);
		assert_eq!(&frame.rotations[..], &[FrameRotation::X(7)]);
		assert_eq!(diagnostics.warnings().len(), 1);
		let frame = Frame::decode(&data, 8, 3, Version::Tr3, &mut diagnostics);
		assert!(frame.rotations.is_empty());
		assert_eq!(diagnostics.warnings().len(), 2);
	}
	
	#[test]
	fn tr3_frame_size_from_rotation_count() {
		let mut data = vec![0u16; 20];
		data[2 + 9] = 4;
		let mut animations = [
			Animation { frame_offset: 4, frame_size: 99, ..Default::default() },
			Animation { frame_offset: 400, frame_size: 7, ..Default::default() },
		];
		let mut diagnostics = Diagnostics::new();
		correct_tr3_frame_sizes(&mut animations, &data, &mut diagnostics);
		assert_eq!(animations[0].frame_size, 18);
		assert_eq!(animations[1].frame_size, 7);
		assert_eq!(diagnostics.warnings().len(), 1);
	}
}
