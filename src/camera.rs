use glam::{I16Vec3, IVec3};
use crate::Readable;

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
	/// World coords
	pub pos: IVec3,
	/// Index into rooms
	pub room: i16,
	pub flags: u16,
}

/// TR4/5 scripted camera path node.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlybyCamera {
	/// World coords
	pub pos: IVec3,
	pub direction: IVec3,
	pub sequence: u8,
	pub index: u8,
	pub fov: u16,
	pub roll: i16,
	pub timer: u16,
	pub speed: u16,
	pub flags: u16,
	/// Index into rooms
	pub room: u32,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundSource {
	/// World coords
	pub pos: IVec3,
	/// Index into sound_map
	pub sound_id: u16,
	pub flags: u16,
}

/// TR1-3 cutscene camera key.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CinematicFrame {
	pub target: I16Vec3,
	pub pos: I16Vec3,
	pub fov: i16,
	pub roll: i16,
}
