use std::io::{Read, Seek};
use bitfield::bitfield;
use glam::I16Vec3;
use shared::MinMax;
use crate::{read_boxed_slice, ByteCursor, Readable, Result, Version};

bitfield! {
	#[derive(Readable, Clone, Copy, PartialEq, Eq)]
	pub struct FaceTexture(u16);
	impl Debug;
	/// Index into object_textures, for textured faces
	pub texture_index, _: 14, 0;
	pub double_sided, _: 15;
	/// Index into the 8-bit palette, for coloured faces
	pub palette8_index, _: 7, 0;
	/// Index into the 16-bit palette, for coloured faces
	pub palette16_index, _: 15, 8;
}

impl FaceTexture {
	pub fn raw(self) -> u16 {
		self.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face<const N: usize> {
	/// Indices into the owning vertex list
	pub vertices: [u16; N],
	pub texture: FaceTexture,
	/// TR4/5 mesh faces and TR5 room faces only, otherwise 0
	pub effects: u16,
}

pub type Quad = Face<4>;
pub type Triangle = Face<3>;

impl<const N: usize> Face<N> {
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, with_effects: bool) -> Result<Self> {
		let vertices = <[u16; N]>::read(cursor)?;
		let texture = FaceTexture::read(cursor)?;
		let effects = match with_effects {
			true => cursor.read_u16()?,
			false => 0,
		};
		Ok(Face { vertices, texture, effects })
	}
}

pub(crate) fn read_faces<R: Read + Seek, const N: usize>(
	cursor: &mut ByteCursor<R>,
	len: usize,
	with_effects: bool,
) -> Result<Box<[Face<N>]>> {
	let mut faces = Vec::with_capacity(len.min(cursor.remaining() as usize));
	for _ in 0..len {
		faces.push(Face::read(cursor, with_effects)?);
	}
	Ok(faces.into_boxed_slice())
}

/// Per-vertex lighting of a mesh, tagged on disk by the sign of its count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshLighting {
	Normals(Box<[I16Vec3]>),
	Lights(Box<[i16]>),
}

impl Readable for MeshLighting {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		Ok(match cursor.read_i16()? {
			num if num >= 0 => MeshLighting::Normals(read_boxed_slice(cursor, num as usize)?),
			num => MeshLighting::Lights(read_boxed_slice(cursor, num.unsigned_abs() as usize)?),
		})
	}
}

#[derive(Clone, Debug)]
pub struct Mesh {
	/// Relative to the owning object
	pub center: I16Vec3,
	pub collision_size: i32,
	pub vertices: Box<[I16Vec3]>,
	pub lighting: MeshLighting,
	pub textured_quads: Box<[Quad]>,
	pub textured_triangles: Box<[Triangle]>,
	/// TR1-3 only
	pub coloured_quads: Box<[Quad]>,
	/// TR1-3 only
	pub coloured_triangles: Box<[Triangle]>,
}

impl Mesh {
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let center = I16Vec3::read(cursor)?;
		let collision_size = cursor.read_i32()?;
		let num_vertices = cursor.read_i16()?.max(0) as usize;
		let vertices = read_boxed_slice(cursor, num_vertices)?;
		let lighting = MeshLighting::read(cursor)?;
		let with_effects = version >= Version::Tr4;
		let num_quads = cursor.read_i16()?.max(0) as usize;
		let textured_quads = read_faces(cursor, num_quads, with_effects)?;
		let num_triangles = cursor.read_i16()?.max(0) as usize;
		let textured_triangles = read_faces(cursor, num_triangles, with_effects)?;
		let (coloured_quads, coloured_triangles) = match with_effects {
			true => (Box::default(), Box::default()),
			false => {
				let num_quads = cursor.read_i16()?.max(0) as usize;
				let quads = read_faces(cursor, num_quads, false)?;
				let num_triangles = cursor.read_i16()?.max(0) as usize;
				(quads, read_faces(cursor, num_triangles, false)?)
			},
		};
		Ok(Mesh {
			center,
			collision_size,
			vertices,
			lighting,
			textured_quads,
			textured_triangles,
			coloured_quads,
			coloured_triangles,
		})
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundBox {
	pub x: MinMax<i16>,
	pub y: MinMax<i16>,
	pub z: MinMax<i16>,
}

/// Non-animated object type, placed in rooms by `RoomStaticMesh`.
#[derive(Readable, Clone, Copy, Debug)]
pub struct StaticMesh {
	pub object_id: u32,
	/// Mesh table slot, see `LevelData::mesh`
	pub mesh: u16,
	pub visibility: BoundBox,
	pub collision: BoundBox,
	pub flags: u16,
}
