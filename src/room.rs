use std::io::{Read, Seek};
use bitfield::bitfield;
use glam::{I16Vec3, IVec3, Vec3};
use log::trace;
use nonmax::{NonMaxU8, NonMaxU16};
use shared::MinMax;
use crate::{
	color::{Color3, Rgba}, mesh::{read_faces, Quad, Triangle}, read_boxed_slice, read_list, ByteCursor,
	Diagnostics, Readable, Result, Version,
};

const XELA: u32 = u32::from_le_bytes(*b"XELA");
const SEPARATOR: u32 = 0xCDCDCDCD;
const TR5_HEADER_SIZE: u64 = 208;
const TR5_VERTEX_SIZE: u32 = 28;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomVertex {
	/// Relative to the room, world coordinates in TR5
	pub pos: Vec3,
	pub lighting1: i16,
	pub attributes: u16,
	pub lighting2: i16,
	/// TR5 only
	pub normal: Option<Vec3>,
	pub colour: Rgba,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomSprite {
	/// Index into Room.vertices
	pub vertex: u16,
	/// Index into sprite_textures
	pub texture: u16,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Portal {
	/// Index into rooms
	pub adjoining_room: u16,
	pub normal: I16Vec3,
	/// Relative to the room
	pub vertices: [I16Vec3; 4],
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sector {
	/// Index into floor_data
	pub floor_data_index: u16,
	/// Box index, packed with a material in TR3+; see `box_index`
	pub box_data: u16,
	/// Index into rooms
	pub room_below: Option<NonMaxU8>,
	pub floor: i8,
	/// Index into rooms
	pub room_above: Option<NonMaxU8>,
	pub ceiling: i8,
}

impl Sector {
	/// Index into boxes, `None` for sectors without one.
	pub fn box_index(&self, version: Version) -> Option<u16> {
		match version {
			Version::Tr1 | Version::Tr2 => (self.box_data != 0xFFFF).then_some(self.box_data),
			_ => Some((self.box_data >> 4) & 0x7FF).filter(|&index| index != 0x7FF),
		}
	}
	
	/// Footstep sound, TR3+.
	pub fn material(&self, version: Version) -> Option<u16> {
		(version >= Version::Tr3).then_some(self.box_data & 15)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoomAmbient {
	pub intensity1: i16,
	pub intensity2: i16,
	/// TR2 only
	pub light_mode: i16,
	/// TR4/5 only
	pub colour: Option<Rgba>,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct Tr1Light {
	/// World coords
	pub pos: IVec3,
	pub intensity: u16,
	pub fade: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct Tr2Light {
	/// World coords
	pub pos: IVec3,
	pub intensity1: u16,
	pub intensity2: u16,
	pub fade1: u32,
	pub fade2: u32,
}

#[derive(Clone, Copy, Debug)]
pub enum Tr3LightKind {
	Sun { normal: I16Vec3 },
	Point { intensity: i32, fade: i32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Tr3Light {
	/// World coords
	pub pos: IVec3,
	pub colour: Color3,
	pub kind: Tr3LightKind,
}

impl Readable for Tr3Light {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		let pos = IVec3::read(cursor)?;
		let colour = Color3::read(cursor)?;
		let kind = match cursor.read_u8()? {
			0 => {
				let normal = I16Vec3::read(cursor)?;
				cursor.skip(2)?;
				Tr3LightKind::Sun { normal }
			},
			_ => Tr3LightKind::Point { intensity: cursor.read_i32()?, fade: cursor.read_i32()? },
		};
		Ok(Tr3Light { pos, colour, kind })
	}
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct Tr4Light {
	/// World coords
	pub pos: IVec3,
	pub colour: Color3,
	pub light_type: u8,
	pub unknown: u8,
	pub intensity: u8,
	pub hotspot: f32,
	pub falloff: f32,
	pub length: f32,
	pub cutoff: f32,
	pub direction: Vec3,
}

#[derive(Readable, Clone, Copy, Debug)]
#[skip_after(3)]
pub struct Tr5Light {
	pub pos: Vec3,
	pub colour: Vec3,
	#[skip(4)]
	pub in_value: f32,
	pub out_value: f32,
	pub radius_in: f32,
	pub radius_out: f32,
	pub range: f32,
	pub direction: Vec3,
	pub pos2: IVec3,
	pub direction2: IVec3,
	pub light_type: u8,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct FogBulb {
	pub pos: Vec3,
	pub colour: Vec3,
	#[skip(4)]
	pub in_value: f32,
	pub out_value: f32,
}

#[derive(Clone, Copy, Debug)]
pub enum RoomLight {
	Tr1(Tr1Light),
	Tr2(Tr2Light),
	Tr3(Tr3Light),
	Tr4(Tr4Light),
	Tr5(Tr5Light),
}

impl RoomLight {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		Ok(match version {
			Version::Tr1 => RoomLight::Tr1(Tr1Light::read(cursor)?),
			Version::Tr2 => RoomLight::Tr2(Tr2Light::read(cursor)?),
			Version::Tr3 => RoomLight::Tr3(Tr3Light::read(cursor)?),
			Version::Tr4 => RoomLight::Tr4(Tr4Light::read(cursor)?),
			Version::Tr5 => RoomLight::Tr5(Tr5Light::read(cursor)?),
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomStaticMesh {
	/// World coords
	pub pos: IVec3,
	/// Units are 1/65536th of a rotation
	pub rotation: u16,
	pub intensity1: u16,
	/// Equal to `intensity1` in TR1
	pub intensity2: u16,
	/// Id into static_meshes
	pub object_id: u16,
}

impl RoomStaticMesh {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let pos = IVec3::read(cursor)?;
		let rotation = cursor.read_u16()?;
		let intensity1 = cursor.read_u16()?;
		let intensity2 = match version {
			Version::Tr1 => intensity1,
			_ => cursor.read_u16()?,
		};
		let object_id = cursor.read_u16()?;
		Ok(RoomStaticMesh { pos, rotation, intensity1, intensity2, object_id })
	}
}

/// TR5 geometry group. Its faces index the room's vertices after the vertices of earlier layers.
#[derive(Readable, Clone, Copy, Debug)]
#[skip_after(16)]
pub struct RoomLayer {
	pub num_vertices: u32,
	#[skip(2)]
	pub num_quads: u16,
	pub num_triangles: u16,
	#[skip(6)]
	pub bound_box: MinMax<Vec3>,
}

bitfield! {
	#[derive(Readable, Clone, Copy, PartialEq, Eq)]
	pub struct RoomFlags(u16);
	impl Debug;
	pub water, _: 0;
	/// Sky visible
	pub outside, _: 3;
	/// Lara's hair blows
	pub wind, _: 5;
}

impl RoomFlags {
	pub fn raw(self) -> u16 {
		self.0
	}
}

#[derive(Clone, Debug)]
pub struct Room {
	/// World coords; y is 0 before TR5
	pub offset: IVec3,
	pub y_bottom: i32,
	pub y_top: i32,
	pub vertices: Box<[RoomVertex]>,
	/// Index into Room.vertices
	pub quads: Box<[Quad]>,
	/// Index into Room.vertices
	pub triangles: Box<[Triangle]>,
	pub sprites: Box<[RoomSprite]>,
	pub portals: Box<[Portal]>,
	pub num_zsectors: u16,
	pub num_xsectors: u16,
	/// `num_xsectors * num_zsectors` sectors, x-major
	pub sectors: Box<[Sector]>,
	pub ambient: RoomAmbient,
	pub lights: Box<[RoomLight]>,
	/// TR5 only
	pub fog_bulbs: Box<[FogBulb]>,
	pub static_meshes: Box<[RoomStaticMesh]>,
	/// Index into rooms
	pub alternate_room: Option<NonMaxU16>,
	pub flags: RoomFlags,
	/// TR3+
	pub water_scheme: u16,
	/// TR3+
	pub reverb_info: u8,
	/// TR3+
	pub alternate_group: u8,
	/// TR5 only
	pub layers: Box<[RoomLayer]>,
}

impl Room {
	pub fn sector(&self, x: u16, z: u16) -> Option<&Sector> {
		if x >= self.num_xsectors || z >= self.num_zsectors {
			return None;
		}
		self.sectors.get(x as usize * self.num_zsectors as usize + z as usize)
	}
}

fn read_classic_vertex<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<RoomVertex> {
	let pos = I16Vec3::read(cursor)?.as_vec3();
	let lighting1 = cursor.read_i16()?;
	let (attributes, lighting2) = match version {
		Version::Tr1 => (0, lighting1),
		_ => (cursor.read_u16()?, cursor.read_i16()?),
	};
	let colour = match version {
		Version::Tr1 => Rgba::from_inverted_intensity(lighting1),
		Version::Tr2 => Rgba::from_inverted_intensity(lighting2),
		_ => Rgba::from_rgb555(lighting2 as u16),
	};
	Ok(RoomVertex { pos, lighting1, attributes, lighting2, normal: None, colour })
}

fn read_tr5_vertex<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<RoomVertex> {
	let pos = Vec3::read(cursor)?;
	let normal = Vec3::read(cursor)?;
	let colour = Rgba::from_argb(cursor.read_u32()?);
	Ok(RoomVertex { pos, lighting1: 0, attributes: 0, lighting2: 0, normal: Some(normal), colour })
}

fn read_sectors<R: Read + Seek>(cursor: &mut ByteCursor<R>, num_zsectors: u16, num_xsectors: u16) -> Result<Box<[Sector]>> {
	read_boxed_slice(cursor, num_zsectors as usize * num_xsectors as usize)
}

fn read_lights<R: Read + Seek>(cursor: &mut ByteCursor<R>, len: usize, version: Version) -> Result<Box<[RoomLight]>> {
	(0..len).map(|_| RoomLight::read(cursor, version)).collect()
}

fn read_static_meshes<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	len: usize,
	version: Version,
) -> Result<Box<[RoomStaticMesh]>> {
	(0..len).map(|_| RoomStaticMesh::read(cursor, version)).collect()
}

pub(crate) fn read_room<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	version: Version,
	diagnostics: &mut Diagnostics,
) -> Result<Room> {
	match version {
		Version::Tr5 => read_tr5_room(cursor, diagnostics),
		_ => read_classic_room(cursor, version, diagnostics),
	}
}

/// TR1-4 layout: a size-prefixed geometry block followed by sequential sections.
fn read_classic_room<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	version: Version,
	diagnostics: &mut Diagnostics,
) -> Result<Room> {
	let x = cursor.read_i32()?;
	let z = cursor.read_i32()?;
	let y_bottom = cursor.read_i32()?;
	let y_top = cursor.read_i32()?;
	let num_data_words = cursor.read_u32()?;
	let geometry_start = cursor.tell();
	let geometry_end = geometry_start + num_data_words as u64 * 2;
	let num_vertices = cursor.read_u16()? as usize;
	let vertices = (0..num_vertices).map(|_| read_classic_vertex(cursor, version)).collect::<Result<_>>()?;
	let num_quads = cursor.read_u16()? as usize;
	let quads = read_faces(cursor, num_quads, false)?;
	let num_triangles = cursor.read_u16()? as usize;
	let triangles = read_faces(cursor, num_triangles, false)?;
	let sprites = read_list::<_, _, u16>(cursor)?;
	if cursor.tell() > geometry_end {
		diagnostics.violation(
			"room",
			format!(
				"geometry at {:#x} runs {} bytes past its declared {} words",
				geometry_start,
				cursor.tell() - geometry_end,
				num_data_words,
			),
		);
	}
	cursor.seek(geometry_end)?;
	let portals = read_list::<_, _, u16>(cursor)?;
	let num_zsectors = cursor.read_u16()?;
	let num_xsectors = cursor.read_u16()?;
	let sectors = read_sectors(cursor, num_zsectors, num_xsectors)?;
	let ambient = match version {
		Version::Tr1 => {
			let intensity = cursor.read_i16()?;
			RoomAmbient { intensity1: intensity, intensity2: intensity, ..Default::default() }
		},
		Version::Tr2 => RoomAmbient {
			intensity1: cursor.read_i16()?,
			intensity2: cursor.read_i16()?,
			light_mode: cursor.read_i16()?,
			colour: None,
		},
		Version::Tr3 => RoomAmbient {
			intensity1: cursor.read_i16()?,
			intensity2: cursor.read_i16()?,
			..Default::default()
		},
		_ => {
			let argb = cursor.read_u32()?;
			RoomAmbient {
				intensity1: argb as i16,
				intensity2: (argb >> 16) as i16,
				light_mode: 0,
				colour: Some(Rgba::from_argb(argb)),
			}
		},
	};
	let num_lights = cursor.read_u16()? as usize;
	let lights = read_lights(cursor, num_lights, version)?;
	let num_static_meshes = cursor.read_u16()? as usize;
	let static_meshes = read_static_meshes(cursor, num_static_meshes, version)?;
	let alternate_room = Option::<NonMaxU16>::read(cursor)?;
	let flags = RoomFlags::read(cursor)?;
	let (water_scheme, reverb_info, alternate_group) = match version {
		Version::Tr3 | Version::Tr4 => (cursor.read_u8()? as u16, cursor.read_u8()?, cursor.read_u8()?),
		_ => (0, 0, 0),
	};
	trace!("room at ({}, {}): {} vertices, {} sectors", x, z, num_vertices, sectors.len());
	Ok(Room {
		offset: IVec3::new(x, 0, z),
		y_bottom,
		y_top,
		vertices,
		quads,
		triangles,
		sprites,
		portals,
		num_zsectors,
		num_xsectors,
		sectors,
		ambient,
		lights,
		fog_bulbs: Box::default(),
		static_meshes,
		alternate_room,
		flags,
		water_scheme,
		reverb_info,
		alternate_group,
		layers: Box::default(),
	})
}

/// TR5 layout: "XELA", a size, then a fixed header whose offsets locate each section relative to
/// the end of the header.
fn read_tr5_room<R: Read + Seek>(cursor: &mut ByteCursor<R>, diagnostics: &mut Diagnostics) -> Result<Room> {
	const SECTION: &str = "tr5 room";
	let marker = cursor.read_u32()?;
	diagnostics.expect_value(SECTION, "marker", marker, &[XELA]);
	let room_data_size = cursor.read_u32()?;
	let header_start = cursor.tell();
	let room_end = header_start + room_data_size as u64;
	let data_start = header_start + TR5_HEADER_SIZE;
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	let _end_sector_offset = cursor.read_u32()?;
	let sector_offset = cursor.read_u32()?;
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[0, SEPARATOR]);
	let static_mesh_offset = cursor.read_u32()?;
	let offset = IVec3::read(cursor)?;
	let y_bottom = cursor.read_i32()?;
	let y_top = cursor.read_i32()?;
	let num_zsectors = cursor.read_u16()?;
	let num_xsectors = cursor.read_u16()?;
	let colour = Rgba::from_argb(cursor.read_u32()?);
	let num_lights = cursor.read_u16()?;
	let num_static_meshes = cursor.read_u16()? as usize;
	let reverb_info = cursor.read_u8()?;
	let alternate_group = cursor.read_u8()?;
	let water_scheme = cursor.read_u16()?;
	for _ in 0..2 {
		diagnostics.expect_value(SECTION, "filler", cursor.read_u32()?, &[0x00007FFF]);
	}
	for _ in 0..2 {
		diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	}
	diagnostics.expect_value(SECTION, "filler", cursor.read_u32()?, &[0xFFFFFFFF]);
	let alternate_room = Option::<NonMaxU16>::read(cursor)?;
	let flags = RoomFlags::read(cursor)?;
	cursor.skip(12)?;
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	cursor.skip(4)?;
	let _float_offset = Vec3::read(cursor)?;
	for _ in 0..4 {
		diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	}
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[0, SEPARATOR]);
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	let num_triangles = cursor.read_u32()?;
	let num_quads = cursor.read_u32()?;
	diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[0]);
	let _light_data_size = cursor.read_u32()?;
	let num_lights2 = cursor.read_u32()?;
	if num_lights2 != num_lights as u32 {
		diagnostics.violation(SECTION, format!("light counts disagree: {} and {}", num_lights, num_lights2));
	}
	let num_fog_bulbs = cursor.read_u32()? as usize;
	cursor.skip(8)?;//y_top, y_bottom repeated
	let num_layers = cursor.read_u32()? as usize;
	let layer_offset = cursor.read_u32()?;
	let vertex_offset = cursor.read_u32()?;
	let poly_offset = cursor.read_u32()?;
	let poly_offset2 = cursor.read_u32()?;
	if poly_offset != poly_offset2 {
		diagnostics.violation(SECTION, format!("polygon offsets disagree: {:#x} and {:#x}", poly_offset, poly_offset2));
	}
	let num_vertex_bytes = cursor.read_u32()?;
	if num_vertex_bytes % TR5_VERTEX_SIZE != 0 {
		diagnostics.violation(SECTION, format!("vertex block of {} bytes is not whole vertices", num_vertex_bytes));
	}
	for _ in 0..4 {
		diagnostics.expect_value(SECTION, "separator", cursor.read_u32()?, &[SEPARATOR]);
	}
	
	cursor.seek(data_start)?;
	let lights = read_lights(cursor, num_lights as usize, Version::Tr5)?;
	let fog_bulbs = read_boxed_slice(cursor, num_fog_bulbs)?;
	cursor.seek(data_start + sector_offset as u64)?;
	let sectors = read_sectors(cursor, num_zsectors, num_xsectors)?;
	let portals = read_list::<_, _, u16>(cursor)?;
	cursor.seek(data_start + static_mesh_offset as u64)?;
	let static_meshes = read_static_meshes(cursor, num_static_meshes, Version::Tr5)?;
	cursor.seek(data_start + layer_offset as u64)?;
	let layers = read_boxed_slice::<_, RoomLayer>(cursor, num_layers)?;
	
	cursor.seek(data_start + poly_offset as u64)?;
	let mut quads = Vec::new();
	let mut triangles = Vec::new();
	let mut vertex_base = 0u32;
	for (index, layer) in layers.iter().enumerate() {
		let mut layer_quads = read_faces::<_, 4>(cursor, layer.num_quads as usize, true)?;
		let mut layer_triangles = read_faces::<_, 3>(cursor, layer.num_triangles as usize, true)?;
		let overflows = layer_quads
			.iter_mut()
			.flat_map(|face| face.vertices.iter_mut())
			.chain(layer_triangles.iter_mut().flat_map(|face| face.vertices.iter_mut()))
			.map(|vertex| rebase_vertex(vertex, vertex_base))
			.filter(Option::is_none)
			.count();
		if overflows > 0 {
			diagnostics.violation(
				SECTION,
				format!("layer {}: {} face indices overflow from vertex base {}", index, overflows, vertex_base),
			);
		}
		quads.extend(layer_quads.into_vec());
		triangles.extend(layer_triangles.into_vec());
		vertex_base = match vertex_base.checked_add(layer.num_vertices) {
			Some(base) => base,
			None => {
				diagnostics.violation(SECTION, format!("layer {} vertex count {} overflows", index, layer.num_vertices));
				u32::MAX
			},
		};
	}
	if quads.len() != num_quads as usize || triangles.len() != num_triangles as usize {
		diagnostics.violation(
			SECTION,
			format!(
				"layers hold {} quads and {} triangles, header declares {} and {}",
				quads.len(),
				triangles.len(),
				num_quads,
				num_triangles,
			),
		);
	}
	
	cursor.seek(data_start + vertex_offset as u64)?;
	let num_vertices = num_vertex_bytes / TR5_VERTEX_SIZE;
	let vertices = (0..num_vertices).map(|_| read_tr5_vertex(cursor)).collect::<Result<_>>()?;
	cursor.seek(room_end)?;
	trace!("tr5 room at {:?}: {} layers, {} vertices", offset, layers.len(), num_vertices);
	Ok(Room {
		offset,
		y_bottom,
		y_top,
		vertices,
		quads: quads.into_boxed_slice(),
		triangles: triangles.into_boxed_slice(),
		sprites: Box::default(),
		portals,
		num_zsectors,
		num_xsectors,
		sectors,
		ambient: RoomAmbient { colour: Some(colour), ..Default::default() },
		lights,
		fog_bulbs,
		static_meshes,
		alternate_room,
		flags,
		water_scheme,
		reverb_info,
		alternate_group,
		layers,
	})
}

/// Offsets a layer-local index by the vertices of earlier layers. Out-of-range results keep the local index.
fn rebase_vertex(vertex: &mut u16, vertex_base: u32) -> Option<()> {
	let rebased = vertex_base.checked_add(*vertex as u32).and_then(|v| u16::try_from(v).ok())?;
	*vertex = rebased;
	Some(())
}
