#![allow(dead_code)]

use std::io::Write;
use byteorder::{WriteBytesExt, LE};
use flate2::{write::ZlibEncoder, Compression};
use tr_level::Version;

pub const TEXTILE_PIXELS: usize = 256 * 256;
pub const SAMPLE_INDEX: u32 = 42;
pub const TWO_CLIPS: &[u8] = b"RIFF\x04\0\0\0WAVERIFF\x04\0\0\0WAVE";
pub const THREE_CLIPS: &[u8] = b"RIFF\x04\0\0\0WAVERIFF\x04\0\0\0WAVERIFF\x04\0\0\0WAVE";
/// Word 9 of the single frame: the first rotation in TR2+
pub const FIRST_ROTATION: u16 = 0x4000 | 5;

pub fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(data).unwrap();
	encoder.finish().unwrap()
}

#[derive(Default)]
pub struct Writer(pub Vec<u8>);

macro_rules! write_le {
	($name:ident, $func:ident, $type:ty) => {
		pub fn $name(&mut self, v: $type) -> &mut Self {
			self.0.$func::<LE>(v).unwrap();
			self
		}
	};
}

impl Writer {
	pub fn u8(&mut self, v: u8) -> &mut Self {
		self.0.write_u8(v).unwrap();
		self
	}
	
	write_le!(u16, write_u16, u16);
	write_le!(i16, write_i16, i16);
	write_le!(u32, write_u32, u32);
	write_le!(i32, write_i32, i32);
	write_le!(f32, write_f32, f32);
	
	pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.0.extend_from_slice(bytes);
		self
	}

	pub fn zeros(&mut self, len: usize) -> &mut Self {
		self.0.resize(self.0.len() + len, 0);
		self
	}

	/// Sizes then the zlib stream, with `cut` bytes removed from its end.
	pub fn compressed(&mut self, data: &[u8], cut: usize) -> &mut Self {
		let mut payload = zlib(data);
		payload.truncate(payload.len() - cut);
		self.u32(data.len() as u32).u32(payload.len() as u32).bytes(&payload)
	}
}

/// What a fixture level holds. `extras` adds one animation, two moveables sharing a frame, an object
/// texture, a box, a sound detail and samples.
#[derive(Clone, Copy, Debug)]
pub struct Contents {
	pub rooms: usize,
	pub meshes: usize,
	pub items: usize,
	pub extras: bool,
	/// Vertex counts of the two TR5 room layers
	pub layer_vertices: [u32; 2],
}

impl Contents {
	pub const EMPTY: Contents = Contents { rooms: 0, meshes: 0, items: 0, extras: false, layer_vertices: [2, 1] };

	pub fn new(rooms: usize, meshes: usize, items: usize) -> Self {
		Contents { rooms, meshes, items, extras: true, ..Contents::EMPTY }
	}
}

fn classic_room(w: &mut Writer, version: Version) {
	w.i32(1024).i32(2048).i32(0).i32(-1024);
	let vertex_words = if version == Version::Tr1 { 4 } else { 6 };
	w.u32(1 + vertex_words + 1 + 5 + 1 + 1);
	w.u16(1).i16(0).i16(-256).i16(0).i16(0);
	if version != Version::Tr1 {
		w.u16(0).i16(0);
	}
	w.u16(1).u16(0).u16(0).u16(0).u16(0).u16(0);//one quad
	w.u16(0).u16(0);//triangles, sprites
	w.u16(0);//portals
	w.u16(1).u16(1);
	w.u16(0).u16(0xFFFF).u16(0x81FF).u16(0x7FFF);
	match version {
		Version::Tr1 => {
			w.i16(0);
		},
		Version::Tr2 => {
			w.i16(0).i16(0).i16(0);
		},
		Version::Tr3 => {
			w.i16(0).i16(0);
		},
		_ => {
			w.u32(0xFF808080);
		},
	}
	w.u16(0).u16(0);//lights, static meshes
	w.i16(-1).u16(0);
	if matches!(version, Version::Tr3 | Version::Tr4) {
		w.u8(0).u8(0).u8(0);
	}
}

/// Two layers: two vertices and a quad, then one vertex and a triangle.
pub const TR5_ROOM_TRIANGLE: [u16; 3] = [2, 2, 2];

fn tr5_room(w: &mut Writer, layer_vertices: [u32; 2]) {
	const SEP: u32 = 0xCDCDCDCD;
	const LAYERS: u32 = 10;
	const POLYS: u32 = LAYERS + 2 * 56;
	const VERTICES: u32 = POLYS + 12 + 10;
	w.bytes(b"XELA").u32(208 + VERTICES + 3 * 28);
	w.u32(SEP).u32(8).u32(0).u32(SEP).u32(LAYERS);
	w.i32(1024).i32(0).i32(2048).i32(0).i32(-1024);
	w.u16(1).u16(1).u32(0xFF808080);
	w.u16(0).u16(0);//lights, static meshes
	w.u8(0).u8(0).u16(0);
	w.u32(0x7FFF).u32(0x7FFF).u32(SEP).u32(SEP).u32(0xFFFFFFFF);
	w.i16(-1).u16(0);
	w.zeros(12).u32(SEP).zeros(4);
	w.f32(1024.0).f32(0.0).f32(2048.0);
	w.u32(SEP).u32(SEP).u32(SEP).u32(SEP).u32(0).u32(SEP);
	w.u32(1).u32(1);//triangles, quads
	w.u32(0).u32(0).u32(0).u32(0);//separator, light bytes, lights, fog bulbs
	w.i32(-1024).i32(0);
	w.u32(2).u32(LAYERS).u32(VERTICES).u32(POLYS).u32(POLYS);
	w.u32(3 * 28);
	w.u32(SEP).u32(SEP).u32(SEP).u32(SEP);
	//data
	w.u16(0).u16(0xFFFF).u16(0x81FF).u16(0x7FFF);//one sector
	w.u16(0);//portals
	for (vertices, quads, triangles) in [(layer_vertices[0], 1, 0), (layer_vertices[1], 0, 1)] {
		w.u32(vertices).u16(0).u16(quads).u16(triangles).zeros(6).zeros(24).zeros(16);
	}
	w.u16(0).u16(1).u16(1).u16(0).u16(0).u16(0);
	w.u16(0).u16(0).u16(0).u16(0).u16(0);
	for i in 0..3 {
		w.f32(i as f32).f32(0.0).f32(0.0).f32(0.0).f32(-1.0).f32(0.0).u32(0xFF102030);
	}
}

fn mesh_words(version: Version) -> u32 {
	match version {
		Version::Tr4 | Version::Tr5 => 9,
		_ => 11,
	}
}

fn mesh(w: &mut Writer, version: Version, index: usize) {
	w.i16(index as i16).i16(0).i16(0).i32(64).i16(0).i16(0);
	for _ in 0..mesh_words(version) - 7 {
		w.i16(0);
	}
}

fn meshes(w: &mut Writer, version: Version, num_meshes: usize) {
	let words = mesh_words(version);
	w.u32(words * num_meshes as u32);
	for index in 0..num_meshes {
		mesh(w, version, index);
	}
	if num_meshes == 0 {
		w.u32(0);
		return;
	}
	//an extra slot repeating the first mesh
	w.u32(num_meshes as u32 + 1);
	for index in 0..num_meshes {
		w.u32(index as u32 * words * 2);
	}
	w.u32(0);
}

fn animation(w: &mut Writer, version: Version) {
	w.u32(0).u8(1).u8(0).u16(0);
	match version {
		Version::Tr4 | Version::Tr5 => {
			w.f32(1.5).f32(0.0).f32(0.25).f32(0.0);
		},
		_ => {
			w.i16(1).u16(32768).i16(0).u16(0);
		},
	}
	w.zeros(16);
}

fn frames_and_moveables(w: &mut Writer, version: Version, extras: bool) {
	if !extras {
		w.u32(0).u32(0);
		return;
	}
	match version {
		Version::Tr1 => {
			w.u32(12).zeros(18).u16(1).u16(0x4567).u16(0x0123);
		},
		_ => {
			w.u32(10).zeros(18).u16(FIRST_ROTATION);
		},
	}
	w.u32(2);
	for object_id in 0..2 {
		w.u32(object_id).u16(1).u16(0).u32(0).u32(0).u16(0);
		if version == Version::Tr5 {
			w.u16(0xFFEF);
		}
	}
}

fn object_textures(w: &mut Writer, version: Version, extras: bool) {
	if !extras {
		w.u32(0);
		return;
	}
	w.u32(1).u16(1).u16(0);
	if version >= Version::Tr4 {
		w.u16(0);
	}
	for uv in [0x0000u16, 0x0000, 0xFF00, 0x0000, 0xFF00, 0xFF00, 0x0000, 0xFF00] {
		w.u16(uv);
	}
	if version >= Version::Tr4 {
		w.u32(0).u32(0).u32(256).u32(256);
	}
	if version == Version::Tr5 {
		w.u16(0);
	}
}

fn boxes(w: &mut Writer, version: Version, extras: bool) {
	if !extras {
		w.u32(0).u32(0);
		return;
	}
	w.u32(1);
	match version {
		Version::Tr1 => {
			w.i32(0).i32(1024).i32(0).i32(1024);
		},
		_ => {
			w.u8(0).u8(1).u8(0).u8(1);
		},
	}
	w.i16(-256).u16(0);
	w.u32(1).u16(0x8000);
	let zones = if version == Version::Tr1 { 6 } else { 10 };
	w.zeros(zones * 2);
}

fn items(w: &mut Writer, version: Version, num_items: usize) {
	w.u32(num_items as u32);
	for index in 0..num_items {
		w.i16(index as i16).i16(0).i32(1024).i32(-256).i32(2048).i16(0).i16(4096);
		match version {
			Version::Tr1 => {},
			Version::Tr2 | Version::Tr3 => {
				w.i16(4096);
			},
			_ => {
				w.i16(7);
			},
		}
		w.u16(0x3E00);
	}
}

fn sound_map_len(version: Version) -> usize {
	match version {
		Version::Tr1 => 256,
		Version::Tr5 => 450,
		_ => 370,
	}
}

/// Everything from the word before the rooms to the sample indices.
fn body(w: &mut Writer, version: Version, contents: Contents) {
	w.u32(0);
	match version {
		Version::Tr5 => {
			w.u32(contents.rooms as u32);
			for _ in 0..contents.rooms {
				tr5_room(w, contents.layer_vertices);
			}
		},
		_ => {
			w.u16(contents.rooms as u16);
			for _ in 0..contents.rooms {
				classic_room(w, version);
			}
		},
	}
	w.u32(0);//floor data
	meshes(w, version, contents.meshes);
	w.u32(contents.extras as u32);
	if contents.extras {
		animation(w, version);
	}
	w.u32(0).u32(0).u32(0).u32(0);//state changes, dispatches, commands, mesh trees
	frames_and_moveables(w, version, contents.extras);
	w.u32(0);//static meshes
	match version {
		Version::Tr1 | Version::Tr2 => {
			object_textures(w, version, contents.extras);
			w.u32(0).u32(0).u32(0).u32(0);//sprite textures, sequences, cameras, sound sources
			boxes(w, version, contents.extras);
			w.u32(0);//animated textures
			items(w, version, contents.items);
		},
		Version::Tr3 => {
			w.u32(0).u32(0).u32(0).u32(0);
			boxes(w, version, contents.extras);
			w.u32(0);
			object_textures(w, version, contents.extras);
			items(w, version, contents.items);
		},
		_ => {
			w.bytes(if version == Version::Tr5 { &b"SPR\0"[..] } else { &b"SPR"[..] });
			w.u32(0).u32(0).u32(0).u32(0).u32(0);//sprites, sequences, cameras, flyby cameras, sound sources
			boxes(w, version, contents.extras);
			w.u32(0).u8(0);
			w.bytes(if version == Version::Tr5 { &b"TEX\0"[..] } else { &b"TEX"[..] });
			object_textures(w, version, contents.extras);
			items(w, version, contents.items);
			w.u32(0);//ai objects
		},
	}
	match version {
		Version::Tr1 => {
			w.zeros(32 * 256).zeros(256 * 3).u16(0).u16(0);
		},
		Version::Tr2 | Version::Tr3 => {
			w.zeros(32 * 256).u16(0).u16(0);
		},
		_ => {
			w.u16(0);
		},
	}
	for _ in 0..sound_map_len(version) {
		w.i16(-1);
	}
	if contents.extras {
		w.u32(1).u16(0).zeros(6);
	} else {
		w.u32(0);
	}
	if version == Version::Tr1 {
		match contents.extras {
			true => w.u32(TWO_CLIPS.len() as u32).bytes(TWO_CLIPS),
			false => w.u32(0),
		};
	}
	match contents.extras {
		true => w.u32(1).u32(SAMPLE_INDEX),
		false => w.u32(0),
	};
}

pub fn tr1_level(contents: Contents) -> Vec<u8> {
	let mut w = Writer::default();
	w.u32(0x20).u32(1).zeros(TEXTILE_PIXELS);
	body(&mut w, Version::Tr1, contents);
	w.0
}

fn tr2_header(w: &mut Writer, magic: u32) {
	w.u32(magic).zeros(256 * 3).zeros(256 * 4);
	w.u32(1).zeros(TEXTILE_PIXELS).zeros(TEXTILE_PIXELS * 2);
}

pub fn tr2_level(contents: Contents) -> Vec<u8> {
	let mut w = Writer::default();
	tr2_header(&mut w, 0x2D);
	body(&mut w, Version::Tr2, contents);
	w.0
}

pub fn tr3_level(contents: Contents) -> Vec<u8> {
	let mut w = Writer::default();
	tr2_header(&mut w, 0xFF180038);
	body(&mut w, Version::Tr3, contents);
	w.0
}

/// Palettes and one textile, followed by bytes that must not be read.
pub fn tr3_textures_only() -> Vec<u8> {
	let mut w = Writer::default();
	tr2_header(&mut w, 0xFF180034);
	w.bytes(&[0xAB; 16]);
	w.0
}

/// TR4 or TR5, decided by the number of misc textiles written. `cut` bytes are removed from the end
/// of the packed level data stream.
pub fn tr4_family_level(version: Version, misc_textiles: usize, contents: Contents, cut: usize) -> Vec<u8> {
	let mut w = Writer::default();
	w.u32(0x00345254).u16(1).u16(0).u16(0);
	w.compressed(&vec![0; TEXTILE_PIXELS * 4], 0);
	w.compressed(&vec![0; TEXTILE_PIXELS * 2], 0);
	w.compressed(&vec![0; TEXTILE_PIXELS * 4 * misc_textiles], 0);
	if version == Version::Tr5 {
		w.u16(2).u16(1).zeros(28);
	}
	let mut packed = Writer::default();
	body(&mut packed, version, contents);
	w.compressed(&packed.0, cut);
	w.u32(3).bytes(THREE_CLIPS);
	w.0
}

pub fn tr4_level(contents: Contents) -> Vec<u8> {
	tr4_family_level(Version::Tr4, 2, contents, 0)
}

pub fn tr5_level(contents: Contents) -> Vec<u8> {
	tr4_family_level(Version::Tr5, 3, contents, 0)
}
