use std::{fs::File, io::{BufReader, Cursor, Read, Seek}, path::{Path, PathBuf}};
use log::{debug, trace};
use crate::{
	animation::{correct_tr3_frame_sizes, AnimDispatch, Animation, Frame, Moveable, RawMoveable, StateChange},
	boxes::BoxData,
	camera::{Camera, CinematicFrame, FlybyCamera, SoundSource},
	color::{Color3, Color4},
	item::{AiObject, Item},
	mesh::{Mesh, StaticMesh},
	read_boxed_slice, read_list,
	remap::{read_meshes, resolve_frames},
	room::{read_room, Room},
	sound::{remap_sample_indices, SampleData, SoundDetail, SIDECAR_FILE_NAME},
	textile::{self, Textiles},
	texture::{ObjectTexture, SpriteSequence, SpriteTexture},
	version::Format,
	ByteCursor, CompressedSection, Diagnostics, Result, Version,
};

pub const PALETTE_SIZE: usize = 256;
pub const LIGHT_MAP_SIZE: usize = 32 * 256;

/// Loading configuration.
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
	/// Location of the TR2/3 sample file. Without it those levels load without samples.
	pub sfx_path: Option<PathBuf>,
}

impl ReadOptions {
	pub fn with_sfx_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.sfx_path = Some(path.into());
		self
	}
	
	/// Options for a level file, with the sample file next to it.
	pub fn for_level_path(path: &Path) -> Self {
		let dir = path.parent().unwrap_or(Path::new(""));
		Self::default().with_sfx_path(dir.join(SIDECAR_FILE_NAME))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tr5Header {
	pub lara_type: u16,
	pub weather_type: u16,
}

/// Everything decoded from one level file. Cross references are indices into these collections.
#[derive(Clone, Debug, Default)]
pub struct LevelData {
	pub version: Version,
	/// Leading magic as read
	pub magic: u32,
	/// TR1-3, 6-bit channels
	pub palette: Option<Box<[Color3]>>,
	/// TR2/3
	pub palette16: Option<Box<[Color4]>>,
	pub textiles: Textiles,
	pub tr5_header: Option<Tr5Header>,
	pub rooms: Box<[Room]>,
	pub floor_data: Box<[u16]>,
	/// Distinct meshes
	pub meshes: Box<[Mesh]>,
	/// Index into meshes for each mesh table slot
	pub mesh_indices: Box<[usize]>,
	pub animations: Box<[Animation]>,
	pub state_changes: Box<[StateChange]>,
	pub anim_dispatches: Box<[AnimDispatch]>,
	pub anim_commands: Box<[i16]>,
	pub mesh_tree_data: Box<[u32]>,
	pub frame_data: Box<[u16]>,
	/// One per distinct moveable frame offset, in offset order
	pub frames: Box<[Frame]>,
	pub moveables: Box<[Moveable]>,
	pub static_meshes: Box<[StaticMesh]>,
	pub object_textures: Box<[ObjectTexture]>,
	pub sprite_textures: Box<[SpriteTexture]>,
	pub sprite_sequences: Box<[SpriteSequence]>,
	pub cameras: Box<[Camera]>,
	pub flyby_cameras: Box<[FlybyCamera]>,
	pub sound_sources: Box<[SoundSource]>,
	pub box_data: BoxData,
	pub animated_textures: Box<[u16]>,
	/// TR4/5
	pub animated_textures_uv_count: u8,
	pub items: Box<[Item]>,
	pub ai_objects: Box<[AiObject]>,
	/// TR1-3
	pub light_map: Option<Box<[u8]>>,
	pub cinematic_frames: Box<[CinematicFrame]>,
	pub demo_data: Box<[u8]>,
	pub sound_map: Box<[i16]>,
	pub sound_details: Box<[SoundDetail]>,
	pub sample_indices: Box<[u32]>,
	pub samples: SampleData,
}

impl LevelData {
	/// Mesh for a mesh table slot.
	pub fn mesh(&self, slot: u16) -> Option<&Mesh> {
		self.meshes.get(*self.mesh_indices.get(slot as usize)?)
	}
	
	pub fn frame(&self, moveable: &Moveable) -> Option<&Frame> {
		self.frames.get(moveable.frame_index)
	}
	
	/// Only the palette and textiles were present.
	pub fn is_textures_only(&self) -> bool {
		self.magic == crate::version::magic::TR3_TEXTURES_ONLY
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
	Palette,
	Palette16,
	Textiles8,
	Textiles8And16,
	/// TR5 Lara and weather types
	Tr5Settings,
	/// Compressed block holding further sections
	Packed(&'static [Section]),
	/// Like `Packed`, but the block may be stored raw
	PackedOrStored(&'static [Section]),
	Unused,
	Rooms16,
	Rooms32,
	FloorData,
	Meshes,
	Animations,
	StateChanges,
	AnimDispatches,
	AnimCommands,
	MeshTrees,
	FramesAndMoveables,
	StaticMeshes,
	Marker(&'static [u8]),
	ObjectTextures,
	SpriteTextures,
	SpriteSequences,
	Cameras,
	FlybyCameras,
	SoundSources,
	Boxes,
	AnimatedTextures,
	AnimatedTexturesUvCount,
	Items,
	AiObjects,
	LightMap,
	CinematicFrames,
	DemoData,
	SoundMap,
	SoundDetails,
	SampleIndices,
	EmbeddedSamples,
	SidecarSamples,
	TrailingSamples,
}

use Section::*;

const TR1: &[Section] = &[
	Textiles8, Unused, Rooms16, FloorData, Meshes, Animations, StateChanges, AnimDispatches, AnimCommands,
	MeshTrees, FramesAndMoveables, StaticMeshes, ObjectTextures, SpriteTextures, SpriteSequences, Cameras,
	SoundSources, Boxes, AnimatedTextures, Items, LightMap, Palette, CinematicFrames, DemoData, SoundMap,
	SoundDetails, EmbeddedSamples, SampleIndices,
];

const TR2: &[Section] = &[
	Palette, Palette16, Textiles8And16, Unused, Rooms16, FloorData, Meshes, Animations, StateChanges,
	AnimDispatches, AnimCommands, MeshTrees, FramesAndMoveables, StaticMeshes, ObjectTextures, SpriteTextures,
	SpriteSequences, Cameras, SoundSources, Boxes, AnimatedTextures, Items, LightMap, CinematicFrames, DemoData,
	SoundMap, SoundDetails, SampleIndices, SidecarSamples,
];

const TR3: &[Section] = &[
	Palette, Palette16, Textiles8And16, Unused, Rooms16, FloorData, Meshes, Animations, StateChanges,
	AnimDispatches, AnimCommands, MeshTrees, FramesAndMoveables, StaticMeshes, SpriteTextures, SpriteSequences,
	Cameras, SoundSources, Boxes, AnimatedTextures, ObjectTextures, Items, LightMap, CinematicFrames, DemoData,
	SoundMap, SoundDetails, SampleIndices, SidecarSamples,
];

const TR3_TEXTURES_ONLY: &[Section] = &[Palette, Palette16, Textiles8And16];

const TR4_PACKED: &[Section] = &[
	Unused, Rooms16, FloorData, Meshes, Animations, StateChanges, AnimDispatches, AnimCommands, MeshTrees,
	FramesAndMoveables, StaticMeshes, Marker(b"SPR"), SpriteTextures, SpriteSequences, Cameras, FlybyCameras,
	SoundSources, Boxes, AnimatedTextures, AnimatedTexturesUvCount, Marker(b"TEX"), ObjectTextures, Items,
	AiObjects, DemoData, SoundMap, SoundDetails, SampleIndices,
];

const TR5_PACKED: &[Section] = &[
	Unused, Rooms32, FloorData, Meshes, Animations, StateChanges, AnimDispatches, AnimCommands, MeshTrees,
	FramesAndMoveables, StaticMeshes, Marker(b"SPR\0"), SpriteTextures, SpriteSequences, Cameras, FlybyCameras,
	SoundSources, Boxes, AnimatedTextures, AnimatedTexturesUvCount, Marker(b"TEX\0"), ObjectTextures, Items,
	AiObjects, DemoData, SoundMap, SoundDetails, SampleIndices,
];

/// Sections after the textiles, which decide between TR4 and TR5.
const TR4_TAIL: &[Section] = &[Packed(TR4_PACKED), TrailingSamples];
const TR5_TAIL: &[Section] = &[Tr5Settings, PackedOrStored(TR5_PACKED), TrailingSamples];

struct Decoder<'a> {
	version: Version,
	options: &'a ReadOptions,
	diagnostics: &'a mut Diagnostics,
	level: LevelData,
	raw_moveables: Box<[RawMoveable]>,
}

impl<'a> Decoder<'a> {
	fn run<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, sections: &[Section]) -> Result<()> {
		for &section in sections {
			trace!("{:?} at {:#x}", section, cursor.tell());
			self.section(cursor, section)?;
		}
		Ok(())
	}
	
	fn run_packed(&mut self, mut cursor: ByteCursor<Cursor<Vec<u8>>>, sections: &[Section]) -> Result<()> {
		debug!("packed level data: {} bytes", cursor.size());
		self.run(&mut cursor, sections)?;
		if cursor.remaining() > 0 {
			debug!("{} unread bytes after packed level data", cursor.remaining());
		}
		Ok(())
	}
	
	fn section<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, section: Section) -> Result<()> {
		let version = self.version;
		let level = &mut self.level;
		match section {
			Palette => level.palette = Some(read_boxed_slice(cursor, PALETTE_SIZE)?),
			Palette16 => level.palette16 = Some(read_boxed_slice(cursor, PALETTE_SIZE)?),
			Textiles8 => level.textiles = textile::read_tr1(cursor)?,
			Textiles8And16 => level.textiles = textile::read_tr2(cursor)?,
			Tr5Settings => {
				let lara_type = cursor.read_u16()?;
				let weather_type = cursor.read_u16()?;
				if cursor.read_bytes(28)?.iter().any(|&b| b != 0) {
					self.diagnostics.violation("tr5 header", "reserved bytes not zero");
				}
				level.tr5_header = Some(Tr5Header { lara_type, weather_type });
			},
			Packed(sections) => {
				let packed = CompressedSection::read(cursor)?.into_cursor()?;
				self.run_packed(packed, sections)?;
			},
			PackedOrStored(sections) => {
				let bytes = CompressedSection::read(cursor)?.decompress_or_stored()?;
				self.run_packed(ByteCursor::from_bytes(bytes), sections)?;
			},
			Unused => {
				let unused = cursor.read_u32()?;
				self.diagnostics.expect_value("level", "word before rooms", unused, &[0]);
			},
			Rooms16 | Rooms32 => {
				let num_rooms = match section {
					Rooms16 => cursor.read_u16()? as usize,
					_ => cursor.read_u32()? as usize,
				};
				debug!("{} rooms", num_rooms);
				let mut rooms = Vec::with_capacity(num_rooms.min(cursor.remaining() as usize));
				for _ in 0..num_rooms {
					rooms.push(read_room(cursor, version, self.diagnostics)?);
				}
				level.rooms = rooms.into_boxed_slice();
			},
			FloorData => level.floor_data = read_list::<_, _, u32>(cursor)?,
			Meshes => (level.meshes, level.mesh_indices) = read_meshes(cursor, version)?,
			Animations => {
				let len = cursor.read_u32()? as usize;
				level.animations = (0..len).map(|_| Animation::read(cursor, version)).collect::<Result<_>>()?;
			},
			StateChanges => level.state_changes = read_list::<_, _, u32>(cursor)?,
			AnimDispatches => level.anim_dispatches = read_list::<_, _, u32>(cursor)?,
			AnimCommands => level.anim_commands = read_list::<_, _, u32>(cursor)?,
			MeshTrees => level.mesh_tree_data = read_list::<_, _, u32>(cursor)?,
			FramesAndMoveables => {
				level.frame_data = read_list::<_, _, u32>(cursor)?;
				let len = cursor.read_u32()? as usize;
				self.raw_moveables = (0..len)
					.map(|_| RawMoveable::read(cursor, version, self.diagnostics))
					.collect::<Result<_>>()?;
			},
			StaticMeshes => level.static_meshes = read_list::<_, _, u32>(cursor)?,
			Marker(expected) => {
				let found = cursor.read_bytes(expected.len())?;
				if found != expected {
					self.diagnostics.violation("level", format!("expected marker {:?}, found {:?}", expected, found));
				}
			},
			ObjectTextures => {
				let len = cursor.read_u32()? as usize;
				level.object_textures = (0..len)
					.map(|_| ObjectTexture::read(cursor, version, self.diagnostics))
					.collect::<Result<_>>()?;
			},
			SpriteTextures => level.sprite_textures = read_list::<_, _, u32>(cursor)?,
			SpriteSequences => level.sprite_sequences = read_list::<_, _, u32>(cursor)?,
			Cameras => level.cameras = read_list::<_, _, u32>(cursor)?,
			FlybyCameras => level.flyby_cameras = read_list::<_, _, u32>(cursor)?,
			SoundSources => level.sound_sources = read_list::<_, _, u32>(cursor)?,
			Boxes => level.box_data = BoxData::read(cursor, version)?,
			AnimatedTextures => level.animated_textures = read_list::<_, _, u32>(cursor)?,
			AnimatedTexturesUvCount => level.animated_textures_uv_count = cursor.read_u8()?,
			Items => {
				let len = cursor.read_u32()? as usize;
				level.items = (0..len).map(|_| Item::read(cursor, version)).collect::<Result<_>>()?;
			},
			AiObjects => level.ai_objects = read_list::<_, _, u32>(cursor)?,
			LightMap => level.light_map = Some(cursor.read_bytes(LIGHT_MAP_SIZE)?.into_boxed_slice()),
			CinematicFrames => level.cinematic_frames = read_list::<_, _, u16>(cursor)?,
			DemoData => level.demo_data = read_list::<_, _, u16>(cursor)?,
			SoundMap => level.sound_map = read_boxed_slice(cursor, version.sound_map_len())?,
			SoundDetails => {
				let len = cursor.read_u32()? as usize;
				level.sound_details = (0..len).map(|_| SoundDetail::read(cursor, version)).collect::<Result<_>>()?;
			},
			SampleIndices => level.sample_indices = read_list::<_, _, u32>(cursor)?,
			EmbeddedSamples => level.samples = SampleData::read_embedded(cursor)?,
			SidecarSamples => {
				level.samples = SampleData::read_sidecar(self.options.sfx_path.as_deref(), self.diagnostics);
			},
			TrailingSamples => level.samples = SampleData::read_trailing(cursor)?,
		}
		Ok(())
	}
	
	/// Passes that need every table loaded.
	fn finish(mut self) -> LevelData {
		let version = self.version;
		let level = &mut self.level;
		(level.moveables, level.frames) = resolve_frames(&self.raw_moveables, &level.frame_data, version, self.diagnostics);
		if version == Version::Tr3 {
			correct_tr3_frame_sizes(&mut level.animations, &level.frame_data, self.diagnostics);
		}
		if version.has_sample_indices_remap() {
			remap_sample_indices(&mut level.sound_details, &level.sample_indices);
		}
		let num_rooms = level.rooms.len();
		for (index, room) in level.rooms.iter().enumerate() {
			if let Some(alternate) = room.alternate_room.filter(|r| r.get() as usize >= num_rooms) {
				self.diagnostics.violation(
					"room",
					format!("room {} has alternate room {} of {}", index, alternate.get(), num_rooms),
				);
			}
		}
		for (index, item) in level.items.iter().enumerate() {
			if item.room < 0 || item.room as usize >= num_rooms {
				self.diagnostics.violation("item", format!("item {} is in room {} of {}", index, item.room, num_rooms));
			}
		}
		self.level
	}
}

/// Decodes a level from `reader`, starting at its current position.
pub fn read_level<R: Read + Seek>(reader: R, options: &ReadOptions, diagnostics: &mut Diagnostics) -> Result<LevelData> {
	let mut cursor = ByteCursor::new(reader)?;
	let magic = cursor.read_u32()?;
	let format = Format::from_magic(magic)?;
	debug!("magic {:#010x}: {:?}", magic, format);
	//TR4/5 textiles come first and decide the version
	let (version, sections, textiles) = match format {
		Format::Tr1 => (Version::Tr1, TR1, Textiles::default()),
		Format::Tr2 => (Version::Tr2, TR2, Textiles::default()),
		Format::Tr3 => (Version::Tr3, TR3, Textiles::default()),
		Format::Tr3TexturesOnly => (Version::Tr3, TR3_TEXTURES_ONLY, Textiles::default()),
		Format::Tr4Family => {
			let (version, textiles) = textile::read_tr4_family(&mut cursor, magic)?;
			let tail = match version {
				Version::Tr5 => TR5_TAIL,
				_ => TR4_TAIL,
			};
			(version, tail, textiles)
		},
	};
	let mut decoder = Decoder {
		version,
		options,
		diagnostics,
		level: LevelData { magic, version, textiles, ..Default::default() },
		raw_moveables: Box::default(),
	};
	decoder.run(&mut cursor, sections)?;
	if cursor.remaining() > 0 {
		debug!("{} unread bytes at end of level", cursor.remaining());
	}
	Ok(decoder.finish())
}

/// Opens and decodes a level file. TR2/3 samples are read from `MAIN.SFX` in the same directory.
pub fn read_level_file(path: impl AsRef<Path>, diagnostics: &mut Diagnostics) -> Result<LevelData> {
	let path = path.as_ref();
	let options = ReadOptions::for_level_path(path);
	read_level(BufReader::new(File::open(path)?), &options, diagnostics)
}
