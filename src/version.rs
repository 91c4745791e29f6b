use crate::{textile::TEXTILE_PIXELS, Error, Result};

pub mod magic {
	pub const TR1: u32 = 0x00000020;
	pub const TR2: u32 = 0x0000002D;
	pub const TR3_A: u32 = 0xFF080038;
	pub const TR3_B: u32 = 0xFF180038;
	/// Files carrying only the palette and textiles.
	pub const TR3_TEXTURES_ONLY: u32 = 0xFF180034;
	/// "TR4\0", shared by TR4 and TR5.
	pub const TR4: u32 = 0x00345254;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
	#[default]
	Tr1,
	Tr2,
	Tr3,
	Tr4,
	Tr5,
}

impl Version {
	/// Mask applied to single-axis frame rotations.
	pub fn single_rotation_mask(self) -> u16 {
		match self {
			Version::Tr1 | Version::Tr2 | Version::Tr3 => 1023,
			Version::Tr4 | Version::Tr5 => 4095,
		}
	}
	
	pub fn sound_map_len(self) -> usize {
		match self {
			Version::Tr1 => 256,
			Version::Tr2 | Version::Tr3 | Version::Tr4 => 370,
			Version::Tr5 => 450,
		}
	}
	
	/// Number of misc 32-bit textiles after the main textile blocks.
	pub fn num_misc_textiles(self) -> usize {
		match self {
			Version::Tr4 => 2,
			Version::Tr5 => 3,
			_ => 0,
		}
	}
	
	/// Versions whose sound details point into a sample index table.
	pub(crate) fn has_sample_indices_remap(self) -> bool {
		self <= Version::Tr3
	}
}

/// Pipeline family chosen by the leading magic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	Tr1,
	Tr2,
	Tr3,
	/// Palette and textiles only; decoding stops after them.
	Tr3TexturesOnly,
	/// TR4 or TR5, told apart by the misc textile block.
	Tr4Family,
}

impl Format {
	pub fn from_magic(value: u32) -> Result<Self> {
		Ok(match value {
			magic::TR1 => Format::Tr1,
			magic::TR2 => Format::Tr2,
			magic::TR3_A | magic::TR3_B => Format::Tr3,
			magic::TR3_TEXTURES_ONLY => Format::Tr3TexturesOnly,
			magic::TR4 => Format::Tr4Family,
			_ => return Err(Error::UnsupportedVersion(value)),
		})
	}
}

/// Tells TR4 from TR5 by the declared size of the misc textile block (2 textiles in TR4, 3 in TR5).
pub fn tr4_family_version(magic: u32, misc_block_size: usize) -> Result<Version> {
	[Version::Tr4, Version::Tr5]
		.into_iter()
		.find(|version| version.num_misc_textiles() * TEXTILE_PIXELS * 4 == misc_block_size)
		.ok_or(Error::UnsupportedVersion(magic))
}
