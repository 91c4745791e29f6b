use bitfield::bitfield;
use crate::Readable;

/// Palette entry. Channels are 6-bit in files.
#[repr(C)]
#[derive(Readable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color3 {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

#[repr(C)]
#[derive(Readable, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color4 {
	pub color: Color3,
	pub unused: u8,
}

/// 8-bit channels in canonical order.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

bitfield! {
	#[derive(Readable, Clone, Copy, PartialEq, Eq)]
	pub struct Argb1555(u16);
	impl Debug;
	pub a, _: 15;
	pub r, _: 14, 10;
	pub g, _: 9, 5;
	pub b, _: 4, 0;
}

fn expand5(c: u16) -> u8 {
	((c << 3) | (c >> 2)) as u8
}

impl Argb1555 {
	pub fn from_raw(raw: u16) -> Self {
		Argb1555(raw)
	}
	
	pub fn to_rgba(self) -> Rgba {
		Rgba {
			r: expand5(self.r()),
			g: expand5(self.g()),
			b: expand5(self.b()),
			a: if self.a() { 255 } else { 0 },
		}
	}
}

impl Rgba {
	/// From a little-endian ARGB word, i.e. bytes B, G, R, A in the file.
	pub fn from_argb(argb: u32) -> Self {
		let [b, g, r, a] = argb.to_le_bytes();
		Rgba { r, g, b, a }
	}
	
	/// Opaque colour from a 5-5-5 RGB word (red in the high bits).
	pub fn from_rgb555(rgb: u16) -> Self {
		Rgba {
			r: expand5((rgb >> 10) & 31),
			g: expand5((rgb >> 5) & 31),
			b: expand5(rgb & 31),
			a: 255,
		}
	}
	
	/// Opaque grey from a 13-bit inverted intensity (0 bright, 8191 dark).
	pub fn from_inverted_intensity(intensity: i16) -> Self {
		let level = 255 - ((intensity.clamp(0, 8191) as u32 * 255) / 8191) as u8;
		Rgba { r: level, g: level, b: level, a: 255 }
	}
}
