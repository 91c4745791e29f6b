//! Decoder for the TR1 to TR5 level formats.
//!
//! [`read_level`] detects the format from the leading magic, runs that format's section pipeline and
//! returns a fully index-resolved [`LevelData`]. Recoverable problems are collected in a
//! [`Diagnostics`] rather than aborting the decode.

extern crate self as tr_level;

mod compressed;
mod cursor;
mod diagnostics;
mod error;
mod impls;
mod remap;

pub mod animation;
pub mod boxes;
pub mod camera;
pub mod color;
pub mod item;
pub mod level;
pub mod mesh;
pub mod room;
pub mod sound;
pub mod texture;
pub mod textile;
pub mod version;

use std::io::{Read, Seek};
use num_traits::AsPrimitive;
pub(crate) use tr_derive::Readable;

pub use compressed::CompressedSection;
pub use cursor::ByteCursor;
pub use diagnostics::{Diagnostics, Warning};
pub use error::{Error, Result};
pub use level::{read_level, read_level_file, LevelData, ReadOptions};
pub use version::Version;

/// A fixed-layout record that reads itself from a cursor.
pub trait Readable: Sized {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self>;
}

/// Reads `len` items. Capacity is capped by the bytes left so a corrupt count cannot over-allocate.
pub fn read_boxed_slice<R: Read + Seek, T: Readable>(cursor: &mut ByteCursor<R>, len: usize) -> Result<Box<[T]>> {
	let mut vec = Vec::with_capacity(len.min(cursor.remaining() as usize));
	for _ in 0..len {
		vec.push(T::read(cursor)?);
	}
	Ok(vec.into_boxed_slice())
}

/// Reads a count of type `L`, then that many items.
pub fn read_list<R: Read + Seek, T: Readable, L: Readable + AsPrimitive<usize>>(
	cursor: &mut ByteCursor<R>,
) -> Result<Box<[T]>> {
	let len = L::read(cursor)?.as_();
	read_boxed_slice(cursor, len)
}
