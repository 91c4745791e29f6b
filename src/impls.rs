use std::io::{Read, Seek};
use arrayvec::ArrayVec;
use glam::{I16Vec2, I16Vec3, IVec3, U16Vec2, Vec3};
use nonmax::{NonMaxU8, NonMaxU16};
use shared::MinMax;
use crate::{ByteCursor, Readable, Result};

//primitive impls

macro_rules! impl_readable_prim {
	($type:ty, $func:ident) => {
		impl Readable for $type {
			fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
				cursor.$func()
			}
		}
	};
}

impl_readable_prim!(u8, read_u8);
impl_readable_prim!(i8, read_i8);
impl_readable_prim!(u16, read_u16);
impl_readable_prim!(i16, read_i16);
impl_readable_prim!(u32, read_u32);
impl_readable_prim!(i32, read_i32);
impl_readable_prim!(f32, read_f32);

//array impl

impl<T: Readable, const N: usize> Readable for [T; N] {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		let mut array = ArrayVec::<T, N>::new();
		for _ in 0..N {
			array.push(T::read(cursor)?);
		}
		match array.into_inner() {
			Ok(array) => Ok(array),
			Err(_) => unreachable!(),//pushed exactly N items
		}
	}
}

//nonmax impls

impl Readable for Option<NonMaxU8> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		Ok(NonMaxU8::new(cursor.read_u8()?))
	}
}

impl Readable for Option<NonMaxU16> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		Ok(NonMaxU16::new(cursor.read_u16()?))
	}
}

//minmax impl

impl<T: Readable> Readable for MinMax<T> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		Ok(MinMax { min: T::read(cursor)?, max: T::read(cursor)? })
	}
}

//glam impls

macro_rules! impl_readable_glam {
	($type:ty, $array:ty) => {
		impl Readable for $type {
			fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
				Ok(<$array>::read(cursor)?.into())
			}
		}
	};
}

impl_readable_glam!(U16Vec2, [u16; 2]);
impl_readable_glam!(I16Vec2, [i16; 2]);
impl_readable_glam!(I16Vec3, [i16; 3]);
impl_readable_glam!(IVec3, [i32; 3]);
impl_readable_glam!(Vec3, [f32; 3]);
