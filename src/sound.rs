use std::{fs, io::{Read, Seek}, path::{Path, PathBuf}};
use log::debug;
use crate::{ByteCursor, Diagnostics, Result, Version, Warning};

/// Name of the TR2/3 sample file, next to the level files.
pub const SIDECAR_FILE_NAME: &str = "MAIN.SFX";

const RIFF: &[u8; 4] = b"RIFF";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundDetail {
	/// Index of the first sample; resolved through sample_indices in TR1-3
	pub sample: u32,
	pub volume: u16,
	pub chance: u16,
	/// 0 means default pitch
	pub pitch: u8,
	/// Sectors; 8 before TR3
	pub range: u8,
	/// Sample count in bits 2-7, looping mode in bits 0-1
	pub flags: u16,
}

impl SoundDetail {
	pub(crate) fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, version: Version) -> Result<Self> {
		let sample = cursor.read_u16()? as u32;
		Ok(match version {
			Version::Tr1 | Version::Tr2 => SoundDetail {
				sample,
				volume: cursor.read_u16()?,
				chance: cursor.read_u16()?,
				pitch: 0,
				range: 8,
				flags: cursor.read_u16()?,
			},
			_ => {
				let volume = cursor.read_u8()? as u16;
				let range = cursor.read_u8()?;
				let chance = cursor.read_u8()? as u16;
				let pitch = cursor.read_u8()?;
				SoundDetail { sample, volume, chance, pitch, range, flags: cursor.read_u16()? }
			},
		})
	}
	
	pub fn num_samples(&self) -> u16 {
		(self.flags >> 2) & 0x3F
	}
}

/// Replaces each detail's sample with the sample index it points to, if in range.
pub(crate) fn remap_sample_indices(details: &mut [SoundDetail], sample_indices: &[u32]) {
	for detail in details {
		if let Some(&index) = sample_indices.get(detail.sample as usize) {
			detail.sample = index;
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SampleSource {
	#[default]
	None,
	/// TR1 sample block inside the level
	Embedded,
	/// TR2/3 sample file
	Sidecar(PathBuf),
	/// TR4/5 samples after the packed level data
	Trailing,
}

#[derive(Clone, Debug, Default)]
pub struct SampleData {
	pub data: Box<[u8]>,
	pub count: usize,
	pub source: SampleSource,
}

/// Number of places a "RIFF" header starts.
pub fn count_riff(data: &[u8]) -> usize {
	data.windows(RIFF.len()).filter(|window| *window == RIFF).count()
}

impl SampleData {
	pub(crate) fn read_embedded<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		let len = cursor.read_u32()? as usize;
		let data = cursor.read_bytes(len)?;
		let count = count_riff(&data);
		debug!("{} embedded samples in {} bytes", count, len);
		Ok(SampleData { data: data.into_boxed_slice(), count, source: SampleSource::Embedded })
	}
	
	/// Loads the sample file. A file that cannot be read is a warning and leaves the level silent.
	pub(crate) fn read_sidecar(path: Option<&Path>, diagnostics: &mut Diagnostics) -> Self {
		let path = match path {
			Some(path) => path,
			None => {
				diagnostics.push(Warning::MissingSidecarFile { path: None });
				return SampleData::default();
			},
		};
		match fs::read(path) {
			Ok(data) => {
				let count = count_riff(&data);
				debug!("{} samples in {}", count, path.display());
				SampleData { data: data.into_boxed_slice(), count, source: SampleSource::Sidecar(path.to_path_buf()) }
			},
			Err(e) => {
				debug!("reading {}: {}", path.display(), e);
				diagnostics.push(Warning::MissingSidecarFile { path: Some(path.to_path_buf()) });
				SampleData::default()
			},
		}
	}
	
	/// Sample count, then the rest of the stream verbatim.
	pub(crate) fn read_trailing<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		if cursor.remaining() == 0 {
			return Ok(SampleData::default());
		}
		let count = cursor.read_u32()? as usize;
		let data = cursor.read_to_end()?;
		debug!("{} trailing samples in {} bytes", count, data.len());
		Ok(SampleData { data: data.into_boxed_slice(), count, source: SampleSource::Trailing })
	}
}
