use std::{fmt::{self, Display, Formatter}, path::PathBuf};
use log::warn;

/// A recoverable problem found while decoding. The decode carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
	/// The sample sidecar could not be read. `None` if no sidecar location was known.
	MissingSidecarFile {
		path: Option<PathBuf>,
	},
	/// A marker, filler, count or reference held an unexpected value.
	StructuralInvariantViolation {
		section: &'static str,
		detail: String,
	},
}

impl Display for Warning {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Warning::MissingSidecarFile { path: Some(path) } => {
				write!(f, "sample file {} missing, level has no samples", path.display())
			},
			Warning::MissingSidecarFile { path: None } => {
				write!(f, "no sample file location known, level has no samples")
			},
			Warning::StructuralInvariantViolation { section, detail } => write!(f, "{}: {}", section, detail),
		}
	}
}

/// Warnings collected over one decode.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
	warnings: Vec<Warning>,
}

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}
	
	pub fn push(&mut self, warning: Warning) {
		warn!("{}", warning);
		self.warnings.push(warning);
	}
	
	pub(crate) fn violation(&mut self, section: &'static str, detail: impl Into<String>) {
		self.push(Warning::StructuralInvariantViolation { section, detail: detail.into() });
	}
	
	/// Warns if `value` is not one of `expected`.
	pub(crate) fn expect_value<T>(&mut self, section: &'static str, what: &str, value: T, expected: &[T])
	where T: PartialEq + fmt::LowerHex {
		if !expected.contains(&value) {
			self.violation(section, format!("{} has unexpected value {:#x}", what, value));
		}
	}
	
	pub fn warnings(&self) -> &[Warning] {
		&self.warnings
	}
	
	pub fn is_empty(&self) -> bool {
		self.warnings.is_empty()
	}
	
	pub fn missing_sidecar_count(&self) -> usize {
		self.warnings.iter().filter(|w| matches!(w, Warning::MissingSidecarFile { .. })).count()
	}
	
	pub fn into_warnings(self) -> Vec<Warning> {
		self.warnings
	}
}
