use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a logical document item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "item#{}", self.0)
	}
}

/// Opaque token for a resource owned by the native document.
///
/// Handles are issued by the native collaborator and never interpreted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn raw(self) -> u64 {
		self.0
	}
}

impl fmt::Display for NativeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

/// Monotonic revision counter of a native document.
///
/// Increases whenever the native state changes through any path, including
/// edits that did not originate from this process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentVersion(pub u64);

impl DocumentVersion {
	pub const INITIAL: Self = Self(0);

	/// Returns the next revision.
	#[must_use]
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl fmt::Display for DocumentVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}", self.0)
	}
}
