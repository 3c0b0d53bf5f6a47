//! Native collaborator boundary.
//!
//! The native document is consumed through [`NativeDocument`] only: fetch all
//! attributes of one kind for a handle, commit a full patch for a handle, and
//! report the current document version.

use std::fmt;

use graver_primitives::{DocumentVersion, ItemId, NativeHandle};
use thiserror::Error;

use crate::attributes::{CharacterStyle, CharacterStylePatch, PathStyle, PathStylePatch};

/// Closed set of proxy kinds the native side understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
	PathStyle,
	CharacterStyle,
}

impl AttributeKind {
	pub const ALL: [Self; 2] = [Self::PathStyle, Self::CharacterStyle];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::PathStyle => "path-style",
			Self::CharacterStyle => "character-style",
		}
	}
}

impl fmt::Display for AttributeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Attribute values returned by a native fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeSet {
	PathStyle(PathStyle),
	CharacterStyle(CharacterStyle),
}

impl AttributeSet {
	pub const fn kind(&self) -> AttributeKind {
		match self {
			Self::PathStyle(_) => AttributeKind::PathStyle,
			Self::CharacterStyle(_) => AttributeKind::CharacterStyle,
		}
	}
}

/// Full attribute payload of a native commit.
///
/// Every field of the kind is present; see [`Slot`] for the per-field states.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributePatch {
	PathStyle(PathStylePatch),
	CharacterStyle(CharacterStylePatch),
}

impl AttributePatch {
	pub const fn kind(&self) -> AttributeKind {
		match self {
			Self::PathStyle(_) => AttributeKind::PathStyle,
			Self::CharacterStyle(_) => AttributeKind::CharacterStyle,
		}
	}
}

/// One attribute inside a commit payload.
///
/// `Keep` and `Clear` are both "no value" on the script side but mean different
/// things natively: `Keep` leaves the native attribute untouched, `Clear` makes it
/// explicitly undefined.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Slot<T> {
	#[default]
	Keep,
	Clear,
	Set(T),
}

/// What a commit payload is derived against.
#[derive(Debug)]
pub enum Baseline<'a, A> {
	/// Values as of the last fetch or commit. Equal fields are `Keep`.
	Synced(&'a A),
	/// Values a proxy was seeded with and the native side has never seen.
	/// Every defined field is `Set`; a field undefined since seeding is `Clear`.
	Seeded(&'a A),
}

impl<A> Clone for Baseline<'_, A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<A> Copy for Baseline<'_, A> {}

impl<'a, A> Baseline<'a, A> {
	/// Narrows the baseline to one field.
	pub fn map<T>(self, field: impl FnOnce(&'a A) -> &'a T) -> Baseline<'a, T> {
		match self {
			Self::Synced(base) => Baseline::Synced(field(base)),
			Self::Seeded(base) => Baseline::Seeded(field(base)),
		}
	}
}

impl<T: Clone + PartialEq> Slot<T> {
	/// Derives the slot for `current` against `base`.
	pub fn diff(current: &Option<T>, base: Baseline<'_, Option<T>>) -> Self {
		match (current, base) {
			(current, Baseline::Synced(synced)) if current == synced => Self::Keep,
			(Some(value), _) => Self::Set(value.clone()),
			(None, Baseline::Synced(_)) => Self::Clear,
			(None, Baseline::Seeded(seed)) if seed.is_some() => Self::Clear,
			(None, Baseline::Seeded(_)) => Self::Keep,
		}
	}
}

impl<T> Slot<T> {
	/// Applies this slot to a stored native value.
	pub fn apply(self, target: &mut Option<T>) {
		match self {
			Self::Keep => {}
			Self::Clear => *target = None,
			Self::Set(value) => *target = Some(value),
		}
	}

	pub const fn is_keep(&self) -> bool {
		matches!(self, Self::Keep)
	}
}

/// Errors reported by the native collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
	#[error("unknown native handle {0}")]
	UnknownHandle(NativeHandle),
	#[error("expected {expected} attributes, native returned {found}")]
	KindMismatch { expected: AttributeKind, found: AttributeKind },
	#[error("native call rejected: {0}")]
	Rejected(String),
}

/// Attribute access to the host's native document.
///
/// Calls are synchronous and may be slow; there is no cancellation. All calls
/// must be marshalled onto the single thread that owns the session.
pub trait NativeDocument {
	/// Current revision of the document owning `handle`.
	fn document_version(&self, handle: NativeHandle) -> DocumentVersion;

	/// Reads every attribute of `kind` for `handle` in one round-trip.
	fn fetch(&mut self, handle: NativeHandle, kind: AttributeKind) -> Result<AttributeSet, NativeError>;

	/// Writes a full attribute payload for `handle`.
	fn commit(&mut self, handle: NativeHandle, patch: AttributePatch) -> Result<(), NativeError>;
}

impl<N: NativeDocument + ?Sized> NativeDocument for Box<N> {
	fn document_version(&self, handle: NativeHandle) -> DocumentVersion {
		(**self).document_version(handle)
	}

	fn fetch(&mut self, handle: NativeHandle, kind: AttributeKind) -> Result<AttributeSet, NativeError> {
		(**self).fetch(handle, kind)
	}

	fn commit(&mut self, handle: NativeHandle, patch: AttributePatch) -> Result<(), NativeError> {
		(**self).commit(handle, patch)
	}
}

/// Item lookup offered by hosts that can enumerate their document.
pub trait ItemDirectory {
	fn lookup(&self, item: ItemId) -> Option<NativeHandle>;

	/// All item ids in ascending order.
	fn item_ids(&self) -> Vec<ItemId>;
}
