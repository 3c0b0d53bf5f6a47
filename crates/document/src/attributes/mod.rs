//! Typed attribute sets mirrored by proxies.
//!
//! Every proxy kind is a plain struct of optional fields. `None` means the
//! attribute is explicitly undefined; "not loaded yet" is tracked by the proxy,
//! never by the fields.

mod character_style;
mod path_style;

use std::fmt;

pub use character_style::{CharacterStyle, CharacterStylePatch};
pub use path_style::{FillStyle, PathStyle, PathStylePatch, StrokeStyle};

use crate::native::{AttributeKind, AttributePatch, AttributeSet, Baseline, NativeError};

/// An attribute set that can back a [`Proxy`](crate::Proxy).
pub trait ProxyAttributes: Clone + Default + PartialEq + fmt::Debug + 'static {
	const KIND: AttributeKind;

	/// Extracts this kind from a native fetch result.
	fn from_set(set: AttributeSet) -> Result<Self, NativeError>;

	/// Builds the full commit payload relative to `base`.
	fn patch(&self, base: Baseline<'_, Self>) -> AttributePatch;
}

impl ProxyAttributes for PathStyle {
	const KIND: AttributeKind = AttributeKind::PathStyle;

	fn from_set(set: AttributeSet) -> Result<Self, NativeError> {
		match set {
			AttributeSet::PathStyle(style) => Ok(style),
			other => Err(NativeError::KindMismatch {
				expected: Self::KIND,
				found: other.kind(),
			}),
		}
	}

	fn patch(&self, base: Baseline<'_, Self>) -> AttributePatch {
		AttributePatch::PathStyle(PathStylePatch::diff(self, base))
	}
}

impl ProxyAttributes for CharacterStyle {
	const KIND: AttributeKind = AttributeKind::CharacterStyle;

	fn from_set(set: AttributeSet) -> Result<Self, NativeError> {
		match set {
			AttributeSet::CharacterStyle(style) => Ok(style),
			other => Err(NativeError::KindMismatch {
				expected: Self::KIND,
				found: other.kind(),
			}),
		}
	}

	fn patch(&self, base: Baseline<'_, Self>) -> AttributePatch {
		AttributePatch::CharacterStyle(CharacterStylePatch::diff(self, base))
	}
}
