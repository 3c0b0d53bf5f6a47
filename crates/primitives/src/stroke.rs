use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unknown name for one of the enumerated style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownStyleName {
	pub kind: &'static str,
	pub name: String,
}

macro_rules! named_enum {
	($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(rename_all = "kebab-case")]
		pub enum $name {
			$($variant),+
		}

		impl $name {
			pub const ALL: &'static [Self] = &[$(Self::$variant),+];

			/// Stable lowercase name.
			pub const fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.as_str())
			}
		}

		impl FromStr for $name {
			type Err = UnknownStyleName;

			fn from_str(input: &str) -> Result<Self, Self::Err> {
				Self::ALL
					.iter()
					.copied()
					.find(|value| value.as_str().eq_ignore_ascii_case(input.trim()))
					.ok_or_else(|| UnknownStyleName {
						kind: $kind,
						name: input.to_string(),
					})
			}
		}
	};
}

named_enum!(
	/// Rule deciding path insideness.
	WindingRule, "winding rule" {
		NonZero => "non-zero",
		EvenOdd => "even-odd",
	}
);

named_enum!(
	/// Shape of open stroke ends.
	StrokeCap, "stroke cap" {
		Butt => "butt",
		Round => "round",
		Square => "square",
	}
);

named_enum!(
	/// Shape of stroke corners.
	StrokeJoin, "stroke join" {
		Miter => "miter",
		Round => "round",
		Bevel => "bevel",
	}
);
