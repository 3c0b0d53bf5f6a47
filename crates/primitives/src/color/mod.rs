use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A paint value.
///
/// [`Color::None`] is the explicit "no paint" value. It is not the same as an
/// undefined color: style attributes use `Option<Color>` where `None` leaves the
/// paint unspecified, while `Some(Color::None)` removes it.
///
/// Components are in `0.0..=1.0`. An absent alpha means opaque / unspecified.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum Color {
	None,
	Gray {
		gray: f32,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		alpha: Option<f32>,
	},
	Rgb {
		red: f32,
		green: f32,
		blue: f32,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		alpha: Option<f32>,
	},
	Cmyk {
		cyan: f32,
		magenta: f32,
		yellow: f32,
		black: f32,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		alpha: Option<f32>,
	},
}

impl Color {
	pub const fn gray(gray: f32) -> Self {
		Self::Gray { gray, alpha: None }
	}

	pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
		Self::Rgb { red, green, blue, alpha: None }
	}

	pub const fn cmyk(cyan: f32, magenta: f32, yellow: f32, black: f32) -> Self {
		Self::Cmyk {
			cyan,
			magenta,
			yellow,
			black,
			alpha: None,
		}
	}

	/// Returns a copy with the given alpha. No-op for [`Color::None`].
	#[must_use]
	pub fn with_alpha(self, value: f32) -> Self {
		match self {
			Self::None => Self::None,
			Self::Gray { gray, .. } => Self::Gray { gray, alpha: Some(value) },
			Self::Rgb { red, green, blue, .. } => Self::Rgb {
				red,
				green,
				blue,
				alpha: Some(value),
			},
			Self::Cmyk {
				cyan, magenta, yellow, black, ..
			} => Self::Cmyk {
				cyan,
				magenta,
				yellow,
				black,
				alpha: Some(value),
			},
		}
	}

	pub fn alpha(&self) -> Option<f32> {
		match self {
			Self::None => None,
			Self::Gray { alpha, .. } | Self::Rgb { alpha, .. } | Self::Cmyk { alpha, .. } => *alpha,
		}
	}

	/// Whether this is the explicit "no paint" value.
	pub const fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}

	/// Color model name as used by [`Display`](fmt::Display) and [`FromStr`].
	pub const fn model(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Gray { .. } => "gray",
			Self::Rgb { .. } => "rgb",
			Self::Cmyk { .. } => "cmyk",
		}
	}

	fn components(&self) -> Vec<f32> {
		let mut out = match *self {
			Self::None => Vec::new(),
			Self::Gray { gray, .. } => vec![gray],
			Self::Rgb { red, green, blue, .. } => vec![red, green, blue],
			Self::Cmyk {
				cyan, magenta, yellow, black, ..
			} => vec![cyan, magenta, yellow, black],
		};
		out.extend(self.alpha());
		out
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_none() {
			return f.write_str("none");
		}
		f.write_str(self.model())?;
		f.write_str("(")?;
		for (i, component) in self.components().iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{component}")?;
		}
		f.write_str(")")
	}
}

/// Errors from parsing a [`Color`] literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
	#[error("unknown color model '{0}'")]
	UnknownModel(String),
	#[error("malformed color literal '{0}'")]
	Malformed(String),
	#[error("{model} takes {expected} or {} components, got {got}", .expected + 1)]
	Arity { model: &'static str, expected: usize, got: usize },
	#[error("invalid color component '{0}'")]
	Component(String),
}

impl FromStr for Color {
	type Err = ColorParseError;

	/// Parses `none`, `gray(g[, a])`, `rgb(r, g, b[, a])` or `cmyk(c, m, y, k[, a])`.
	fn from_str(input: &str) -> Result<Self, Self::Err> {
		let trimmed = input.trim();
		if trimmed.eq_ignore_ascii_case("none") {
			return Ok(Self::None);
		}
		let (model, rest) = trimmed.split_once('(').ok_or_else(|| ColorParseError::Malformed(trimmed.to_string()))?;
		let body = rest.strip_suffix(')').ok_or_else(|| ColorParseError::Malformed(trimmed.to_string()))?;
		let values = body
			.split(',')
			.map(|part| part.trim().parse::<f32>().map_err(|_| ColorParseError::Component(part.trim().to_string())))
			.collect::<Result<Vec<_>, _>>()?;

		let (name, expected) = match model.trim().to_ascii_lowercase().as_str() {
			"gray" | "grey" => ("gray", 1),
			"rgb" => ("rgb", 3),
			"cmyk" => ("cmyk", 4),
			other => return Err(ColorParseError::UnknownModel(other.to_string())),
		};
		if values.len() != expected && values.len() != expected + 1 {
			return Err(ColorParseError::Arity {
				model: name,
				expected,
				got: values.len(),
			});
		}

		let color = match values[..expected] {
			[gray] => Self::gray(gray),
			[red, green, blue] => Self::rgb(red, green, blue),
			[cyan, magenta, yellow, black] => Self::cmyk(cyan, magenta, yellow, black),
			_ => return Err(ColorParseError::Malformed(trimmed.to_string())),
		};
		Ok(match values.get(expected) {
			Some(&alpha) => color.with_alpha(alpha),
			None => color,
		})
	}
}
