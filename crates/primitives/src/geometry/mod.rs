use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in document space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Linear interpolation towards `other` at `t` (`0.0` is `self`).
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
	}
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{ x: {}, y: {} }}", self.x, self.y)
	}
}
