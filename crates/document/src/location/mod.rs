//! Read-only memoized locations on a curve.
//!
//! A [`CurveLocation`] is defined by either a curve parameter or a point on the
//! curve. Every other quantity is derived through [`CurveGeometry`] on first use
//! and cached for the lifetime of the location. The curve is borrowed, so it
//! cannot change underneath a location.

use std::cell::OnceCell;
use std::fmt;

use graver_primitives::Point;

/// Geometry of one curve, parameterized over `0.0..=1.0`.
pub trait CurveGeometry {
	fn point_at(&self, parameter: f64) -> Point;

	/// Closest parameter for `point`, or `None` if the point is not on the curve.
	fn parameter_of(&self, point: Point) -> Option<f64>;

	fn length(&self) -> f64;

	/// Arc length between two parameters, `from <= to`.
	fn part_length(&self, from: f64, to: f64) -> f64;

	/// Index of this curve within its path, if it belongs to one.
	fn index(&self) -> Option<usize> {
		None
	}
}

impl<C: CurveGeometry + ?Sized> CurveGeometry for &C {
	fn point_at(&self, parameter: f64) -> Point {
		(**self).point_at(parameter)
	}

	fn parameter_of(&self, point: Point) -> Option<f64> {
		(**self).parameter_of(point)
	}

	fn length(&self) -> f64 {
		(**self).length()
	}

	fn part_length(&self, from: f64, to: f64) -> f64 {
		(**self).part_length(from, to)
	}

	fn index(&self) -> Option<usize> {
		(**self).index()
	}
}

/// The end segment a location is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndSegment {
	First,
	Second,
}

/// A lazily resolved location on a curve.
pub struct CurveLocation<'c, C: ?Sized> {
	curve: &'c C,
	point: OnceCell<Point>,
	parameter: OnceCell<Option<f64>>,
	segment: OnceCell<Option<EndSegment>>,
	curve_length: OnceCell<Option<f64>>,
}

impl<'c, C: CurveGeometry + ?Sized> CurveLocation<'c, C> {
	pub fn at_parameter(curve: &'c C, parameter: f64) -> Self {
		let location = Self::empty(curve);
		let _ = location.parameter.set(Some(parameter));
		location
	}

	pub fn at_point(curve: &'c C, point: Point) -> Self {
		let location = Self::empty(curve);
		let _ = location.point.set(point);
		location
	}

	fn empty(curve: &'c C) -> Self {
		Self {
			curve,
			point: OnceCell::new(),
			parameter: OnceCell::new(),
			segment: OnceCell::new(),
			curve_length: OnceCell::new(),
		}
	}

	pub fn curve(&self) -> &'c C {
		self.curve
	}

	/// The point on the curve. Computed from the parameter at most once.
	///
	/// A location built from a point always has one, so this only returns `None`
	/// when neither form resolves.
	pub fn point(&self) -> Option<Point> {
		if let Some(point) = self.point.get() {
			return Some(*point);
		}
		let parameter = self.parameter()?;
		Some(*self.point.get_or_init(|| self.curve.point_at(parameter)))
	}

	/// The curve parameter, or `None` if the defining point is not on the curve.
	pub fn parameter(&self) -> Option<f64> {
		*self.parameter.get_or_init(|| self.point.get().and_then(|point| self.curve.parameter_of(*point)))
	}

	/// The end segment this location is closest to.
	///
	/// Parameters `0.0` and `1.0` resolve exactly. Elsewhere, the location belongs
	/// to the first segment when the remaining sub-curve is longer than half the
	/// curve, and to the second segment otherwise (including an exact half).
	pub fn boundary_segment(&self) -> Option<EndSegment> {
		*self.segment.get_or_init(|| {
			let parameter = self.parameter()?;
			Some(if parameter == 0.0 {
				EndSegment::First
			} else if parameter == 1.0 {
				EndSegment::Second
			} else if self.curve.part_length(parameter, 1.0) > self.curve.length() / 2.0 {
				EndSegment::First
			} else {
				EndSegment::Second
			})
		})
	}

	/// Arc length from the start of the curve to this location.
	pub fn curve_length(&self) -> Option<f64> {
		*self
			.curve_length
			.get_or_init(|| self.parameter().map(|parameter| self.curve.part_length(0.0, parameter)))
	}

	pub fn index(&self) -> Option<usize> {
		self.curve.index()
	}
}

impl<C: CurveGeometry + ?Sized> fmt::Display for CurveLocation<'_, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut parts = Vec::with_capacity(3);
		if let Some(point) = self.point() {
			parts.push(format!("point: {point}"));
		}
		if let Some(index) = self.index() {
			parts.push(format!("index: {index}"));
		}
		if let Some(parameter) = self.parameter() {
			parts.push(format!("parameter: {parameter}"));
		}
		write!(f, "{{ {} }}", parts.join(", "))
	}
}

impl<C: ?Sized> fmt::Debug for CurveLocation<'_, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CurveLocation")
			.field("point", &self.point.get())
			.field("parameter", &self.parameter.get())
			.field("segment", &self.segment.get())
			.finish_non_exhaustive()
	}
}
