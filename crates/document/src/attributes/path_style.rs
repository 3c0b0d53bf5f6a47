use graver_primitives::{Color, StrokeCap, StrokeJoin, WindingRule};
use serde::{Deserialize, Serialize};

use crate::native::{Baseline, Slot};

/// Fill half of a [`PathStyle`].
///
/// `color: Some(Color::None)` means "no fill"; `color: None` leaves the fill undefined.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillStyle {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color: Option<Color>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub overprint: Option<bool>,
}

/// Stroke half of a [`PathStyle`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub color: Option<Color>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub overprint: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub width: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dash_offset: Option<f32>,
	/// An empty array is a defined "solid" dash pattern, distinct from `None`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dash_array: Option<Vec<f32>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cap: Option<StrokeCap>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub join: Option<StrokeJoin>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub miter_limit: Option<f32>,
}

/// Paint and geometry style of a path item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
	pub fill: FillStyle,
	pub stroke: StrokeStyle,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub clip: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lock_clip: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub winding_rule: Option<WindingRule>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub resolution: Option<f32>,
}

impl PathStyle {
	/// Copies every field `other` defines onto `self`; undefined fields are left alone.
	pub fn overlay(&mut self, other: &PathStyle) {
		PathStylePatch::diff(other, Baseline::Seeded(&PathStyle::default())).apply_to(self);
	}
}

/// Commit payload for a [`PathStyle`], flattened the way the native setter takes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathStylePatch {
	pub fill_color: Slot<Color>,
	pub fill_overprint: Slot<bool>,
	pub stroke_color: Slot<Color>,
	pub stroke_overprint: Slot<bool>,
	pub stroke_width: Slot<f32>,
	pub dash_offset: Slot<f32>,
	pub dash_array: Slot<Vec<f32>>,
	pub cap: Slot<StrokeCap>,
	pub join: Slot<StrokeJoin>,
	pub miter_limit: Slot<f32>,
	pub clip: Slot<bool>,
	pub lock_clip: Slot<bool>,
	pub winding_rule: Slot<WindingRule>,
	pub resolution: Slot<f32>,
}

impl PathStylePatch {
	pub fn diff(style: &PathStyle, base: Baseline<'_, PathStyle>) -> Self {
		Self {
			fill_color: Slot::diff(&style.fill.color, base.map(|s| &s.fill.color)),
			fill_overprint: Slot::diff(&style.fill.overprint, base.map(|s| &s.fill.overprint)),
			stroke_color: Slot::diff(&style.stroke.color, base.map(|s| &s.stroke.color)),
			stroke_overprint: Slot::diff(&style.stroke.overprint, base.map(|s| &s.stroke.overprint)),
			stroke_width: Slot::diff(&style.stroke.width, base.map(|s| &s.stroke.width)),
			dash_offset: Slot::diff(&style.stroke.dash_offset, base.map(|s| &s.stroke.dash_offset)),
			dash_array: Slot::diff(&style.stroke.dash_array, base.map(|s| &s.stroke.dash_array)),
			cap: Slot::diff(&style.stroke.cap, base.map(|s| &s.stroke.cap)),
			join: Slot::diff(&style.stroke.join, base.map(|s| &s.stroke.join)),
			miter_limit: Slot::diff(&style.stroke.miter_limit, base.map(|s| &s.stroke.miter_limit)),
			clip: Slot::diff(&style.clip, base.map(|s| &s.clip)),
			lock_clip: Slot::diff(&style.lock_clip, base.map(|s| &s.lock_clip)),
			winding_rule: Slot::diff(&style.winding_rule, base.map(|s| &s.winding_rule)),
			resolution: Slot::diff(&style.resolution, base.map(|s| &s.resolution)),
		}
	}

	pub fn apply_to(self, style: &mut PathStyle) {
		self.fill_color.apply(&mut style.fill.color);
		self.fill_overprint.apply(&mut style.fill.overprint);
		self.stroke_color.apply(&mut style.stroke.color);
		self.stroke_overprint.apply(&mut style.stroke.overprint);
		self.stroke_width.apply(&mut style.stroke.width);
		self.dash_offset.apply(&mut style.stroke.dash_offset);
		self.dash_array.apply(&mut style.stroke.dash_array);
		self.cap.apply(&mut style.stroke.cap);
		self.join.apply(&mut style.stroke.join);
		self.miter_limit.apply(&mut style.stroke.miter_limit);
		self.clip.apply(&mut style.clip);
		self.lock_clip.apply(&mut style.lock_clip);
		self.winding_rule.apply(&mut style.winding_rule);
		self.resolution.apply(&mut style.resolution);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn stroked() -> PathStyle {
		PathStyle {
			stroke: StrokeStyle {
				color: Some(Color::gray(0.0)),
				width: Some(2.0),
				dash_array: Some(Vec::new()),
				..StrokeStyle::default()
			},
			winding_rule: Some(WindingRule::EvenOdd),
			..PathStyle::default()
		}
	}

	#[test]
	fn unchanged_style_patches_to_all_keep() {
		let style = stroked();
		assert_eq!(PathStylePatch::diff(&style, Baseline::Synced(&style)), PathStylePatch::default());
	}

	#[test]
	fn no_paint_is_a_set_not_a_clear() {
		let synced = stroked();
		let mut style = synced.clone();
		style.stroke.color = Some(Color::None);
		style.stroke.width = None;

		let patch = PathStylePatch::diff(&style, Baseline::Synced(&synced));
		assert_eq!(patch.stroke_color, Slot::Set(Color::None));
		assert_eq!(patch.stroke_width, Slot::Clear);
		assert!(patch.winding_rule.is_keep());
	}

	#[test]
	fn seeded_style_sets_only_defined_fields() {
		let seed = stroked();
		let patch = PathStylePatch::diff(&seed, Baseline::Seeded(&seed));
		assert_eq!(patch.stroke_width, Slot::Set(2.0));
		assert_eq!(patch.dash_array, Slot::Set(Vec::new()));
		assert_eq!(patch.fill_color, Slot::Keep);
	}

	#[test]
	fn seeded_field_cleared_before_commit_is_sent_as_clear() {
		let seed = stroked();
		let mut style = seed.clone();
		style.stroke.width = None;

		let patch = PathStylePatch::diff(&style, Baseline::Seeded(&seed));
		assert_eq!(patch.stroke_width, Slot::Clear);
		assert_eq!(patch.winding_rule, Slot::Set(WindingRule::EvenOdd));
		assert_eq!(patch.resolution, Slot::Keep);
	}

	#[test]
	fn overlay_copies_only_defined_fields() {
		let mut style = stroked();
		style.fill.color = Some(Color::gray(0.5));
		let incoming = PathStyle {
			fill: FillStyle {
				color: Some(Color::None),
				..FillStyle::default()
			},
			resolution: Some(72.0),
			..PathStyle::default()
		};

		style.overlay(&incoming);
		assert_eq!(style.fill.color, Some(Color::None));
		assert_eq!(style.resolution, Some(72.0));
		assert_eq!(style.stroke, stroked().stroke);
		assert_eq!(style.winding_rule, Some(WindingRule::EvenOdd));
	}

	#[test]
	fn apply_round_trips_diff() {
		let synced = stroked();
		let mut edited = synced.clone();
		edited.fill.color = Some(Color::rgb(1.0, 0.0, 0.0));
		edited.stroke.dash_array = None;

		let mut native = synced.clone();
		PathStylePatch::diff(&edited, Baseline::Synced(&synced)).apply_to(&mut native);
		assert_eq!(native, edited);
	}
}
