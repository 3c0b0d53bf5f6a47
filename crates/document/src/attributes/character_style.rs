use serde::{Deserialize, Serialize};

use crate::native::{Baseline, Slot};

/// Text attributes of a text item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStyle {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub font_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub font_size: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub leading: Option<f32>,
	/// Tracking in thousandths of an em.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tracking: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub horizontal_scale: Option<f32>,
}

/// Commit payload for a [`CharacterStyle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterStylePatch {
	pub font_name: Slot<String>,
	pub font_size: Slot<f32>,
	pub leading: Slot<f32>,
	pub tracking: Slot<i32>,
	pub horizontal_scale: Slot<f32>,
}

impl CharacterStylePatch {
	pub fn diff(style: &CharacterStyle, base: Baseline<'_, CharacterStyle>) -> Self {
		Self {
			font_name: Slot::diff(&style.font_name, base.map(|s| &s.font_name)),
			font_size: Slot::diff(&style.font_size, base.map(|s| &s.font_size)),
			leading: Slot::diff(&style.leading, base.map(|s| &s.leading)),
			tracking: Slot::diff(&style.tracking, base.map(|s| &s.tracking)),
			horizontal_scale: Slot::diff(&style.horizontal_scale, base.map(|s| &s.horizontal_scale)),
		}
	}

	pub fn apply_to(self, style: &mut CharacterStyle) {
		self.font_name.apply(&mut style.font_name);
		self.font_size.apply(&mut style.font_size);
		self.leading.apply(&mut style.leading);
		self.tracking.apply(&mut style.tracking);
		self.horizontal_scale.apply(&mut style.horizontal_scale);
	}
}
