//! Conversions between document attribute values and script values.
//!
//! Undefined attributes surface as `()` and assigning `()` clears them.

use graver_primitives::{Color, StrokeCap, StrokeJoin, WindingRule};
use rhai::{Array, Dynamic, EvalAltResult, FLOAT, INT};

pub(crate) type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// A value that can cross the script boundary.
pub(crate) trait ScriptValue: Sized {
	fn into_dynamic(self) -> Dynamic;

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self>;
}

pub(crate) fn mismatch(property: &str, expected: &str, value: &Dynamic) -> Box<EvalAltResult> {
	format!("`{property}` expects {expected}, got {}", value.type_name()).into()
}

/// Accepts both integer and float literals.
pub(crate) fn number(value: &Dynamic, property: &str) -> ScriptResult<f32> {
	if let Ok(float) = value.as_float() {
		return Ok(float as f32);
	}
	if let Ok(int) = value.as_int() {
		return Ok(int as f32);
	}
	Err(mismatch(property, "a number", value))
}

/// `()` maps to `None`.
pub(crate) fn optional<T: ScriptValue>(value: Dynamic, property: &str) -> ScriptResult<Option<T>> {
	if value.is_unit() {
		return Ok(None);
	}
	T::from_dynamic(value, property).map(Some)
}

pub(crate) fn defined<T: ScriptValue>(value: Option<T>) -> Dynamic {
	value.map_or(Dynamic::UNIT, ScriptValue::into_dynamic)
}

impl ScriptValue for f32 {
	fn into_dynamic(self) -> Dynamic {
		Dynamic::from_float(FLOAT::from(self))
	}

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		number(&value, property)
	}
}

impl ScriptValue for i32 {
	fn into_dynamic(self) -> Dynamic {
		Dynamic::from_int(INT::from(self))
	}

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		let int = value.as_int().map_err(|_| mismatch(property, "an integer", &value))?;
		i32::try_from(int).map_err(|_| format!("`{property}` is out of range: {int}").into())
	}
}

impl ScriptValue for bool {
	fn into_dynamic(self) -> Dynamic {
		Dynamic::from_bool(self)
	}

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		value.as_bool().map_err(|_| mismatch(property, "a boolean", &value))
	}
}

impl ScriptValue for String {
	fn into_dynamic(self) -> Dynamic {
		Dynamic::from(self)
	}

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		let shown = value.type_name();
		value
			.into_string()
			.map_err(|_| format!("`{property}` expects a string, got {shown}").into())
	}
}

impl ScriptValue for Color {
	fn into_dynamic(self) -> Dynamic {
		Dynamic::from(self)
	}

	/// Takes a `Color` value or its textual form, e.g. `"rgb(1, 0, 0)"`.
	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		if value.is_string() {
			let text = String::from_dynamic(value, property)?;
			return text.parse().map_err(|err| format!("`{property}`: {err}").into());
		}
		let shown = value.type_name();
		value
			.try_cast::<Color>()
			.ok_or_else(|| format!("`{property}` expects a color, got {shown}").into())
	}
}

/// Dash patterns are arrays of numbers; `[]` is a solid line.
impl ScriptValue for Vec<f32> {
	fn into_dynamic(self) -> Dynamic {
		let array: Array = self.into_iter().map(ScriptValue::into_dynamic).collect();
		Dynamic::from_array(array)
	}

	fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
		let shown = value.type_name();
		let array = value
			.into_array()
			.map_err(|_| -> Box<EvalAltResult> { format!("`{property}` expects an array of numbers, got {shown}").into() })?;
		array.iter().map(|entry| number(entry, property)).collect()
	}
}

macro_rules! named_value {
	($($ty:ty),* $(,)?) => {
		$(
			/// Round-trips through the lowercase style name.
			impl ScriptValue for $ty {
				fn into_dynamic(self) -> Dynamic {
					Dynamic::from(self.as_str().to_owned())
				}

				fn from_dynamic(value: Dynamic, property: &str) -> ScriptResult<Self> {
					let name = String::from_dynamic(value, property)?;
					name.parse().map_err(|err| format!("`{property}`: {err}").into())
				}
			}
		)*
	};
}

named_value!(WindingRule, StrokeCap, StrokeJoin);
