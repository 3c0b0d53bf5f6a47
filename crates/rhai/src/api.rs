//! Script-visible types and functions.
//!
//! `Item` values are the session's cached items, so two lookups of the same id
//! share style proxies. Property reads go through the proxy cache and writes mark
//! the proxy dirty; nothing reaches the native document before the run's flush.

use std::rc::Rc;

use graver_document::{
	CharacterStyle, FillStyle, Item, ItemDirectory, NativeDocument, NativeError, PathStyle, ProxyAttributes, ProxyRef, StrokeStyle,
};
use graver_primitives::{Color, ItemId, StrokeCap, StrokeJoin, WindingRule};
use rhai::{Array, Dynamic, Engine, EvalAltResult, INT, Map};

use crate::SharedSession;
use crate::values::{ScriptResult, ScriptValue, defined, mismatch, number, optional};

fn native_error(err: NativeError) -> Box<EvalAltResult> {
	err.to_string().into()
}

fn item_id(id: INT) -> ScriptResult<ItemId> {
	u64::try_from(id)
		.map(ItemId)
		.map_err(|_| format!("item ids are non-negative, got {id}").into())
}

fn id_value(item: &Item) -> ScriptResult<INT> {
	INT::try_from(item.id().0).map_err(|_| format!("{} does not fit a script integer", item.id()).into())
}

pub(crate) fn register_colors(engine: &mut Engine) {
	engine
		.register_type_with_name::<Color>("Color")
		.register_fn("no_paint", || Color::None)
		.register_fn("gray", |gray: Dynamic| -> ScriptResult<Color> { Ok(Color::gray(number(&gray, "gray")?)) })
		.register_fn("rgb", |red: Dynamic, green: Dynamic, blue: Dynamic| -> ScriptResult<Color> {
			Ok(Color::rgb(number(&red, "red")?, number(&green, "green")?, number(&blue, "blue")?))
		})
		.register_fn(
			"cmyk",
			|cyan: Dynamic, magenta: Dynamic, yellow: Dynamic, black: Dynamic| -> ScriptResult<Color> {
				Ok(Color::cmyk(
					number(&cyan, "cyan")?,
					number(&magenta, "magenta")?,
					number(&yellow, "yellow")?,
					number(&black, "black")?,
				))
			},
		)
		.register_fn("color", |text: &str| -> ScriptResult<Color> {
			text.parse().map_err(|err| format!("{err}").into())
		})
		.register_fn("with_alpha", |color: &mut Color, alpha: Dynamic| -> ScriptResult<Color> {
			Ok((*color).with_alpha(number(&alpha, "alpha")?))
		})
		.register_get("alpha", |color: &mut Color| defined(color.alpha()))
		.register_get("model", |color: &mut Color| color.model().to_owned())
		.register_get("is_none", |color: &mut Color| color.is_none())
		.register_fn("to_string", |color: &mut Color| color.to_string())
		.register_fn("to_debug", |color: &mut Color| color.to_string())
		.register_fn("==", |a: Color, b: Color| a == b)
		.register_fn("!=", |a: Color, b: Color| a != b);
}

/// Registers a read/write property over one optional attribute field.
fn register_property<N, A, T>(
	engine: &mut Engine,
	session: &SharedSession<N>,
	name: &'static str,
	get: fn(&A) -> Option<T>,
	set: fn(&mut A, Option<T>),
) where
	N: NativeDocument + ItemDirectory + 'static,
	A: ProxyAttributes + 'static,
	T: ScriptValue + 'static,
{
	let reader = Rc::clone(session);
	let writer = Rc::clone(session);
	engine.register_get_set(
		name,
		move |proxy: &mut ProxyRef<A>| -> ScriptResult<Dynamic> {
			let value = reader.borrow_mut().read(proxy, get).map_err(native_error)?;
			Ok(defined(value))
		},
		move |proxy: &mut ProxyRef<A>, value: Dynamic| -> ScriptResult<()> {
			let value = optional::<T>(value, name)?;
			writer.borrow_mut().write(proxy, |attributes| set(attributes, value)).map_err(native_error)
		},
	);
}

macro_rules! properties {
	($engine:ident, $session:ident, $attributes:ty { $($name:literal => $($field:ident).+ : $value:ty),* $(,)? }) => {
		$(
			register_property::<N, $attributes, $value>(
				$engine,
				$session,
				$name,
				|attributes: &$attributes| attributes.$($field).+.clone(),
				|attributes: &mut $attributes, value: Option<$value>| attributes.$($field).+ = value,
			);
		)*
	};
}

pub(crate) fn register_styles<N>(engine: &mut Engine, session: &SharedSession<N>)
where
	N: NativeDocument + ItemDirectory + 'static,
{
	engine.register_type_with_name::<ProxyRef<PathStyle>>("PathStyle");
	engine.register_type_with_name::<ProxyRef<CharacterStyle>>("CharacterStyle");

	properties!(engine, session, PathStyle {
		"fill_color" => fill.color: Color,
		"fill_overprint" => fill.overprint: bool,
		"stroke_color" => stroke.color: Color,
		"stroke_overprint" => stroke.overprint: bool,
		"stroke_width" => stroke.width: f32,
		"dash_offset" => stroke.dash_offset: f32,
		"dash_array" => stroke.dash_array: Vec<f32>,
		"stroke_cap" => stroke.cap: StrokeCap,
		"stroke_join" => stroke.join: StrokeJoin,
		"miter_limit" => stroke.miter_limit: f32,
		"clip" => clip: bool,
		"lock_clip" => lock_clip: bool,
		"winding_rule" => winding_rule: WindingRule,
		"resolution" => resolution: f32,
	});

	properties!(engine, session, CharacterStyle {
		"font_name" => font_name: String,
		"font_size" => font_size: f32,
		"leading" => leading: f32,
		"tracking" => tracking: i32,
		"horizontal_scale" => horizontal_scale: f32,
	});
}

fn unknown_key(owner: &str, key: &str) -> Box<EvalAltResult> {
	format!("{owner} has no property `{key}`").into()
}

/// A paint slot where `()` means "no paint" rather than "undefined".
fn paint(value: Dynamic, property: &str) -> ScriptResult<Color> {
	if value.is_unit() {
		return Ok(Color::None);
	}
	Color::from_dynamic(value, property)
}

fn as_map(value: Dynamic, property: &str) -> ScriptResult<Map> {
	let shown = value.clone();
	value.try_cast::<Map>().ok_or_else(|| mismatch(property, "an object map", &shown))
}

/// `fill: ()` paints nothing; otherwise a map of fill fields.
fn fill_from(value: Dynamic) -> ScriptResult<FillStyle> {
	if value.is_unit() {
		return Ok(FillStyle {
			color: Some(Color::None),
			..FillStyle::default()
		});
	}
	let mut fill = FillStyle::default();
	for (key, value) in as_map(value, "fill")? {
		match key.as_str() {
			"color" => fill.color = Some(paint(value, "fill.color")?),
			"overprint" => fill.overprint = optional(value, "fill.overprint")?,
			other => return Err(unknown_key("fill", other)),
		}
	}
	Ok(fill)
}

/// `stroke: ()` paints nothing; otherwise a map of stroke fields.
fn stroke_from(value: Dynamic) -> ScriptResult<StrokeStyle> {
	if value.is_unit() {
		return Ok(StrokeStyle {
			color: Some(Color::None),
			..StrokeStyle::default()
		});
	}
	let mut stroke = StrokeStyle::default();
	for (key, value) in as_map(value, "stroke")? {
		match key.as_str() {
			"color" => stroke.color = Some(paint(value, "stroke.color")?),
			"overprint" => stroke.overprint = optional(value, "stroke.overprint")?,
			"width" => stroke.width = optional(value, "stroke.width")?,
			"dash_offset" => stroke.dash_offset = optional(value, "stroke.dash_offset")?,
			"dash_array" => stroke.dash_array = optional(value, "stroke.dash_array")?,
			"cap" => stroke.cap = optional(value, "stroke.cap")?,
			"join" => stroke.join = optional(value, "stroke.join")?,
			"miter_limit" => stroke.miter_limit = optional(value, "stroke.miter_limit")?,
			other => return Err(unknown_key("stroke", other)),
		}
	}
	Ok(stroke)
}

/// Builds a path style from an object map.
///
/// Keys are the `PathStyle` property names, plus nested `fill` and `stroke`
/// maps. Absent keys stay undefined.
fn path_style_from(map: Map) -> ScriptResult<PathStyle> {
	let mut style = PathStyle::default();
	// Keys iterate sorted, so flat `fill_*`/`stroke_*` keys override the nested maps.
	for (key, value) in map {
		match key.as_str() {
			"fill" => style.fill = fill_from(value)?,
			"stroke" => style.stroke = stroke_from(value)?,
			"fill_color" => style.fill.color = Some(paint(value, "fill_color")?),
			"fill_overprint" => style.fill.overprint = optional(value, "fill_overprint")?,
			"stroke_color" => style.stroke.color = Some(paint(value, "stroke_color")?),
			"stroke_overprint" => style.stroke.overprint = optional(value, "stroke_overprint")?,
			"stroke_width" => style.stroke.width = optional(value, "stroke_width")?,
			"dash_offset" => style.stroke.dash_offset = optional(value, "dash_offset")?,
			"dash_array" => style.stroke.dash_array = optional(value, "dash_array")?,
			"stroke_cap" => style.stroke.cap = optional(value, "stroke_cap")?,
			"stroke_join" => style.stroke.join = optional(value, "stroke_join")?,
			"miter_limit" => style.stroke.miter_limit = optional(value, "miter_limit")?,
			"clip" => style.clip = optional(value, "clip")?,
			"lock_clip" => style.lock_clip = optional(value, "lock_clip")?,
			"winding_rule" => style.winding_rule = optional(value, "winding_rule")?,
			"resolution" => style.resolution = optional(value, "resolution")?,
			other => return Err(unknown_key("PathStyle", other)),
		}
	}
	Ok(style)
}

pub(crate) fn register_items<N>(engine: &mut Engine, session: &SharedSession<N>)
where
	N: NativeDocument + ItemDirectory + 'static,
{
	engine
		.register_type_with_name::<Item>("Item")
		.register_get("id", |item: &mut Item| id_value(item))
		.register_get("style", |item: &mut Item| item.style())
		.register_get("character_style", |item: &mut Item| item.character_style())
		.register_fn("to_string", |item: &mut Item| item.id().to_string())
		.register_fn("to_debug", |item: &mut Item| format!("{item:?}"))
		.register_fn("==", |a: Item, b: Item| a.ptr_eq(&b))
		.register_fn("!=", |a: Item, b: Item| !a.ptr_eq(&b));

	let versions = Rc::clone(session);
	engine.register_get("version", move |item: &mut Item| -> ScriptResult<INT> {
		let version = versions.borrow().document_version(item);
		INT::try_from(version.0).map_err(|_| format!("{version} does not fit a script integer").into())
	});

	// Assigning a style copies the fields it defines; the rest of the item's style is kept.
	let styles = Rc::clone(session);
	engine.register_set("style", move |item: &mut Item, value: Dynamic| -> ScriptResult<()> {
		let mut session = styles.borrow_mut();
		let incoming = if value.is::<ProxyRef<PathStyle>>() {
			let source = value.cast::<ProxyRef<PathStyle>>();
			session.read(&source, |style| style.clone()).map_err(native_error)?
		} else if value.is::<Map>() {
			path_style_from(value.cast::<Map>())?
		} else {
			return Err(mismatch("style", "a PathStyle or an object map", &value));
		};
		session
			.write(&item.style(), |style| style.overlay(&incoming))
			.map_err(native_error)
	});

	let lookup = Rc::clone(session);
	engine.register_fn("item", move |id: INT| -> ScriptResult<Item> {
		let id = item_id(id)?;
		lookup.borrow_mut().item(id).ok_or_else(|| format!("{id} does not exist").into())
	});

	let listing = Rc::clone(session);
	engine.register_fn("items", move || -> Array {
		let mut session = listing.borrow_mut();
		let ids = session.item_ids();
		ids.into_iter().filter_map(|id| session.item(id)).map(Dynamic::from).collect()
	});
}
