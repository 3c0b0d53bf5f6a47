use graver_document::{AttributePatch, MemoryDocument, Slot, StoredItem};
use graver_primitives::{Color, ItemId, StrokeCap, WindingRule};
use graver_script::{CaptureSink, DiagnosticKind, Engine, EngineConfig, EngineError, OsFs, RunOutcome};
use pretty_assertions::assert_eq;

use super::*;

type TestEngine = Engine<RhaiBackend<MemoryDocument>, OsFs>;

/// Items 1 and 2; item 1 starts with a gray fill and a 12pt font.
fn engine() -> (TestEngine, SharedSession<MemoryDocument>, CaptureSink) {
	let mut document = MemoryDocument::new();
	let mut first = StoredItem::default();
	first.style.fill.color = Some(Color::gray(0.5));
	first.character_style.font_size = Some(12.0);
	document.insert(ItemId(1), first);
	document.insert(ItemId(2), StoredItem::default());

	let backend = RhaiBackend::new(Session::new(document));
	let session = Rc::clone(backend.session());
	let sink = CaptureSink::new();
	(Engine::with_parts(backend, OsFs, EngineConfig::default(), sink.clone()), session, sink)
}

fn run(engine: &mut TestEngine, source: &str) -> RunOutcome {
	engine.run_source_text(source, None).unwrap()
}

fn stored(session: &SharedSession<MemoryDocument>, id: u64) -> StoredItem {
	session.borrow().native().item(ItemId(id)).cloned().unwrap()
}

#[test]
fn print_goes_to_the_console() {
	let (mut engine, _, sink) = engine();
	assert!(run(&mut engine, r#"print("hello"); print(1 + 2);"#).is_success());
	assert_eq!(sink.outputs(), vec!["hello".to_owned(), "3".to_owned()]);
}

#[test]
fn style_write_is_committed_when_the_run_ends() {
	let (mut engine, session, _) = engine();
	let outcome = run(&mut engine, "let style = item(1).style;\nstyle.fill_color = rgb(1, 0, 0);");
	assert!(outcome.is_success(), "{:?}", outcome.diagnostic());
	assert_eq!(outcome.flushed().committed, 1);
	assert_eq!(stored(&session, 1).style.fill.color, Some(Color::rgb(1.0, 0.0, 0.0)));
	assert!(session.borrow().commits().is_empty());
}

#[test]
fn script_reads_its_own_uncommitted_writes() {
	let (mut engine, session, sink) = engine();
	let source = "let style = item(2).style;\nstyle.stroke_width = 2;\nprint(item(2).style.stroke_width);";
	assert!(run(&mut engine, source).is_success());
	assert_eq!(sink.outputs(), vec!["2.0".to_owned()]);
	assert_eq!(session.borrow().native().fetch_count(), 1, "one fetch serves the whole run");
}

#[test]
fn undefined_attribute_reads_as_unit() {
	let (mut engine, _, sink) = engine();
	run(&mut engine, "print(type_of(item(2).style.dash_array));");
	assert_eq!(sink.outputs(), vec!["()".to_owned()]);
}

#[test]
fn assigning_unit_clears_the_attribute() {
	let (mut engine, session, _) = engine();
	assert!(run(&mut engine, "let style = item(1).style;\nstyle.fill_color = ();").is_success());
	assert_eq!(stored(&session, 1).style.fill.color, None);
	let Some((_, AttributePatch::PathStyle(patch))) = session.borrow().native().last_patch().cloned() else {
		panic!("expected a path style patch");
	};
	assert_eq!(patch.fill_color, Slot::Clear);
}

#[test]
fn no_paint_is_distinct_from_undefined() {
	let (mut engine, session, _) = engine();
	run(&mut engine, "let style = item(2).style;\nstyle.stroke_color = no_paint();");
	assert_eq!(stored(&session, 2).style.stroke.color, Some(Color::None));
}

#[test]
fn colors_accept_their_text_form() {
	let (mut engine, session, sink) = engine();
	let source = r#"
		let style = item(2).style;
		style.fill_color = "cmyk(0, 1, 1, 0)";
		print(style.fill_color);
		print(gray(0.5).with_alpha(0.25));
		print(color("rgb(1, 0.5, 0)").model);
	"#;
	assert!(run(&mut engine, source).is_success());
	assert_eq!(
		sink.outputs(),
		vec!["cmyk(0, 1, 1, 0)".to_owned(), "gray(0.5, 0.25)".to_owned(), "rgb".to_owned()]
	);
	assert_eq!(stored(&session, 2).style.fill.color, Some(Color::cmyk(0.0, 1.0, 1.0, 0.0)));
}

#[test]
fn dash_array_and_style_names_round_trip() {
	let (mut engine, session, sink) = engine();
	let source = r#"
		let style = item(2).style;
		style.dash_array = [3, 1.5];
		style.winding_rule = "even-odd";
		print(style.winding_rule);
	"#;
	assert!(run(&mut engine, source).is_success());
	assert_eq!(sink.outputs(), vec!["even-odd".to_owned()]);
	let item = stored(&session, 2);
	assert_eq!(item.style.stroke.dash_array, Some(vec![3.0, 1.5]));
	assert_eq!(item.style.winding_rule, Some(WindingRule::EvenOdd));
}

#[test]
fn character_style_is_a_separate_proxy() {
	let (mut engine, session, sink) = engine();
	let source = "let text = item(1).character_style;\nprint(text.font_size);\ntext.tracking = 50;";
	let outcome = run(&mut engine, source);
	assert!(outcome.is_success(), "{:?}", outcome.diagnostic());
	assert_eq!(sink.outputs(), vec!["12.0".to_owned()]);
	assert_eq!(outcome.flushed().committed, 1);
	assert_eq!(stored(&session, 1).character_style.tracking, Some(50));
	assert_eq!(stored(&session, 1).style.fill.color, Some(Color::gray(0.5)));
}

#[test]
fn bad_style_name_is_a_runtime_error_at_its_line() {
	let (mut engine, _, _) = engine();
	let outcome = run(&mut engine, "let style = item(1).style;\nstyle.winding_rule = \"sideways\";");
	let diagnostic = outcome.diagnostic().unwrap();
	assert_eq!(diagnostic.kind, DiagnosticKind::Runtime);
	assert_eq!(diagnostic.line, Some(2));
	assert!(diagnostic.message.contains("sideways"), "{diagnostic}");
	assert_eq!(diagnostic.source_name, "console");
}

#[test]
fn edits_before_a_runtime_error_are_still_committed() {
	let (mut engine, session, _) = engine();
	let outcome = run(&mut engine, "let style = item(2).style;\nstyle.clip = true;\nthrow \"stop\";");
	assert!(!outcome.is_success());
	assert_eq!(outcome.flushed().committed, 1);
	assert_eq!(stored(&session, 2).style.clip, Some(true));
}

#[test]
fn parse_error_is_a_compile_diagnostic() {
	let (mut engine, _, _) = engine();
	let outcome = run(&mut engine, "print(1);\nlet x = ;");
	let diagnostic = outcome.diagnostic().unwrap();
	assert_eq!(diagnostic.kind, DiagnosticKind::Compile);
	assert_eq!(diagnostic.line, Some(2));
	assert!(diagnostic.column.is_some());
}

#[test]
fn unknown_item_is_reported() {
	let (mut engine, _, _) = engine();
	let outcome = run(&mut engine, "item(99)");
	let diagnostic = outcome.diagnostic().unwrap();
	assert!(diagnostic.message.contains("item#99 does not exist"), "{diagnostic}");
}

#[test]
fn items_lists_the_document_in_id_order() {
	let (mut engine, _, sink) = engine();
	run(&mut engine, "for entry in items() { print(entry.id); }\nprint(item(1) == items()[0]);");
	assert_eq!(sink.outputs(), vec!["1".to_owned(), "2".to_owned(), "true".to_owned()]);
}

#[test]
fn item_version_tracks_native_commits() {
	let (mut engine, session, sink) = engine();
	let before = session.borrow().native().version().0;
	run(&mut engine, "let it = item(1);\nprint(it.version);\nlet style = it.style;\nstyle.resolution = 300;");
	run(&mut engine, "print(item(1).version);");
	let after = session.borrow().native().version().0;
	assert_eq!(after, before + 1, "one commit, one version step");
	assert_eq!(sink.outputs(), vec![before.to_string(), after.to_string()]);
}

#[test]
fn supplied_scope_keeps_variables_between_runs() {
	let (mut engine, _, sink) = engine();
	let mut scope = engine.backend_mut().new_scope();
	engine.run_source_text("let width = 4;", Some(&mut scope)).unwrap();
	engine.run_source_text("print(width * 2);", Some(&mut scope)).unwrap();
	assert_eq!(sink.outputs(), vec!["8".to_owned()]);
}

#[test]
fn commit_rejection_is_fatal_to_the_engine() {
	let (mut engine, session, _) = engine();
	session.borrow_mut().native_mut().reject_next_commit("document is locked");
	let err = engine.run_source_text("let style = item(2).style;\nstyle.clip = false;", None).unwrap_err();
	assert!(matches!(err, EngineError::Commit(_)), "{err}");
	assert_eq!(session.borrow().commits().pending_len(), 1);
}

#[test]
fn type_mismatch_names_the_property() {
	let (mut engine, _, _) = engine();
	let outcome = run(&mut engine, "let style = item(1).style;\nstyle.stroke_width = \"wide\";");
	let diagnostic = outcome.diagnostic().unwrap();
	assert!(diagnostic.message.contains("stroke_width"), "{diagnostic}");
}

#[test]
fn assigning_a_map_sets_only_the_keys_it_names() {
	let (mut engine, session, _) = engine();
	let source = "let it = item(1);\nit.style = #{ stroke: #{ width: 3, cap: \"round\" }, winding_rule: \"even-odd\", resolution: 72 };";
	let outcome = run(&mut engine, source);
	assert!(outcome.is_success(), "{:?}", outcome.diagnostic());

	let style = stored(&session, 1).style;
	assert_eq!(style.stroke.width, Some(3.0));
	assert_eq!(style.stroke.cap, Some(StrokeCap::Round));
	assert_eq!(style.winding_rule, Some(WindingRule::EvenOdd));
	assert_eq!(style.resolution, Some(72.0));
	assert_eq!(style.fill.color, Some(Color::gray(0.5)), "fill was not named");
}

#[test]
fn unit_fill_in_a_style_map_means_no_paint() {
	let (mut engine, session, sink) = engine();
	let outcome = run(&mut engine, "let it = item(1);\nit.style = #{ fill: () };\nprint(it.style.fill_color.is_none);");
	assert!(outcome.is_success(), "{:?}", outcome.diagnostic());
	assert_eq!(sink.outputs(), vec!["true".to_owned()]);
	assert_eq!(stored(&session, 1).style.fill.color, Some(Color::None));

	run(&mut engine, "let it = item(2);\nit.style = #{ stroke_color: () };");
	assert_eq!(stored(&session, 2).style.stroke.color, Some(Color::None));
}

#[test]
fn assigning_another_items_style_copies_its_fields() {
	let (mut engine, session, _) = engine();
	let source = "let source = item(1).style;\nsource.clip = true;\nlet target = item(2);\ntarget.style = source;";
	let outcome = run(&mut engine, source);
	assert!(outcome.is_success(), "{:?}", outcome.diagnostic());
	assert_eq!(outcome.flushed().committed, 2);

	let copied = stored(&session, 2).style;
	assert_eq!(copied.fill.color, Some(Color::gray(0.5)));
	assert_eq!(copied.clip, Some(true));
	assert_eq!(stored(&session, 1).style.clip, Some(true));
}

#[test]
fn style_map_with_an_unknown_key_fails_the_run() {
	let (mut engine, session, _) = engine();
	let outcome = run(&mut engine, "let it = item(1);\nit.style = #{ fil: () };");
	let diagnostic = outcome.diagnostic().unwrap();
	assert_eq!(diagnostic.kind, DiagnosticKind::Runtime);
	assert!(diagnostic.message.contains("no property `fil`"), "{diagnostic}");
	assert_eq!(stored(&session, 1).style.fill.color, Some(Color::gray(0.5)));
}
