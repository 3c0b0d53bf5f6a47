use pretty_assertions::assert_eq;

use super::*;

#[test]
fn missing_file_yields_defaults_anchored_at_dir() {
	let dir = tempfile::tempdir().unwrap();
	let config = EngineConfig::load(dir.path()).unwrap();
	assert_eq!(config.script_dir, dir.path());
	assert_eq!(config.startup_path(), dir.path().join("startup"));
	assert_eq!(config.extension, "rhai");
	assert_eq!(config.max_flush_rounds, DEFAULT_MAX_FLUSH_ROUNDS);
	assert_eq!(config.console_name, "console");
}

#[test]
fn partial_file_overrides_given_fields() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(
		dir.path().join(CONFIG_FILE_NAME),
		"script_dir = \"scripts\"\nmax_flush_rounds = 4\nextension = \"gr\"\n",
	)
	.unwrap();

	let config = EngineConfig::load(dir.path()).unwrap();
	assert_eq!(config.script_dir, dir.path().join("scripts"));
	assert_eq!(config.max_flush_rounds, 4);
	assert_eq!(config.extension, "gr");
	assert_eq!(config.console_name, "console");
	assert!(config.is_source(Path::new("a/b.gr")));
	assert!(!config.is_source(Path::new("a/b.rhai")));
}

#[test]
fn unknown_keys_are_rejected() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(dir.path().join(CONFIG_FILE_NAME), "scripts = \"x\"\n").unwrap();

	let err = EngineConfig::load(dir.path()).unwrap_err();
	assert!(matches!(err, ConfigError::Toml { .. }), "{err}");
}

#[test]
fn absolute_paths_are_kept() {
	let config = EngineConfig {
		script_dir: PathBuf::from("/srv/scripts"),
		startup_dir: PathBuf::from("/etc/graver/startup"),
		..EngineConfig::default()
	};
	assert_eq!(config.startup_path(), PathBuf::from("/etc/graver/startup"));
	assert_eq!(config.resolve(Path::new("tools/a.rhai")), PathBuf::from("/srv/scripts/tools/a.rhai"));
	assert_eq!(config.resolve(Path::new("/tmp/b.rhai")), PathBuf::from("/tmp/b.rhai"));
}
