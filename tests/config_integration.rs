use snip_core::config::{ConfigError, DEFAULT_FUZZY_THRESHOLD, DEFAULT_MAX_RESULTS, EngineConfig};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn defaults_are_valid() {
    let config = EngineConfig::default();
    assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
    assert_eq!(config.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);
    assert_eq!(config.reload_debounce(), Duration::from_millis(500));
    assert!(config.auto_reload);
    assert!(config.snippet_file.ends_with("snippets/snippets.yaml"));
    assert!(config.validate().is_ok());
}

#[test]
fn missing_file_is_created_with_defaults() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.yaml");

    let config = EngineConfig::load(&path);
    assert_eq!(config, EngineConfig::default());
    assert!(path.exists());
    assert_eq!(EngineConfig::read(&path).unwrap(), config);
}

#[test]
fn partial_file_keeps_other_defaults() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "max_results: 15\nauto_reload: false\n").unwrap();

    let config = EngineConfig::load(&path);
    assert_eq!(config.max_results, 15);
    assert!(!config.auto_reload);
    assert_eq!(config.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);

    let options = config.search_options();
    assert_eq!(options.max_results, 15);
    assert_eq!(options.threshold, DEFAULT_FUZZY_THRESHOLD);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "max_results: [not a number").unwrap();

    assert!(matches!(EngineConfig::read(&path), Err(ConfigError::Parse(_))));
    assert_eq!(EngineConfig::load(&path), EngineConfig::default());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "max_results: [not a number"
    );
}

#[test]
fn validation_reports_every_problem() {
    let config = EngineConfig {
        snippet_file: PathBuf::new(),
        max_results: 50,
        fuzzy_threshold: 10.0,
        reload_debounce_ms: 500,
        auto_reload: true,
    };

    match config.validate() {
        Err(ConfigError::Invalid(errors)) => {
            assert_eq!(errors.len(), 3);
            assert!(errors.iter().any(|e| e.contains("max_results")));
            assert!(errors.iter().any(|e| e.contains("fuzzy_threshold")));
        }
        other => panic!("expected invalid config, got {other:?}"),
    }
}

#[test]
fn save_and_read_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    let config = EngineConfig {
        snippet_file: temp_dir.path().join("mine.yaml"),
        max_results: 7,
        fuzzy_threshold: 55.5,
        reload_debounce_ms: 250,
        auto_reload: false,
    };

    config.save(&path).unwrap();
    assert_eq!(EngineConfig::read(&path).unwrap(), config);
}
