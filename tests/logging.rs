use traystore::config::LoggingConfig;
use traystore::logging::{init_tracing, LoggingError, LOG_FILE_ENV};

// Installs the global subscriber, so everything lives in one test.
#[test]
fn init_tracing_writes_to_configured_file() {
    std::env::remove_var(LOG_FILE_ENV);
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("traystore.log");
    let config = LoggingConfig {
        filter: "warn".to_string(),
        file: Some(path.clone()),
        ansi: false,
    };

    init_tracing(&config).unwrap();
    tracing::error!(target: "traystore", "logging smoke test");

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("logging smoke test"));
    assert!(contents.contains("ERROR"));

    assert!(matches!(
        init_tracing(&config),
        Err(LoggingError::AlreadyInitialized(_))
    ));
}
