use digger_logging::{digger_info, initialize, initialize_for_tests, LogDestination};
use log::LevelFilter;
use tempfile::TempDir;

#[test]
fn repeated_initialization_is_harmless() {
    initialize_for_tests();
    initialize_for_tests();

    let temp = TempDir::new().unwrap();
    // A logger is already installed, so this must not panic or create a second logger.
    initialize(
        LogDestination::File(temp.path().join("digger.log")),
        LevelFilter::Info,
    );
    digger_info!("still logging after repeated init");
}

#[test]
fn unwritable_log_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    let missing_dir = temp.path().join("missing").join("digger.log");
    initialize(LogDestination::File(missing_dir.clone()), LevelFilter::Info);
    assert!(!missing_dir.exists());
}
