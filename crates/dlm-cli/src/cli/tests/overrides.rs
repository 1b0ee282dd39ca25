//! Tests for overlaying flags onto the loaded config.

use crate::cli::SessionArgs;
use dlm_core::ManagerConfig;

#[test]
fn no_flags_keep_file_values() {
    let file = ManagerConfig::new(9778, "/Volumes/filespace", 3).with_max_workers(6);
    let cfg = SessionArgs::default().apply(file.clone());
    assert_eq!(cfg, file);
}

#[test]
fn flags_win_over_file_values() {
    let file = ManagerConfig::new(9778, "/Volumes/filespace", 3);
    let args = SessionArgs {
        port: Some(7001),
        mount_point: Some("/mnt/fs".to_string()),
        api_version: Some(2),
        workers: Some(2),
        filespace: Some("acme".to_string()),
    };
    let cfg = args.apply(file);
    assert_eq!(cfg.port, 7001);
    assert_eq!(cfg.mount_point, "/mnt/fs");
    assert_eq!(cfg.version, 2);
    assert_eq!(cfg.max_workers, 2);
    assert_eq!(cfg.filespace.as_deref(), Some("acme"));
    assert!(cfg.validate().is_ok());
}
