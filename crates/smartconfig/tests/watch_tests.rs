//! Integration tests for hot reload.
//!
//! These tests touch real files and depend on filesystem notification
//! latency, so they run serially with generous timeouts.

#![cfg(feature = "watch")]
#![allow(clippy::pedantic)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serial_test::serial;
use smartconfig::{ConfigHandle, Schema, Session, WatchError};
use tempfile::tempdir;

// ============================================================================
// Test Configuration Types
// ============================================================================

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct Listener {
    #[flag("H|127.0.0.1|Listen {IP}")]
    ip: String,

    #[flag("p|8080|Listen {Port}")]
    port: u16,
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
struct AppConfig {
    listener: Listener,
    name: String,
}

const TIMEOUT: Duration = Duration::from_secs(5);

fn start(dir: &Path, args: &[&str]) -> ConfigHandle<AppConfig> {
    Session::new("watched", "0.1.0")
        .search_dir(dir)
        .debounce(Duration::from_millis(50))
        .args(std::iter::once("watched").chain(args.iter().copied()))
        .run(AppConfig::default())
        .expect("session should run")
        .running()
        .expect("session should not end in a terminal branch")
}

/// Poll until `check` holds for the current snapshot.
fn wait_for(handle: &ConfigHandle<AppConfig>, check: impl Fn(&AppConfig) -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if handle.read(&check) {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

// ============================================================================
// Reload Tests
// ============================================================================

#[test]
#[serial]
fn test_watching_starts_when_file_found() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"name": "initial"}"#).unwrap();

    let handle = start(dir.path(), &[]);

    assert!(handle.is_watching());
    assert_eq!(handle.read(|c| c.name.clone()), "initial");
    assert_eq!(handle.epoch(), 0);
    assert!(handle.changed().is_empty());

    handle.stop();
    assert!(!handle.is_watching());
}

#[test]
#[serial]
fn test_rewrite_is_published() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "initial"}"#).unwrap();

    let handle = start(dir.path(), &[]);

    // Give the backend a moment to install the watch.
    thread::sleep(Duration::from_millis(100));
    fs::write(&path, r#"{"name": "updated", "listener": {"port": 9000}}"#).unwrap();

    let config = handle
        .changed()
        .recv_timeout(TIMEOUT)
        .expect("reload should be published");

    assert_eq!(config.name, "updated");
    assert_eq!(config.listener.port, 9000);
    assert_eq!(config.listener.ip, "127.0.0.1");
    assert_eq!(*handle.get(), *config);
    assert!(handle.has_changed_since(0));
}

#[test]
#[serial]
fn test_slot_keeps_only_latest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "initial"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    thread::sleep(Duration::from_millis(100));

    fs::write(&path, r#"{"name": "first"}"#).unwrap();
    assert!(wait_for(&handle, |c| c.name == "first"));

    fs::write(&path, r#"{"name": "second"}"#).unwrap();
    assert!(wait_for(&handle, |c| c.name == "second"));

    // Let the publish that follows the swap land.
    thread::sleep(Duration::from_millis(200));

    let pending: Vec<Arc<AppConfig>> = handle.changed().try_iter().collect();
    assert!(!pending.is_empty());
    assert!(pending.iter().all(|c| c.name == "second"));
}

#[test]
#[serial]
fn test_command_line_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"listener": {"port": 1000}}"#).unwrap();

    let handle = start(dir.path(), &["--listener.port", "2000"]);
    assert_eq!(handle.read(|c| c.listener.port), 2000);
    thread::sleep(Duration::from_millis(100));

    fs::write(&path, r#"{"listener": {"port": 3000, "ip": "0.0.0.0"}}"#).unwrap();
    assert!(wait_for(&handle, |c| c.listener.ip == "0.0.0.0"));

    assert_eq!(handle.read(|c| c.listener.port), 2000);
}

#[test]
#[serial]
fn test_broken_rewrite_keeps_previous() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "good"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    thread::sleep(Duration::from_millis(100));

    fs::write(&path, "{ broken").unwrap();
    thread::sleep(Duration::from_millis(500));

    assert_eq!(handle.read(|c| c.name.clone()), "good");
    assert!(handle.changed().is_empty());
    assert!(handle.is_watching());

    // The watcher keeps going after a failed reload.
    fs::write(&path, r#"{"name": "fixed"}"#).unwrap();
    let config = handle.changed().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(config.name, "fixed");
}

#[test]
#[serial]
fn test_atomic_replace_is_picked_up() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "before"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    thread::sleep(Duration::from_millis(100));

    // Editors save by writing a sibling and renaming it over the original.
    let staging = dir.path().join("config.json.tmp");
    fs::write(&staging, r#"{"name": "after"}"#).unwrap();
    fs::rename(&staging, &path).unwrap();

    assert!(wait_for(&handle, |c| c.name == "after"));
}

// ============================================================================
// Manual Reload and Lifecycle
// ============================================================================

#[test]
#[serial]
fn test_reload_after_stop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "one"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    handle.stop();

    // Stopped handles refuse to reload.
    assert!(matches!(handle.reload(), Err(WatchError::Stopped)));
}

#[test]
#[serial]
fn test_manual_reload_reads_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "one"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    fs::write(&path, r#"{"name": "two"}"#).unwrap();

    let config = handle.reload().unwrap();
    assert_eq!(config.name, "two");
    assert_eq!(handle.read(|c| c.name.clone()), "two");
}

#[test]
#[serial]
fn test_manual_reload_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "one"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    fs::write(&path, r#"{"listener": {"port": "not a port"}}"#).unwrap();

    assert!(matches!(
        handle.reload(),
        Err(WatchError::ReloadFailed { .. })
    ));
    assert_eq!(handle.read(|c| c.name.clone()), "one");
}

#[test]
#[serial]
fn test_clones_share_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"name": "shared"}"#).unwrap();

    let handle = start(dir.path(), &[]);
    let clone = handle.clone();
    drop(handle);

    assert!(clone.is_watching());
    fs::write(&path, r#"{"name": "seen by clone"}"#).unwrap();
    assert_eq!(clone.reload().unwrap().name, "seen by clone");
}

#[test]
#[serial]
fn test_no_file_no_watcher() {
    let dir = tempdir().unwrap();
    let handle = start(dir.path(), &[]);

    assert!(!handle.is_watching());
    assert!(handle.config_file().is_none());

    // Manual reload still applies defaults over the current snapshot.
    let config = handle.reload().unwrap();
    assert_eq!(config.listener.port, 8080);
    assert_eq!(handle.changed().try_recv().unwrap().listener.port, 8080);
}
