//! Integration tests for the dispatcher surface
//!
//! Tests cover:
//! - Context identity assignment across handles
//! - Unknown/stale handle behavior
//! - The wait barrier and its reusability
//! - Cross-context concurrency
//! - Activity counters

use std::sync::Arc;
use std::thread;

use bulkline::{Dispatcher, DispatcherConfig, RegistryError};
use tempfile::TempDir;

use super::test_utils::{find_bulk_file, read_bulk_file};

fn dispatcher_in(dir: &TempDir) -> Dispatcher {
    let config = DispatcherConfig {
        output_dir: dir.path().to_path_buf(),
        ..DispatcherConfig::default()
    };
    Dispatcher::new(config).unwrap()
}

#[test]
fn context_ids_follow_connect_order_not_receive_order() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    let h1 = dispatcher.connect(3).unwrap();
    let h2 = dispatcher.connect(3).unwrap();

    // The second context is fed and closed first; identities stay put.
    dispatcher.receive(h2, b"b1\nb2\nb3\n");
    dispatcher.disconnect(h2).unwrap();
    dispatcher.receive(h1, b"a1\na2\na3\n");
    dispatcher.disconnect(h1).unwrap();
    dispatcher.wait();

    assert_eq!(read_bulk_file(dir.path(), 1, 1).unwrap(), "bulk: a1, a2, a3\n");
    assert_eq!(read_bulk_file(dir.path(), 2, 1).unwrap(), "bulk: b1, b2, b3\n");
}

#[test]
fn zero_bulk_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    assert!(matches!(
        dispatcher.connect(0),
        Err(RegistryError::ZeroBulkSize)
    ));
}

#[test]
fn disconnect_of_unknown_handle_reports_error() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    let handle = dispatcher.connect(3).unwrap();
    dispatcher.disconnect(handle).unwrap();
    assert!(matches!(
        dispatcher.disconnect(handle),
        Err(RegistryError::UnknownHandle(_))
    ));
}

#[test]
fn receive_on_stale_handle_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    let handle = dispatcher.connect(1).unwrap();
    dispatcher.disconnect(handle).unwrap();
    dispatcher.receive(handle, b"cmd1\n");
    dispatcher.wait();
    assert!(find_bulk_file(dir.path(), 1, 1).is_none());
}

#[test]
fn wait_is_reusable_and_immediate_when_drained() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    dispatcher.wait();

    let handle = dispatcher.connect(1).unwrap();
    dispatcher.receive(handle, b"cmd1\n");
    dispatcher.wait();
    assert!(find_bulk_file(dir.path(), 1, 1).is_some());

    // Still usable after the drain.
    dispatcher.receive(handle, b"cmd2\n");
    dispatcher.disconnect(handle).unwrap();
    dispatcher.wait();
    assert!(find_bulk_file(dir.path(), 1, 2).is_some());
    dispatcher.wait();
}

#[test]
fn contexts_are_isolated_across_threads() {
    let dir = TempDir::new().unwrap();
    let dispatcher = Arc::new(dispatcher_in(&dir));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(thread::spawn(move || {
            let handle = dispatcher.connect(2).unwrap();
            for chunk in [&b"x1\nx"[..], &b"2\nx3\nx4"[..]] {
                dispatcher.receive(handle, chunk);
            }
            dispatcher.disconnect(handle).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    dispatcher.wait();

    // Every context emitted two bulks with its own gap-free sequences.
    for context_id in 1..=4 {
        assert_eq!(
            read_bulk_file(dir.path(), context_id, 1).unwrap(),
            "bulk: x1, x2\n"
        );
        assert_eq!(
            read_bulk_file(dir.path(), context_id, 2).unwrap(),
            "bulk: x3, x4\n"
        );
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 8);
}

#[test]
fn stats_track_dispatch_activity() {
    let dir = TempDir::new().unwrap();
    let dispatcher = dispatcher_in(&dir);
    let handle = dispatcher.connect(2).unwrap();
    dispatcher.receive(handle, b"cmd1\ncmd2\ncmd3\n");
    dispatcher.disconnect(handle).unwrap();
    dispatcher.wait();

    let stats = dispatcher.stats();
    assert_eq!(stats.contexts_opened, 1);
    assert_eq!(stats.bulks_emitted, 2);
    assert_eq!(stats.files_written, 2);
    assert_eq!(stats.write_failures, 0);
}

#[test]
fn output_directory_is_created_on_construction() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("bulks").join("out");
    let config = DispatcherConfig {
        output_dir: nested.clone(),
        ..DispatcherConfig::default()
    };
    let dispatcher = Dispatcher::new(config).unwrap();
    let handle = dispatcher.connect(1).unwrap();
    dispatcher.receive(handle, b"cmd1\n");
    dispatcher.wait();
    assert_eq!(read_bulk_file(&nested, 1, 1).unwrap(), "bulk: cmd1\n");
}
