//! Tests for Engine
//!
//! These tests verify:
//! - Frame execution and direct dispatch
//! - End-to-end command scenarios
//! - Restart recovery from the snapshot
//! - Concurrent access patterns
//! - Engine lifecycle (open/flush/shutdown/close)

use std::fs;
use std::sync::Arc;
use std::thread;

use emberkv::config::{Config, SnapshotSchedule};
use emberkv::engine::Engine;
use emberkv::protocol::{decode, encode, Frame, Request, Value, WRONGTYPE};
use emberkv::EmberError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .snapshot_schedule(SnapshotSchedule::OnShutdown) // Deterministic: only explicit flushes
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(config_for(&temp_dir)).unwrap();
    (temp_dir, engine)
}

/// Run a command through the wire path and return the encoded reply
fn roundtrip(engine: &Engine, words: &[&str]) -> Vec<u8> {
    let request = Request::from_words(words.iter().copied()).unwrap();
    let wire = encode(&request.into_value());

    let frame = match decode(&mut wire.as_slice()).unwrap() {
        Frame::Value(value) => value,
        other => panic!("Expected a value, got {:?}", other),
    };
    encode(&engine.execute(frame).unwrap())
}

fn run(engine: &Engine, words: &[&str]) -> Value {
    let args: Vec<&[u8]> = words[1..].iter().map(|w| w.as_bytes()).collect();
    engine.dispatch(words[0].as_bytes(), &args)
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_engine_open_creates_directories() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let config = Config::builder()
        .data_dir(&data_dir)
        .snapshot_schedule(SnapshotSchedule::OnShutdown)
        .build();
    let engine = Engine::open(config).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join("dump.rdb").exists());
    assert_eq!(engine.snapshot_path(), data_dir.join("dump.rdb"));
    assert_eq!(engine.key_count(), 0);
}

#[test]
fn test_engine_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .snapshot_schedule(SnapshotSchedule::Interval { ms: 0 })
        .build();

    assert!(matches!(Engine::open(config), Err(EmberError::Config(_))));
}

#[test]
fn test_engine_open_path_convenience() {
    let temp_dir = TempDir::new().unwrap();

    let engine = Engine::open_path(temp_dir.path()).unwrap();

    assert_eq!(engine.data_dir(), temp_dir.path());
    engine.close().unwrap();
}

#[test]
fn test_engine_corrupt_snapshot_fails_to_open() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("dump.rdb"), b"not a snapshot at all").unwrap();

    let result = Engine::open(config_for(&temp_dir));

    assert!(matches!(result, Err(EmberError::SnapshotCorruption(_))));
}

#[test]
fn test_engine_shutdown_is_idempotent() {
    let (_temp, engine) = setup_temp_engine();
    run(&engine, &["SET", "a", "1"]);

    let first = engine.shutdown().unwrap();
    let second = engine.shutdown().unwrap();

    assert_eq!(first.map(|s| s.keys), Some(1));
    assert_eq!(second, None);
}

#[test]
fn test_engine_manual_flush() {
    let (_temp, engine) = setup_temp_engine();
    run(&engine, &["MSET", "a", "1", "b", "2"]);

    let stats = engine.flush().unwrap();

    assert_eq!(stats.keys, 2);
    assert_eq!(fs::metadata(engine.snapshot_path()).unwrap().len() as usize, stats.bytes);
}

#[test]
fn test_engine_accessors() {
    let (temp, engine) = setup_temp_engine();
    run(&engine, &["SET", "s", "1"]);
    run(&engine, &["HSET", "h", "f", "v"]);

    assert_eq!(engine.data_dir(), temp.path());
    assert_eq!(engine.config().snapshot_schedule, SnapshotSchedule::OnShutdown);
    assert!(engine.commands().lookup("HEXISTS").is_some());
    assert!(engine.keyspace().get(b"s").unwrap().is_scalar());
    assert!(engine.keyspace().get(b"h").unwrap().is_field_map());
}

// =============================================================================
// Execution Tests
// =============================================================================

#[test]
fn test_engine_execute_ignores_non_commands() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.execute(Value::simple("PING")), None);
    assert_eq!(engine.execute(Value::Array(vec![])), None);
    assert_eq!(engine.execute(Value::Array(vec![Value::Integer(1)])), None);
}

#[test]
fn test_engine_execute_ping() {
    let (_temp, engine) = setup_temp_engine();

    let reply = engine.execute(Value::Array(vec![Value::bulk("PING")]));

    assert_eq!(reply, Some(Value::simple("PONG")));
}

#[test]
fn test_engine_dispatch_unknown_verb() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(
        run(&engine, &["Nope", "x"]),
        Value::error("ERR unknown command 'Nope'")
    );
}

// =============================================================================
// Scenario Tests (wire bytes)
// =============================================================================

#[test]
fn test_scenario_set_get() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(roundtrip(&engine, &["SET", "foo", "bar"]), b"+OK\r\n");
    assert_eq!(roundtrip(&engine, &["GET", "foo"]), b"$3\r\nbar\r\n");
}

#[test]
fn test_scenario_del_missing() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(roundtrip(&engine, &["DEL", "missing"]), b":0\r\n");
}

#[test]
fn test_scenario_hset_repeated_field() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(roundtrip(&engine, &["HSET", "h", "f1", "v1", "f1", "v2"]), b":1\r\n");
    assert_eq!(roundtrip(&engine, &["HGET", "h", "f1"]), b"$2\r\nv2\r\n");
}

#[test]
fn test_scenario_wrongtype() {
    let (_temp, engine) = setup_temp_engine();

    roundtrip(&engine, &["SET", "s", "1"]);

    let expected = format!("-{}\r\n", WRONGTYPE);
    assert_eq!(roundtrip(&engine, &["HGET", "s", "f"]), expected.as_bytes());
}

#[test]
fn test_scenario_mset_mget() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(roundtrip(&engine, &["MSET", "a", "1", "b", "2"]), b"+OK\r\n");
    assert_eq!(
        roundtrip(&engine, &["MGET", "a", "b", "c"]),
        b"*3\r\n$1\r\n1\r\n$1\r\n2\r\n_\r\n"
    );
}

#[test]
fn test_scenario_restart_keeps_data() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(config_for(&temp_dir)).unwrap();
        assert_eq!(roundtrip(&engine, &["SET", "foo", "bar"]), b"+OK\r\n");
        engine.close().unwrap();
    }

    let engine = Engine::open(config_for(&temp_dir)).unwrap();
    assert_eq!(roundtrip(&engine, &["GET", "foo"]), b"$3\r\nbar\r\n");
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_engine_restart_restores_both_shapes() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(config_for(&temp_dir)).unwrap();
        run(&engine, &["SET", "s", "scalar"]);
        run(&engine, &["SET", "empty", ""]);
        run(&engine, &["HSET", "h", "a", "1", "b", "2"]);
        run(&engine, &["HSET", "drained", "f", "v"]);
        run(&engine, &["HDEL", "drained", "f"]);
        engine.close().unwrap();
    }

    let engine = Engine::open(config_for(&temp_dir)).unwrap();

    assert_eq!(engine.key_count(), 4);
    assert_eq!(run(&engine, &["GET", "s"]), Value::bulk("scalar"));
    assert_eq!(run(&engine, &["GET", "empty"]), Value::bulk(""));
    assert_eq!(run(&engine, &["HGET", "h", "b"]), Value::bulk("2"));
    assert_eq!(run(&engine, &["EXISTS", "drained"]), Value::Integer(1));
    assert_eq!(run(&engine, &["GET", "h"]), Value::error(WRONGTYPE));
}

#[test]
fn test_engine_drop_writes_final_snapshot() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open(config_for(&temp_dir)).unwrap();
        run(&engine, &["SET", "k", "v"]);
        // Dropped without close()
    }

    let engine = Engine::open(config_for(&temp_dir)).unwrap();
    assert_eq!(run(&engine, &["GET", "k"]), Value::bulk("v"));
}

#[test]
fn test_engine_snapshot_is_idempotent_across_restart() {
    let temp_dir = TempDir::new().unwrap();

    let first = {
        let engine = Engine::open(config_for(&temp_dir)).unwrap();
        for i in 0..100 {
            run(&engine, &["SET", &format!("k{}", i), &format!("v{}", i)]);
            run(&engine, &["HSET", "h", &format!("f{}", i), "x"]);
        }
        engine.close().unwrap();
        fs::read(temp_dir.path().join("dump.rdb")).unwrap()
    };

    // Load and re-snapshot without changes
    let second = {
        let engine = Engine::open(config_for(&temp_dir)).unwrap();
        engine.close().unwrap();
        fs::read(temp_dir.path().join("dump.rdb")).unwrap()
    };

    assert_eq!(first, second);
}

#[test]
fn test_engine_periodic_snapshot_schedule() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .snapshot_schedule(SnapshotSchedule::Interval { ms: 10 })
        .build();

    let engine = Engine::open(config).unwrap();
    run(&engine, &["SET", "k", "v"]);
    engine.close().unwrap();

    let engine = Engine::open(config_for(&temp_dir)).unwrap();
    assert_eq!(run(&engine, &["GET", "k"]), Value::bulk("v"));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_engine_concurrent_set_get_distinct_keys() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);
    let workers = 16;

    let mut handles = vec![];
    for t in 0..workers {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let key = format!("key{}", t);
            let value = format!("value{}", t);
            assert_eq!(run(&engine, &["SET", &key, &value]), Value::ok());
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let mut handles = vec![];
    for t in 0..workers {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let key = format!("key{}", t);
            let reply = run(&engine, &["GET", &key]);
            assert_eq!(reply, Value::bulk(format!("value{}", t)));
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.key_count(), workers);
}

#[test]
fn test_engine_concurrent_hset_counts_once() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let mut handles = vec![];
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let mut created = 0;
            for i in 0..50 {
                if let Value::Integer(n) = run(&engine, &["HSET", "shared", &format!("f{}", i), "v"]) {
                    created += n;
                }
            }
            created
        }));
    }

    let total: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 50);
}

#[test]
fn test_engine_flush_during_writes() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..500 {
                run(&engine, &["SET", &format!("k{}", i), "v"]);
            }
        })
    };

    for _ in 0..5 {
        engine.flush().unwrap();
    }
    writer.join().unwrap();

    let stats = engine.flush().unwrap();
    assert_eq!(stats.keys, 500);
}
