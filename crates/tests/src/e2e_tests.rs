//! End-to-end scenarios

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use config_loader::FileConfigSource;
use contracts::HubConfiguration;
use hub::ShutdownController;
use serde_json::{json, Value};

use crate::support::{events, none, open_hub, open_hub_with, rec, spec, Event};

fn adds(events: &[Event], dispatcher: &str) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Add { dispatcher: d, value } if d == dispatcher => Some(*value),
            _ => None,
        })
        .collect()
}

fn flushes(events: &[Event], dispatcher: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::Flush(d) if d == dispatcher))
        .count()
}

/// Scenario A: one listener feeding one dispatcher
#[test]
fn test_single_listener_to_single_dispatcher() {
    let config = HubConfiguration::default()
        .with_listener("l1", rec(json!({"emit": 7.0})))
        .with_dispatcher("d1", rec(none()));
    let (mut hub, _) = open_hub(config);
    events();

    for _ in 0..3 {
        hub.run_once().unwrap();
    }
    let events = events();

    assert_eq!(adds(&events, "d1"), vec![7.0, 7.0, 7.0]);
    assert_eq!(flushes(&events, "d1"), 3);
    assert_eq!(hub.stats().reading_sets, 3);
}

/// Every dispatcher sees every set; each is flushed exactly once per iteration
#[test]
fn test_fan_out_and_single_flush() {
    let config = HubConfiguration::default()
        .with_listener("l1", rec(json!({"emit": 1.0})))
        .with_listener("quiet", rec(none()))
        .with_listener("l2", rec(json!({"emit": 2.0})))
        .with_dispatcher("d1", rec(none()))
        .with_dispatcher("d2", rec(none()));
    let (mut hub, _) = open_hub(config);
    events();

    hub.run_once().unwrap();
    let events = events();

    assert_eq!(adds(&events, "d1"), vec![1.0, 2.0]);
    assert_eq!(adds(&events, "d2"), vec![1.0, 2.0]);
    assert_eq!(flushes(&events, "d1"), 1);
    assert_eq!(flushes(&events, "d2"), 1);

    let last_add = events
        .iter()
        .rposition(|e| matches!(e, Event::Add { .. }))
        .unwrap();
    let first_flush = events
        .iter()
        .position(|e| matches!(e, Event::Flush(_)))
        .unwrap();
    assert!(last_add < first_flush);
}

/// Scenario B: a dispatcher replaced while running
#[test]
fn test_dispatcher_swap_mid_run() {
    let with = |dispatcher: &str| {
        HubConfiguration::default()
            .with_listener("l1", rec(json!({"emit": 3.0})))
            .with_dispatcher(dispatcher, rec(none()))
    };
    let (mut hub, handle) = open_hub(with("d1"));
    hub.run_once().unwrap();
    events();

    handle.replace(with("d2"));
    hub.run_once().unwrap();
    hub.run_once().unwrap();
    let events = events();

    assert!(adds(&events, "d1").is_empty());
    assert_eq!(flushes(&events, "d1"), 0);
    assert_eq!(adds(&events, "d2"), vec![3.0, 3.0]);
    assert_eq!(hub.dispatcher_names(), vec!["d2"]);
}

/// Scenario C: an exit requested mid-iteration lets the iteration finish
#[test]
fn test_exit_mid_iteration_completes_and_closes() {
    let config = HubConfiguration::default()
        .with_listener("l1", rec(json!({"emit": 5.0, "exit_on_run": true})))
        .with_listener("l2", rec(json!({"emit": 6.0})))
        .with_dispatcher("d1", rec(none()));
    let (mut hub, _) = open_hub(config);
    events();

    hub.run().unwrap();
    let stats = hub.close().unwrap();
    let events = events();

    assert_eq!(stats.iterations, 1);
    assert_eq!(adds(&events, "d1"), vec![5.0, 6.0]);
    assert_eq!(flushes(&events, "d1"), 1);
    assert_eq!(
        &events[events.len() - 2..],
        &[Event::Close("l1".into()), Event::Close("l2".into())]
    );
}

/// A blocking listener holds up every other listener and the flush
#[test]
fn test_blocking_listener_delays_iteration() {
    let config = HubConfiguration::default()
        .with_listener("slow", rec(json!({"emit": 1.0, "block_ms": 50})))
        .with_listener("fast", rec(json!({"emit": 2.0})))
        .with_dispatcher("d1", rec(none()));
    let (mut hub, _) = open_hub(config);
    events();

    let started = Instant::now();
    hub.run_once().unwrap();
    let elapsed = started.elapsed();
    let events = events();

    assert!(elapsed >= Duration::from_millis(50));
    assert_eq!(adds(&events, "d1"), vec![1.0, 2.0]);
    assert_eq!(events.last(), Some(&Event::Flush("d1".into())));
}

/// Scenario C over a real SIGINT delivered mid-iteration
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_interrupt_signal_completes_iteration_and_closes() {
    let config = HubConfiguration::default()
        .with_listener("l1", rec(json!({"emit": 5.0, "interrupt_on_run": true})))
        .with_listener("l2", rec(json!({"emit": 6.0})))
        .with_dispatcher("d1", rec(none()));
    let (mut hub, _) = open_hub(config);
    let shutdown = ShutdownController::install(hub.exit_flag()).unwrap();
    events();

    let stats = tokio::task::block_in_place(|| {
        hub.run()?;
        hub.close()
    })
    .unwrap();
    shutdown.uninstall();
    let events = events();

    assert_eq!(stats.iterations, 1);
    assert_eq!(adds(&events, "d1"), vec![5.0, 6.0]);
    assert_eq!(flushes(&events, "d1"), 1);
    assert_eq!(
        &events[events.len() - 2..],
        &[Event::Close("l1".into()), Event::Close("l2".into())]
    );
}

/// A failing live listener ends the loop without running the close phase
#[test]
fn test_listener_failure_propagates() {
    let config = HubConfiguration::default()
        .with_listener("l1", rec(json!({"fail_run": true})))
        .with_dispatcher("d1", rec(none()));
    let (mut hub, _) = open_hub(config);
    events();

    let err = hub.run().unwrap_err();
    let events = events();

    assert!(err.to_string().contains("device unplugged"));
    assert_eq!(events, vec![Event::Run("l1".into())]);
}

/// Built-in components wired through the factories
#[test]
fn test_mock_listener_to_file_dispatcher() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("readings.jsonl");
    let config = HubConfiguration::default()
        .with_listener(
            "s1",
            spec("mock", json!({"node": "10", "fields": ["power1", "power2"]}))
                .with_runtime(crate::support::settings(json!({"interval_ms": 0, "value": 50}))),
        )
        .with_dispatcher("f1", spec("file", json!({"path": out.to_str().unwrap()})));
    let (mut hub, _) = open_hub(config);

    hub.run_once().unwrap();
    hub.run_once().unwrap();
    hub.close().unwrap();

    let lines: Vec<Value> = fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0]["readings"],
        json!([
            {"node": "10", "field": "power1", "value": 50.0},
            {"node": "10", "field": "power2", "value": 51.0}
        ])
    );
}

fn write_config(path: &Path, content: &str, bump_secs: u64) {
    fs::write(path, content).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(bump_secs))
        .unwrap();
}

/// Configuration file edits are picked up between iterations
#[test]
fn test_file_config_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emonhub.toml");
    let base = "[hub]\nloglevel = \"INFO\"\n\n[dispatchers.d1]\ntype = \"rec\"\n";
    write_config(&path, base, 0);

    let source = FileConfigSource::open(&path).unwrap();
    let mut hub = open_hub_with(Box::new(source)).unwrap();
    assert!(hub.listener_names().is_empty());

    let added = format!("{base}\n[listeners.l1]\ntype = \"rec\"\n[listeners.l1.init_settings]\nemit = 9.5\n");
    write_config(&path, &added, 10);
    hub.run_once().unwrap();
    assert_eq!(hub.listener_names(), vec!["l1"]);
    assert_eq!(adds(&events(), "d1"), vec![9.5]);

    write_config(&path, "[listeners.l1\ntype =", 20);
    hub.run_once().unwrap();
    assert_eq!(hub.listener_names(), vec!["l1"]);
    assert_eq!(hub.dispatcher_names(), vec!["d1"]);
}
