//! Reconciliation properties

use contracts::{HubConfiguration, LogLevel};
use hub::HubError;
use observability::LevelFilter;
use serde_json::json;

use crate::support::{
    created_names, events, none, open_hub, rec, set_init_failing, settings, settings_names,
    spec, try_open_hub, Event,
};

fn base() -> HubConfiguration {
    HubConfiguration::default()
        .with_listener("l1", rec(none()))
        .with_dispatcher("d1", rec(none()))
}

#[test]
fn test_initial_pass_creates_dispatchers_then_listeners() {
    let (hub, _) = open_hub(base());
    let events = events();

    assert_eq!(created_names(&events), vec!["d1", "l1"]);
    assert_eq!(hub.listener_names(), vec!["l1"]);
    assert_eq!(hub.dispatcher_names(), vec!["d1"]);
}

#[test]
fn test_reconcile_is_idempotent() {
    let (mut hub, _) = open_hub(base());
    events();

    let report = hub.reconcile().unwrap();
    let events = events();

    assert!(report.is_unchanged());
    assert!(created_names(&events).is_empty());
    assert!(!events.iter().any(|e| matches!(e, Event::Close(_))));
    assert_eq!(settings_names(&events), vec!["d1", "l1"]);
    assert_eq!(hub.listener_names(), vec!["l1"]);
}

#[test]
fn test_runtime_settings_reapplied_every_pass() {
    let config = HubConfiguration::default().with_listener(
        "l1",
        rec(none()).with_runtime(settings(json!({"interval": 5}))),
    );
    let (mut hub, _) = open_hub(config);
    hub.reconcile().unwrap();
    hub.reconcile().unwrap();

    let applied: Vec<_> = events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Settings { name, settings } => Some((name, settings)),
            _ => None,
        })
        .collect();

    assert_eq!(applied.len(), 3);
    assert!(applied
        .iter()
        .all(|(name, s)| name == "l1" && s == &settings(json!({"interval": 5}))));
}

#[test]
fn test_additive_reconcile_only_creates_new_names() {
    let (mut hub, handle) = open_hub(base());
    events();

    handle.replace(
        base()
            .with_listener("l2", rec(none()))
            .with_dispatcher("d2", rec(none())),
    );
    hub.run_once().unwrap();
    let events = events();

    assert_eq!(created_names(&events), vec!["d2", "l2"]);
    assert_eq!(hub.listener_names(), vec!["l1", "l2"]);
    assert_eq!(hub.dispatcher_names(), vec!["d1", "d2"]);
}

#[test]
fn test_subtractive_reconcile_closes_listeners_only() {
    let (mut hub, handle) = open_hub(
        base()
            .with_listener("l2", rec(none()))
            .with_dispatcher("d2", rec(none())),
    );
    events();

    handle.replace(base());
    hub.run_once().unwrap();
    let events = events();

    let closed: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, Event::Close(_)))
        .collect();
    assert_eq!(closed, vec![&Event::Close("l2".into())]);
    assert!(!events.contains(&Event::Flush("d2".into())));
    assert_eq!(hub.listener_names(), vec!["l1"]);
    assert_eq!(hub.dispatcher_names(), vec!["d1"]);
}

#[test]
fn test_failed_init_is_isolated_and_retried() {
    set_init_failing("flaky", true);
    let config = base().with_listener("flaky", rec(none()));
    let (mut hub, handle) = open_hub(config.clone());

    assert_eq!(created_names(&events()), vec!["d1", "l1"]);
    assert_eq!(hub.listener_names(), vec!["l1"]);

    // Still failing: retried on every pass, no placeholder left behind
    let report = hub.reconcile().unwrap();
    assert_eq!(report.listeners.failed, vec!["flaky"]);
    assert!(!settings_names(&events()).contains(&"flaky".to_string()));

    set_init_failing("flaky", false);
    handle.replace(config);
    hub.run_once().unwrap();

    assert_eq!(created_names(&events()), vec!["flaky"]);
    assert_eq!(hub.listener_names(), vec!["l1", "flaky"]);
}

#[test]
fn test_failed_dispatcher_init_is_isolated() {
    set_init_failing("flaky_d", true);
    let (mut hub, _) = open_hub(base().with_dispatcher("flaky_d", rec(none())));

    assert_eq!(hub.dispatcher_names(), vec!["d1"]);
    assert_eq!(hub.listener_names(), vec!["l1"]);
    hub.run_once().unwrap();

    set_init_failing("flaky_d", false);
}

#[test]
fn test_type_change_keeps_existing_instance() {
    let (mut hub, handle) = open_hub(base());
    events();

    handle.replace(
        HubConfiguration::default()
            .with_listener("l1", spec("alt", none()))
            .with_dispatcher("d1", rec(none())),
    );
    hub.run_once().unwrap();
    let events = events();

    assert!(created_names(&events).is_empty());
    assert!(!events.contains(&Event::Close("l1".into())));
    assert_eq!(hub.listener_names(), vec!["l1"]);
}

#[test]
fn test_unknown_type_is_fatal_at_startup() {
    let config = base().with_listener("s1", spec("serial", none()));

    match try_open_hub(config) {
        Err(HubError::UnknownType {
            name,
            component_type,
            ..
        }) => {
            assert_eq!(name, "s1");
            assert_eq!(component_type, "serial");
        }
        other => panic!("expected unknown type error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_type_is_fatal_on_reload() {
    let (mut hub, handle) = open_hub(base());

    handle.replace(base().with_dispatcher("d9", spec("carrier-pigeon", none())));

    assert!(matches!(
        hub.run_once(),
        Err(HubError::UnknownType { .. })
    ));
}

#[test]
fn test_log_level_changes_only_when_different() {
    let (mut hub, handle) = open_hub(base());
    assert!(!events().iter().any(|e| matches!(e, Event::Level(_))));

    let mut debug = base();
    debug.hub.loglevel = "DEBUG".to_string();
    handle.replace(debug.clone());
    hub.run_once().unwrap();
    handle.replace(debug);
    hub.run_once().unwrap();

    let levels: Vec<_> = events()
        .into_iter()
        .filter(|e| matches!(e, Event::Level(_)))
        .collect();
    assert_eq!(levels, vec![Event::Level(LevelFilter::DEBUG)]);
    assert_eq!(hub.logging().current(), LogLevel::Debug);
}

#[test]
fn test_invalid_log_level_keeps_current() {
    let (mut hub, handle) = open_hub(base());

    let mut invalid = base();
    invalid.hub.loglevel = "VERBOSE".to_string();
    handle.replace(invalid);
    hub.run_once().unwrap();

    assert!(!events().iter().any(|e| matches!(e, Event::Level(_))));
    assert_eq!(hub.logging().current(), LogLevel::Info);
}
