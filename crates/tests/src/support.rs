//! Recording components shared by the scenarios
//!
//! Constructors are plain `fn`s, so recorded state lives in thread locals.
//! Each test runs the hub on its own thread.

use std::cell::RefCell;
use std::collections::HashSet;
#[cfg(unix)]
use std::process::{self, Command};
use std::thread;
use std::time::{Duration, Instant};

use config_loader::{ConfigSource, MemoryConfigHandle, MemoryConfigSource};
use contracts::{
    ComponentSpec, ContractError, Dispatcher, HubConfiguration, InitError, Listener, LogLevel,
    ReadingSet, Settings,
};
use hub::{DispatcherFactory, ExitFlag, Factories, Hub, HubOptions, ListenerFactory};
use observability::{LevelFilter, LevelSink, LogLevelController};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Created { name: String, component_type: String },
    Settings { name: String, settings: Settings },
    Run(String),
    Add { dispatcher: String, value: f64 },
    Flush(String),
    Close(String),
    Level(LevelFilter),
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
    static FAILING: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
    static EXIT: RefCell<ExitFlag> = RefCell::new(ExitFlag::new());
}

fn record(event: Event) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

/// Drain recorded events
pub fn events() -> Vec<Event> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

/// Make construction of `name` fail until cleared
pub fn set_init_failing(name: &str, failing: bool) {
    FAILING.with(|names| {
        let mut names = names.borrow_mut();
        if failing {
            names.insert(name.to_string());
        } else {
            names.remove(name);
        }
    });
}

fn init_failing(name: &str) -> bool {
    FAILING.with(|names| names.borrow().contains(name))
}

pub fn exit_flag() -> ExitFlag {
    EXIT.with(|flag| flag.borrow().clone())
}

/// Listener driven by its init settings
///
/// - `emit`: value of the reading set returned by every `read`
/// - `fail_run`: make `run` fail
/// - `exit_on_run`: raise the exit flag from inside `run`
/// - `block_ms`: block inside `run` for that many milliseconds
/// - `interrupt_on_run`: send SIGINT to this process from inside `run`, then
///   wait for the exit flag to be raised
pub struct RecordingListener {
    name: String,
    emit: Option<f64>,
    fail_run: bool,
    exit_on_run: bool,
    interrupt_on_run: bool,
    block: Option<Duration>,
}

impl Listener for RecordingListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> Result<(), ContractError> {
        record(Event::Run(self.name.clone()));
        if let Some(block) = self.block {
            std::thread::sleep(block);
        }
        if self.exit_on_run {
            exit_flag().request();
        }
        if self.interrupt_on_run {
            interrupt_self();
        }
        if self.fail_run {
            return Err(ContractError::listener(&self.name, "device unplugged"));
        }
        Ok(())
    }

    fn read(&mut self) -> Result<Option<ReadingSet>, ContractError> {
        Ok(self
            .emit
            .map(|value| ReadingSet::single(self.name.clone(), "value", value)))
    }

    fn apply_runtime_settings(&mut self, settings: &Settings) -> Result<(), ContractError> {
        record(Event::Settings {
            name: self.name.clone(),
            settings: settings.clone(),
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        record(Event::Close(self.name.clone()));
        Ok(())
    }
}

pub struct RecordingDispatcher {
    name: String,
}

impl Dispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn add(&mut self, readings: &ReadingSet) -> Result<(), ContractError> {
        for reading in readings {
            record(Event::Add {
                dispatcher: self.name.clone(),
                value: reading.value,
            });
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        record(Event::Flush(self.name.clone()));
        Ok(())
    }

    fn apply_runtime_settings(&mut self, settings: &Settings) -> Result<(), ContractError> {
        record(Event::Settings {
            name: self.name.clone(),
            settings: settings.clone(),
        });
        Ok(())
    }
}

/// Deliver SIGINT to the test process and wait until the exit flag is up
#[cfg(unix)]
fn interrupt_self() {
    let status = Command::new("kill")
        .args(["-INT", &process::id().to_string()])
        .status()
        .expect("kill should run");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !exit_flag().is_requested() {
        assert!(Instant::now() < deadline, "SIGINT did not raise the exit flag");
        thread::sleep(Duration::from_millis(5));
    }
}

#[cfg(not(unix))]
fn interrupt_self() {
    exit_flag().request();
}

fn created(name: &str, component_type: &str) -> Result<(), InitError> {
    if init_failing(name) {
        return Err(InitError::new(name, "simulated hardware fault"));
    }
    record(Event::Created {
        name: name.to_string(),
        component_type: component_type.to_string(),
    });
    Ok(())
}

fn build_listener(
    component_type: &str,
    name: &str,
    init: &Settings,
) -> Result<Box<dyn Listener>, InitError> {
    created(name, component_type)?;
    let flag = |key: &str| init.get(key).and_then(Value::as_bool).unwrap_or(false);
    Ok(Box::new(RecordingListener {
        name: name.to_string(),
        emit: init.get("emit").and_then(Value::as_f64),
        fail_run: flag("fail_run"),
        exit_on_run: flag("exit_on_run"),
        interrupt_on_run: flag("interrupt_on_run"),
        block: init
            .get("block_ms")
            .and_then(Value::as_u64)
            .map(Duration::from_millis),
    }))
}

fn rec_listener(name: &str, init: &Settings) -> Result<Box<dyn Listener>, InitError> {
    build_listener("rec", name, init)
}

fn alt_listener(name: &str, init: &Settings) -> Result<Box<dyn Listener>, InitError> {
    build_listener("alt", name, init)
}

fn rec_dispatcher(name: &str, _init: &Settings) -> Result<Box<dyn Dispatcher>, InitError> {
    created(name, "rec")?;
    Ok(Box::new(RecordingDispatcher {
        name: name.to_string(),
    }))
}

/// Recording types plus the built-in ones
pub fn factories() -> Factories {
    Factories::new(
        ListenerFactory::new()
            .with("rec", rec_listener)
            .with("alt", alt_listener)
            .with_all(listeners::builtin()),
        DispatcherFactory::new()
            .with("rec", rec_dispatcher)
            .with_all(dispatcher::builtin()),
    )
}

struct RecordingLevelSink;

impl LevelSink for RecordingLevelSink {
    fn apply(&self, filter: LevelFilter) -> anyhow::Result<()> {
        record(Event::Level(filter));
        Ok(())
    }
}

/// Hub over an in-memory configuration, with zero sleep between iterations
pub fn open_hub(config: HubConfiguration) -> (Hub, MemoryConfigHandle) {
    try_open_hub(config).expect("hub should open")
}

pub fn try_open_hub(config: HubConfiguration) -> hub::Result<(Hub, MemoryConfigHandle)> {
    let source = MemoryConfigSource::new(config);
    let handle = source.handle();
    let hub = open_hub_with(Box::new(source))?;
    Ok((hub, handle))
}

/// Hub over any configuration source
///
/// Clears recorded events and installs a fresh exit flag.
pub fn open_hub_with(source: Box<dyn ConfigSource>) -> hub::Result<Hub> {
    events();
    EXIT.with(|flag| *flag.borrow_mut() = ExitFlag::new());

    let logging = LogLevelController::new(Box::new(RecordingLevelSink), LogLevel::Info);
    let options = HubOptions {
        poll_interval: Duration::ZERO,
    };
    Ok(Hub::new(source, factories(), logging, options)?.with_exit_flag(exit_flag()))
}

/// Spec of a recording component
pub fn rec(init: Value) -> ComponentSpec {
    spec("rec", init)
}

pub fn spec(component_type: &str, init: Value) -> ComponentSpec {
    let init = match init {
        Value::Object(map) => map,
        _ => Settings::new(),
    };
    ComponentSpec::new(component_type).with_init(init)
}

pub fn settings(value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        _ => Settings::new(),
    }
}

/// Empty json object
pub fn none() -> Value {
    json!({})
}

/// Only events of one kind, for order-insensitive assertions
pub fn created_names(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Created { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}

pub fn settings_names(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Settings { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect()
}
