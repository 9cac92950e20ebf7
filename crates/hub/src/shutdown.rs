//! Cooperative shutdown
//!
//! Signals only raise the [`ExitFlag`]; the poll loop checks it at the top of
//! each iteration, so an iteration in flight always completes.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Shared exit request token
#[derive(Debug, Clone, Default)]
pub struct ExitFlag(Arc<AtomicBool>);

impl ExitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current iteration
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Background task turning termination signals into an exit request
pub struct ShutdownController {
    task: JoinHandle<()>,
}

impl ShutdownController {
    /// Start listening; must be called from within a tokio runtime
    ///
    /// Handlers are registered before this returns, so a signal sent right
    /// after is not missed.
    pub fn install(flag: ExitFlag) -> io::Result<Self> {
        let mut signals = ShutdownSignals::register()?;
        let task = tokio::spawn(async move {
            match signals.recv().await {
                Ok(()) => {
                    debug!("Shutdown signal received");
                    flag.request();
                }
                Err(e) => error!(error = %e, "Could not listen for shutdown signals"),
            }
        });
        Ok(Self { task })
    }

    /// Stop listening for signals
    pub fn uninstall(self) {
        self.task.abort();
    }
}

/// Registered SIGINT, SIGTERM and SIGQUIT streams
#[cfg(unix)]
pub struct ShutdownSignals {
    sigint: Signal,
    sigterm: Signal,
    sigquit: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes on the first of the three signals
    pub async fn recv(&mut self) -> io::Result<()> {
        tokio::select! {
            _ = self.sigint.recv() => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
        Ok(())
    }
}

/// Ctrl-C only
#[cfg(not(unix))]
pub struct ShutdownSignals(());

#[cfg(not(unix))]
impl ShutdownSignals {
    pub fn register() -> io::Result<Self> {
        Ok(Self(()))
    }

    pub async fn recv(&mut self) -> io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}
