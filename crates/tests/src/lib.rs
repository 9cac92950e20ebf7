//! # Integration Tests
//!
//! Cross-crate scenarios driving a real [`hub::Hub`] with recording
//! components:
//! - reconciliation properties (idempotence, add/remove, isolation and retry)
//! - poll loop fan-out and flush
//! - end-to-end runs with the built-in listeners and dispatchers

#[cfg(test)]
mod support;

#[cfg(test)]
mod reconcile_tests;

#[cfg(test)]
mod e2e_tests;
