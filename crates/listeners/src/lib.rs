//! # Listeners
//!
//! Built-in hub input adapters.
//!
//! | type   | source                                              |
//! |--------|-----------------------------------------------------|
//! | `mock` | synthetic readings at a configurable interval       |
//! | `udp`  | `<node>/<field> <value>` lines received on a socket |
//!
//! The hub resolves a configured `type` through [`builtin`]; nothing here is
//! looked up by reflection.

mod mock;
mod udp;

pub use mock::MockListener;
pub use udp::{parse_line, UdpListener};

use contracts::ListenerConstructor;

/// Type names and constructors of the built-in listeners
pub fn builtin() -> Vec<(&'static str, ListenerConstructor)> {
    vec![
        (MockListener::TYPE_NAME, MockListener::construct as ListenerConstructor),
        (UdpListener::TYPE_NAME, UdpListener::construct as ListenerConstructor),
    ]
}
