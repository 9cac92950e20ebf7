//! Dispatcher implementations

mod emoncms;
mod file;
mod log;

pub use self::emoncms::EmoncmsDispatcher;
pub use self::file::FileDispatcher;
pub use self::log::LogDispatcher;
