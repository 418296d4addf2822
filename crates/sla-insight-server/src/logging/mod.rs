//! Process-wide tracing setup.

mod logger;

pub use logger::init_logger;
