// The binary in main.rs drives everything through this module tree; the
// integration tests and criterion benches import it as `tablas::*`.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod explain;
pub mod generator;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
pub mod voice;
