// Framework bootstrap: environment configuration, tracing and task wiring.

pub mod config;
pub mod runtime;
#[cfg(feature = "window")]
pub mod window;
