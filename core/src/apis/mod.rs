//! Bindings for concrete REST APIs, each a preconfigured [`WaiterBuilder`].
//!
//! [`WaiterBuilder`]: crate::waiter::WaiterBuilder

pub mod twitter;
