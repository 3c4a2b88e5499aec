//! Fluent request builder for REST-style HTTP APIs.
//!
//! # Overview
//! A [`Waiter`] accumulates path segments and params through repeated
//! `combine` calls. Combining with params (or calling `call`) serves the
//! order: a [`Chef`] encodes it into an [`HttpRequest`], a [`Transport`]
//! performs the round-trip, and a [`Consumer`] decodes the response.
//!
//! ```rust,ignore
//! use waiter_core::{Waiter, method::GET};
//!
//! let mut waiter = Waiter::builder().build();
//! waiter.combine(GET)?;
//! waiter.combine("http://x.com")?;
//! let dish = waiter.combine([("q", "1")])?.into_dish();
//! ```
//!
//! # Design
//! - Operands are a closed [`Order`] enum. Custom operands implement
//!   [`CombinesWithWaiter`]; everything else is dispatched through an
//!   instance-scoped [`Menu`] keyed by [`Shape`], which bindings extend.
//! - Chefs, consumers and transports are trait objects so bindings swap any
//!   of them without touching the waiter.
//! - The transport is the only blocking step; there are no retries.

pub mod apis;
pub mod chef;
pub mod config;
pub mod consumer;
pub mod error;
pub mod http;
pub mod menu;
pub mod method;
pub mod params;
pub mod recipe;
pub mod transport;
pub mod waiter;

pub use chef::{Chef, PlainChef};
pub use config::TransportConfig;
pub use consumer::{Consumer, Dish, JsonConsumer, PlainConsumer, StatusGuardConsumer};
pub use error::{ConfigError, RecipeError, ResponseError, TransportError, WaiterError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use menu::{CombinesWithWaiter, Menu, Order, Outcome, Shape};
pub use method::Method;
pub use params::Params;
pub use recipe::{LaxRecipeChef, Recipe};
pub use transport::{Transport, UreqTransport};
pub use waiter::{Waiter, WaiterBuilder};
