//! Operands and the dispatch table that decides what each one does.
//!
//! # Design
//! Everything a waiter can be combined with is an [`Order`]. Dispatch runs
//! in two steps:
//!
//! 1. `Order::Custom` values carry their own [`CombinesWithWaiter`] logic and
//!    are applied directly, so external types join the pipeline without the
//!    waiter knowing about them.
//! 2. Every other order is looked up by its [`Shape`] in the waiter's
//!    [`Menu`]. A missing entry is a `WaiterError::Dispatch`, never a no-op.
//!
//! Menus are built per binding and shared read-only (`Arc<Menu>`) once a
//! waiter is constructed. Bindings extend the standard menu with foreign
//! shapes, e.g. a credentials client type that replaces the transport.

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::consumer::Dish;
use crate::error::WaiterError;
use crate::params::Params;
use crate::transport::Transport;
use crate::waiter::Waiter;

/// Result of a single combine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The waiter is still taking the order.
    Pending,
    /// The order was sent and this is the decoded response.
    Served(Dish),
}

impl Outcome {
    pub fn is_served(&self) -> bool {
        matches!(self, Outcome::Served(_))
    }

    pub fn into_dish(self) -> Option<Dish> {
        match self {
            Outcome::Served(dish) => Some(dish),
            Outcome::Pending => None,
        }
    }
}

/// An operand that knows how to apply itself to a waiter.
pub trait CombinesWithWaiter: Send {
    fn accept(self: Box<Self>, waiter: &mut Waiter) -> Result<Outcome, WaiterError>;
}

/// Anything a waiter can be combined with.
pub enum Order {
    Segment(String),
    Params(Params),
    /// Replace the waiter's transport.
    Transport(Box<dyn Transport>),
    Custom(Box<dyn CombinesWithWaiter>),
    /// A value of a type only some menus know about.
    Foreign {
        value: Box<dyn Any + Send>,
        type_name: &'static str,
    },
}

impl Order {
    pub fn transport(transport: impl Transport + 'static) -> Self {
        Order::Transport(Box::new(transport))
    }

    pub fn custom(custom: impl CombinesWithWaiter + 'static) -> Self {
        Order::Custom(Box::new(custom))
    }

    pub fn foreign<T: Any + Send>(value: T) -> Self {
        Order::Foreign {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// The menu key for this order. `None` for custom orders, which bypass
    /// the menu.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Order::Segment(_) => Some(Shape::Segment),
            Order::Params(_) => Some(Shape::Params),
            Order::Transport(_) => Some(Shape::Transport),
            Order::Custom(_) => None,
            // Deref past the box so the id is the value's, not the box's.
            Order::Foreign { value, .. } => Some(Shape::Foreign((**value).type_id())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Order::Segment(_) => "string",
            Order::Params(_) => "params",
            Order::Transport(_) => "transport",
            Order::Custom(_) => "custom",
            Order::Foreign { type_name, .. } => *type_name,
        }
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Segment(s) => f.debug_tuple("Segment").field(s).finish(),
            Order::Params(p) => f.debug_tuple("Params").field(p).finish(),
            other => f.debug_tuple("Order").field(&other.type_name()).finish(),
        }
    }
}

impl From<&str> for Order {
    fn from(segment: &str) -> Self {
        Order::Segment(segment.to_string())
    }
}

impl From<String> for Order {
    fn from(segment: String) -> Self {
        Order::Segment(segment)
    }
}

impl From<Params> for Order {
    fn from(params: Params) -> Self {
        Order::Params(params)
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Order {
    fn from(pairs: [(K, V); N]) -> Self {
        Order::Params(pairs.into())
    }
}

/// Menu key for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Segment,
    Params,
    Transport,
    Foreign(TypeId),
}

impl Shape {
    pub fn of<T: Any>() -> Self {
        Shape::Foreign(TypeId::of::<T>())
    }
}

pub type Handler = Arc<dyn Fn(&mut Waiter, Order) -> Result<Outcome, WaiterError> + Send + Sync>;

/// Dispatch table from [`Shape`] to handler.
#[derive(Clone, Default)]
pub struct Menu {
    handlers: HashMap<Shape, Handler>,
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

fn mismatch(order: Order) -> WaiterError {
    WaiterError::Dispatch {
        shape: order.type_name().to_string(),
    }
}

impl Menu {
    /// A menu that rejects every order.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Segments append to the path, params serve the order, transports
    /// replace the waiter's transport.
    pub fn standard() -> Self {
        let mut menu = Self::empty();
        menu.register(Shape::Segment, |waiter, order| match order {
            Order::Segment(segment) => {
                waiter.append_segment(segment);
                Ok(Outcome::Pending)
            }
            other => Err(mismatch(other)),
        });
        menu.register(Shape::Params, |waiter, order| match order {
            Order::Params(params) => waiter.call(params).map(Outcome::Served),
            other => Err(mismatch(other)),
        });
        menu.register(Shape::Transport, |waiter, order| match order {
            Order::Transport(transport) => {
                waiter.set_transport(transport);
                Ok(Outcome::Pending)
            }
            other => Err(mismatch(other)),
        });
        menu
    }

    /// Install or replace the handler for `shape`.
    pub fn register<F>(&mut self, shape: Shape, handler: F) -> &mut Self
    where
        F: Fn(&mut Waiter, Order) -> Result<Outcome, WaiterError> + Send + Sync + 'static,
    {
        self.handlers.insert(shape, Arc::new(handler));
        self
    }

    /// Install a handler for orders built with `Order::foreign::<T>`.
    pub fn register_foreign<T, F>(&mut self, handler: F) -> &mut Self
    where
        T: Any + Send,
        F: Fn(&mut Waiter, T) -> Result<Outcome, WaiterError> + Send + Sync + 'static,
    {
        self.register(Shape::of::<T>(), move |waiter, order| match order {
            Order::Foreign { value, type_name } => match value.downcast::<T>() {
                Ok(value) => handler(waiter, *value),
                Err(_) => Err(WaiterError::Dispatch {
                    shape: type_name.to_string(),
                }),
            },
            other => Err(mismatch(other)),
        })
    }

    /// Let values of the client type `C` swap in as the waiter's transport.
    pub fn accept_transport_type<C: Transport + Any>(&mut self) -> &mut Self {
        self.register_foreign::<C, _>(|waiter, client| {
            waiter.set_transport(Box::new(client));
            Ok(Outcome::Pending)
        })
    }

    pub fn handler(&self, shape: &Shape) -> Option<Handler> {
        self.handlers.get(shape).cloned()
    }

    pub fn handles(&self, shape: &Shape) -> bool {
        self.handlers.contains_key(shape)
    }

    /// Resolve and run the handler for `order`.
    pub(crate) fn dispatch(&self, waiter: &mut Waiter, order: Order) -> Result<Outcome, WaiterError> {
        let handler = order.shape().and_then(|shape| self.handler(&shape));
        match handler {
            Some(handler) => {
                debug!(shape = order.type_name(), "dispatching order");
                handler(waiter, order)
            }
            None => Err(mismatch(order)),
        }
    }
}
