//! The request accumulator.
//!
//! # Design
//! A `Waiter` collects path segments and params through repeated
//! [`combine`](Waiter::combine) calls, then serves the order: the chef
//! encodes it, the transport sends it, and the consumer decodes the
//! response. Combining with params serves immediately; `call` does the same
//! explicitly.
//!
//! State is reset before the transport runs, so transport and decode
//! failures never leave a half-built order behind. A chef rejection happens
//! before the reset and keeps the accumulated state for inspection.
//!
//! A waiter is single-owner and not meant to be shared between callers;
//! give each logical request its own waiter. The menu is the only part
//! shared between waiters, and it is read-only.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chef::{Chef, PlainChef};
use crate::config::TransportConfig;
use crate::consumer::{Consumer, Dish, JsonConsumer};
use crate::error::WaiterError;
use crate::http::HttpMethod;
use crate::menu::{Menu, Order, Outcome};
use crate::params::Params;
use crate::recipe::{LaxRecipeChef, Recipe};
use crate::transport::{Transport, UreqTransport};

/// Separator pushed between consecutive string segments.
pub const SEPARATOR: &str = "/";

pub struct Waiter {
    transport: Box<dyn Transport>,
    chef: Box<dyn Chef>,
    consumer: Box<dyn Consumer>,
    menu: Arc<Menu>,
    stack: Vec<String>,
    payload: Params,
}

impl Waiter {
    pub fn builder() -> WaiterBuilder {
        WaiterBuilder::default()
    }

    /// A waiter with the standard menu, a JSON consumer and the given parts.
    pub fn new(
        transport: impl Transport + 'static,
        chef: impl Chef + 'static,
        consumer: impl Consumer + 'static,
    ) -> Self {
        Self::builder()
            .transport(transport)
            .chef(chef)
            .consumer(consumer)
            .build()
    }

    /// Combine one operand into the order.
    ///
    /// Custom orders apply themselves; everything else goes through the menu.
    pub fn combine(&mut self, order: impl Into<Order>) -> Result<Outcome, WaiterError> {
        match order.into() {
            Order::Custom(custom) => {
                debug!("applying custom order");
                custom.accept(self)
            }
            order => {
                let menu = Arc::clone(&self.menu);
                menu.dispatch(self, order)
            }
        }
    }

    /// Combine a sequence of operands, returning the last outcome.
    ///
    /// Orders after a served one start again on the reset waiter.
    pub fn order<I>(&mut self, orders: I) -> Result<Outcome, WaiterError>
    where
        I: IntoIterator,
        I::Item: Into<Order>,
    {
        let mut outcome = Outcome::Pending;
        for order in orders {
            outcome = self.combine(order)?;
        }
        Ok(outcome)
    }

    /// Merge `params` and serve the order.
    pub fn call(&mut self, params: impl Into<Params>) -> Result<Dish, WaiterError> {
        self.payload.merge(params.into());

        if !self.chef.encode_and_validate(&self.stack, &self.payload) {
            let errors = self.chef.errors().to_vec();
            warn!(?errors, stack = ?self.stack, "chef rejected the order");
            return Err(WaiterError::Request { errors });
        }
        let Some(request) = self.chef.encoded() else {
            return Err(WaiterError::Request {
                errors: vec!["chef stored no encoded request".to_string()],
            });
        };

        self.stack.clear();
        self.payload.clear();

        info!(method = %request.method, uri = %request.uri, "serving order");
        let response = self.transport.send(request)?;
        debug!(status = response.status, "decoding response");
        self.consumer.handle(response)
    }

    /// Serve the order with no extra params.
    pub fn invoke(&mut self) -> Result<Dish, WaiterError> {
        self.call(Params::new())
    }

    /// Push a segment, preceded by a separator unless the stack is empty.
    pub fn append_segment(&mut self, segment: impl Into<String>) {
        let segment = segment.into();
        debug!(%segment, "appending segment");
        if !self.stack.is_empty() {
            self.stack.push(SEPARATOR.to_string());
        }
        self.stack.push(segment);
    }

    pub fn merge_params(&mut self, params: impl Into<Params>) {
        self.payload.merge(params.into());
    }

    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        debug!("transport replaced");
        self.transport = transport;
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.chef.set_method(method);
    }

    pub fn chef(&self) -> &dyn Chef {
        self.chef.as_ref()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    pub fn payload(&self) -> &Params {
        &self.payload
    }

    /// True when no segments or params are pending.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.payload.is_empty()
    }
}

impl fmt::Debug for Waiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waiter")
            .field("method", &self.chef.method())
            .field("stack", &self.stack)
            .field("payload", &self.payload)
            .field("menu", &self.menu)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Waiter`]. Unset parts get defaults: a `PlainChef` using
/// `method` (GET unless set), a `JsonConsumer`, a `UreqTransport` and the
/// standard menu.
#[derive(Default)]
pub struct WaiterBuilder {
    transport: Option<Box<dyn Transport>>,
    transport_config: Option<TransportConfig>,
    method: Option<HttpMethod>,
    chef: Option<Box<dyn Chef>>,
    consumer: Option<Box<dyn Consumer>>,
    menu: Option<Menu>,
}

impl WaiterBuilder {
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Configure the default `UreqTransport`. Ignored when a transport is set.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = Some(config);
        self
    }

    /// Configure the default `UreqTransport` from `WAITER_*` environment
    /// variables.
    pub fn transport_config_from_env(self) -> Result<Self, WaiterError> {
        Ok(self.transport_config(TransportConfig::from_env()?))
    }

    /// Method for the default chef. Also applied to an explicit chef.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn chef(mut self, chef: impl Chef + 'static) -> Self {
        self.chef = Some(Box::new(chef));
        self
    }

    /// Use a [`LaxRecipeChef`] for `domain`, parsing the recipe from `text`.
    pub fn recipe(self, domain: impl Into<String>, text: &str) -> Result<Self, WaiterError> {
        let recipe = Recipe::parse(text)?;
        Ok(self.chef(LaxRecipeChef::new(domain, recipe)))
    }

    pub fn consumer(mut self, consumer: impl Consumer + 'static) -> Self {
        self.consumer = Some(Box::new(consumer));
        self
    }

    pub fn menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Accept values of the client type `C` as mid-pipeline transport swaps.
    pub fn accept_transport_type<C: Transport + 'static>(mut self) -> Self {
        self.menu
            .get_or_insert_with(Menu::standard)
            .accept_transport_type::<C>();
        self
    }

    pub fn build(self) -> Waiter {
        let mut chef = self
            .chef
            .unwrap_or_else(|| Box::new(PlainChef::new(self.method.unwrap_or(HttpMethod::Get))));
        if let Some(method) = self.method {
            chef.set_method(method);
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(UreqTransport::new(self.transport_config.unwrap_or_default())),
        };

        Waiter {
            transport,
            chef,
            consumer: self.consumer.unwrap_or_else(|| Box::new(JsonConsumer)),
            menu: Arc::new(self.menu.unwrap_or_else(Menu::standard)),
            stack: Vec::new(),
            payload: Params::new(),
        }
    }
}
