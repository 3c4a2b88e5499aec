//! HTTP method overrides usable as pipeline steps.

use crate::error::WaiterError;
use crate::http::HttpMethod;
use crate::menu::{CombinesWithWaiter, Order, Outcome};
use crate::waiter::Waiter;

/// Sets the chef's method when combined with a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method(pub HttpMethod);

pub const GET: Method = Method(HttpMethod::Get);
pub const POST: Method = Method(HttpMethod::Post);
pub const PUT: Method = Method(HttpMethod::Put);
pub const DELETE: Method = Method(HttpMethod::Delete);

impl CombinesWithWaiter for Method {
    fn accept(self: Box<Self>, waiter: &mut Waiter) -> Result<Outcome, WaiterError> {
        waiter.set_method(self.0);
        Ok(Outcome::Pending)
    }
}

impl From<Method> for Order {
    fn from(method: Method) -> Self {
        Order::Custom(Box::new(method))
    }
}
