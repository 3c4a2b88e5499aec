//! Request encoding: turns an accumulated path stack and params into an
//! [`HttpRequest`].
//!
//! # Design
//! `Chef` is the extension point. The base `PlainChef` never rejects an
//! order apart from a failing query encoding, but validating chefs push
//! their findings onto `errors_mut()` from inside `encode`, which makes
//! `encode_and_validate` report failure and the waiter raise
//! `WaiterError::Request` without sending anything.
//!
//! [`HttpRequest`]: crate::http::HttpRequest

use crate::http::{HttpMethod, HttpRequest, FORM_CONTENT_TYPE};
use crate::params::Params;

pub trait Chef: Send {
    fn method(&self) -> HttpMethod;

    fn set_method(&mut self, method: HttpMethod);

    /// Build the request. Problems go onto `errors_mut()`.
    fn encode(&mut self, stack: &[String], params: &Params) -> HttpRequest;

    fn errors(&self) -> &[String];

    fn errors_mut(&mut self) -> &mut Vec<String>;

    /// The last request produced by `encode_and_validate`.
    fn encoded(&self) -> Option<&HttpRequest>;

    fn store_encoded(&mut self, request: HttpRequest);

    /// Clear previous errors, encode, keep the result, and report success.
    fn encode_and_validate(&mut self, stack: &[String], params: &Params) -> bool {
        self.errors_mut().clear();
        let request = self.encode(stack, params);
        self.store_encoded(request);
        self.errors().is_empty()
    }
}

/// The base chef: literal concatenation plus url-encoded params.
#[derive(Debug, Clone)]
pub struct PlainChef {
    method: HttpMethod,
    errors: Vec<String>,
    encoded: Option<HttpRequest>,
}

impl PlainChef {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            errors: Vec::new(),
            encoded: None,
        }
    }
}

impl Default for PlainChef {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl Chef for PlainChef {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    fn encode(&mut self, stack: &[String], params: &Params) -> HttpRequest {
        let query = params.to_query().unwrap_or_else(|e| {
            self.errors.push(format!("could not encode params: {e}"));
            String::new()
        });
        cook(self.method, stack, query)
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<String> {
        &mut self.errors
    }

    fn encoded(&self) -> Option<&HttpRequest> {
        self.encoded.as_ref()
    }

    fn store_encoded(&mut self, request: HttpRequest) {
        self.encoded = Some(request);
    }
}

/// Join the stack and place the query according to `method`.
fn cook(method: HttpMethod, stack: &[String], query: String) -> HttpRequest {
    let mut uri = stack.concat();
    if method.is_body_bearing() {
        HttpRequest {
            method,
            uri,
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(query),
        }
    } else {
        uri.push('?');
        uri.push_str(&query);
        HttpRequest {
            method,
            uri,
            headers: Vec::new(),
            body: None,
        }
    }
}
