//! The HTTP round-trip behind every served order.
//!
//! # Design
//! `Transport` is the only place the pipeline blocks. The waiter hands it a
//! finished [`HttpRequest`] and expects an [`HttpResponse`] back; status
//! interpretation is left to the consumer, so implementations must return
//! 4xx/5xx responses as data rather than as errors. No retries, timeouts
//! beyond the configured one, or cancellation happen here.
//!
//! Closures implement `Transport`, which is how tests and credential-signing
//! wrappers plug in without a new type.

use tracing::debug;
use ureq::Agent;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    default_headers: Vec<(String, String)>,
}

impl UreqTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .new_agent();
        Self {
            agent,
            default_headers: config.default_headers,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers: Vec<(String, String)> = self
            .default_headers
            .iter()
            .chain(request.headers.iter())
            .cloned()
            .collect();
        let uri = request.uri.as_str();

        macro_rules! without_body {
            ($builder:expr) => {
                with_headers($builder, &headers).call()
            };
        }
        macro_rules! with_body {
            ($builder:expr) => {{
                let builder = with_headers($builder, &headers);
                match request.body.as_deref() {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }};
        }

        let mut response = match request.method {
            HttpMethod::Get => without_body!(self.agent.get(uri)),
            HttpMethod::Delete => without_body!(self.agent.delete(uri)),
            HttpMethod::Head => without_body!(self.agent.head(uri)),
            HttpMethod::Options => without_body!(self.agent.options(uri)),
            HttpMethod::Post => with_body!(self.agent.post(uri)),
            HttpMethod::Put => with_body!(self.agent.put(uri)),
            HttpMethod::Patch => with_body!(self.agent.patch(uri)),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
