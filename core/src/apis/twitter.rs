//! Twitter REST API binding.
//!
//! Endpoints are named by path with a format suffix, and the method comes
//! from the recipe below:
//!
//! ```rust,ignore
//! use waiter_core::apis::twitter::Twitter;
//!
//! let mut twitter = Twitter::builder().build();
//! twitter.combine("statuses")?;
//! twitter.combine("user_timeline.json")?;
//! let timeline = twitter.call([("screen_name", "rustlang")])?;
//! ```
//!
//! A signing client can be swapped in mid-pipeline when its type is
//! registered with `accept_transport_type::<C>()` on the builder.

use std::sync::LazyLock;

use crate::consumer::StatusGuardConsumer;
use crate::error::WaiterError;
use crate::recipe::{LaxRecipeChef, Recipe};
use crate::waiter::WaiterBuilder;

pub const DOMAIN: &str = "https://twitter.com";

/// Statuses that fail without decoding the body.
pub const BAD_STATUSES: [u16; 3] = [404, 500, 503];

pub const TWITTER_ENDPOINTS: &str = "
    search - GET
    trends - GET
    trends/current - GET
    trends/daily - GET
    trends/weekly - GET
    statuses/public_timeline - GET
    statuses/home_timeline - GET
    statuses/friends_timeline - GET
    statuses/user_timeline - GET
    statuses/mentions - GET
    statuses/retweeted_by_me - GET
    statuses/retweeted_to_me - GET
    statuses/retweets_of_me - GET
    statuses/show - GET
    statuses/update - POST
    statuses/destroy - POST
    statuses/retweet - POST
    statuses/retweets - GET
    users/show - GET
    users/search - GET
    statuses/friends - GET
    statuses/followers - GET
    direct_messages - GET
    direct_messages/sent - GET
    direct_messages/new - POST
    direct_messages/destroy - POST
    friendships/create - POST
    friendships/destroy - POST
    friendships/exists - GET
    friendships/show - GET
    friends/ids - GET
    followers/ids - GET
    account/verify_credentials - GET
    account/rate_limit_status - GET
    account/end_session - POST
    account/update_delivery_device - POST
    account/update_profile_colors - POST
    account/update_profile_image - POST
    account/update_profile_background_image - POST
    account/update_profile - POST
    favorites - GET
    favorites/create - POST
    favorites/destroy - POST
    notifications/follow - POST
    notifications/leave - POST
    blocks/create - POST
    blocks/destroy - POST
    blocks/exists - GET
    blocks/blocking - GET
    blocks/blocking/ids - GET
    report_spam - GET
    saved_searches - GET
    saved_searches/show - GET
    saved_searches/create - POST
    saved_searches/destroy - POST
    oauth/request_token - GET
    oauth/authorize - GET
    oauth/authenticate - GET
    oauth/access_token - POST
    trends/available - GET
    trends/location - GET
";

static RECIPE: LazyLock<Recipe> = LazyLock::new(|| {
    Recipe::parse(TWITTER_ENDPOINTS).expect("built-in twitter recipe is well-formed")
});

pub fn recipe() -> Recipe {
    RECIPE.clone()
}

/// Recipe chef pointed at `domain`.
pub fn recipe_chef(domain: impl Into<String>) -> LaxRecipeChef {
    LaxRecipeChef::new(domain, recipe())
}

pub fn consumer() -> StatusGuardConsumer {
    StatusGuardConsumer::new("twitter", BAD_STATUSES, "error")
}

pub struct Twitter;

impl Twitter {
    pub fn builder() -> WaiterBuilder {
        Self::builder_for(DOMAIN)
    }

    /// [`Twitter::builder`] with the transport configured from the
    /// environment.
    pub fn builder_from_env() -> Result<WaiterBuilder, WaiterError> {
        Self::builder().transport_config_from_env()
    }

    /// Same binding against another host, e.g. a local stand-in.
    pub fn builder_for(domain: impl Into<String>) -> WaiterBuilder {
        WaiterBuilder::default()
            .chef(recipe_chef(domain))
            .consumer(consumer())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::chef::Chef;
    use crate::config::TIMEOUT_ENV;
    use crate::error::{ConfigError, ResponseError, TransportError};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    #[test]
    fn recipe_parses_every_endpoint() {
        let recipe = recipe();
        assert_eq!(recipe.len(), 61);
        assert_eq!(recipe.get("statuses/update"), Some(HttpMethod::Post));
        assert_eq!(recipe.get("blocks/blocking/ids"), Some(HttpMethod::Get));
        assert_eq!(recipe.get("oauth/access_token"), Some(HttpMethod::Post));
    }

    #[test]
    fn builder_from_env_reports_invalid_config() {
        std::env::set_var(TIMEOUT_ENV, "soon");
        let result = Twitter::builder_from_env();
        std::env::remove_var(TIMEOUT_ENV);
        match result {
            Err(WaiterError::Config(ConfigError::InvalidEnv { var, value })) => {
                assert_eq!(var, TIMEOUT_ENV);
                assert_eq!(value, "soon");
            }
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("invalid timeout was accepted"),
        }

        let waiter = Twitter::builder_from_env().unwrap().build();
        assert_eq!(waiter.chef().method(), HttpMethod::Get);
    }

    #[test]
    fn consumer_guards_known_bad_statuses() {
        assert_eq!(
            consumer().bad_statuses().iter().copied().collect::<Vec<_>>(),
            vec![404, 500, 503]
        );
    }

    fn canned(
        status: u16,
        body: &'static str,
    ) -> (
        Arc<Mutex<Option<HttpRequest>>>,
        impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + 'static,
    ) {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let transport = move |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
            *sink.lock().unwrap() = Some(req.clone());
            Ok(HttpResponse::new(status, body))
        };
        (seen, transport)
    }

    #[test]
    fn update_is_posted_to_twitter() {
        let (seen, transport) = canned(200, r#"{"id": 1, "text": "hello"}"#);
        let mut twitter = Twitter::builder().transport(transport).build();

        twitter.combine("statuses").unwrap();
        twitter.combine("update.json").unwrap();
        let dish = twitter.call([("status", "hello")]).unwrap();
        assert_eq!(dish.into_json(), Some(json!({"id": 1, "text": "hello"})));

        let req = seen.lock().unwrap().clone().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.uri, "https://twitter.com/statuses/update.json");
        assert_eq!(req.body.as_deref(), Some("status=hello"));
    }

    #[test]
    fn show_is_fetched_with_query() {
        let (seen, transport) = canned(200, r#"{"id": 20}"#);
        let mut twitter = Twitter::builder().transport(transport).build();
        twitter.order(["statuses", "show.json"]).unwrap();
        twitter.call([("id", 20)]).unwrap();

        let req = seen.lock().unwrap().clone().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.uri, "https://twitter.com/statuses/show.json?id=20");
        assert_eq!(twitter.chef().method(), HttpMethod::Get);
    }

    #[test]
    fn bad_status_becomes_twitter_error() {
        let (_, transport) = canned(503, "<html>Over capacity</html>");
        let mut twitter = Twitter::builder().transport(transport).build();
        twitter.combine("search.json").unwrap();
        let err = twitter.call([("q", "rust")]).unwrap_err();
        assert!(matches!(
            err,
            WaiterError::Response(ResponseError::BadStatus { status: 503, .. })
        ));
    }

    #[test]
    fn embedded_error_becomes_twitter_error() {
        let (_, transport) = canned(401, r#"{"error": "Could not authenticate you."}"#);
        let mut twitter = Twitter::builder().transport(transport).build();
        twitter.order(["account", "verify_credentials.json"]).unwrap();
        let err = twitter.invoke().unwrap_err();
        assert_eq!(
            err.to_string(),
            "twitter: bad request - Could not authenticate you."
        );
    }
}
