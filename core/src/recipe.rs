//! Endpoint → HTTP method tables and the chef that consults them.
//!
//! # Recipe text format
//! One endpoint per line, `<endpoint-path> - <METHOD>`:
//!
//! ```text
//! statuses/show - GET
//! statuses/update - POST
//! ```
//!
//! Each line is split on its first `-` and both halves are trimmed. Blank
//! lines are skipped; any other line without a `-` is an error.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::chef::{Chef, PlainChef};
use crate::error::RecipeError;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::Params;

/// Immutable endpoint → method mapping, shared by every chef of an API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe(Arc<HashMap<String, HttpMethod>>);

impl Recipe {
    pub fn parse(text: &str) -> Result<Self, RecipeError> {
        let mut table = HashMap::new();
        for (index, line) in text.trim().lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (endpoint, method) = line.split_once('-').ok_or_else(|| RecipeError::MalformedLine {
                line: index + 1,
                content: line.to_string(),
            })?;
            let endpoint = endpoint.trim();
            if last_segment(endpoint).contains('.') {
                return Err(RecipeError::SuffixedEndpoint(endpoint.to_string()));
            }
            table.insert(endpoint.to_string(), method.trim().parse()?);
        }
        Ok(Self(Arc::new(table)))
    }

    pub fn get(&self, endpoint: &str) -> Option<HttpMethod> {
        self.0.get(endpoint).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Recipe {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recipe::parse(s)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, HttpMethod); N]> for Recipe {
    fn from(pairs: [(K, HttpMethod); N]) -> Self {
        Self(Arc::new(
            pairs.into_iter().map(|(k, m)| (k.into(), m)).collect(),
        ))
    }
}

/// A chef that prefixes a domain and infers the method from a [`Recipe`].
///
/// The lookup is lax: unknown endpoints keep whatever method the chef
/// already had. A hit is sticky and stays in effect for later orders that
/// miss the recipe.
#[derive(Debug, Clone)]
pub struct LaxRecipeChef {
    domain: String,
    recipe: Recipe,
    inner: PlainChef,
}

impl LaxRecipeChef {
    pub fn new(domain: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            domain: domain.into(),
            recipe,
            inner: PlainChef::new(HttpMethod::Get),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Drop one trailing `.<suffix>` from the last segment of the joined path.
fn endpoint_of(stack: &[String]) -> String {
    let mut path = stack.concat();
    let last_start = path.len() - last_segment(&path).len();
    if let Some(dot) = path[last_start..].rfind('.') {
        path.truncate(last_start + dot);
    }
    path
}

impl Chef for LaxRecipeChef {
    fn method(&self) -> HttpMethod {
        self.inner.method()
    }

    fn set_method(&mut self, method: HttpMethod) {
        self.inner.set_method(method);
    }

    fn encode(&mut self, stack: &[String], params: &Params) -> HttpRequest {
        let endpoint = endpoint_of(stack);
        match self.recipe.get(&endpoint) {
            Some(method) => self.inner.set_method(method),
            None => debug!(%endpoint, method = %self.inner.method(), "endpoint not in recipe"),
        }

        let mut full = Vec::with_capacity(stack.len() + 2);
        full.push(self.domain.clone());
        full.push("/".to_string());
        full.extend_from_slice(stack);
        self.inner.encode(&full, params)
    }

    fn errors(&self) -> &[String] {
        self.inner.errors()
    }

    fn errors_mut(&mut self) -> &mut Vec<String> {
        self.inner.errors_mut()
    }

    fn encoded(&self) -> Option<&HttpRequest> {
        self.inner.encoded()
    }

    fn store_encoded(&mut self, request: HttpRequest) {
        self.inner.store_encoded(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn chef() -> LaxRecipeChef {
        let recipe = Recipe::parse("statuses/show - GET\nstatuses/update - POST").unwrap();
        LaxRecipeChef::new("https://api.example.com", recipe)
    }

    #[test]
    fn parse_splits_on_first_dash_and_trims() {
        let recipe = Recipe::parse("a/b - GET\nc - POST").unwrap();
        assert_eq!(recipe.len(), 2);
        assert_eq!(recipe.get("a/b"), Some(HttpMethod::Get));
        assert_eq!(recipe.get("c"), Some(HttpMethod::Post));
        assert_eq!(recipe, Recipe::from([("a/b", HttpMethod::Get), ("c", HttpMethod::Post)]));
    }

    #[test]
    fn parse_ignores_surrounding_whitespace_and_blank_lines() {
        let recipe: Recipe = "\n    search - GET\n\n    favorites/create -POST   \n"
            .parse()
            .unwrap();
        assert_eq!(recipe.get("search"), Some(HttpMethod::Get));
        assert_eq!(recipe.get("favorites/create"), Some(HttpMethod::Post));
    }

    #[test]
    fn parse_rejects_line_without_dash() {
        let err = Recipe::parse("search - GET\ntrends GET").unwrap_err();
        assert_eq!(
            err,
            RecipeError::MalformedLine {
                line: 2,
                content: "trends GET".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_method() {
        let err = Recipe::parse("search - FETCH").unwrap_err();
        assert_eq!(err, RecipeError::UnknownMethod("FETCH".to_string()));
    }

    #[test]
    fn parse_rejects_suffixed_endpoint() {
        let err = Recipe::parse("search.json - GET").unwrap_err();
        assert_eq!(err, RecipeError::SuffixedEndpoint("search.json".to_string()));

        let err = Recipe::parse("v1.1/search.json - GET").unwrap_err();
        assert_eq!(err, RecipeError::SuffixedEndpoint("v1.1/search.json".to_string()));
        assert!(Recipe::parse("v1.1/search - GET").is_ok());
    }

    #[test]
    fn empty_text_is_empty_recipe() {
        assert!(Recipe::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn defaults_to_get() {
        assert_eq!(chef().method(), HttpMethod::Get);
    }

    #[test]
    fn recipe_hit_overrides_method() {
        let mut chef = chef();
        let req = chef.encode(
            &stack(&["statuses", "/", "update.json"]),
            &Params::from([("status", "hello")]),
        );
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.uri, "https://api.example.com/statuses/update.json");
        assert_eq!(req.body.as_deref(), Some("status=hello"));
    }

    #[test]
    fn suffix_content_does_not_matter() {
        for suffix in ["json", "xml", "atom"] {
            let mut chef = chef();
            let last = format!("update.{suffix}");
            chef.encode(&stack(&["statuses", "/", last.as_str()]), &Params::new());
            assert_eq!(chef.method(), HttpMethod::Post, "suffix {suffix}");
        }
    }

    #[test]
    fn only_last_suffix_is_stripped() {
        let mut chef = chef();
        chef.encode(&stack(&["statuses", "/", "update.json.xml"]), &Params::new());
        assert_eq!(chef.method(), HttpMethod::Get);
    }

    #[test]
    fn dotted_earlier_segment_keeps_lookup_key() {
        let recipe = Recipe::parse("v1 - DELETE\nv1.1/search/new - PUT").unwrap();
        let mut chef = LaxRecipeChef::new("http://h", recipe.clone());
        let req = chef.encode(&stack(&["v1.1", "/", "search", "/", "new"]), &Params::new());
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.uri, "http://h/v1.1/search/new?");

        let mut chef = LaxRecipeChef::new("http://h", recipe);
        let req = chef.encode(&stack(&["v1.1", "/", "search", "/", "new.json"]), &Params::new());
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.uri, "http://h/v1.1/search/new.json?");
    }

    #[test]
    fn miss_keeps_prior_method() {
        let mut chef = chef();
        chef.set_method(HttpMethod::Delete);
        let req = chef.encode(&stack(&["unknown", "/", "thing.json"]), &Params::from([("id", 1)]));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.uri, "https://api.example.com/unknown/thing.json?id=1");
    }

    #[test]
    fn hit_is_sticky_across_orders() {
        let mut chef = chef();
        chef.encode(&stack(&["statuses", "/", "update.json"]), &Params::new());
        let req = chef.encode(&stack(&["unknown.json"]), &Params::new());
        assert_eq!(req.method, HttpMethod::Post);
    }

    #[test]
    fn path_without_suffix_is_looked_up_whole() {
        let mut chef = chef();
        let req = chef.encode(&stack(&["statuses", "/", "show"]), &Params::from([("id", 7)]));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.uri, "https://api.example.com/statuses/show?id=7");
    }
}
