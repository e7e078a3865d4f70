//! Ordered route table: first structural match wins.

use super::pattern::{PathParams, PathPattern, RouteError};
use crate::errors::AppError;
use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Request bodies larger than this are rejected before parsing.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Type-erased async route handler.
pub type RouteHandler<S> =
    Arc<dyn Fn(RouteContext<S>) -> BoxFuture<'static, Result<Response, AppError>> + Send + Sync>;

/// Which request methods a route accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodMatcher {
    Any,
    Exact(Method),
}

impl MethodMatcher {
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Exact(expected) => expected == method,
        }
    }
}

impl fmt::Display for MethodMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodMatcher::Any => f.write_str("*"),
            MethodMatcher::Exact(method) => f.write_str(method.as_str()),
        }
    }
}

impl From<Method> for MethodMatcher {
    fn from(method: Method) -> Self {
        MethodMatcher::Exact(method)
    }
}

/// Everything a handler receives for one request.
pub struct RouteContext<S> {
    pub request: Request,
    pub params: PathParams,
    pub state: S,
}

impl<S> RouteContext<S> {
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// A path parameter declared by the matched pattern.
    pub fn param(&self, name: &str) -> Result<&str, AppError> {
        self.params.get(name).ok_or_else(|| {
            AppError::InternalServerError(format!("route has no path parameter '{}'", name))
        })
    }

    /// Read and parse the request body as JSON. The body is consumed.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, AppError> {
        let body = std::mem::take(self.request.body_mut());
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read request body: {}", e)))?;

        serde_json::from_slice(&bytes).map_err(|e| AppError::InvalidJson(e.to_string()))
    }

    /// Hand the request to another service, e.g. a static file server.
    pub fn into_request(self) -> Request {
        self.request
    }
}

pub struct Route<S> {
    method: MethodMatcher,
    pattern: PathPattern,
    handler: RouteHandler<S>,
}

impl<S> Route<S> {
    pub fn method(&self) -> &MethodMatcher {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &RouteHandler<S> {
        &self.handler
    }
}

/// Immutable list of routes, scanned linearly in registration order.
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
}

impl<S> RouteTable<S> {
    pub fn builder() -> RouteTableBuilder<S> {
        RouteTableBuilder {
            entries: Vec::new(),
        }
    }

    /// First route whose method and pattern both match.
    pub fn find(&self, method: &Method, path: &str) -> Option<(&Route<S>, PathParams)> {
        self.routes
            .iter()
            .filter(|route| route.method.matches(method))
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<S>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Collects route definitions; patterns are validated in [`RouteTableBuilder::build`].
///
/// # Example
/// ```ignore
/// let table = RouteTable::builder()
///     .options("*", preflight)
///     .get("/healthz", health)
///     .post("/api/events/:name", record_event)
///     .get("*", assets)
///     .build()?;
/// ```
pub struct RouteTableBuilder<S> {
    entries: Vec<(MethodMatcher, String, RouteHandler<S>)>,
}

impl<S: Send + 'static> RouteTableBuilder<S> {
    pub fn route<H, Fut, R, E>(
        mut self,
        method: impl Into<MethodMatcher>,
        pattern: &str,
        handler: H,
    ) -> Self
    where
        H: Fn(RouteContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<AppError> + 'static,
    {
        let handler = Arc::new(handler);
        let erased: RouteHandler<S> = Arc::new(move |ctx| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                handler(ctx)
                    .await
                    .map(IntoResponse::into_response)
                    .map_err(Into::into)
            })
        });

        self.entries.push((method.into(), pattern.to_string(), erased));
        self
    }

    pub fn get<H, Fut, R, E>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(RouteContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<AppError> + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<H, Fut, R, E>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(RouteContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<AppError> + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn options<H, Fut, R, E>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(RouteContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<AppError> + 'static,
    {
        self.route(Method::OPTIONS, pattern, handler)
    }

    pub fn any<H, Fut, R, E>(self, pattern: &str, handler: H) -> Self
    where
        H: Fn(RouteContext<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse + 'static,
        E: Into<AppError> + 'static,
    {
        self.route(MethodMatcher::Any, pattern, handler)
    }

    /// Parse every pattern and reject duplicate `(method, pattern)` pairs.
    pub fn build(self) -> Result<RouteTable<S>, RouteError> {
        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(self.entries.len());

        for (method, raw, handler) in self.entries {
            let pattern = PathPattern::parse(&raw)?;
            if !seen.insert((method.clone(), raw.clone())) {
                return Err(RouteError::DuplicateRoute {
                    method: method.to_string(),
                    pattern: raw,
                });
            }
            routes.push(Route {
                method,
                pattern,
                handler,
            });
        }

        Ok(RouteTable { routes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn named(label: &'static str) -> Result<&'static str, AppError> {
        Ok(label)
    }

    fn table() -> RouteTable<()> {
        RouteTable::builder()
            .options("*", |_| named("preflight"))
            .get("/api", |_| named("info"))
            .post("/api/events/:name", |_| named("record"))
            .get("/api/events/:name", |_| named("list"))
            .any("/echo", |_| named("echo"))
            .get("*", |_| named("assets"))
            .build()
            .unwrap()
    }

    fn matched(table: &RouteTable<()>, method: Method, path: &str) -> Option<String> {
        table
            .find(&method, path)
            .map(|(route, _)| route.pattern().to_string())
    }

    #[test]
    fn test_first_match_wins() {
        let table = table();
        assert_eq!(matched(&table, Method::GET, "/api").as_deref(), Some("/api"));
        assert_eq!(matched(&table, Method::GET, "/index.html").as_deref(), Some("*"));
        assert_eq!(matched(&table, Method::OPTIONS, "/api").as_deref(), Some("*"));
    }

    #[test]
    fn test_method_must_match() {
        let table = table();
        let (route, params) = table.find(&Method::POST, "/api/events/signup").unwrap();
        assert_eq!(route.method(), &MethodMatcher::Exact(Method::POST));
        assert_eq!(params.get("name"), Some("signup"));

        assert!(table.find(&Method::DELETE, "/api/events/signup").is_none());
        assert!(table.find(&Method::PUT, "/echo").is_some());
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let result = RouteTable::<()>::builder()
            .get("/api", |_| named("a"))
            .get("/api", |_| named("b"))
            .build();

        assert!(matches!(result, Err(RouteError::DuplicateRoute { .. })));
    }

    #[test]
    fn test_same_pattern_different_method_is_allowed() {
        let table = RouteTable::<()>::builder()
            .get("/api/visitors", |_| named("counts"))
            .post("/api/visitors", |_| named("mint"))
            .build()
            .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let result = RouteTable::<()>::builder()
            .get("api", |_| named("a"))
            .build();
        assert!(matches!(result, Err(RouteError::InvalidPattern { .. })));
    }

    #[tokio::test]
    async fn test_context_json_and_param() {
        let table = table();
        let (_, params) = table.find(&Method::POST, "/api/events/click").unwrap();
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/events/click")
            .body(Body::from(r#"{"visitor":"v1"}"#))
            .unwrap();

        let mut ctx = RouteContext {
            request,
            params,
            state: (),
        };
        assert_eq!(ctx.param("name").unwrap(), "click");
        assert!(ctx.param("missing").is_err());

        let body: serde_json::Value = ctx.json().await.unwrap();
        assert_eq!(body["visitor"], "v1");
    }

    #[tokio::test]
    async fn test_context_json_rejects_malformed_body() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::from("{not json"))
            .unwrap();
        let mut ctx = RouteContext {
            request,
            params: PathParams::default(),
            state: (),
        };

        let err = ctx.json::<serde_json::Value>().await.unwrap_err();
        assert!(matches!(err, AppError::InvalidJson(_)));
    }
}
