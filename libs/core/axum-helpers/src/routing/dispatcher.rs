//! Request dispatch: route selection, CORS, error translation, logging.

use super::table::{RouteContext, RouteTable};
use crate::errors::AppError;
use crate::http::CorsPolicy;
use axum::extract::Request;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use observability::HttpMetrics;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Callback for 5xx outcomes, e.g. to forward them to an error tracker.
pub type ErrorReporter = Arc<dyn Fn(&Method, &Uri, &AppError) + Send + Sync>;

const UNMATCHED_ROUTE: &str = "unmatched";

/// Dispatches requests through an ordered [`RouteTable`].
///
/// At most one handler runs per request. Handler errors and panics are
/// turned into JSON error responses here and never reach the server.
///
/// # Example
/// ```ignore
/// let router = Dispatcher::new(table, state)
///     .with_cors(CorsPolicy::from_config(&config.cors))
///     .into_axum_router();
/// ```
pub struct Dispatcher<S> {
    table: Arc<RouteTable<S>>,
    cors: Arc<CorsPolicy>,
    state: S,
    on_error: Option<ErrorReporter>,
}

impl<S: Clone> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            cors: Arc::clone(&self.cors),
            state: self.state.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<S> Dispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(table: RouteTable<S>, state: S) -> Self {
        Self {
            table: Arc::new(table),
            cors: Arc::new(CorsPolicy::default()),
            state,
            on_error: None,
        }
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = Arc::new(cors);
        self
    }

    pub fn with_error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&Method, &Uri, &AppError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(reporter));
        self
    }

    /// Produce the response for one request.
    pub async fn dispatch(&self, request: Request) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let uri = request.uri().clone();
        let cors = self.cors.negotiate(request.headers());

        let (outcome, route) = match self.table.find(&method, uri.path()) {
            Some((route, params)) => {
                let ctx = RouteContext {
                    request,
                    params,
                    state: self.state.clone(),
                };
                let outcome = AssertUnwindSafe((route.handler())(ctx))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        error!(
                            method = %method,
                            path = uri.path(),
                            "Handler panicked: {}",
                            panic_message(panic.as_ref())
                        );
                        Err(AppError::InternalServerError(
                            "An internal server error occurred".to_string(),
                        ))
                    });
                (outcome, route.pattern().as_str())
            }
            None => (
                Err(AppError::NotFound(format!("No route for {} {}", method, uri.path()))),
                UNMATCHED_ROUTE,
            ),
        };

        let mut response = match outcome {
            Ok(response) => response,
            Err(err) => {
                if err.is_server_error() {
                    self.report(&method, &uri, &err);
                }
                err.into_response()
            }
        };

        CorsPolicy::apply(cors, response.headers_mut());

        let status = response.status().as_u16();
        let latency = start.elapsed();
        info!(
            method = %method,
            status,
            path = uri.path(),
            latency_ms = latency.as_secs_f64() * 1000.0,
            "request"
        );
        HttpMetrics::record_request(method.as_str(), route, status, latency);

        response
    }

    fn report(&self, method: &Method, uri: &Uri, err: &AppError) {
        match &self.on_error {
            Some(reporter) => reporter(method, uri, err),
            None => error!(method = %method, path = uri.path(), "Request failed: {}", err),
        }
    }

    /// Mount the dispatcher as the catch-all of an axum router.
    pub fn into_axum_router(self) -> axum::Router {
        axum::Router::new().fallback(move |request: Request| {
            let dispatcher = self.clone();
            async move { dispatcher.dispatch(request).await }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, VARY};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct Calls(Arc<Mutex<Vec<&'static str>>>);

    impl Calls {
        fn record(&self, label: &'static str) {
            self.0.lock().unwrap().push(label);
        }

        fn taken(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn table() -> RouteTable<Calls> {
        RouteTable::builder()
            .options("*", |ctx: RouteContext<Calls>| async move {
                ctx.state.record("preflight");
                Ok::<_, AppError>(StatusCode::OK)
            })
            .get("/api/events/:name", |ctx: RouteContext<Calls>| async move {
                ctx.state.record("events");
                let name = ctx.param("name")?.to_string();
                Ok::<_, AppError>(name)
            })
            .get("/boom", |ctx: RouteContext<Calls>| async move {
                ctx.state.record("boom");
                Err::<StatusCode, _>(AppError::InternalServerError("store down".into()))
            })
            .get("/panic", |_ctx: RouteContext<Calls>| async move {
                if true {
                    panic!("handler exploded");
                }
                Ok::<_, AppError>(StatusCode::OK)
            })
            .get("/static/*", |ctx: RouteContext<Calls>| async move {
                ctx.state.record("static");
                Ok::<_, AppError>("asset")
            })
            .build()
            .unwrap()
    }

    fn request(method: Method, uri: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("origin", "https://app.test")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_exact_route_invokes_one_handler() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(table(), calls.clone());

        let response = dispatcher
            .dispatch(request(Method::GET, "/api/events/signup"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "signup");
        assert_eq!(calls.taken(), vec!["events"]);
    }

    #[tokio::test]
    async fn test_preflight_precedes_other_routes() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(table(), calls.clone());

        let response = dispatcher
            .dispatch(request(Method::OPTIONS, "/api/events/signup"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.taken(), vec!["preflight"]);
    }

    #[tokio::test]
    async fn test_unmatched_route_is_json_404_with_cors() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(table(), calls.clone())
            .with_cors(CorsPolicy::list(["https://app.test"]));

        let response = dispatcher.dispatch(request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.test"
        );
        assert_eq!(response.headers()[VARY], "Origin");

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "NOT_FOUND");
        assert!(calls.taken().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let dispatcher = Dispatcher::new(table(), Calls::default()).with_error_reporter(
            move |method, uri, err| {
                assert_eq!(*method, Method::GET);
                assert_eq!(uri.path(), "/boom");
                assert!(err.is_server_error());
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        let response = dispatcher.dispatch(request(Method::GET, "/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let dispatcher = Dispatcher::new(table(), Calls::default())
            .with_error_reporter(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        let response = dispatcher.dispatch(request(Method::GET, "/panic")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reported.load(Ordering::SeqCst), 1);

        // the dispatcher keeps serving afterwards
        let response = dispatcher
            .dispatch(request(Method::GET, "/api/events/after"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_error_is_not_reported() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let dispatcher = Dispatcher::new(table(), Calls::default())
            .with_error_reporter(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        dispatcher.dispatch(request(Method::GET, "/missing")).await;
        assert_eq!(reported.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_trailing_wildcard_route() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(table(), calls.clone());

        for uri in ["/static", "/static/app.js", "/static/js/vendor/app.js"] {
            let response = dispatcher.dispatch(request(Method::GET, uri)).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
        assert_eq!(calls.taken(), vec!["static", "static", "static"]);
    }

    #[tokio::test]
    async fn test_into_axum_router() {
        let calls = Calls::default();
        let app = Dispatcher::new(table(), calls.clone()).into_axum_router();

        let response = app
            .oneshot(request(Method::GET, "/api/events/via-axum"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "via-axum");
    }
}
