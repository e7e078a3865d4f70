use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};
use core_config::cors::CorsConfig;
use std::collections::HashSet;

/// Methods advertised on every response.
pub const ALLOWED_METHODS: &str = "GET, HEAD, PUT, PATCH, POST, DELETE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(HashSet<String>),
}

/// Decides the `Access-Control-*` headers for each response.
///
/// Negotiation happens per request from the request headers alone, so the
/// same headers land on successful, 404 and error responses.
///
/// # Example
/// ```ignore
/// use axum_helpers::http::CorsPolicy;
///
/// let policy = CorsPolicy::list(["https://app.example.com"]);
/// let headers = policy.negotiate(request.headers());
/// CorsPolicy::apply(headers, response.headers_mut());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
    credentials: bool,
}

impl CorsPolicy {
    /// Allow every origin with `Access-Control-Allow-Origin: *`.
    pub fn any() -> Self {
        Self {
            origins: AllowedOrigins::Any,
            credentials: false,
        }
    }

    /// Allow only the listed origins. A `*` entry allows every origin.
    pub fn list<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let origins: HashSet<String> = origins.into_iter().map(Into::into).collect();
        let origins = if origins.contains("*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        };

        Self {
            origins,
            credentials: false,
        }
    }

    pub fn with_credentials(mut self, credentials: bool) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::list(config.origin_list()).with_credentials(config.credentials)
    }

    pub fn origins(&self) -> &AllowedOrigins {
        &self.origins
    }

    pub fn allows(&self, origin: &str) -> bool {
        match &self.origins {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(origins) => origins.contains(origin),
        }
    }

    /// Response headers for a request carrying `request` headers.
    pub fn negotiate(&self, request: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();

        match &self.origins {
            AllowedOrigins::Any => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }
            AllowedOrigins::List(origins) => {
                let listed = request
                    .get(ORIGIN)
                    .filter(|origin| origin.to_str().is_ok_and(|o| origins.contains(o)));

                if let Some(origin) = listed {
                    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                    headers.append(VARY, HeaderValue::from_static("Origin"));
                }
            }
        }

        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );

        if let Some(requested) = request.get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            headers.append(
                VARY,
                HeaderValue::from_static("Access-Control-Request-Headers"),
            );
        }

        if self.credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        headers
    }

    /// Merge negotiated headers into a response. `Vary` values are appended,
    /// everything else replaces what the handler set.
    pub fn apply(negotiated: HeaderMap, response: &mut HeaderMap) {
        for (name, value) in negotiated.iter() {
            if *name == VARY {
                response.append(VARY, value.clone());
            } else {
                response.insert(name.clone(), value.clone());
            }
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::any()
    }
}
