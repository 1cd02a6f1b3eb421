//! HTTP requests with test-override routing
//!
//! A request is a plain description (`method`, `url`, headers, JSON body).
//! When the configuration carries an override, requests are answered from it
//! without touching the network; otherwise a real `reqwest` call is made.
//!
//! Override resolution order for a request `GET http://host/path`:
//! 1. exact key `"GET:http://host/path"`,
//! 2. method wildcard `"GET:*"`,
//! 3. global wildcard `"*"`,
//! 4. no match: [`HttpError::RouteNotDefined`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// A request description.
#[derive(Clone, Debug, Default)]
pub struct HttpRequest {
    /// HTTP method, upper-case ("GET", "POST", ...).
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Additional request headers.
    pub headers: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request with the given method and URL.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Shorthand for a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The override-routing key for this request.
    pub fn route_key(&self) -> String {
        format!("{}:{}", self.method, self.url)
    }
}

/// Errors produced by the HTTP service.
#[derive(Error, Debug)]
pub enum HttpError {
    /// An override is configured but defines no route for this request.
    #[error("route not defined: {0}")]
    RouteNotDefined(String),
    /// The server answered with a non-success status.
    #[error("{status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// The request could not be sent or the response not read.
    #[error("transport error: {0}")]
    Transport(String),
    /// A configured override rejected the request.
    #[error("{0}")]
    Rejected(String),
}

/// Handler closure answering a request in an override.
pub type RequestFn = Arc<dyn Fn(&HttpRequest) -> Result<Value, HttpError> + Send + Sync>;

/// One route's reply in a routed override.
#[derive(Clone)]
pub enum RouteReply {
    /// Resolve with this value.
    Resolve(Value),
    /// Reject with this message.
    Reject(String),
    /// Compute the reply.
    Handler(RequestFn),
}

impl From<Value> for RouteReply {
    fn from(value: Value) -> Self {
        RouteReply::Resolve(value)
    }
}

/// Request override set through the app configuration.
#[derive(Clone)]
pub enum RequestOverride {
    /// Answer every request with one handler.
    Handler(RequestFn),
    /// Answer by route key (see module docs for resolution order).
    Routes(HashMap<String, RouteReply>),
}

impl RequestOverride {
    /// Build a routed override from `(key, reply)` pairs.
    pub fn routes<I, K, R>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Into<RouteReply>,
    {
        RequestOverride::Routes(
            entries
                .into_iter()
                .map(|(key, reply)| (key.into(), reply.into()))
                .collect(),
        )
    }
}

/// The HTTP service. Cheap to clone; safe to move into spawned tasks.
#[derive(Clone)]
pub struct Http {
    request_override: Option<RequestOverride>,
    client: reqwest::Client,
}

impl Http {
    /// Create the service, optionally with a request override.
    pub fn new(request_override: Option<RequestOverride>) -> Self {
        Self {
            request_override,
            client: reqwest::Client::new(),
        }
    }

    /// Make a request. Overrides win over the network.
    pub async fn request(&self, request: HttpRequest) -> Result<Value, HttpError> {
        match &self.request_override {
            Some(RequestOverride::Handler(handler)) => handler(&request),
            Some(RequestOverride::Routes(routes)) => Self::route(routes, &request),
            None => self.send(request).await,
        }
    }

    fn route(routes: &HashMap<String, RouteReply>, request: &HttpRequest) -> Result<Value, HttpError> {
        let key = request.route_key();
        let reply = routes
            .get(&key)
            .or_else(|| routes.get(&format!("{}:*", request.method)))
            .or_else(|| routes.get("*"))
            .ok_or(HttpError::RouteNotDefined(key))?;
        match reply {
            RouteReply::Resolve(value) => Ok(value.clone()),
            RouteReply::Reject(message) => Err(HttpError::Rejected(message.clone())),
            RouteReply::Handler(handler) => handler(request),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<Value, HttpError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|err| HttpError::Transport(err.to_string()))?;
        let mut builder = self.client.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| HttpError::Transport(err.to_string()))?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);
        let text = response
            .text()
            .await
            .map_err(|err| HttpError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if is_json {
            serde_json::from_str(&text).map_err(|err| HttpError::Transport(err.to_string()))
        } else {
            Ok(Value::String(text))
        }
    }
}

impl Default for Http {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_exact_route_override() {
        let http = Http::new(Some(RequestOverride::routes([(
            "GET:http://fake.org/functions/increment",
            json!(5),
        )])));

        let reply = http
            .request(HttpRequest::get("http://fake.org/functions/increment"))
            .await
            .unwrap();
        assert_eq!(reply, json!(5));
    }

    #[tokio::test]
    async fn test_wildcard_resolution_order() {
        let http = Http::new(Some(RequestOverride::routes([
            ("GET:http://host/a", RouteReply::Resolve(json!("exact"))),
            ("GET:*", RouteReply::Resolve(json!("method"))),
            ("*", RouteReply::Resolve(json!("any"))),
        ])));

        let exact = http.request(HttpRequest::get("http://host/a")).await.unwrap();
        assert_eq!(exact, json!("exact"));

        let method = http.request(HttpRequest::get("http://host/b")).await.unwrap();
        assert_eq!(method, json!("method"));

        let any = http.request(HttpRequest::post("http://host/b")).await.unwrap();
        assert_eq!(any, json!("any"));
    }

    #[tokio::test]
    async fn test_missing_route_is_an_error() {
        let http = Http::new(Some(RequestOverride::routes([(
            "GET:http://host/a",
            json!(1),
        )])));

        let err = http
            .request(HttpRequest::get("http://host/other"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::RouteNotDefined(key) if key == "GET:http://host/other"));
    }

    #[tokio::test]
    async fn test_reject_and_handler_replies() {
        let http = Http::new(Some(RequestOverride::routes([
            ("GET:http://host/fail", RouteReply::Reject("denied".into())),
            (
                "POST:http://host/echo",
                RouteReply::Handler(Arc::new(|request: &HttpRequest| {
                    Ok(request.body.clone().unwrap_or(Value::Null))
                })),
            ),
        ])));

        let err = http.request(HttpRequest::get("http://host/fail")).await.unwrap_err();
        assert!(matches!(err, HttpError::Rejected(message) if message == "denied"));

        let echoed = http
            .request(HttpRequest::post("http://host/echo").with_body(json!({"x": 1})))
            .await
            .unwrap();
        assert_eq!(echoed, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_catch_all_handler_override() {
        let http = Http::new(Some(RequestOverride::Handler(Arc::new(
            |request: &HttpRequest| Ok(Value::String(request.route_key())),
        ))));

        let reply = http.request(HttpRequest::get("http://host/x")).await.unwrap();
        assert_eq!(reply, json!("GET:http://host/x"));
    }
}
