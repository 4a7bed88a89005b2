use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// What the server saw for one request to `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub user: String,
}

#[derive(Deserialize)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusParams {
    pub body: Option<String>,
}

#[derive(Deserialize)]
pub struct FlakyParams {
    /// Number of leading requests answered with 504.
    pub fail: u32,
}

#[derive(Deserialize)]
pub struct SlowParams {
    pub ms: u64,
}

/// Request counters keyed by the caller-chosen name in `/flaky/{key}`.
pub type Hits = Arc<RwLock<HashMap<String, u32>>>;

pub fn app() -> Router {
    let hits: Hits = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/login", post(login))
        .route("/cookies/set", get(set_cookie))
        .route("/status/{code}", any(status))
        .route("/flaky/{key}", get(flaky))
        .route("/hits/{key}", get(hit_count))
        .route("/slow", get(slow))
        .route("/redirect", get(redirect))
        .route("/binary-error", get(binary_error))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        query,
        cookie: header_str(&headers, header::COOKIE),
        content_type: header_str(&headers, header::CONTENT_TYPE),
        body,
    })
}

async fn login(Form(input): Form<Login>) -> Response {
    (
        [(
            header::SET_COOKIE,
            format!("session={}; Path=/; HttpOnly", input.user),
        )],
        "welcome",
    )
        .into_response()
}

async fn set_cookie(Query(input): Query<SetCookie>) -> Response {
    let path = input.path.unwrap_or_else(|| "/".to_string());
    (
        [(
            header::SET_COOKIE,
            format!("{}={}; Path={path}", input.name, input.value),
        )],
        "ok",
    )
        .into_response()
}

async fn status(Path(code): Path<u16>, Query(params): Query<StatusParams>) -> Response {
    let code = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (code, params.body.unwrap_or_default()).into_response()
}

async fn flaky(
    State(hits): State<Hits>,
    Path(key): Path<String>,
    Query(params): Query<FlakyParams>,
) -> Response {
    let count = {
        let mut hits = hits.write().await;
        let count = hits.entry(key).or_insert(0);
        *count += 1;
        *count
    };
    if count <= params.fail {
        return (StatusCode::GATEWAY_TIMEOUT, "upstream timed out").into_response();
    }
    (StatusCode::OK, format!("attempt={count}")).into_response()
}

async fn hit_count(State(hits): State<Hits>, Path(key): Path<String>) -> String {
    hits.read().await.get(&key).copied().unwrap_or(0).to_string()
}

async fn redirect() -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/echo"),
            (header::SET_COOKIE, "sid=1; Path=/"),
        ],
        "moved",
    )
        .into_response()
}

/// 500 whose body is not valid UTF-8.
async fn binary_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, vec![0xff_u8, 0xfe, b'X']).into_response()
}

async fn slow(Query(params): Query<SlowParams>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(params.ms)).await;
    "finally"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: Some("q=a+b".to_string()),
            cookie: None,
            content_type: None,
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "q=a+b");
        assert!(json["cookie"].is_null());
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            query: None,
            cookie: Some("a=1".to_string()),
            content_type: Some("text/plain".to_string()),
            body: "hi".to_string(),
        };
        let back: Echo = serde_json::from_str(&serde_json::to_string(&echo).unwrap()).unwrap();
        assert_eq!(back.cookie.as_deref(), Some("a=1"));
        assert_eq!(back.body, "hi");
    }

    #[test]
    fn set_cookie_path_is_optional() {
        let input: SetCookie = serde_json::from_str(r#"{"name":"a","value":"1"}"#).unwrap();
        assert!(input.path.is_none());
    }
}
