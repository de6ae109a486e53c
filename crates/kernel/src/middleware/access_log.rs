//! Access-log record construction.
//!
//! Builds one structured record per request: method, path, client IP
//! resolved through proxy headers, headers, query and path parameters, the
//! decoded request body, matched API metadata, and bearer-token user info.
//!
//! Reading the body consumes the underlying stream, so the request is
//! rebuilt from the captured bytes before any field extraction happens;
//! downstream handlers always observe the original bytes.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, MatchedPath};
use axum::http::{HeaderMap, Request, Uri, header};
use serde::Serialize;
use tracing::{debug, error};

use crate::services::token::{UserInfo, ValidationMode};
use crate::state::AppState;

/// One structured access-log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogRecord {
    /// Request path.
    pub uri: String,
    /// HTTP method.
    pub method: String,
    /// Client IP, resolved through proxy headers where present.
    pub ip: String,
    /// Full request URL, reconstructed from the Host header.
    pub full_url: String,
    /// All request headers, in wire order.
    pub headers: Vec<(String, String)>,
    /// Decoded query-string parameters.
    pub query_params: BTreeMap<String, String>,
    /// Named path parameters from the matched route.
    pub path_params: BTreeMap<String, String>,
    /// Request body as text, or a placeholder for non-text payloads.
    pub body: String,
    /// Semicolon-joined tags from the matched API operation.
    pub tags: String,
    /// Summary from the matched API operation.
    pub summary: String,
    /// Claims from the bearer token, when one decodes.
    pub user_info: UserInfo,
}

/// Capture the request for logging and emit a record to the configured sink.
///
/// Returns the request rebuilt around the captured body bytes, ready to be
/// passed downstream. Never fails: every extraction step degrades to a
/// placeholder or empty field instead.
pub async fn record_request(state: &AppState, request: Request<Body>) -> Request<Body> {
    let (parts, body) = request.into_parts();

    // The body stream can only be read once. Capture it fully, then carry
    // the bytes both into the rebuilt request and into the record.
    let (bytes, read_error) = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => (bytes, None),
        Err(e) => {
            error!(error = %e, "failed to read request body for access log");
            (Bytes::new(), Some(e.to_string()))
        }
    };

    // Rebuild before extracting anything: whatever happens below, the
    // request handed downstream has a readable body.
    let request = Request::from_parts(parts, Body::from(bytes.clone()));

    let record = build_record(state, &request, &bytes, read_error);
    state.access_log_sink().emit(&record);

    request
}

fn build_record(
    state: &AppState,
    request: &Request<Body>,
    bytes: &Bytes,
    read_error: Option<String>,
) -> AccessLogRecord {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let route_template = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());

    let uri = request.uri();
    let path = uri.path().to_string();
    let method = request.method().as_str().to_string();
    let headers = request.headers();

    let operation = state
        .api_catalog()
        .lookup(&path, &method, route_template.as_deref());

    let body = match read_error {
        None => decode_body(bytes),
        Some(e) => format!("** body could not be read ({e}) **"),
    };

    AccessLogRecord {
        ip: client_ip(headers, peer),
        method,
        full_url: full_url(headers, uri),
        headers: header_pairs(headers),
        query_params: query_params(uri.query().unwrap_or_default()),
        path_params: path_params(route_template.as_deref().unwrap_or_default(), &path),
        body,
        tags: operation.tags.join(";"),
        summary: operation.summary,
        user_info: user_info(state, headers),
        uri: path,
    }
}

/// Resolve the client IP, preferring proxy-provided headers.
///
/// Precedence: first non-empty entry of `X-Forwarded-For`, then
/// `X-Real-Ip`, then the transport peer address. An absent or empty header
/// is treated as not provided.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|e| !e.is_empty()) {
            return first.to_string();
        }
    }

    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

/// Decode the captured body as text.
///
/// Binary payloads are replaced by a placeholder naming the decoding error;
/// they are logged here and never propagated.
fn decode_body(bytes: &Bytes) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            error!(error = %e, "request body is not valid UTF-8");
            format!("** body is not valid UTF-8 ({e}) **")
        }
    }
}

/// Extract bearer-token claims for the record.
///
/// Decoding is lenient (no signature or expiry checks): the record captures
/// who the caller claimed to be. Missing, malformed, or undecodable tokens
/// yield an empty mapping.
fn user_info(state: &AppState, headers: &HeaderMap) -> UserInfo {
    let Some(token) = header_str(headers, header::AUTHORIZATION.as_str()).and_then(bearer_token)
    else {
        return UserInfo::new();
    };

    match state.token_service().decode(token, ValidationMode::Lenient) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "could not decode bearer token for access log");
            UserInfo::new()
        }
    }
}

/// Split `Bearer <token>` into its token, case-insensitively on the scheme.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reconstruct the full request URL.
///
/// Server-side URIs are origin-form (path + query); the original scheme is
/// not recoverable behind a proxy, so http is assumed.
fn full_url(headers: &HeaderMap, uri: &Uri) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    match header_str(headers, header::HOST.as_str()) {
        Some(host) => format!("http://{host}{uri}"),
        None => uri.to_string(),
    }
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn query_params(query: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Recover named path parameters by aligning the matched route template
/// with the concrete path (`/items/{item_id}` + `/items/42` -> item_id=42).
fn path_params(template: &str, path: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    if template.is_empty() {
        return params;
    }

    let pattern_segments: Vec<&str> = template.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    for (i, pattern) in pattern_segments.iter().enumerate() {
        let Some(name) = pattern.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
            continue;
        };
        let Some(value) = path_segments.get(i) else {
            break;
        };
        if let Some(name) = name.strip_prefix('*') {
            // Wildcard segments swallow the rest of the path.
            params.insert(name.to_string(), path_segments[i..].join("/"));
            break;
        }
        params.insert(name.to_string(), (*value).to_string());
    }

    params
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
