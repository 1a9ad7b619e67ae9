//! # Request Context
//!
//! Per-request record threaded through every pipeline stage.
//!
//! A [`RequestContext`] is created by the API for exactly one request, passed
//! by `&mut` to each stage and to the business handler, and dropped when the
//! response has been rendered. It is never shared between requests.
//!
//! ## Contents
//!
//! - request id (ULID, taken from `x-request-id` when valid)
//! - API version and resource id bound by the route
//! - pagination cursor and limit from the `next` / `limit` query parameters
//! - response status, current error, current result(s), accumulated messages

use crate::error::PipelineError;
use crate::router::ParamVec;
use crate::value::Value;
use http::{HeaderMap, Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Route variable holding the API version.
pub const VERSION_PARAM: &str = "version";
/// Route variable holding the resource id.
pub const RESOURCE_ID_PARAM: &str = "resource_id";
/// Query parameter carrying the pagination cursor.
pub const CURSOR_PARAM: &str = "next";
/// Query parameter carrying the page size.
pub const LIMIT_PARAM: &str = "limit";
/// Query parameter selecting the response format.
pub const FORMAT_PARAM: &str = "format";

/// Request identifier backed by a ULID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuses a caller-supplied id when it parses, else generates one.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RequestId>()
            .map_err(|_| serde::de::Error::custom("invalid request id"))
    }
}

/// Mutable per-request state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    route_params: ParamVec,
    version: String,
    resource_id: Option<String>,
    cursor: Option<String>,
    limit: usize,
    status: StatusCode,
    error: Option<PipelineError>,
    result: Option<Value>,
    results: Option<Vec<Value>>,
    next_cursor: Option<String>,
    messages: Vec<String>,
}

impl RequestContext {
    /// Builds a context from request metadata and the matched route variables.
    ///
    /// `version` and `resource_id` come from the route; `next` from the query.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        route_params: ParamVec,
        limit: usize,
    ) -> Self {
        let request_id = RequestId::from_header_or_new(
            headers.get("x-request-id").and_then(|v| v.to_str().ok()),
        );
        let find = |name: &str| {
            route_params
                .iter()
                .rfind(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.clone())
        };
        let version = find(VERSION_PARAM).unwrap_or_default();
        let resource_id = find(RESOURCE_ID_PARAM);
        let cursor = query
            .iter()
            .rfind(|(k, _)| k == CURSOR_PARAM)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty());

        Self {
            request_id,
            method,
            path: path.into(),
            query,
            headers,
            route_params,
            version,
            resource_id,
            cursor,
            limit,
            status: StatusCode::OK,
            error: None,
            result: None,
            results: None,
            next_cursor: None,
            messages: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path, without the query string.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by name (case-insensitive); `None` if absent or not UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Route variable by name. Last occurrence wins.
    #[must_use]
    pub fn route_param(&self, name: &str) -> Option<&str> {
        self.route_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Query parameter by name. Last occurrence wins.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Incoming pagination cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    /// Records the request's error and the status it maps to. Any result
    /// recorded earlier is discarded.
    pub fn set_error(&mut self, error: PipelineError) {
        self.status = error.status();
        self.result = None;
        self.results = None;
        self.next_cursor = None;
        self.error = Some(error);
    }

    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: Value) {
        self.result = Some(result);
    }

    #[must_use]
    pub fn results(&self) -> Option<&[Value]> {
        self.results.as_deref()
    }

    pub fn set_results(&mut self, results: Vec<Value>) {
        self.results = Some(results);
    }

    /// Cursor returned by a list handler for the following page.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn set_next_cursor(&mut self, cursor: Option<String>) {
        self.next_cursor = cursor.filter(|c| !c.is_empty());
    }

    /// Appends a message to the response envelope.
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// URL of the next page: the request path and query with `next` replaced by
    /// the new cursor and `limit` set. `None` without a cursor.
    #[must_use]
    pub fn next_url(&self) -> Option<String> {
        let cursor = self.next_cursor.as_deref()?;
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.query {
            if k != CURSOR_PARAM && k != LIMIT_PARAM {
                query.append_pair(k, v);
            }
        }
        query.append_pair(CURSOR_PARAM, cursor);
        query.append_pair(LIMIT_PARAM, &self.limit.to_string());
        Some(format!("{}?{}", self.path, query.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use std::sync::Arc;

    fn context(query: &[(&str, &str)]) -> RequestContext {
        RequestContext::new(
            Method::GET,
            "/api/v2/widgets",
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            HeaderMap::new(),
            smallvec![(Arc::from("version"), "2".to_string())],
            25,
        )
    }

    #[test]
    fn test_route_variables() {
        let ctx = context(&[]);
        assert_eq!(ctx.version(), "2");
        assert_eq!(ctx.resource_id(), None);
        assert_eq!(ctx.status(), StatusCode::OK);
    }

    #[test]
    fn test_next_url_replaces_cursor() {
        let mut ctx = context(&[("next", "abc"), ("format", "yaml"), ("limit", "5")]);
        assert_eq!(ctx.cursor(), Some("abc"));
        assert_eq!(ctx.next_url(), None);
        ctx.set_next_cursor(Some("def".into()));
        assert_eq!(
            ctx.next_url().as_deref(),
            Some("/api/v2/widgets?format=yaml&next=def&limit=25")
        );
    }

    #[test]
    fn test_empty_cursor_has_no_next() {
        let mut ctx = context(&[]);
        ctx.set_next_cursor(Some(String::new()));
        assert_eq!(ctx.next_url(), None);
    }

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::new();
        let parsed = RequestId::from_header_or_new(Some(&id.to_string()));
        assert_eq!(parsed, id);
        assert_ne!(RequestId::from_header_or_new(Some("nope")), id);
    }
}
