use crate::context::RequestContext;
use crate::serializer::{JsonSerializer, Serializer};
use crate::value::{Payload, Value};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use tracing::error;

/// Response type produced by the API.
pub type HttpResponse = http::Response<Vec<u8>>;

/// `{success, result|results, next?, error?, messages?}`, built once per request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    pub success: bool,
    pub result: Option<Value>,
    pub results: Option<Vec<Value>>,
    pub next: Option<String>,
    pub error: Option<String>,
    pub messages: Vec<String>,
}

impl Envelope {
    /// Envelope for the final state of `ctx`. An error hides any result.
    #[must_use]
    pub fn from_context(ctx: &RequestContext) -> Self {
        let messages = ctx.messages().to_vec();
        match ctx.error() {
            Some(err) => Self {
                success: false,
                error: Some(err.to_string()),
                messages,
                ..Self::default()
            },
            None => Self {
                success: true,
                result: ctx.result().cloned(),
                results: ctx.results().map(<[Value]>::to_vec),
                next: ctx.next_url(),
                error: None,
                messages,
            },
        }
    }

    /// Failure envelope carrying only `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Payload {
        let mut out = Payload::new();
        out.insert("success".into(), Value::Bool(self.success));
        if let Some(result) = self.result {
            out.insert("result".into(), result);
        }
        if let Some(results) = self.results {
            out.insert("results".into(), Value::Array(results));
        }
        if let Some(next) = self.next {
            out.insert("next".into(), Value::String(next));
        }
        if let Some(error) = self.error {
            out.insert("error".into(), Value::String(error));
        }
        if !self.messages.is_empty() {
            out.insert(
                "messages".into(),
                Value::Array(self.messages.into_iter().map(Value::String).collect()),
            );
        }
        out
    }
}

fn with_body(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> HttpResponse {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Encodes `envelope` with `serializer`. A serializer failure becomes a JSON 500.
#[must_use]
pub fn render(status: StatusCode, envelope: Envelope, serializer: &dyn Serializer) -> HttpResponse {
    match serializer.serialize(&envelope.into_payload()) {
        Ok(body) => with_body(status, serializer.content_type(), body),
        Err(err) => {
            error!(error = %err, "Response serialization failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Response for the final state of `ctx`. `204` always has an empty body.
#[must_use]
pub fn render_context(ctx: &RequestContext, serializer: &dyn Serializer) -> HttpResponse {
    if ctx.status() == StatusCode::NO_CONTENT && ctx.error().is_none() {
        let mut response = http::Response::new(Vec::new());
        *response.status_mut() = StatusCode::NO_CONTENT;
        return response;
    }
    render(ctx.status(), Envelope::from_context(ctx), serializer)
}

/// Error envelope encoded as JSON regardless of the requested format.
#[must_use]
pub fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    let payload = Envelope::error(message).into_payload();
    let body = JsonSerializer.serialize(&payload).unwrap_or_else(|_| {
        br#"{"success":false,"error":"Unable to serialize response"}"#.to_vec()
    });
    with_body(status, "application/json", body)
}

/// Plain-text response.
#[must_use]
pub fn text(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    with_body(
        status,
        "text/plain; charset=utf-8",
        message.into().into_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, PipelineError};
    use http::{HeaderMap, Method};

    fn ctx() -> RequestContext {
        RequestContext::new(
            Method::GET,
            "/x",
            Vec::new(),
            HeaderMap::new(),
            Default::default(),
            10,
        )
    }

    #[test]
    fn test_error_hides_result() {
        let mut c = ctx();
        c.set_result(Value::from("kept?"));
        c.set_error(PipelineError::from(HandlerError::not_found("gone")));
        let env = Envelope::from_context(&c);
        assert!(!env.success);
        assert_eq!(env.result, None);
        assert_eq!(env.error.as_deref(), Some("gone"));
        assert_eq!(c.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_messages_only_when_present() {
        let mut c = ctx();
        let payload = Envelope::from_context(&c).into_payload();
        assert!(!payload.contains_key("messages"));
        c.add_message("note");
        let payload = Envelope::from_context(&c).into_payload();
        assert_eq!(
            payload.get("messages"),
            Some(&Value::Array(vec![Value::from("note")]))
        );
    }

    #[test]
    fn test_no_content_has_empty_body() {
        let mut c = ctx();
        c.set_status(StatusCode::NO_CONTENT);
        let res = render_context(&c, &JsonSerializer);
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_json_error_body() {
        let res = json_error(StatusCode::BAD_REQUEST, "Format 'xml' not supported");
        assert_eq!(
            res.body().as_slice(),
            br#"{"error":"Format 'xml' not supported","success":false}"#
        );
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }
}
