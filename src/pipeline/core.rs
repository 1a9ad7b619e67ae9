use crate::context::RequestContext;
use crate::error::{DecodeError, PipelineError};
use crate::handler::{ResourceHandler, Verb};
use crate::projection::{project_inbound, project_outbound};
use crate::resource::Resource;
use crate::rules::RuleSet;
use crate::value::{Payload, Value};
use http::StatusCode;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// Pipeline states, in order. Any state may end in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decoding,
    VersionResolved,
    ProjectingInbound,
    Invoking,
    ProjectingOutbound,
    Responding,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Decoding => "decoding",
            Stage::VersionResolved => "version_resolved",
            Stage::ProjectingInbound => "projecting_inbound",
            Stage::Invoking => "invoking",
            Stage::ProjectingOutbound => "projecting_outbound",
            Stage::Responding => "responding",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage, verb: Verb) {
    debug!(stage = %stage, verb = %verb, "Pipeline stage");
}

/// Runs one verb for one resource against a request context.
///
/// The outcome is written into the context: status, result(s), next cursor,
/// or the first error raised.
pub struct Pipeline<'a> {
    handler: &'a dyn ResourceHandler,
    rules: &'a RuleSet,
}

impl<'a> Pipeline<'a> {
    pub fn new(handler: &'a dyn ResourceHandler, rules: &'a RuleSet) -> Self {
        Self { handler, rules }
    }

    /// Runs `verb` with the raw request body. Never panics on bad input; every
    /// failure ends up in `ctx.error()`.
    pub fn run(&self, verb: Verb, ctx: &mut RequestContext, body: &[u8]) {
        let outcome = match verb {
            Verb::Create => self.create(ctx, body),
            Verb::Read => self.read(ctx),
            Verb::ReadList => self.read_list(ctx),
            Verb::Update => self.update(ctx, body),
            Verb::UpdateList => self.update_list(ctx, body),
            Verb::Delete => self.delete(ctx),
        };

        match outcome {
            Ok(()) => enter(Stage::Responding, verb),
            Err(err) => {
                match &err {
                    PipelineError::Handler(_) => warn!(
                        verb = %verb,
                        resource = %self.handler.resource_name(),
                        status = err.status().as_u16(),
                        error = %err,
                        "Handler returned an error"
                    ),
                    _ => debug!(
                        verb = %verb,
                        resource = %self.handler.resource_name(),
                        status = err.status().as_u16(),
                        error = %err,
                        "Request rejected"
                    ),
                }
                ctx.set_error(err);
            }
        }
    }

    fn create(&self, ctx: &mut RequestContext, body: &[u8]) -> Result<(), PipelineError> {
        enter(Stage::Decoding, Verb::Create);
        let payload = decode_object(body)?;
        let version = resolve_version(ctx, Verb::Create);

        enter(Stage::ProjectingInbound, Verb::Create);
        let data = project_inbound(payload, self.rules, &version)?;

        enter(Stage::Invoking, Verb::Create);
        match self.handler.create_resource(ctx, data, &version)? {
            Some(resource) => {
                enter(Stage::ProjectingOutbound, Verb::Create);
                ctx.set_result(self.outbound(resource, &version));
                ctx.set_status(StatusCode::CREATED);
            }
            None => ctx.set_status(StatusCode::NO_CONTENT),
        }
        Ok(())
    }

    fn read(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let version = resolve_version(ctx, Verb::Read);
        let id = ctx.resource_id().unwrap_or_default().to_string();

        enter(Stage::Invoking, Verb::Read);
        let resource = self.handler.read_resource(ctx, &id, &version)?;
        self.respond_single(ctx, resource, &version, Verb::Read);
        Ok(())
    }

    fn read_list(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let version = resolve_version(ctx, Verb::ReadList);
        let limit = ctx.limit();
        let cursor = ctx.cursor().map(str::to_string);

        enter(Stage::Invoking, Verb::ReadList);
        let (items, next) =
            self.handler
                .read_resource_list(ctx, limit, cursor.as_deref(), &version)?;

        enter(Stage::ProjectingOutbound, Verb::ReadList);
        let results = items
            .into_iter()
            .map(|item| self.outbound(item, &version))
            .collect();
        ctx.set_results(results);
        ctx.set_next_cursor(next);
        ctx.set_status(StatusCode::OK);
        Ok(())
    }

    fn update(&self, ctx: &mut RequestContext, body: &[u8]) -> Result<(), PipelineError> {
        enter(Stage::Decoding, Verb::Update);
        let payload = decode_object(body)?;
        let version = resolve_version(ctx, Verb::Update);
        let id = ctx.resource_id().unwrap_or_default().to_string();

        enter(Stage::ProjectingInbound, Verb::Update);
        let data = project_inbound(payload, self.rules, &version)?;

        enter(Stage::Invoking, Verb::Update);
        let resource = self.handler.update_resource(ctx, &id, data, &version)?;
        self.respond_single(ctx, resource, &version, Verb::Update);
        Ok(())
    }

    fn update_list(&self, ctx: &mut RequestContext, body: &[u8]) -> Result<(), PipelineError> {
        enter(Stage::Decoding, Verb::UpdateList);
        let payloads = decode_array(body)?;
        let version = resolve_version(ctx, Verb::UpdateList);

        enter(Stage::ProjectingInbound, Verb::UpdateList);
        let data = payloads
            .into_iter()
            .map(|payload| project_inbound(Some(payload), self.rules, &version))
            .collect::<Result<Vec<_>, _>>()?;

        enter(Stage::Invoking, Verb::UpdateList);
        let items = self.handler.update_resource_list(ctx, data, &version)?;

        enter(Stage::ProjectingOutbound, Verb::UpdateList);
        let results = items
            .into_iter()
            .map(|item| self.outbound(item, &version))
            .collect();
        ctx.set_results(results);
        ctx.set_status(StatusCode::OK);
        Ok(())
    }

    fn delete(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let version = resolve_version(ctx, Verb::Delete);
        let id = ctx.resource_id().unwrap_or_default().to_string();

        enter(Stage::Invoking, Verb::Delete);
        let resource = self.handler.delete_resource(ctx, &id, &version)?;
        self.respond_single(ctx, resource, &version, Verb::Delete);
        Ok(())
    }

    fn respond_single(
        &self,
        ctx: &mut RequestContext,
        resource: Option<Resource>,
        version: &str,
        verb: Verb,
    ) {
        if let Some(resource) = resource {
            enter(Stage::ProjectingOutbound, verb);
            ctx.set_result(self.outbound(resource, version));
        }
        ctx.set_status(StatusCode::OK);
    }

    fn outbound(&self, resource: Resource, version: &str) -> Value {
        project_outbound(resource, self.rules, version).into_value()
    }
}

fn resolve_version(ctx: &RequestContext, verb: Verb) -> String {
    let version = ctx.version().to_string();
    debug!(stage = %Stage::VersionResolved, verb = %verb, version = %version, "Pipeline stage");
    version
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn decode_json(body: &[u8]) -> Result<Option<serde_json::Value>, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Decodes a request body into a payload.
///
/// An empty body or a JSON `null` is no payload at all; any other non-object
/// is rejected.
///
/// # Errors
///
/// [`DecodeError`] on malformed JSON or a non-object document.
pub fn decode_object(body: &[u8]) -> Result<Option<Payload>, DecodeError> {
    match decode_json(body)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => Ok(Some(
            map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        )),
        Some(other) => Err(DecodeError::Shape {
            expected: "object",
            found: json_kind(&other),
        }),
    }
}

/// Decodes a request body into a list of payloads. An empty body is an empty list.
///
/// # Errors
///
/// [`DecodeError`] on malformed JSON, a non-array document, or a non-object element.
pub fn decode_array(body: &[u8]) -> Result<Vec<Payload>, DecodeError> {
    match decode_json(body)? {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(map) => {
                    Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
                }
                other => Err(DecodeError::Shape {
                    expected: "object",
                    found: json_kind(&other),
                }),
            })
            .collect(),
        Some(other) => Err(DecodeError::Shape {
            expected: "array",
            found: json_kind(&other),
        }),
    }
}
