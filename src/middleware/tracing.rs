use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::context::RequestContext;
use crate::pipeline::HttpResponse;

/// Logs request arrival and completion. Runs inside the API's `request` span,
/// so every line carries the request id, method and path.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &RequestContext) -> Option<HttpResponse> {
        debug!(version = %ctx.version(), resource_id = ?ctx.resource_id(), "Request received");
        None
    }

    fn after(&self, _ctx: &RequestContext, res: &mut HttpResponse, latency: Duration) {
        info!(
            status = res.status().as_u16(),
            latency_us = latency.as_micros() as u64,
            "Request completed"
        );
    }
}
