use std::time::Duration;

use crate::context::RequestContext;
use crate::pipeline::HttpResponse;

/// Hooks around every routed request.
///
/// `before` runs after routing and before authentication; returning a response
/// short-circuits the request. `after` runs on every response the API produces
/// for a routed request, including short-circuited ones.
pub trait Middleware: Send + Sync {
    fn before(&self, _ctx: &RequestContext) -> Option<HttpResponse> {
        None
    }
    fn after(&self, _ctx: &RequestContext, _res: &mut HttpResponse, _latency: Duration) {}
}
