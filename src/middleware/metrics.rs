use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::context::RequestContext;
use crate::pipeline::HttpResponse;

/// In-process request counters.
///
/// All counters use relaxed atomics; readings are eventually consistent.
#[derive(Debug, Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that reached a route.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx status.
    pub fn client_errors(&self) -> usize {
        self.client_errors.load(Ordering::Relaxed)
    }

    /// Responses with a 5xx status.
    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    /// Mean processing time; zero before the first request.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    // `after` runs for every routed request; `before` may be skipped.
    fn after(&self, _ctx: &RequestContext, res: &mut HttpResponse, latency: Duration) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if res.status().is_client_error() {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if res.status().is_server_error() {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}
