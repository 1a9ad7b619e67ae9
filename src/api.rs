//! # API
//!
//! Registration of resource handlers and per-request dispatch.
//!
//! [`ApiBuilder::build`] validates every RuleSet and compiles every route; a
//! single failure refuses to produce an [`Api`]. The resulting [`Api`] is
//! immutable and can serve requests from any number of threads.
//!
//! ## Request flow
//!
//! 1. resolve the response format (`?format=`, else the configured default);
//!    an unknown format answers 400 in JSON
//! 2. match the route; no match answers 404
//! 3. build the [`RequestContext`]; a bad `limit` on a list read answers 400
//! 4. middleware `before` hooks, which may short-circuit
//! 5. the handler's `authenticate`; failure answers 401 in plain text
//! 6. the [`Pipeline`] for the route's verb
//! 7. render the envelope, then middleware `after` hooks
//!
//! ## Example
//!
//! ```rust
//! use crudrules::api::ApiBuilder;
//! use crudrules::config::ApiConfig;
//! use crudrules::handler::ResourceHandler;
//! use crudrules::resource::{Resource, TypeDescriptor};
//! use crudrules::rules::{Rule, RuleSet};
//! use crudrules::{HandlerError, RequestContext};
//!
//! struct Pets;
//!
//! impl ResourceHandler for Pets {
//!     fn resource_name(&self) -> &str {
//!         "pets"
//!     }
//!
//!     fn rules(&self) -> RuleSet {
//!         RuleSet::new(TypeDescriptor::map("Pet"), [Rule::new("name")])
//!     }
//!
//!     fn read_resource(
//!         &self,
//!         _ctx: &mut RequestContext,
//!         id: &str,
//!         _version: &str,
//!     ) -> Result<Option<Resource>, HandlerError> {
//!         Ok(Some(Resource::Map(crudrules::payload! { "name" => id })))
//!     }
//! }
//!
//! let api = ApiBuilder::new(ApiConfig::default()).register(Pets).build().unwrap();
//! let req = http::Request::get("/api/v1/pets/rex").body(Vec::new()).unwrap();
//! let res = api.handle(req);
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.body().as_slice(), br#"{"result":{"name":"rex"},"success":true}"#);
//! ```

use crate::config::ApiConfig;
use crate::context::{RequestContext, FORMAT_PARAM, LIMIT_PARAM};
use crate::error::{PipelineError, StartupError};
use crate::handler::{ResourceHandler, Verb};
use crate::middleware::Middleware;
use crate::pipeline::{json_error, render, render_context, text, Envelope, HttpResponse, Pipeline};
use crate::router::{RouteMatch, Router};
use crate::rules::RuleSet;
use crate::serializer::{Serializer, SerializerRegistry};
use http::StatusCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

struct Registered {
    handler: Arc<dyn ResourceHandler>,
    rules: RuleSet,
}

/// Collects handlers, serializers and middleware before startup.
pub struct ApiBuilder {
    config: ApiConfig,
    handlers: Vec<Arc<dyn ResourceHandler>>,
    serializers: SerializerRegistry,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ApiBuilder {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            handlers: Vec::new(),
            serializers: SerializerRegistry::default(),
            middlewares: Vec::new(),
        }
    }

    #[must_use]
    pub fn register<H: ResourceHandler>(self, handler: H) -> Self {
        self.register_arc(Arc::new(handler))
    }

    #[must_use]
    pub fn register_arc(mut self, handler: Arc<dyn ResourceHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Adds (or replaces) the serializer for `format`.
    #[must_use]
    pub fn serializer(mut self, format: impl Into<String>, serializer: Arc<dyn Serializer>) -> Self {
        self.serializers.register(format, serializer);
        self
    }

    /// Appends a middleware; hooks run in registration order.
    #[must_use]
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Validates every RuleSet and compiles every route.
    ///
    /// # Errors
    ///
    /// - [`StartupError::DuplicateResource`] when two handlers share a name
    /// - [`StartupError::InvalidRules`] for the first invalid RuleSet
    /// - [`StartupError::InvalidRoute`] for the first malformed URI template
    /// - [`StartupError::UnknownDefaultFormat`] when the default format has no serializer
    pub fn build(self) -> Result<Api, StartupError> {
        if !self.serializers.contains(&self.config.default_format) {
            let err = StartupError::UnknownDefaultFormat(self.config.default_format.clone());
            error!(error = %err, "Refusing to start");
            return Err(err);
        }

        let mut router = Router::new(self.config.base_path.as_str());
        let mut resources: Vec<Registered> = Vec::with_capacity(self.handlers.len());

        for handler in self.handlers {
            let name = handler.resource_name().to_string();
            if resources
                .iter()
                .any(|r| r.handler.resource_name() == name)
            {
                let err = StartupError::DuplicateResource(name);
                error!(error = %err, "Refusing to start");
                return Err(err);
            }

            let rules = handler.rules();
            if let Err(source) = rules.validate() {
                let err = StartupError::InvalidRules {
                    resource: name,
                    source,
                };
                error!(error = %err, "Refusing to start");
                return Err(err);
            }

            let index = resources.len();
            for verb in Verb::ALL {
                let template = handler.uri(verb);
                router
                    .add(verb.method(), &template, (index, verb))
                    .map_err(|source| {
                        let err = StartupError::InvalidRoute {
                            resource: name.clone(),
                            source,
                        };
                        error!(error = %err, "Refusing to start");
                        err
                    })?;
            }
            info!(resource = %name, rules = rules.len(), "Resource registered");
            resources.push(Registered { handler, rules });
        }

        router.log_routes();
        Ok(Api {
            config: self.config,
            resources,
            router,
            serializers: self.serializers,
            middlewares: self.middlewares,
        })
    }
}

/// A validated, immutable set of resources ready to serve requests.
pub struct Api {
    config: ApiConfig,
    resources: Vec<Registered>,
    router: Router<(usize, Verb)>,
    serializers: SerializerRegistry,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Api {
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Registered routes as `(method, template, verb)`.
    #[must_use]
    pub fn routes(&self) -> Vec<(http::Method, String, Verb)> {
        self.router
            .routes()
            .iter()
            .map(|r| (r.method().clone(), r.template().to_string(), r.target().1))
            .collect()
    }

    /// Serves one request.
    pub fn handle(&self, req: http::Request<Vec<u8>>) -> HttpResponse {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();
        let query: Vec<(String, String)> = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let format = query
            .iter()
            .rfind(|(k, _)| k == FORMAT_PARAM)
            .map(|(_, v)| v.as_str())
            .unwrap_or(self.config.default_format.as_str());
        let serializer = match self.serializers.get(format) {
            Ok(s) => s,
            Err(err) => {
                debug!(method = %parts.method, path = %path, error = %err, "Unknown response format");
                return json_error(StatusCode::BAD_REQUEST, err.to_string());
            }
        };

        let Some(RouteMatch {
            route,
            path_params,
        }) = self.router.route(&parts.method, &path)
        else {
            let err = PipelineError::RouteNotFound {
                method: parts.method.to_string(),
                path,
            };
            return render(err.status(), Envelope::error(err.to_string()), serializer.as_ref());
        };
        let (index, verb) = *route.target();
        let resource = &self.resources[index];

        // Only list reads paginate; other verbs ignore `limit`.
        let limit = if verb == Verb::ReadList {
            match parse_limit(&query, &self.config) {
                Ok(limit) => limit,
                Err(err) => {
                    return render(err.status(), Envelope::error(err.to_string()), serializer.as_ref())
                }
            }
        } else {
            self.config.default_limit.min(self.config.max_limit)
        };
        let mut ctx =
            RequestContext::new(parts.method, path, query, parts.headers, path_params, limit);

        let span = info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            resource = %resource.handler.resource_name(),
            verb = %verb,
        );
        let _entered = span.enter();

        let mut response = self.dispatch(resource, verb, &mut ctx, &body, serializer.as_ref());
        let latency = started.elapsed();
        for mw in &self.middlewares {
            mw.after(&ctx, &mut response, latency);
        }
        response
    }

    fn dispatch(
        &self,
        resource: &Registered,
        verb: Verb,
        ctx: &mut RequestContext,
        body: &[u8],
        serializer: &dyn Serializer,
    ) -> HttpResponse {
        for mw in &self.middlewares {
            if let Some(response) = mw.before(ctx) {
                return response;
            }
        }

        if let Err(err) = resource.handler.authenticate(ctx) {
            warn!(error = %err, "Authentication failed");
            return text(StatusCode::UNAUTHORIZED, err.to_string());
        }

        Pipeline::new(resource.handler.as_ref(), &resource.rules).run(verb, ctx, body);
        render_context(ctx, serializer)
    }
}

/// `limit` from the query: default when absent, clamped to `max_limit`.
fn parse_limit(query: &[(String, String)], config: &ApiConfig) -> Result<usize, PipelineError> {
    let Some((_, raw)) = query.iter().rfind(|(k, _)| k == LIMIT_PARAM) else {
        return Ok(config.default_limit.min(config.max_limit));
    };
    let limit: usize = raw.trim().parse().map_err(|_| PipelineError::Query {
        name: LIMIT_PARAM,
        reason: format!("'{raw}' is not a non-negative integer"),
    })?;
    Ok(limit.min(config.max_limit))
}
