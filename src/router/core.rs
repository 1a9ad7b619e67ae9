use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Maximum number of path parameters stored inline before spilling to the heap.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path parameters extracted from a match. Names are shared with the route table.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A URI template that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid route template '{template}': {reason}")]
pub struct RouteTemplateError {
    pub template: String,
    pub reason: String,
}

/// One compiled route.
#[derive(Debug, Clone)]
pub struct Route<T> {
    method: Method,
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    target: T,
}

impl<T> Route<T> {
    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Template including the base path.
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }
}

/// Result of matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a, T> {
    pub route: &'a Route<T>,
    /// Path parameters extracted from the URL (e.g., `{resource_id}` -> `"42"`)
    pub path_params: ParamVec,
}

impl<T> RouteMatch<'_, T> {
    /// Path parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Regex router over URI templates.
///
/// Routes are tried in registration order; the first one whose method and
/// pattern both match wins.
#[derive(Debug, Clone)]
pub struct Router<T> {
    routes: Vec<Route<T>>,
    base_path: String,
}

impl<T> Router<T> {
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            routes: Vec::new(),
            base_path,
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Compiles `template` (prefixed with the base path) and appends the route.
    ///
    /// # Errors
    ///
    /// Fails on unbalanced braces, empty or duplicate parameter names.
    pub fn add(
        &mut self,
        method: Method,
        template: &str,
        target: T,
    ) -> Result<(), RouteTemplateError> {
        let full = format!("{}{}", self.base_path, template);
        let (regex, param_names) = path_to_regex(&full)?;
        debug!(method = %method, template = %full, params = ?param_names, "Route registered");
        self.routes.push(Route {
            method,
            template: full,
            regex,
            param_names,
            target,
        });
        Ok(())
    }

    #[must_use]
    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Logs the routing table once at startup.
    pub fn log_routes(&self) {
        let summary: Vec<String> = self
            .routes
            .iter()
            .map(|r| format!("{} {}", r.method, r.template))
            .collect();
        info!(
            routes_count = self.routes.len(),
            base_path = %self.base_path,
            routes = ?summary,
            "Routing table loaded"
        );
    }

    /// Matches `method` and `path` (without query string) to a route.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        for route in &self.routes {
            if route.method != *method {
                continue;
            }
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (i, name) in route.param_names.iter().enumerate() {
                if let Some(m) = caps.get(i + 1) {
                    path_params.push((Arc::clone(name), m.as_str().to_string()));
                }
            }
            debug!(
                method = %method,
                path = %path,
                route_pattern = %route.template,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch { route, path_params });
        }

        debug!(method = %method, path = %path, "No route matched");
        None
    }
}

/// Converts a URI template to an anchored regex and its ordered parameter names.
///
/// `{name}` may appear anywhere inside a segment, so `/api/v{version}/pets`
/// compiles to `^/api/v([^/]+)/pets$`. Literal text is escaped. Trailing and
/// repeated slashes in the template are ignored.
///
/// # Errors
///
/// Fails on unbalanced braces, empty or duplicate parameter names.
pub fn path_to_regex(path: &str) -> Result<(Regex, Vec<Arc<str>>), RouteTemplateError> {
    let fail = |reason: &str| RouteTemplateError {
        template: path.to_string(),
        reason: reason.to_string(),
    };

    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut param_names: Vec<Arc<str>> = Vec::with_capacity(path.matches('{').count());

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        pattern.push('/');
        let mut rest = segment;
        while let Some(open) = rest.find('{') {
            let (literal, tail) = rest.split_at(open);
            if literal.contains('}') {
                return Err(fail("unexpected '}'"));
            }
            pattern.push_str(&regex::escape(literal));
            let close = tail.find('}').ok_or_else(|| fail("unclosed '{'"))?;
            let name = &tail[1..close];
            if name.is_empty() || name.contains('{') {
                return Err(fail("empty or malformed parameter name"));
            }
            if param_names.iter().any(|n| n.as_ref() == name) {
                return Err(fail("duplicate parameter name"));
            }
            param_names.push(Arc::from(name));
            pattern.push_str("([^/]+)");
            rest = &tail[close + 1..];
        }
        if rest.contains('}') {
            return Err(fail("unexpected '}'"));
        }
        pattern.push_str(&regex::escape(rest));
    }

    if param_names.is_empty() && pattern.len() == 1 {
        pattern.push('/');
    }
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|e| fail(&e.to_string()))?;
    Ok((regex, param_names))
}
