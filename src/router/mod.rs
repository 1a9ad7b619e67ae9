//! # Router Module
//!
//! Path matching for resource URIs.
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: when a resource is registered, each verb's URI template
//!    (e.g. `/api/v{version}/pets/{resource_id}`) is converted into an anchored
//!    regex that captures the route variables.
//!
//! 2. **Matching**: for each incoming request, the router tests the method and
//!    path against the compiled routes in registration order and returns the
//!    first match with its extracted parameters.
//!
//! ## Example
//!
//! ```rust
//! use crudrules::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new("");
//! router.add(Method::GET, "/api/v{version}/pets/{resource_id}", "read").unwrap();
//!
//! let m = router.route(&Method::GET, "/api/v2/pets/7").unwrap();
//! assert_eq!(*m.route.target(), "read");
//! assert_eq!(m.get_path_param("version"), Some("2"));
//! assert_eq!(m.get_path_param("resource_id"), Some("7"));
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{path_to_regex, ParamVec, Route, RouteMatch, RouteTemplateError, Router};
