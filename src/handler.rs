//! # Resource Handlers
//!
//! The business-logic seam. A [`ResourceHandler`] owns one resource name, one
//! RuleSet and up to six verb callbacks. Verbs it does not override answer
//! `501 Not Implemented`.
//!
//! ## Verbs and Routes
//!
//! | Verb | Method | Default URI |
//! |---|---|---|
//! | [`Verb::Create`] | `POST` | `/api/v{version}/{name}` |
//! | [`Verb::ReadList`] | `GET` | `/api/v{version}/{name}` |
//! | [`Verb::UpdateList`] | `PUT` | `/api/v{version}/{name}` |
//! | [`Verb::Read`] | `GET` | `/api/v{version}/{name}/{resource_id}` |
//! | [`Verb::Update`] | `PUT` | `/api/v{version}/{name}/{resource_id}` |
//! | [`Verb::Delete`] | `DELETE` | `/api/v{version}/{name}/{resource_id}` |
//!
//! Any URI can be overridden per verb; `{version}` and `{resource_id}` are the
//! route variables the pipeline reads.
//!
//! ## Example
//!
//! ```rust
//! use crudrules::handler::ResourceHandler;
//! use crudrules::resource::{Resource, TypeDescriptor};
//! use crudrules::rules::{Rule, RuleSet};
//! use crudrules::{HandlerError, Payload, RequestContext};
//!
//! struct Echo;
//!
//! impl ResourceHandler for Echo {
//!     fn resource_name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn rules(&self) -> RuleSet {
//!         RuleSet::new(TypeDescriptor::map("Echo"), [Rule::new("msg").required()])
//!     }
//!
//!     fn create_resource(
//!         &self,
//!         _ctx: &mut RequestContext,
//!         data: Payload,
//!         _version: &str,
//!     ) -> Result<Option<Resource>, HandlerError> {
//!         Ok(Some(Resource::Map(data)))
//!     }
//! }
//! ```

use crate::context::RequestContext;
use crate::error::{AuthError, HandlerError};
use crate::resource::Resource;
use crate::rules::RuleSet;
use crate::value::Payload;
use http::Method;
use std::fmt::{Display, Formatter};

/// The six CRUD verbs a resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Read,
    ReadList,
    Update,
    UpdateList,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Create,
        Verb::ReadList,
        Verb::UpdateList,
        Verb::Read,
        Verb::Update,
        Verb::Delete,
    ];

    /// HTTP method the verb is bound to.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Verb::Create => Method::POST,
            Verb::Read | Verb::ReadList => Method::GET,
            Verb::Update | Verb::UpdateList => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Whether the verb addresses the collection rather than a single item.
    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(self, Verb::Create | Verb::ReadList | Verb::UpdateList)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::ReadList => "read_list",
            Verb::Update => "update",
            Verb::UpdateList => "update_list",
            Verb::Delete => "delete",
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Business logic for one resource.
///
/// Implementations are shared across concurrent requests and must not keep
/// per-request state outside the [`RequestContext`].
pub trait ResourceHandler: Send + Sync + 'static {
    /// Resource name used in the default URIs.
    fn resource_name(&self) -> &str;

    /// Rules for this resource. Called once at registration and validated.
    fn rules(&self) -> RuleSet;

    fn collection_uri(&self) -> String {
        format!("/api/v{{version}}/{}", self.resource_name())
    }

    fn item_uri(&self) -> String {
        format!("/api/v{{version}}/{}/{{resource_id}}", self.resource_name())
    }

    /// URI template for `verb`. Defaults to the collection or item URI.
    fn uri(&self, verb: Verb) -> String {
        if verb.is_collection() {
            self.collection_uri()
        } else {
            self.item_uri()
        }
    }

    /// Runs before the pipeline. An error becomes a `401` with the error's
    /// text as a plain-text body.
    fn authenticate(&self, _ctx: &RequestContext) -> Result<(), AuthError> {
        Ok(())
    }

    fn create_resource(
        &self,
        _ctx: &mut RequestContext,
        _data: Payload,
        _version: &str,
    ) -> Result<Option<Resource>, HandlerError> {
        Err(HandlerError::not_implemented())
    }

    fn read_resource(
        &self,
        _ctx: &mut RequestContext,
        _id: &str,
        _version: &str,
    ) -> Result<Option<Resource>, HandlerError> {
        Err(HandlerError::not_implemented())
    }

    /// Returns one page of resources and the cursor of the following page.
    fn read_resource_list(
        &self,
        _ctx: &mut RequestContext,
        _limit: usize,
        _cursor: Option<&str>,
        _version: &str,
    ) -> Result<(Vec<Resource>, Option<String>), HandlerError> {
        Err(HandlerError::not_implemented())
    }

    fn update_resource(
        &self,
        _ctx: &mut RequestContext,
        _id: &str,
        _data: Payload,
        _version: &str,
    ) -> Result<Option<Resource>, HandlerError> {
        Err(HandlerError::not_implemented())
    }

    fn update_resource_list(
        &self,
        _ctx: &mut RequestContext,
        _data: Vec<Payload>,
        _version: &str,
    ) -> Result<Vec<Resource>, HandlerError> {
        Err(HandlerError::not_implemented())
    }

    fn delete_resource(
        &self,
        _ctx: &mut RequestContext,
        _id: &str,
        _version: &str,
    ) -> Result<Option<Resource>, HandlerError> {
        Err(HandlerError::not_implemented())
    }
}
