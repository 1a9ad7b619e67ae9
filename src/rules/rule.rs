use super::RuleSet;
use crate::coerce::Type;
use crate::resource::TypeDescriptor;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Value hook applied after coercion (inbound) or before emission (outbound).
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Which projections a rule takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Both,
    InputOnly,
    OutputOnly,
}

/// Describes one logical field of a resource.
#[derive(Clone)]
pub struct Rule {
    field: String,
    alias: Option<String>,
    ty: Type,
    required: bool,
    versions: Vec<String>,
    direction: Direction,
    input_transform: Option<Transform>,
    output_transform: Option<Transform>,
    nested: Option<Arc<RuleSet>>,
    owner: Option<Arc<TypeDescriptor>>,
}

impl Rule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
            ty: Type::Unspecified,
            required: false,
            versions: Vec::new(),
            direction: Direction::Both,
            input_transform: None,
            output_transform: None,
            nested: None,
            owner: None,
        }
    }

    /// Wire name, when it differs from the field name.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the rule to the given API versions.
    #[must_use]
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn input_only(self) -> Self {
        self.with_direction(Direction::InputOnly)
    }

    #[must_use]
    pub fn output_only(self) -> Self {
        self.with_direction(Direction::OutputOnly)
    }

    #[must_use]
    pub fn with_input_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.input_transform = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn with_output_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.output_transform = Some(Arc::new(f));
        self
    }

    /// Projects the field's value recursively through `rules`.
    #[must_use]
    pub fn with_nested(mut self, rules: RuleSet) -> Self {
        self.nested = Some(Arc::new(rules));
        self
    }

    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Wire name: the alias if one was given, else the field name.
    #[inline]
    #[must_use]
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn nested(&self) -> Option<&RuleSet> {
        self.nested.as_deref()
    }

    /// Resource type the rule was declared against, once it joined a RuleSet.
    #[must_use]
    pub fn owner(&self) -> Option<&TypeDescriptor> {
        self.owner.as_deref()
    }

    /// True if the rule applies to `version`.
    #[must_use]
    pub fn applies_to(&self, version: &str) -> bool {
        self.versions.is_empty() || self.versions.iter().any(|v| v == version)
    }

    #[inline]
    #[must_use]
    pub fn is_inbound(&self) -> bool {
        self.direction != Direction::OutputOnly
    }

    #[inline]
    #[must_use]
    pub fn is_outbound(&self) -> bool {
        self.direction != Direction::InputOnly
    }

    pub(crate) fn apply_input(&self, value: Value) -> Value {
        match &self.input_transform {
            Some(f) => f(value),
            None => value,
        }
    }

    pub(crate) fn apply_output(&self, value: Value) -> Value {
        match &self.output_transform {
            Some(f) => f(value),
            None => value,
        }
    }

    /// Records the owning type. Only the first call has any effect.
    pub(crate) fn stamp_owner(&mut self, owner: &Arc<TypeDescriptor>) {
        if self.owner.is_none() {
            self.owner = Some(Arc::clone(owner));
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("field", &self.field)
            .field("alias", &self.alias())
            .field("type", &self.ty)
            .field("required", &self.required)
            .field("versions", &self.versions)
            .field("direction", &self.direction)
            .field("input_transform", &self.input_transform.is_some())
            .field("output_transform", &self.output_transform.is_some())
            .field("nested", &self.nested)
            .field("owner", &self.owner.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}
