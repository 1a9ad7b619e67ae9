use super::{validate, Rule};
use crate::error::RuleSetError;
use crate::resource::TypeDescriptor;
use std::fmt;
use std::sync::Arc;

/// Ordered rules for one resource type.
#[derive(Clone)]
pub struct RuleSet {
    resource: Arc<TypeDescriptor>,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds a RuleSet and records `resource` as the owning type of every rule
    /// that does not have one yet.
    pub fn new<I>(resource: TypeDescriptor, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        let resource = Arc::new(resource);
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                rule.stamp_owner(&resource);
                rule
            })
            .collect();
        Self { resource, rules }
    }

    /// A RuleSet with no rules: projection is a no-op in both directions.
    pub fn empty(resource: TypeDescriptor) -> Self {
        Self::new(resource, [])
    }

    #[inline]
    #[must_use]
    pub fn resource(&self) -> &TypeDescriptor {
        &self.resource
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Rules that take part in inbound projection for `version`, in order.
    #[must_use]
    pub fn inbound(&self, version: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.is_inbound() && r.applies_to(version))
            .collect()
    }

    /// Rules that take part in outbound projection for `version`, in order.
    #[must_use]
    pub fn outbound(&self, version: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.is_outbound() && r.applies_to(version))
            .collect()
    }

    /// Startup structural check. See [`validate`].
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        validate(self)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("resource", &self.resource.name())
            .field("rules", &self.rules)
            .finish()
    }
}
