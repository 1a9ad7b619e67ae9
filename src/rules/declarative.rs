//! Rule files: map-shaped RuleSets declared in YAML or JSON.
//!
//! ```yaml
//! resource: Pet
//! rules:
//!   - field: name
//!     required: true
//!   - field: age
//!     type: int
//!   - field: internal_id
//!     alias: id
//!     direction: output_only
//!   - field: owner
//!     nested:
//!       resource: Owner
//!       rules:
//!         - field: email
//!           required: true
//! ```

use super::{Direction, Rule, RuleSet};
use crate::coerce::Type;
use crate::resource::TypeDescriptor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A RuleSet as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetSpec {
    /// Name of the (map-shaped) resource the rules describe.
    pub resource: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A single rule as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Box<RuleSetSpec>>,
}

impl RuleSpec {
    fn into_rule(self) -> Rule {
        let mut rule = Rule::new(self.field)
            .with_type(self.ty)
            .with_versions(self.versions)
            .with_direction(self.direction);
        if let Some(alias) = self.alias {
            rule = rule.with_alias(alias);
        }
        if self.required {
            rule = rule.required();
        }
        if let Some(nested) = self.nested {
            rule = rule.with_nested(nested.into_rule_set());
        }
        rule
    }
}

impl RuleSetSpec {
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown keys.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("Failed to parse YAML rule file")
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or unknown keys.
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Failed to parse JSON rule file")
    }

    /// Reads a rule file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file {}", path.display()))?;
        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    #[must_use]
    pub fn into_rule_set(self) -> RuleSet {
        RuleSet::new(
            TypeDescriptor::map(self.resource),
            self.rules.into_iter().map(RuleSpec::into_rule),
        )
    }
}

/// Loads and validates a rule file.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or if the RuleSet is invalid.
pub fn load_rule_set(path: &Path) -> Result<RuleSet> {
    let rules = RuleSetSpec::load(path)?.into_rule_set();
    rules
        .validate()
        .with_context(|| format!("Invalid rules in {}", path.display()))?;
    Ok(rules)
}
