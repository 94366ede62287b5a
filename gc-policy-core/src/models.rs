//! Core domain models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AgeThreshold;

/// How a combinator merges its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GcMode {
    /// Collect a cell when any child rule matches
    Union,
    /// Collect a cell only when every child rule matches
    Intersection,
}

impl GcMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GcMode::Union => "UNION",
            GcMode::Intersection => "INTERSECTION",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            GcMode::Union => " || ",
            GcMode::Intersection => " && ",
        }
    }
}

impl fmt::Display for GcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of most-recent versions kept before older ones become collectable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionThreshold(pub u32);

/// Canonical garbage-collection policy tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyNode {
    /// Nothing is ever collected
    NoPolicy,
    MaxAge(AgeThreshold),
    MaxVersions(VersionThreshold),
    Combinator {
        mode: GcMode,
        children: Vec<PolicyNode>,
    },
}

impl PolicyNode {
    pub fn max_age(age: AgeThreshold) -> Self {
        PolicyNode::MaxAge(age)
    }

    pub fn max_versions(number: u32) -> Self {
        PolicyNode::MaxVersions(VersionThreshold(number))
    }

    pub fn combine(mode: GcMode, children: Vec<PolicyNode>) -> Self {
        PolicyNode::Combinator { mode, children }
    }

    pub fn union(children: Vec<PolicyNode>) -> Self {
        Self::combine(GcMode::Union, children)
    }

    pub fn intersection(children: Vec<PolicyNode>) -> Self {
        Self::combine(GcMode::Intersection, children)
    }

    pub fn is_no_policy(&self) -> bool {
        matches!(self, PolicyNode::NoPolicy)
    }
}

/// Renders the textual form the table admin reports for a column family,
/// e.g. `(age() > 168h0m0s || versions() > 3)`. `NoPolicy` renders empty.
impl fmt::Display for PolicyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyNode::NoPolicy => Ok(()),
            PolicyNode::MaxAge(age) => write!(f, "age() > {}", age),
            PolicyNode::MaxVersions(VersionThreshold(n)) => write!(f, "versions() > {}", n),
            PolicyNode::Combinator { mode, children } => {
                let rendered: Vec<String> = children
                    .iter()
                    .map(ToString::to_string)
                    .filter(|s| !s.is_empty())
                    .collect();
                write!(f, "({})", rendered.join(mode.separator()))
            }
        }
    }
}

/// Structured age rule. Exactly one of the two fields is meant to carry data;
/// `days` is the deprecated form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxAgeBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl MaxAgeBlock {
    pub fn days(days: u32) -> Self {
        Self {
            days: Some(days),
            duration: None,
        }
    }

    pub fn duration(literal: impl Into<String>) -> Self {
        Self {
            days: None,
            duration: Some(literal.into()),
        }
    }
}

/// Structured version rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxVersionBlock {
    pub number: u32,
}

/// Resource-level GC configuration for one column family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Required when both a max-age and a max-version rule are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GcMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<MaxAgeBlock>,
    /// Only the first block is used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max_version: Vec<MaxVersionBlock>,
    /// Serialized rule document; conflicts with every other field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_rules: Option<String>,
}

impl Configuration {
    /// The rule document text, treating an empty string as absent
    pub fn gc_rules(&self) -> Option<&str> {
        self.gc_rules.as_deref().filter(|s| !s.is_empty())
    }
}
