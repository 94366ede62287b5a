//! Serialized rule documents (`gc_rules`)
//!
//! A rule document is the JSON form of a policy tree:
//!
//! ```json
//! {"mode": "union", "rules": [{"max_age": "168h"}, {"max_version": 3}]}
//! ```
//!
//! It stays loosely typed (strings and numbers) until [`lower`] turns it into a
//! [`PolicyNode`], so malformed input is rejected at that single boundary.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{AgeThreshold, GcPolicyError, PolicyNode};

const MODE_UNION: &str = "union";
const MODE_INTERSECTION: &str = "intersection";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleDocument>>,
    /// Lower-case `union` or `intersection`; any other token means "no mode"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_version: Option<f64>,
}

impl RuleDocument {
    /// Parse `gc_rules` text. A top-level `null` is an empty document.
    pub fn parse(text: &str) -> Result<Self, GcPolicyError> {
        match serde_json::from_str(text)? {
            Value::Null => Ok(Self::default()),
            Value::Object(fields) => Self::from_object(&fields),
            other => Err(invalid_shape("document", &other)),
        }
    }

    // Every level must be a JSON object; null fields count as absent.
    fn from_object(fields: &Map<String, Value>) -> Result<Self, GcPolicyError> {
        let rules = match fields.get("rules") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => Self::from_object(fields),
                        other => Err(invalid_shape("rules element", other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(other) => return Err(invalid_shape("rules", other)),
        };

        // Any non-null mode marks a nested document; only the two lower-case
        // tokens select a combinator.
        let mode = match fields.get("mode") {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) => Some(token.clone()),
            Some(other) => Some(other.to_string()),
        };

        let max_age = match fields.get("max_age") {
            None | Some(Value::Null) => None,
            Some(Value::String(literal)) => Some(literal.clone()),
            Some(other) => return Err(invalid_shape("max_age", other)),
        };

        let max_version = match fields.get("max_version") {
            None | Some(Value::Null) => None,
            Some(Value::Number(number)) => number.as_f64(),
            Some(other) => return Err(invalid_shape("max_version", other)),
        };

        Ok(Self {
            rules,
            mode,
            max_age,
            max_version,
        })
    }
}

fn invalid_shape(field: &str, value: &Value) -> GcPolicyError {
    let expected = match field {
        "rules" => "an array",
        "max_age" => "a string",
        "max_version" => "a number",
        _ => "an object",
    };
    GcPolicyError::InvalidRuleDocument(format!("{} must be {}, got {}", field, expected, value))
}

/// Lower a rule document into a policy tree.
///
/// Each element of `rules` contributes its `max_age` and `max_version` leaves,
/// and, when it carries a `mode`, the lowered element itself. Nested results
/// that lower to `NoPolicy` are dropped rather than merged into a combinator.
pub fn lower(doc: &RuleDocument) -> Result<PolicyNode, GcPolicyError> {
    let Some(rules) = &doc.rules else {
        return Ok(PolicyNode::NoPolicy);
    };

    let mut children = Vec::new();
    for rule in rules {
        if let Some(literal) = &rule.max_age {
            let age: AgeThreshold = literal.parse()?;
            children.push(PolicyNode::max_age(age));
        }

        if let Some(number) = rule.max_version {
            children.push(PolicyNode::max_versions(version_count(number)?));
        }

        if rule.mode.is_some() {
            let nested = lower(rule)?;
            if !nested.is_no_policy() {
                children.push(nested);
            }
        }
    }

    match doc.mode.as_deref() {
        Some(MODE_UNION) => Ok(PolicyNode::union(children)),
        Some(MODE_INTERSECTION) => Ok(PolicyNode::intersection(children)),
        // Known quirk: without a mode only the first collected rule survives and
        // its siblings are dropped. Existing documents rely on this, so it stays.
        _ => Ok(children.into_iter().next().unwrap_or(PolicyNode::NoPolicy)),
    }
}

// Numbers arrive as JSON floats and are truncated toward zero.
fn version_count(number: f64) -> Result<u32, GcPolicyError> {
    if !number.is_finite() || number < 0.0 || number > f64::from(u32::MAX) {
        return Err(GcPolicyError::InvalidVersion(number));
    }
    Ok(number.trunc() as u32)
}

/// Canonical text stored for a `gc_rules` value: keys sorted, no whitespace.
pub fn normalize_gc_rules(text: &str) -> Result<String, GcPolicyError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(value.to_string())
}

/// Whether a change from `old` to `new` rule text is only cosmetic.
///
/// Documents are compared structurally with numbers compared by value, so
/// `1` and `1.0` match. If either side does not parse the change is treated as
/// cosmetic; validation rejects malformed text before it gets this far.
pub fn gc_rules_equivalent(old: &str, new: &str) -> bool {
    let (Ok(old), Ok(new)) = (
        serde_json::from_str::<Value>(old),
        serde_json::from_str::<Value>(new),
    ) else {
        return true;
    };
    json_eq(&old, &new)
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}
