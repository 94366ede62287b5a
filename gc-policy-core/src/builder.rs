//! Policy builder
//!
//! Turns a [`Configuration`] into the policy tree handed to the table admin.

use crate::rules::{self, RuleDocument};
use crate::{resolve_max_age, Configuration, GcPolicyError, PolicyNode};

/// Build the canonical policy for a configuration.
///
/// A non-empty `gc_rules` document takes precedence and the structured fields
/// are ignored. Otherwise the max-age leaf comes first, then the max-version
/// leaf, combined by `mode`. A lone rule without a mode is returned as is.
pub fn build(config: &Configuration) -> Result<PolicyNode, GcPolicyError> {
    if let Some(text) = config.gc_rules() {
        let doc = RuleDocument::parse(text)?;
        let policy = rules::lower(&doc)?;
        tracing::debug!(policy = %policy, "built policy from gc_rules");
        return Ok(policy);
    }

    let max_version = config.max_version.first();
    if config.max_age.is_none() && max_version.is_none() {
        return Ok(PolicyNode::NoPolicy);
    }
    if config.mode.is_none() && config.max_age.is_some() && max_version.is_some() {
        return Err(GcPolicyError::AmbiguousMode);
    }

    let mut children = Vec::with_capacity(2);
    if let Some(block) = &config.max_age {
        let age = resolve_max_age(block.days, block.duration.as_deref())?;
        children.push(PolicyNode::max_age(age));
    }
    if let Some(block) = max_version {
        children.push(PolicyNode::max_versions(block.number));
    }

    let policy = match config.mode {
        Some(mode) => PolicyNode::combine(mode, children),
        None => children.into_iter().next().unwrap_or(PolicyNode::NoPolicy),
    };
    tracing::debug!(policy = %policy, "built policy from structured rules");
    Ok(policy)
}
