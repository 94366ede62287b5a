//! Configuration checks run before a policy is built

use crate::{parse_duration, Configuration, GcPolicyError, RuleDocument};

/// Reject configurations the builder would otherwise silently reinterpret.
///
/// `gc_rules` excludes every structured field, must be a JSON object (or
/// `null`) at every level, and a `max_age`
/// block carries exactly one of `days` or `duration`.
pub fn validate(config: &Configuration) -> Result<(), GcPolicyError> {
    if let Some(text) = config.gc_rules() {
        let conflicts: Vec<&str> = [
            ("mode", config.mode.is_some()),
            ("max_age", config.max_age.is_some()),
            ("max_version", !config.max_version.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();
        if !conflicts.is_empty() {
            return Err(GcPolicyError::InvalidConfig(format!(
                "\"gc_rules\" conflicts with {}",
                conflicts.join(", ")
            )));
        }
        RuleDocument::parse(text)?;
    }

    if let Some(block) = &config.max_age {
        let duration = block.duration.as_deref().filter(|s| !s.is_empty());
        match (block.days, duration) {
            (Some(_), Some(_)) => {
                return Err(GcPolicyError::InvalidConfig(
                    "only one of max_age.days, max_age.duration can be specified".to_string(),
                ))
            }
            (None, None) => {
                return Err(GcPolicyError::InvalidConfig(
                    "one of max_age.days, max_age.duration must be specified".to_string(),
                ))
            }
            (None, Some(literal)) => {
                parse_duration(literal)?;
            }
            (Some(_), None) => {}
        }
    }

    Ok(())
}
