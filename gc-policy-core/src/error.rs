//! Error types for the core crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcPolicyError {
    #[error("invalid duration string: {literal:?} ({reason})")]
    InvalidDuration { literal: String, reason: &'static str },

    #[error("malformed gc_rules document: {0}")]
    MalformedRules(#[from] serde_json::Error),

    #[error("malformed gc_rules document: {0}")]
    InvalidRuleDocument(String),

    #[error("invalid max_version value: {0}")]
    InvalidVersion(f64),

    #[error("if multiple policies are set, mode can't be empty")]
    AmbiguousMode,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification handed to callers deciding how to reject a configuration.
///
/// Neither kind is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed duration literal or malformed `gc_rules` text
    Parse,
    /// Ambiguous or conflicting configuration
    Config,
}

impl GcPolicyError {
    pub(crate) fn invalid_duration(literal: &str, reason: &'static str) -> Self {
        Self::InvalidDuration {
            literal: literal.to_string(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDuration { .. }
            | Self::MalformedRules(_)
            | Self::InvalidRuleDocument(_)
            | Self::InvalidVersion(_) => ErrorKind::Parse,
            Self::AmbiguousMode | Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}
