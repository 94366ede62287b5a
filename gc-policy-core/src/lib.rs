//! Garbage-collection policies for wide-column tables
//!
//! This crate turns a column family's GC configuration, either structured
//! max-age/max-version rules or a serialized rule document, into one canonical
//! [`PolicyNode`] tree, and decides when a `max_age` edit is only a change of
//! representation.

pub mod builder;
pub mod duration;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod rules;
pub mod validate;

pub use builder::build;
pub use duration::{format_duration, parse_duration, resolve_max_age, AgeThreshold};
pub use error::{ErrorKind, GcPolicyError};
pub use models::*;
pub use normalizer::{
    customize_diff, days_to_duration_migration, FieldChange, MaxAgeDiff, MaxAgeField,
    PendingMaxAgeChange,
};
pub use rules::{gc_rules_equivalent, lower, normalize_gc_rules, RuleDocument};
pub use validate::validate;
