//! Change detection for the `max_age` block
//!
//! `max_age.days` is deprecated in favour of `max_age.duration`. Moving a
//! configuration from `days = 7` to `duration = "168h"` describes the same
//! threshold, so that one transition must not show up as a pending change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AgeThreshold, GcPolicyError};

/// Sub-field of the `max_age` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxAgeField {
    Days,
    Duration,
}

/// Before and after values of one tracked field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub old: T,
    pub new: T,
}

impl<T> FieldChange<T> {
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }
}

/// Sub-fields to drop from the pending change set when a days value is
/// rewritten as an equal duration literal.
///
/// Only the days→duration direction is recognized: the old state must have no
/// duration recorded and the new configuration must introduce one. Every other
/// edit is reported unchanged (an empty result).
pub fn days_to_duration_migration(
    days: &FieldChange<u32>,
    duration: &FieldChange<String>,
) -> Result<Vec<MaxAgeField>, GcPolicyError> {
    if !duration.old.is_empty() || duration.new.is_empty() {
        return Ok(Vec::new());
    }

    let introduced: AgeThreshold = duration.new.parse()?;
    if introduced == AgeThreshold::from_days(days.old) {
        Ok(vec![MaxAgeField::Days, MaxAgeField::Duration])
    } else {
        Ok(Vec::new())
    }
}

/// Pending change set as seen by the change-detection host
pub trait MaxAgeDiff {
    /// Number of `max_age` blocks in the new configuration
    fn max_age_count(&self) -> usize;

    fn days_change(&self) -> FieldChange<u32>;

    fn duration_change(&self) -> FieldChange<String>;

    /// Drop a sub-field from the pending change set
    fn clear(&mut self, field: MaxAgeField) -> Result<(), GcPolicyError>;
}

/// Customize a pending diff before planning: clears both `max_age` sub-fields
/// when the days→duration migration leaves the threshold unchanged.
pub fn customize_diff<D: MaxAgeDiff + ?Sized>(diff: &mut D) -> Result<(), GcPolicyError> {
    if diff.max_age_count() != 1 {
        return Ok(());
    }

    let days = diff.days_change();
    let duration = diff.duration_change();
    tracing::debug!(old = days.old, new = days.new, "max_age.days");
    tracing::debug!(old = %duration.old, new = %duration.new, "max_age.duration");

    for field in days_to_duration_migration(&days, &duration)? {
        diff.clear(field)?;
    }
    Ok(())
}

/// In-memory pending change for a single resource's `max_age` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMaxAgeChange {
    pub max_age_count: usize,
    pub days: FieldChange<u32>,
    pub duration: FieldChange<String>,
    #[serde(default)]
    pub cleared: BTreeSet<MaxAgeField>,
}

impl PendingMaxAgeChange {
    pub fn new(days: FieldChange<u32>, duration: FieldChange<String>) -> Self {
        Self {
            max_age_count: 1,
            days,
            duration,
            cleared: BTreeSet::new(),
        }
    }

    /// Whether a field still differs after clearing
    pub fn has_change(&self, field: MaxAgeField) -> bool {
        if self.cleared.contains(&field) {
            return false;
        }
        match field {
            MaxAgeField::Days => self.days.old != self.days.new,
            MaxAgeField::Duration => self.duration.old != self.duration.new,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.has_change(MaxAgeField::Days) || self.has_change(MaxAgeField::Duration)
    }
}

impl MaxAgeDiff for PendingMaxAgeChange {
    fn max_age_count(&self) -> usize {
        self.max_age_count
    }

    fn days_change(&self) -> FieldChange<u32> {
        self.days.clone()
    }

    fn duration_change(&self) -> FieldChange<String> {
        self.duration.clone()
    }

    fn clear(&mut self, field: MaxAgeField) -> Result<(), GcPolicyError> {
        self.cleared.insert(field);
        Ok(())
    }
}
