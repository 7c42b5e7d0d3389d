//! Sibling ordering rules for curriculum collections.
//!
//! Sections within a course, lessons within a section, and content blocks
//! within a lesson each carry a `sort_order` integer. Appends assign
//! `max + 1` (0 for an empty group), a reorder rewrites the whole group
//! densely from 0, and deletions leave gaps that readers tolerate. The
//! repositories own the SQL; this module owns the request validation
//! shared by all three collections.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Validate a reorder request against the current sibling ids.
///
/// The request must name exactly the current siblings, once each:
/// duplicates are a validation error; missing or foreign ids are a
/// conflict and reject the whole call.
pub fn validate_reorder(current: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Duplicate id in reorder request: {id}"
            )));
        }
    }

    let current_set: HashSet<DbId> = current.iter().copied().collect();
    let matched = requested
        .iter()
        .filter(|id| current_set.contains(id))
        .count();
    if requested.len() != current.len() || matched != current.len() {
        return Err(CoreError::Conflict(format!(
            "Reorder request names {matched} of {} current items ({} requested); \
             the id set must match exactly",
            current.len(),
            requested.len()
        )));
    }

    Ok(())
}
