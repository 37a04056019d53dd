//! Lifecycle rules for issues: draft validation on create and patch
//! application on update. This is the only place that may set `resolved_at`.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, FieldError};
use crate::models::{Issue, IssueType, Location, Priority, Status};

/// Maximum number of photo references per issue.
pub const MAX_PHOTOS: usize = 5;

/// A citizen submission, before the store has assigned id and timestamps.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub reporter_id: i64,
    pub issue_type: IssueType,
    pub description: String,
    pub location: Location,
    pub photos: Vec<String>,
    pub priority: Option<Priority>,
}

/// Partial update to an issue's workflow fields. Absent fields are left
/// unchanged, not cleared. Reporter and created_at are not reachable here.
#[derive(Debug, Clone, Default)]
pub struct IssuePatch {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub department: Option<String>,
    pub assigned_to: Option<i64>,
    pub resolution_notes: Option<String>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.priority.is_none()
            && self.department.is_none()
            && self.assigned_to.is_none()
            && self.resolution_notes.is_none()
    }
}

/// Checks every required field and reports all failures together.
pub fn validate_draft(draft: &IssueDraft) -> Result<(), CoreError> {
    let mut errors = Vec::new();

    if draft.description.trim().is_empty() {
        errors.push(FieldError::new("description", "is required"));
    }
    if draft.location.address.trim().is_empty() {
        errors.push(FieldError::new("location.address", "is required"));
    }
    if !draft.location.coordinates.lat.is_finite() {
        errors.push(FieldError::new(
            "location.coordinates.lat",
            "must be a valid number",
        ));
    }
    if !draft.location.coordinates.lng.is_finite() {
        errors.push(FieldError::new(
            "location.coordinates.lng",
            "must be a valid number",
        ));
    }
    if draft.photos.len() > MAX_PHOTOS {
        errors.push(FieldError::new(
            "photos",
            format!("at most {} photos are allowed", MAX_PHOTOS),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

/// Applies the patch in place and stamps `updated_at`. When the new status is
/// resolved or closed and `resolved_at` is still unset, it is stamped with the
/// same instant; a later resolved/closed update keeps the original value, and
/// moving back out of resolved/closed never clears it.
pub fn apply_patch(issue: &mut Issue, patch: &IssuePatch, now: DateTime<Utc>) {
    if let Some(status) = patch.status {
        issue.status = status;
        if status.marks_resolution() && issue.resolved_at.is_none() {
            issue.resolved_at = Some(now);
        }
    }
    if let Some(priority) = patch.priority {
        issue.priority = priority;
    }
    if let Some(department) = &patch.department {
        issue.department = Some(department.trim().to_string());
    }
    if let Some(assigned_to) = patch.assigned_to {
        issue.assigned_to = Some(assigned_to);
    }
    if let Some(notes) = &patch.resolution_notes {
        issue.resolution_notes = Some(notes.trim().to_string());
    }
    issue.updated_at = now;
}
