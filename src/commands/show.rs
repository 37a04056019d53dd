use anyhow::Result;

use crate::db::Database;

pub fn run(db: &Database, id: i64, json: bool) -> Result<()> {
    let issue = db.get_issue(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&issue)?);
        return Ok(());
    }

    println!("Issue #{}", issue.id);
    println!("  Type:        {}", issue.issue_type);
    println!("  Status:      {}", issue.status);
    println!("  Priority:    {}", issue.priority);
    println!("  Reporter:    user #{}", issue.reporter_id);
    println!("  Description: {}", issue.description);
    println!(
        "  Location:    {} ({}, {})",
        issue.location.address, issue.location.coordinates.lat, issue.location.coordinates.lng
    );
    if let Some(department) = &issue.department {
        println!("  Department:  {}", department);
    }
    if let Some(assignee) = issue.assigned_to {
        println!("  Assigned to: user #{}", assignee);
    }
    if let Some(notes) = &issue.resolution_notes {
        println!("  Resolution:  {}", notes);
    }
    for reference in &issue.photos {
        println!("  Photo:       {}", reference);
    }
    println!("  Created:     {}", issue.created_at.to_rfc3339());
    println!("  Updated:     {}", issue.updated_at.to_rfc3339());
    if let Some(resolved_at) = issue.resolved_at {
        println!("  Resolved:    {}", resolved_at.to_rfc3339());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::lifecycle::IssueDraft;
    use crate::models::{Coordinates, IssueType, Location, Role};
    use tempfile::tempdir;

    #[test]
    fn test_show_missing_issue_fails() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();

        let err = run(&db, 42, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_show_existing_issue() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let user = db
            .create_user("Ada", "ada@example.com", Role::Citizen)
            .unwrap();
        let issue = db
            .create_issue(&IssueDraft {
                reporter_id: user.id,
                issue_type: IssueType::Safety,
                description: "broken streetlight".to_string(),
                location: Location {
                    address: "5th Ave".to_string(),
                    coordinates: Coordinates { lat: 0.5, lng: 0.7 },
                },
                photos: Vec::new(),
                priority: None,
            })
            .unwrap();

        assert!(run(&db, issue.id, false).is_ok());
        assert!(run(&db, issue.id, true).is_ok());
    }
}
