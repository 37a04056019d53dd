use std::io::{self, Write};

use anyhow::Result;

use crate::db::Database;

pub fn run(db: &Database, id: i64, force: bool) -> Result<()> {
    // Fetch first so the prompt can describe what is being removed.
    let issue = db.get_issue(id)?;

    if !force {
        print!(
            "Delete issue #{} \"{}\"? [y/N] ",
            id,
            super::list::truncate(&issue.description, 40)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_issue(id)?;
    println!("Deleted issue #{}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::lifecycle::IssueDraft;
    use crate::models::{Coordinates, IssueType, Location, Role};
    use tempfile::tempdir;

    fn setup() -> (Database, tempfile::TempDir, i64) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let user = db
            .create_user("Ada", "ada@example.com", Role::Citizen)
            .unwrap();
        let issue = db
            .create_issue(&IssueDraft {
                reporter_id: user.id,
                issue_type: IssueType::Other,
                description: "graffiti".to_string(),
                location: Location {
                    address: "Wall St".to_string(),
                    coordinates: Coordinates { lat: 0.0, lng: 0.0 },
                },
                photos: Vec::new(),
                priority: None,
            })
            .unwrap();
        (db, dir, issue.id)
    }

    #[test]
    fn test_forced_delete_removes_issue() {
        let (db, _dir, id) = setup();
        run(&db, id, true).unwrap();
        assert!(matches!(db.get_issue(id), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing_issue_not_found() {
        let (db, _dir, _) = setup();
        let err = run(&db, 12345, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));
    }
}
