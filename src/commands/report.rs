use std::path::PathBuf;

use anyhow::Result;

use crate::auth;
use crate::blob::{self, BlobStore};
use crate::db::Database;
use crate::lifecycle::{self, IssueDraft};
use crate::models::{Coordinates, IssueType, Location, Priority};

#[allow(clippy::too_many_arguments)]
pub fn run(
    db: &Database,
    blobs: &dyn BlobStore,
    as_user: i64,
    issue_type: IssueType,
    description: &str,
    address: &str,
    lat: f64,
    lng: f64,
    priority: Option<Priority>,
    photos: &[PathBuf],
) -> Result<()> {
    let caller = auth::resolve_caller(db, as_user)?;

    // Draft fields and the upload batch are both checked in full before any
    // photo is handed to the store, so a failing create leaves no blobs behind.
    let mut draft = IssueDraft {
        reporter_id: caller.id,
        issue_type,
        description: description.to_string(),
        location: Location {
            address: address.to_string(),
            coordinates: Coordinates { lat, lng },
        },
        photos: Vec::new(),
        priority,
    };
    lifecycle::validate_draft(&draft)?;
    blob::check_uploads(photos)?;

    draft.photos = photos
        .iter()
        .map(|path| blobs.store(path))
        .collect::<Result<Vec<String>>>()?;

    let issue = db.create_issue(&draft)?;
    println!(
        "Reported issue #{} ({}, {} priority)",
        issue.id, issue.issue_type, issue.priority
    );
    for reference in &issue.photos {
        println!("  photo: {}", reference);
    }
    Ok(())
}
