use anyhow::{bail, Result};

use crate::db::Database;
use crate::lifecycle::IssuePatch;

pub fn run(db: &Database, id: i64, patch: &IssuePatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to update. Use --status, --priority, --department, --assign, or --notes");
    }

    let issue = db.update_issue(id, patch)?;
    println!("Updated issue #{} [{}]", issue.id, issue.status);
    if let Some(resolved_at) = issue.resolved_at {
        println!("  resolved at {}", resolved_at.to_rfc3339());
    }

    Ok(())
}
