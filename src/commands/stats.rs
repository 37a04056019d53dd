use anyhow::Result;

use crate::db::Database;
use crate::stats;

pub fn run(db: &Database, json: bool) -> Result<()> {
    let dashboard = stats::gather(db)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!("Total issues: {}", dashboard.total_issues);

    println!("\nBy status:");
    for entry in &dashboard.issues_by_status {
        println!("  {:12} {}", entry.status, entry.count);
    }

    if !dashboard.issues_by_type.is_empty() {
        println!("\nBy type:");
        for entry in &dashboard.issues_by_type {
            println!("  {:12} {}", entry.issue_type, entry.count);
        }
    }

    if !dashboard.issues_by_priority.is_empty() {
        println!("\nBy priority:");
        for entry in &dashboard.issues_by_priority {
            println!("  {:12} {}", entry.priority, entry.count);
        }
    }

    if !dashboard.recent_issues.is_empty() {
        println!("\nRecent issues:");
        for issue in &dashboard.recent_issues {
            super::list::print_row(issue);
        }
    }

    Ok(())
}
