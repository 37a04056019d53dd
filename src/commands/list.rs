use anyhow::Result;

use crate::db::Database;
use crate::filter::IssueFilter;
use crate::models::Issue;

pub fn run(db: &Database, filter: &IssueFilter, json: bool) -> Result<()> {
    let issues = db.list_issues(filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    if issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    for issue in &issues {
        print_row(issue);
    }

    Ok(())
}

pub(crate) fn print_row(issue: &Issue) {
    let status_display = format!("[{}]", issue.status);
    let date = issue.created_at.format("%Y-%m-%d");
    println!(
        "#{:<4} {:13} {:10} {:<40} {:8} {}",
        issue.id,
        status_display,
        issue.issue_type,
        truncate(&issue.description, 40),
        issue.priority,
        date
    );
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
