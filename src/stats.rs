//! Dashboard statistics. Every call recomputes from the current store state;
//! the dashboard is read-mostly and the issue volume is small, so no caching.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::CoreError;
use crate::models::{Issue, IssueType, Priority, Status};

/// Number of issues shown in the dashboard's recent-activity list.
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub issue_type: IssueType,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_issues: i64,
    /// All four statuses, fixed order, zero counts included.
    pub issues_by_status: Vec<StatusCount>,
    /// Only types present in the data.
    pub issues_by_type: Vec<TypeCount>,
    /// Only priorities present in the data.
    pub issues_by_priority: Vec<PriorityCount>,
    /// The 10 most recently created issues, newest first.
    pub recent_issues: Vec<Issue>,
}

pub fn gather(db: &Database) -> Result<DashboardStats, CoreError> {
    let total_issues = db.count_issues()?;

    let mut issues_by_status = Vec::with_capacity(Status::ALL.len());
    for status in Status::ALL {
        issues_by_status.push(StatusCount {
            status,
            count: db.count_issues_with_status(status)?,
        });
    }

    let issues_by_type = db
        .count_issues_by_type()?
        .into_iter()
        .map(|(issue_type, count)| TypeCount { issue_type, count })
        .collect();

    let issues_by_priority = db
        .count_issues_by_priority()?
        .into_iter()
        .map(|(priority, count)| PriorityCount { priority, count })
        .collect();

    let recent_issues = db.recent_issues(RECENT_LIMIT)?;

    Ok(DashboardStats {
        total_issues,
        issues_by_status,
        issues_by_type,
        issues_by_priority,
        recent_issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IssueFilter;
    use crate::lifecycle::{IssueDraft, IssuePatch};
    use crate::models::{Coordinates, Location, Role};
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn draft(reporter_id: i64, issue_type: IssueType, priority: Priority) -> IssueDraft {
        IssueDraft {
            reporter_id,
            issue_type,
            description: "something broken".to_string(),
            location: Location {
                address: "Main St".to_string(),
                coordinates: Coordinates { lat: 1.0, lng: 2.0 },
            },
            photos: Vec::new(),
            priority: Some(priority),
        }
    }

    #[test]
    fn test_empty_store_zero_fills_statuses() {
        let (db, _dir) = setup_test_db();
        let stats = gather(&db).unwrap();

        assert_eq!(stats.total_issues, 0);
        assert_eq!(stats.issues_by_status.len(), 4);
        assert!(stats.issues_by_status.iter().all(|c| c.count == 0));
        assert!(stats.issues_by_type.is_empty());
        assert!(stats.issues_by_priority.is_empty());
        assert!(stats.recent_issues.is_empty());
    }

    #[test]
    fn test_status_breakdown_order_is_fixed() {
        let (db, _dir) = setup_test_db();
        let stats = gather(&db).unwrap();
        let order: Vec<Status> = stats.issues_by_status.iter().map(|c| c.status).collect();
        assert_eq!(order, Status::ALL.to_vec());
    }

    #[test]
    fn test_grouped_counts_skip_absent_values() {
        let (db, _dir) = setup_test_db();
        let user = db
            .create_user("Ada", "ada@example.com", Role::Citizen)
            .unwrap();
        db.create_issue(&draft(user.id, IssueType::Water, Priority::High))
            .unwrap();
        db.create_issue(&draft(user.id, IssueType::Water, Priority::Low))
            .unwrap();

        let stats = gather(&db).unwrap();
        assert_eq!(stats.issues_by_type.len(), 1);
        assert_eq!(stats.issues_by_type[0].issue_type, IssueType::Water);
        assert_eq!(stats.issues_by_type[0].count, 2);
        assert_eq!(stats.issues_by_priority.len(), 2);
    }

    #[test]
    fn test_recent_is_prefix_of_full_listing() {
        let (db, _dir) = setup_test_db();
        let user = db
            .create_user("Ada", "ada@example.com", Role::Citizen)
            .unwrap();
        for _ in 0..13 {
            db.create_issue(&draft(user.id, IssueType::Other, Priority::Medium))
                .unwrap();
        }

        let stats = gather(&db).unwrap();
        assert_eq!(stats.recent_issues.len(), RECENT_LIMIT);

        let all = db.list_issues(&IssueFilter::default()).unwrap();
        for (recent, listed) in stats.recent_issues.iter().zip(all.iter()) {
            assert_eq!(recent.id, listed.id);
        }
    }

    #[test]
    fn test_stats_reflect_status_changes() {
        let (db, _dir) = setup_test_db();
        let user = db
            .create_user("Ada", "ada@example.com", Role::Citizen)
            .unwrap();
        let issue = db
            .create_issue(&draft(user.id, IssueType::Safety, Priority::Urgent))
            .unwrap();
        db.update_issue(
            issue.id,
            &IssuePatch {
                status: Some(Status::Resolved),
                ..Default::default()
            },
        )
        .unwrap();

        let stats = gather(&db).unwrap();
        let resolved = stats
            .issues_by_status
            .iter()
            .find(|c| c.status == Status::Resolved)
            .unwrap();
        assert_eq!(resolved.count, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Total always equals the sum of the per-status counts.
        #[test]
        fn prop_total_equals_status_sum(
            picks in proptest::collection::vec(0usize..4, 0..20)
        ) {
            let (db, _dir) = setup_test_db();
            let user = db
                .create_user("Ada", "ada@example.com", Role::Citizen)
                .unwrap();

            for pick in &picks {
                let issue = db
                    .create_issue(&draft(user.id, IssueType::Other, Priority::Medium))
                    .unwrap();
                let status = Status::ALL[*pick];
                if status != Status::Pending {
                    db.update_issue(
                        issue.id,
                        &IssuePatch { status: Some(status), ..Default::default() },
                    )
                    .unwrap();
                }
            }

            let stats = gather(&db).unwrap();
            let sum: i64 = stats.issues_by_status.iter().map(|c| c.count).sum();
            prop_assert_eq!(stats.total_issues, sum);
            prop_assert_eq!(stats.total_issues, picks.len() as i64);
        }
    }
}
