use rusqlite::ToSql;

use crate::models::{IssueType, Priority, Status};

/// Optional equality criteria for listing issues. Each supplied criterion
/// narrows the result set; an empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub issue_type: Option<IssueType>,
    pub priority: Option<Priority>,
    pub reporter_id: Option<i64>,
}

impl IssueFilter {
    pub fn by_reporter(reporter_id: i64) -> Self {
        IssueFilter {
            reporter_id: Some(reporter_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.issue_type.is_none()
            && self.priority.is_none()
            && self.reporter_id.is_none()
    }

    /// SQL conjuncts and their parameters, in a fixed column order.
    /// Placeholders are positional starting at `?1`.
    pub fn conditions(&self) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = self.status {
            params.push(Box::new(status.as_str()));
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(issue_type) = self.issue_type {
            params.push(Box::new(issue_type.as_str()));
            conditions.push(format!("issue_type = ?{}", params.len()));
        }
        if let Some(priority) = self.priority {
            params.push(Box::new(priority.as_str()));
            conditions.push(format!("priority = ?{}", params.len()));
        }
        if let Some(reporter_id) = self.reporter_id {
            params.push(Box::new(reporter_id));
            conditions.push(format!("reporter_id = ?{}", params.len()));
        }

        (conditions, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_conditions() {
        let filter = IssueFilter::default();
        assert!(filter.is_empty());
        let (conditions, params) = filter.conditions();
        assert!(conditions.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_single_criterion() {
        let filter = IssueFilter {
            status: Some(Status::Pending),
            ..Default::default()
        };
        let (conditions, params) = filter.conditions();
        assert_eq!(conditions, vec!["status = ?1"]);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_all_criteria_numbered_in_order() {
        let filter = IssueFilter {
            status: Some(Status::Resolved),
            issue_type: Some(IssueType::Water),
            priority: Some(Priority::High),
            reporter_id: Some(42),
        };
        let (conditions, params) = filter.conditions();
        assert_eq!(
            conditions,
            vec![
                "status = ?1",
                "issue_type = ?2",
                "priority = ?3",
                "reporter_id = ?4"
            ]
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_by_reporter_only_constrains_reporter() {
        let filter = IssueFilter::by_reporter(9);
        let (conditions, _) = filter.conditions();
        assert_eq!(conditions, vec!["reporter_id = ?1"]);
    }
}
