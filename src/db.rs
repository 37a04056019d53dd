use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::CoreError;
use crate::filter::IssueFilter;
use crate::lifecycle::{self, IssueDraft, IssuePatch};
use crate::models::{Coordinates, Issue, IssueType, Location, Priority, Role, Status, User};

const SCHEMA_VERSION: i32 = 1;

/// The issue store. A single open SQLite connection; per-statement atomicity
/// is the only concurrency guarantee, last write wins on updates.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), CoreError> {
        let version: i32 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM pragma_user_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    role TEXT NOT NULL DEFAULT 'citizen',
                    created_at TEXT NOT NULL
                );

                -- Core issues table
                CREATE TABLE IF NOT EXISTS issues (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    reporter_id INTEGER NOT NULL,
                    issue_type TEXT NOT NULL,
                    description TEXT NOT NULL,
                    address TEXT NOT NULL,
                    lat REAL NOT NULL,
                    lng REAL NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    priority TEXT NOT NULL DEFAULT 'medium',
                    department TEXT,
                    assigned_to INTEGER,
                    resolution_notes TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    resolved_at TEXT,
                    FOREIGN KEY (reporter_id) REFERENCES users(id),
                    FOREIGN KEY (assigned_to) REFERENCES users(id)
                );

                -- Photo references (ordered per issue)
                CREATE TABLE IF NOT EXISTS photos (
                    issue_id INTEGER NOT NULL,
                    position INTEGER NOT NULL,
                    reference TEXT NOT NULL,
                    PRIMARY KEY (issue_id, position),
                    FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE
                );

                -- Indexes
                CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
                CREATE INDEX IF NOT EXISTS idx_issues_type ON issues(issue_type);
                CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority);
                CREATE INDEX IF NOT EXISTS idx_issues_reporter ON issues(reporter_id);
                CREATE INDEX IF NOT EXISTS idx_issues_created ON issues(created_at);
                CREATE INDEX IF NOT EXISTS idx_photos_issue ON photos(issue_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        // Enable foreign keys
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(())
    }

    // Issue CRUD

    /// Validates the draft, assigns an id, stamps created_at = updated_at and
    /// applies the pending/medium defaults, then persists issue and photo
    /// references together.
    pub fn create_issue(&self, draft: &IssueDraft) -> Result<Issue, CoreError> {
        lifecycle::validate_draft(draft)?;
        self.get_user(draft.reporter_id)?;

        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let priority = draft.priority.unwrap_or(Priority::Medium);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO issues (reporter_id, issue_type, description, address, lat, lng, status, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?8, ?8)",
            params![
                draft.reporter_id,
                draft.issue_type.as_str(),
                draft.description.trim(),
                draft.location.address.trim(),
                draft.location.coordinates.lat,
                draft.location.coordinates.lng,
                priority.as_str(),
                now_str,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for (position, reference) in draft.photos.iter().enumerate() {
            tx.execute(
                "INSERT INTO photos (issue_id, position, reference) VALUES (?1, ?2, ?3)",
                params![id, position as i64, reference],
            )?;
        }
        tx.commit()?;

        debug!(issue_id = id, issue_type = %draft.issue_type, "created issue");
        self.get_issue(id)
    }

    pub fn get_issue(&self, id: i64) -> Result<Issue, CoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM issues WHERE id = ?1",
            ISSUE_COLUMNS
        ))?;

        let issue = stmt
            .query_row([id], issue_from_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CoreError::issue_not_found(id),
                other => CoreError::Storage(other),
            })?;

        Ok(self.attach_photos(issue)?)
    }

    /// All issues matching the filter, newest first.
    pub fn list_issues(&self, filter: &IssueFilter) -> Result<Vec<Issue>, CoreError> {
        let mut sql = format!("SELECT {} FROM issues", ISSUE_COLUMNS);
        let (conditions, params_vec) = filter.conditions();

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        issues
            .into_iter()
            .map(|issue| self.attach_photos(issue))
            .collect()
    }

    /// Loads the issue, runs the patch through the lifecycle rules and writes
    /// the updated row back. Single UPDATE, last write wins.
    pub fn update_issue(&self, id: i64, patch: &IssuePatch) -> Result<Issue, CoreError> {
        let mut issue = self.get_issue(id)?;

        if let Some(assignee) = patch.assigned_to {
            self.get_user(assignee)?;
        }

        let now = Utc::now();
        lifecycle::apply_patch(&mut issue, patch, now);

        self.conn.execute(
            "UPDATE issues SET status = ?1, priority = ?2, department = ?3, assigned_to = ?4,
             resolution_notes = ?5, updated_at = ?6, resolved_at = ?7 WHERE id = ?8",
            params![
                issue.status.as_str(),
                issue.priority.as_str(),
                issue.department,
                issue.assigned_to,
                issue.resolution_notes,
                issue.updated_at.to_rfc3339(),
                issue.resolved_at.map(|dt| dt.to_rfc3339()),
                id,
            ],
        )?;

        debug!(issue_id = id, status = %issue.status, "updated issue");
        Ok(issue)
    }

    /// Unconditional hard delete; photo references cascade.
    pub fn delete_issue(&self, id: i64) -> Result<(), CoreError> {
        let rows = self.conn.execute("DELETE FROM issues WHERE id = ?1", [id])?;
        if rows == 0 {
            return Err(CoreError::issue_not_found(id));
        }
        debug!(issue_id = id, "deleted issue");
        Ok(())
    }

    fn attach_photos(&self, mut issue: Issue) -> Result<Issue, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT reference FROM photos WHERE issue_id = ?1 ORDER BY position")?;
        issue.photos = stmt
            .query_map([issue.id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(issue)
    }

    // Dashboard aggregation

    pub fn count_issues(&self) -> Result<i64, CoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_issues_with_status(&self, status: Status) -> Result<i64, CoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM issues WHERE status = ?1",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Counts grouped by issue type, only for types present in the data.
    pub fn count_issues_by_type(&self) -> Result<Vec<(IssueType, i64)>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT issue_type, COUNT(*) FROM issues GROUP BY issue_type ORDER BY issue_type",
        )?;
        let counts = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                Ok((parse_stored(0, raw)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    /// Counts grouped by priority, only for priorities present in the data.
    pub fn count_issues_by_priority(&self) -> Result<Vec<(Priority, i64)>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT priority, COUNT(*) FROM issues GROUP BY priority ORDER BY priority",
        )?;
        let counts = stmt
            .query_map([], |row| {
                let raw: String = row.get(0)?;
                Ok((parse_stored(0, raw)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    /// The `limit` most recently created issues, newest first.
    pub fn recent_issues(&self, limit: usize) -> Result<Vec<Issue>, CoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM issues ORDER BY created_at DESC, id DESC LIMIT ?1",
            ISSUE_COLUMNS
        ))?;
        let issues = stmt
            .query_map([limit as i64], issue_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        issues
            .into_iter()
            .map(|issue| self.attach_photos(issue))
            .collect()
    }

    // Users

    pub fn create_user(&self, name: &str, email: &str, role: Role) -> Result<User, CoreError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (name, email, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name.trim(), email.trim(), role.as_str(), now],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(user_id = id, role = %role, "created user");
        self.get_user(id)
    }

    pub fn get_user(&self, id: i64) -> Result<User, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, role, created_at FROM users WHERE id = ?1")?;
        stmt.query_row([id], user_from_row).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CoreError::user_not_found(id),
            other => CoreError::Storage(other),
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, role, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}

const ISSUE_COLUMNS: &str = "id, reporter_id, issue_type, description, address, lat, lng, \
     status, priority, department, assigned_to, resolution_notes, \
     created_at, updated_at, resolved_at";

fn issue_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        reporter_id: row.get(1)?,
        issue_type: parse_stored(2, row.get::<_, String>(2)?)?,
        description: row.get(3)?,
        location: Location {
            address: row.get(4)?,
            coordinates: Coordinates {
                lat: row.get(5)?,
                lng: row.get(6)?,
            },
        },
        photos: Vec::new(),
        status: parse_stored(7, row.get::<_, String>(7)?)?,
        priority: parse_stored(8, row.get::<_, String>(8)?)?,
        department: row.get(9)?,
        assigned_to: row.get(10)?,
        resolution_notes: row.get(11)?,
        created_at: parse_datetime(row.get::<_, String>(12)?),
        updated_at: parse_datetime(row.get::<_, String>(13)?),
        resolved_at: row.get::<_, Option<String>>(14)?.map(parse_datetime),
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: parse_stored(3, row.get::<_, String>(3)?)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

/// Stored enum values are written via `as_str`, so a parse failure here means
/// the database was edited out of band; surface it instead of defaulting.
fn parse_stored<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
