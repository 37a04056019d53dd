use anyhow::Result;

use crate::auth;
use crate::db::Database;
use crate::filter::IssueFilter;

pub fn run(db: &Database, as_user: i64, json: bool) -> Result<()> {
    let caller = auth::resolve_caller(db, as_user)?;
    let filter = IssueFilter::by_reporter(caller.id);

    super::list::run(db, &filter, json)
}
