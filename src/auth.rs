//! Caller identity and the single capability check. Identity itself is
//! established outside this core; here a caller is just a resolved user id
//! plus role.

use crate::db::Database;
use crate::error::CoreError;
use crate::models::Role;

#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

/// Resolves an already-authenticated user id into a caller. Fails with
/// `NotFound` for an unknown id.
pub fn resolve_caller(db: &Database, user_id: i64) -> Result<Caller, CoreError> {
    let user = db.get_user(user_id)?;
    Ok(Caller {
        id: user.id,
        role: user.role,
    })
}

/// Central role gate for privileged operations.
pub fn require_role(caller: &Caller, role: Role) -> Result<(), CoreError> {
    if caller.role == role {
        Ok(())
    } else {
        Err(CoreError::AccessDenied)
    }
}
