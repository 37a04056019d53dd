use anyhow::Result;

use crate::auth;
use crate::db::Database;
use crate::models::Role;

pub fn add(db: &Database, name: &str, email: &str, role: Role) -> Result<()> {
    let user = db.create_user(name, email, role)?;
    println!("Added {} user #{} ({})", user.role, user.id, user.email);
    Ok(())
}

/// The acting user's own record. Any authenticated caller may read it.
pub fn show(db: &Database, as_user: i64, json: bool) -> Result<()> {
    let caller = auth::resolve_caller(db, as_user)?;
    let user = db.get_user(caller.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!("User #{}", user.id);
    println!("  Name:   {}", user.name);
    println!("  Email:  {}", user.email);
    println!("  Role:   {}", user.role);
    println!("  Since:  {}", user.created_at.to_rfc3339());
    Ok(())
}

/// Admin-only aggregate listing.
pub fn list(db: &Database, as_user: i64, json: bool) -> Result<()> {
    let caller = auth::resolve_caller(db, as_user)?;
    auth::require_role(&caller, Role::Admin)?;

    let users = db.list_users()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    for user in &users {
        println!("#{:<4} {:8} {:<24} {}", user.id, user.role, user.name, user.email);
    }

    Ok(())
}
