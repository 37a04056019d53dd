use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::Database;

pub fn run(base_dir: &Path) -> Result<()> {
    let data_dir = base_dir.join(".civictrack");

    if data_dir.exists() {
        println!("civictrack already initialized at {}", data_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&data_dir).context("Failed to create .civictrack directory")?;
    fs::create_dir_all(data_dir.join("uploads")).context("Failed to create uploads directory")?;

    let db_path = data_dir.join("issues.db");
    Database::open(&db_path).context("Failed to initialize database")?;

    println!("Initialized civictrack in {}", data_dir.display());
    println!("Register users with 'civictrack user add', then report issues.");
    Ok(())
}
