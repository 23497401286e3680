//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Notes;

/// Remove the public directory
pub fn run(notes: &Notes) -> Result<()> {
    if notes.public_dir.exists() {
        fs::remove_dir_all(&notes.public_dir)?;
        tracing::info!("Deleted: {:?}", notes.public_dir);
    }

    Ok(())
}
