//! List indexed notes

use anyhow::Result;
use std::io::Write;

use crate::Notes;

/// Print every note with its slug, or the full records as JSON
pub fn run(notes: &Notes, json: bool) -> Result<()> {
    let posts = notes.indexer().list_all_posts();
    let mut out = std::io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &posts)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Notes ({}):", posts.len())?;
    for post in posts {
        let date = post
            .last_modified
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        writeln!(
            out,
            "  {} - {} [{}] -> {}",
            date,
            post.title,
            post.path,
            post.slug.url_path()
        )?;
    }

    Ok(())
}
