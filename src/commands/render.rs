//! Render a single note to HTML

use anyhow::{bail, Result};

use crate::content::Slug;
use crate::Notes;

/// Print the sanitized HTML body of the note at `slug` (`a/b` form)
pub fn run(notes: &Notes, slug: &str) -> Result<()> {
    let slug = Slug::from_url_path(slug);

    let Some(post) = notes.indexer().get_post_by_slug(&slug) else {
        bail!("No note found for slug: {}", slug);
    };

    let rendered = notes.renderer().render_with_diagnostics(&post.content);
    for d in &rendered.diagnostics {
        tracing::warn!("{}: {}", post.path, d);
    }

    print!("{}", rendered.html);
    Ok(())
}
