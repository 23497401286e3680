//! Write every route to the public directory

use anyhow::Result;

use crate::generator::Generator;
use crate::Notes;

/// Index the content root and generate the static site
pub fn run(notes: &Notes) -> Result<()> {
    let start = std::time::Instant::now();

    let indexer = notes.indexer();
    let posts = indexer.list_all_posts();
    let tree = indexer.build_directory_tree();
    tracing::info!("Indexed {} notes", posts.len());

    let summary = Generator::new(notes).generate(&posts, &tree)?;
    if summary.diagnostics > 0 {
        tracing::info!(
            "{} rendering warnings, run `check` for details",
            summary.diagnostics
        );
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
