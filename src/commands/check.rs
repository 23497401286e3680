//! Report slug collisions and rendering diagnostics

use anyhow::Result;

use crate::content::{Collision, Diagnostic};
use crate::Notes;

/// Everything `check` found
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub collisions: Vec<Collision>,
    /// Note path with the diagnostics its rendering produced
    pub diagnostics: Vec<(String, Vec<Diagnostic>)>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty() && self.diagnostics.is_empty()
    }
}

/// Index and render every note, collecting problems
pub fn collect(notes: &Notes) -> Report {
    let indexer = notes.indexer();
    let renderer = notes.renderer();

    let diagnostics = indexer
        .list_all_posts()
        .into_iter()
        .filter_map(|post| {
            let rendered = renderer.render_with_diagnostics(&post.content);
            (!rendered.diagnostics.is_empty()).then_some((post.path, rendered.diagnostics))
        })
        .collect();

    Report {
        collisions: indexer.find_collisions(),
        diagnostics,
    }
}

/// Print the check report
pub fn run(notes: &Notes) -> Result<()> {
    let report = collect(notes);

    if report.is_clean() {
        println!("No problems found.");
        return Ok(());
    }

    if !report.collisions.is_empty() {
        println!("Slug collisions ({}):", report.collisions.len());
        for c in &report.collisions {
            println!("  {}: {} shadows {}", c.slug, c.kept, c.shadowed);
        }
    }

    for (path, diagnostics) in &report.diagnostics {
        println!("{}:", path);
        for d in diagnostics {
            println!("  {}", d);
        }
    }

    Ok(())
}
