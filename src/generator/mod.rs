//! Generator module - writes every note route as a static HTML file

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{DirectoryNode, MarkdownRenderer, Post, Slug};
use crate::templates::{self, HIGHLIGHT_CSS};
use crate::Notes;

/// What a generation pass produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub pages: usize,
    pub diagnostics: usize,
}

/// Static site generator
pub struct Generator {
    notes: Notes,
    renderer: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(notes: &Notes) -> Self {
        Self {
            notes: notes.clone(),
            renderer: notes.renderer(),
        }
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post], tree: &DirectoryNode) -> Result<GenerateSummary> {
        let public_dir = &self.notes.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        let site_title = &self.notes.config.title;
        let mut summary = GenerateSummary::default();

        for post in posts {
            let rendered = self.renderer.render_with_diagnostics(&post.content);
            for d in &rendered.diagnostics {
                tracing::debug!("{}: {}", post.path, d);
            }
            summary.diagnostics += rendered.diagnostics.len();

            let html = templates::post_page(site_title, post, &rendered.html, tree);
            write_file(&output_path(public_dir, &post.slug), &html)?;
            summary.pages += 1;
        }

        write_file(
            &public_dir.join("404.html"),
            &templates::not_found_page(site_title, tree),
        )?;

        match self.renderer.theme_css() {
            Ok(css) => write_file(&public_dir.join(HIGHLIGHT_CSS), &css)?,
            Err(e) => tracing::warn!("Failed to generate highlight stylesheet: {}", e),
        }

        tracing::info!("Generated {} pages", summary.pages);
        Ok(summary)
    }
}

/// `<public>/<segments>/index.html`; the root index note becomes `<public>/index.html`
pub fn output_path(public_dir: &Path, slug: &Slug) -> PathBuf {
    let mut path = public_dir.to_path_buf();
    if !slug.is_root_index() {
        path.extend(slug.segments());
    }
    path.join("index.html")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let public = Path::new("public");
        let slug: Slug = ["a", "b"].into_iter().collect();
        assert_eq!(output_path(public, &slug), Path::new("public/a/b/index.html"));
        let root: Slug = ["index"].into_iter().collect();
        assert_eq!(output_path(public, &root), Path::new("public/index.html"));
    }

    #[test]
    fn test_generate_writes_routes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.md"), "# Home").unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(
            dir.path().join("js/closures.md"),
            "---\ntitle: Closures\n---\n<script>x()</script>\n\nBody",
        )
        .unwrap();

        let notes = Notes::new(dir.path()).unwrap();
        let indexer = notes.indexer();
        let posts = indexer.list_all_posts();
        let tree = indexer.build_directory_tree();

        let summary = Generator::new(&notes).generate(&posts, &tree).unwrap();
        assert_eq!(summary.pages, 2);
        assert!(summary.diagnostics >= 1);

        let home = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(home.contains("<h1>Home</h1>"));

        let closures = fs::read_to_string(dir.path().join("public/js/closures/index.html")).unwrap();
        assert!(closures.contains("Closures"));
        assert!(!closures.contains("x()"));

        assert!(dir.path().join("public/404.html").exists());
        assert!(dir.path().join("public/highlight.css").exists());
    }
}
