//! notes-rs: a small static site generator for a tree of Markdown notes
//!
//! The core is the ingestion pipeline in [`content`]: walk the content
//! root into [`content::Post`]s and a navigation tree, then render each
//! note's markdown to sanitized HTML. Everything else (commands, the static
//! generator, the dev server) is a thin page layer on top of it.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentIndexer, DiskSource, MarkdownRenderer, SanitizePolicy};

/// A notes site rooted at a base directory
#[derive(Debug, Clone)]
pub struct Notes {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content root
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Notes {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Indexer over the content root on disk, excluding the configured names
    /// as well as the built-in ones
    pub fn indexer(&self) -> ContentIndexer<DiskSource> {
        let mut exclude = self.config.exclude.clone();

        // Never index our own output
        if let Some(name) = self
            .public_dir
            .strip_prefix(&self.content_dir)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
        {
            if !exclude.contains(&name) {
                exclude.push(name);
            }
        }

        ContentIndexer::new(DiskSource, &self.content_dir).with_exclude(exclude)
    }

    /// Renderer configured from the site config
    pub fn renderer(&self) -> MarkdownRenderer {
        let policy = self
            .config
            .sanitize
            .allow_tags
            .iter()
            .fold(SanitizePolicy::default(), |policy, (tag, attrs)| {
                let attrs: Vec<&str> = attrs.iter().map(String::as_str).collect();
                policy.allow_tag(tag, &attrs)
            });

        MarkdownRenderer::with_options(&self.config.highlight.theme, self.config.highlight.enable)
            .with_policy(policy)
    }

    /// Write every route to the public directory
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let notes = Notes::new(dir.path()).unwrap();
        assert_eq!(notes.config.title, "Notes");
        assert_eq!(notes.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_output_dir_inside_content_is_not_indexed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "content_dir: notes\npublic_dir: notes/_site\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("notes/_site")).unwrap();
        fs::write(dir.path().join("notes/a.md"), "# A").unwrap();
        fs::write(dir.path().join("notes/_site/stale.md"), "# Stale").unwrap();

        let notes = Notes::new(dir.path()).unwrap();
        let posts = notes.indexer().list_all_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "a.md");
    }

    #[test]
    fn test_configured_exclude_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "exclude: [drafts]\n").unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::write(dir.path().join("node_modules/pkg/README.md"), "vendored").unwrap();
        fs::write(dir.path().join("drafts/wip.md"), "wip").unwrap();

        let notes = Notes::new(dir.path()).unwrap();
        let paths: Vec<_> = notes
            .indexer()
            .list_all_posts()
            .into_iter()
            .map(|p| p.path)
            .collect();
        assert_eq!(paths, vec!["a.md"]);
    }

    #[test]
    fn test_renderer_refuses_script_from_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "sanitize:\n  allow_tags:\n    script: []\n",
        )
        .unwrap();

        let notes = Notes::new(dir.path()).unwrap();
        let html = notes.renderer().render_to_html("<script>alert(1)</script>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn test_renderer_honours_extra_tags() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "sanitize:\n  allow_tags:\n    video: [src]\n",
        )
        .unwrap();

        let notes = Notes::new(dir.path()).unwrap();
        let html = notes
            .renderer()
            .render_to_html(r#"<video src="clip.mp4" onplay="x()"></video>"#);
        assert!(html.contains(r#"<video src="clip.mp4">"#));
    }
}
