//! Content indexer - walks the content root into posts and a navigation tree

use chrono::{DateTime, Local};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::source::{ContentSource, DirEntry, SourceError};
use super::{DirectoryNode, FileNode, FrontMatter, Post, Slug};

/// Directory and file names never indexed, besides anything starting with `.`
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    "out",
    "build",
    "dist",
    "target",
    "components",
    "lib",
    "public",
    "styles",
    "pages",
    "app",
];

const MARKDOWN_EXT: &str = ".md";

/// Two source files resolving to the same slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub slug: Slug,
    /// Path of the post that is served
    pub kept: String,
    /// Path of the post that is dropped
    pub shadowed: String,
}

struct Scan {
    posts: Vec<Post>,
    collisions: Vec<Collision>,
}

/// Indexes the markdown files under a content root
///
/// Every call re-reads the source; nothing is cached between calls.
pub struct ContentIndexer<S> {
    source: S,
    root: PathBuf,
    exclude: Vec<String>,
}

impl<S: ContentSource> ContentIndexer<S> {
    /// Create an indexer using the default exclusion list
    pub fn new(source: S, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            root: root.into(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Exclude more names on top of the defaults
    pub fn with_exclude<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for name in names.into_iter().map(Into::into) {
            if !self.exclude.contains(&name) {
                self.exclude.push(name);
            }
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All posts, sorted by `path`, one per slug
    pub fn list_all_posts(&self) -> Vec<Post> {
        let scan = self.scan();
        for c in &scan.collisions {
            tracing::warn!(
                "Slug collision on {:?}: {} shadows {}",
                c.slug.joined(),
                c.kept,
                c.shadowed
            );
        }
        scan.posts
    }

    /// Look up a post by exact slug
    pub fn get_post_by_slug(&self, slug: &Slug) -> Option<Post> {
        let wanted = slug.joined();
        self.list_all_posts()
            .into_iter()
            .find(|p| p.slug.joined() == wanted)
    }

    /// Source files dropped because another file owns their slug
    pub fn find_collisions(&self) -> Vec<Collision> {
        self.scan().collisions
    }

    /// Navigation tree mirroring the content root
    ///
    /// Files that lose a slug collision are left out, so every link in the
    /// tree points at the post actually served for it.
    pub fn build_directory_tree(&self) -> DirectoryNode {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut tree = self.build_node(&self.root, name, Vec::new());

        let mut files = tree.all_files();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let shadowed: HashSet<String> =
            collisions_by_slug(&files, |f| (f.slug.joined(), f.is_index()))
                .into_iter()
                .map(|(_, lost)| files[lost].path.clone())
                .collect();

        if !shadowed.is_empty() {
            tracing::debug!("Leaving {} shadowed files out of the tree", shadowed.len());
            tree.retain_files(&|f: &FileNode| !shadowed.contains(&f.path));
        }
        tree
    }

    fn scan(&self) -> Scan {
        let mut posts = Vec::new();
        self.collect_posts(&self.root, &[], &mut posts);
        posts.sort_by(|a, b| a.path.cmp(&b.path));
        resolve_collisions(posts)
    }

    fn collect_posts(&self, dir: &Path, base: &[String], posts: &mut Vec<Post>) {
        for entry in self.entries(dir) {
            let path = dir.join(&entry.name);
            if entry.is_dir() {
                let mut sub = base.to_vec();
                sub.push(entry.name);
                self.collect_posts(&path, &sub, posts);
            } else if let Some(stem) = entry.name.strip_suffix(MARKDOWN_EXT) {
                match self.load_post(&path, base, stem, &entry.name) {
                    Ok(post) => posts.push(post),
                    Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
                }
            }
        }
    }

    /// Load a single post from a file
    fn load_post(
        &self,
        path: &Path,
        base: &[String],
        stem: &str,
        file_name: &str,
    ) -> Result<Post, SourceError> {
        let raw = self.source.read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw);

        let relative = base
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(file_name))
            .collect::<Vec<_>>()
            .join("/");

        let mut post = Post::new(
            Slug::derive(base, stem),
            fm.title.unwrap_or_else(|| stem.to_string()),
            body.to_string(),
            relative,
        );
        post.last_modified = self.source.modified(path).map(DateTime::<Local>::from);

        tracing::debug!("Indexed {} as {:?}", post.path, post.slug.joined());
        Ok(post)
    }

    fn build_node(&self, dir: &Path, name: String, segments: Vec<String>) -> DirectoryNode {
        let mut node = DirectoryNode::new(name, segments);

        for entry in self.entries(dir) {
            let path = dir.join(&entry.name);
            if entry.is_dir() {
                let mut sub = node.path.clone();
                sub.push(entry.name.clone());
                let child = self.build_node(&path, entry.name, sub);
                if !child.is_empty() {
                    node.children.push(child);
                }
            } else if let Some(stem) = entry.name.strip_suffix(MARKDOWN_EXT) {
                let relative = node
                    .path
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(entry.name.as_str()))
                    .collect::<Vec<_>>()
                    .join("/");
                node.files.push(FileNode::new(stem, relative));
            }
        }

        node
    }

    /// Readable, non-excluded entries of `dir`, sorted by name
    fn entries(&self, dir: &Path) -> Vec<DirEntry> {
        let mut entries = match self.source.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory: {}", e);
                return Vec::new();
            }
        };

        entries.retain(|e| !self.is_excluded(&e.name));
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.') || self.exclude.iter().any(|e| e == name)
    }
}

/// Pairs of `(kept, shadowed)` indexes for items sharing a slug
///
/// An `index.md` wins over a plain file with the same slug; otherwise the
/// first path in sort order wins. `items` must already be sorted by path.
fn collisions_by_slug<T>(
    items: &[T],
    key: impl Fn(&T) -> (String, bool),
) -> Vec<(usize, usize)> {
    let mut owners: HashMap<String, (usize, bool)> = HashMap::new();
    let mut pairs = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let (slug, is_index) = key(item);
        match owners.get(&slug).copied() {
            None => {
                owners.insert(slug, (idx, is_index));
            }
            Some((owner, owner_is_index)) => {
                if is_index && !owner_is_index {
                    pairs.push((idx, owner));
                    owners.insert(slug, (idx, is_index));
                } else {
                    pairs.push((owner, idx));
                }
            }
        }
    }

    pairs
}

/// Keep one post per slug, recording the ones dropped
fn resolve_collisions(posts: Vec<Post>) -> Scan {
    let pairs = collisions_by_slug(&posts, |p| (p.slug.joined(), p.is_index()));

    let collisions = pairs
        .iter()
        .map(|&(kept, lost)| Collision {
            slug: posts[lost].slug.clone(),
            kept: posts[kept].path.clone(),
            shadowed: posts[lost].path.clone(),
        })
        .collect();

    let lost: HashSet<usize> = pairs.into_iter().map(|(_, lost)| lost).collect();
    let posts = posts
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !lost.contains(idx))
        .map(|(_, post)| post)
        .collect();

    Scan { posts, collisions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemorySource;
    use std::time::{Duration, SystemTime};

    fn indexer(source: MemorySource) -> ContentIndexer<MemorySource> {
        ContentIndexer::new(source, "notes")
    }

    fn slugs(posts: &[Post]) -> Vec<String> {
        posts.iter().map(|p| p.slug.joined()).collect()
    }

    fn sample() -> MemorySource {
        MemorySource::new()
            .with_file("notes/index.md", "---\ntitle: Home\n---\nWelcome")
            .with_file("notes/js/index.md", "# JavaScript")
            .with_file("notes/js/closures.md", "---\ntitle: Closures\n---\nBody")
            .with_file("notes/js/async/promises.md", "Promises")
            .with_file("notes/js/diagram.png", "binary")
            .with_file("notes/node_modules/pkg/readme.md", "vendored")
            .with_file("notes/.obsidian/workspace.md", "hidden")
            .with_file("notes/.draft.md", "hidden file")
            .with_file("notes/components/Button.md", "app code")
    }

    #[test]
    fn test_lists_markdown_sorted_by_path() {
        let posts = indexer(sample()).list_all_posts();
        let paths: Vec<_> = posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.md",
                "js/async/promises.md",
                "js/closures.md",
                "js/index.md",
            ]
        );
        assert!(paths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_slugs_and_titles() {
        let posts = indexer(sample()).list_all_posts();
        assert_eq!(
            slugs(&posts),
            vec!["index", "js/async/promises", "js/closures", "js"]
        );
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Home", "promises", "Closures", "index"]);
        assert_eq!(posts[2].content, "Body");
    }

    #[test]
    fn test_excluded_and_hidden_entries_skipped() {
        let posts = indexer(sample()).list_all_posts();
        assert!(posts.iter().all(|p| !p.path.starts_with("node_modules")));
        assert!(posts.iter().all(|p| !p.path.contains(".obsidian")));
        assert!(posts.iter().all(|p| p.path != ".draft.md"));
        assert!(posts.iter().all(|p| !p.path.starts_with("components")));
    }

    #[test]
    fn test_custom_exclude_adds_to_defaults() {
        let posts = indexer(sample())
            .with_exclude(["js"])
            .list_all_posts();
        let paths: Vec<_> = posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["index.md"]);
    }

    #[test]
    fn test_repeated_calls_are_deterministic() {
        let idx = indexer(sample());
        assert_eq!(idx.list_all_posts(), idx.list_all_posts());
    }

    #[test]
    fn test_get_post_by_slug_round_trip() {
        let idx = indexer(sample());
        for post in idx.list_all_posts() {
            assert_eq!(idx.get_post_by_slug(&post.slug), Some(post));
        }
    }

    #[test]
    fn test_get_post_by_slug_not_found() {
        let idx = indexer(sample());
        let missing: Slug = ["js", "generators"].into_iter().collect();
        assert_eq!(idx.get_post_by_slug(&missing), None);
        let vendored: Slug = ["node_modules", "pkg", "readme"].into_iter().collect();
        assert_eq!(idx.get_post_by_slug(&vendored), None);
    }

    #[test]
    fn test_last_modified_from_source() {
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let source = MemorySource::new().with_file_modified("notes/a.md", "A", mtime);
        let posts = indexer(source).list_all_posts();
        assert_eq!(posts[0].last_modified, Some(DateTime::<Local>::from(mtime)));
    }

    #[test]
    fn test_unreadable_subtree_is_skipped() {
        let source = MemorySource::new()
            .with_file("notes/a.md", "A")
            .with_file("notes/locked/secret.md", "S")
            .with_file("notes/z/b.md", "B")
            .with_unreadable_dir("notes/locked");

        let idx = indexer(source);
        assert_eq!(slugs(&idx.list_all_posts()), vec!["a", "z/b"]);
        assert!(idx.build_directory_tree().child("locked").is_none());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let idx = ContentIndexer::new(MemorySource::new(), "nowhere");
        assert!(idx.list_all_posts().is_empty());
        assert!(idx.build_directory_tree().is_empty());
    }

    #[test]
    fn test_index_wins_slug_collision() {
        let source = MemorySource::new()
            .with_file("notes/a.md", "plain")
            .with_file("notes/a/index.md", "index");

        let idx = indexer(source);
        let posts = idx.list_all_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].path, "a/index.md");

        let collisions = idx.find_collisions();
        assert_eq!(
            collisions,
            vec![Collision {
                slug: ["a"].into_iter().collect(),
                kept: "a/index.md".to_string(),
                shadowed: "a.md".to_string(),
            }]
        );
    }

    #[test]
    fn test_root_index_wins_over_nested_index_dir() {
        let source = MemorySource::new()
            .with_file("notes/index.md", "root")
            .with_file("notes/index/index.md", "nested");

        let idx = indexer(source);
        let posts = idx.list_all_posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "root");
        assert_eq!(idx.find_collisions()[0].shadowed, "index/index.md");
    }

    #[test]
    fn test_directory_tree() {
        let tree = indexer(sample()).build_directory_tree();
        assert_eq!(tree.name, "notes");
        assert!(tree.path.is_empty());
        assert_eq!(tree.files.len(), 1);
        assert_eq!(tree.files[0].name, "index");

        let js = tree.child("js").unwrap();
        assert_eq!(js.path, vec!["js".to_string()]);
        let names: Vec<_> = js.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["closures", "index"]);
        assert_eq!(js.files[0].path, "js/closures.md");

        let async_dir = js.child("async").unwrap();
        assert_eq!(async_dir.path, vec!["js".to_string(), "async".to_string()]);
        assert_eq!(async_dir.files[0].slug.joined(), "js/async/promises");

        assert!(tree.child("node_modules").is_none());
        assert!(tree.child(".obsidian").is_none());
        assert!(tree.child("components").is_none());
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_directory_tree_omits_shadowed_files() {
        let source = MemorySource::new()
            .with_file("notes/a.md", "plain")
            .with_file("notes/a/index.md", "index")
            .with_file("notes/b.md", "b")
            .with_file("notes/index.md", "root")
            .with_file("notes/index/index.md", "nested");

        let tree = indexer(source).build_directory_tree();
        let names: Vec<_> = tree.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(names, vec!["b.md", "index.md"]);
        assert_eq!(tree.child("a").unwrap().files[0].path, "a/index.md");
        assert!(tree.child("index").is_none());

        let mut slugs: Vec<_> = tree.all_files().iter().map(|f| f.slug.joined()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), tree.file_count());
    }

    #[test]
    fn test_directory_tree_prunes_empty_dirs() {
        let source = MemorySource::new()
            .with_file("notes/a/note.md", "x")
            .with_file("notes/images/logo.png", "png")
            .with_dir("notes/empty")
            .with_dir("notes/nested/deeper");

        let tree = indexer(source).build_directory_tree();
        let names: Vec<_> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
