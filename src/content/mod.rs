//! Content module - indexing notes and rendering markdown

mod frontmatter;
pub mod indexer;
mod markdown;
mod post;
pub mod sanitize;
pub mod source;
mod tree;

pub use frontmatter::FrontMatter;
pub use indexer::{Collision, ContentIndexer, DEFAULT_EXCLUDES};
pub use markdown::{Diagnostic, MarkdownRenderer, Rendered, DEFAULT_THEME};
pub use post::{Post, Slug};
pub use sanitize::SanitizePolicy;
pub use source::{ContentSource, DiskSource, MemorySource, SourceError};
pub use tree::{DirectoryNode, FileNode};
