//! Post and Slug models

use chrono::{DateTime, Local};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters escaped when a slug segment is put into a URL path
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Name of the file that stands in for its directory
pub const INDEX_STEM: &str = "index";

/// Ordered URL path segments identifying a note
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(Vec<String>);

impl Slug {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Derive the slug of `<base>/<stem>.md`
    ///
    /// `index` files collapse onto their directory; a root-level
    /// `index.md` keeps the single segment `index`.
    pub fn derive(base: &[String], stem: &str) -> Self {
        if stem == INDEX_STEM {
            if base.is_empty() {
                Self(vec![INDEX_STEM.to_string()])
            } else {
                Self(base.to_vec())
            }
        } else {
            let mut segments = base.to_vec();
            segments.push(stem.to_string());
            Self(segments)
        }
    }

    /// Slug of a `/`-separated path relative to the content root
    pub fn from_relative_path(path: &str) -> Self {
        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let file = segments.pop().unwrap_or_default();
        let stem = file.strip_suffix(".md").unwrap_or(&file);
        Self::derive(&segments, stem)
    }

    /// Map a request path such as `/03.%20JavaScript/closures/` to a slug
    ///
    /// The site root resolves to the root `index` note.
    pub fn from_url_path(path: &str) -> Self {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();

        if segments.is_empty() {
            Self(vec![INDEX_STEM.to_string()])
        } else {
            Self(segments)
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root_index(&self) -> bool {
        self.0.len() == 1 && self.0[0] == INDEX_STEM
    }

    /// Segments joined with `/`
    pub fn joined(&self) -> String {
        self.0.join("/")
    }

    /// Percent-encoded URL path with a trailing slash
    pub fn url_path(&self) -> String {
        if self.is_root_index() {
            return "/".to_string();
        }
        let mut url = String::new();
        for segment in &self.0 {
            url.push('/');
            url.extend(utf8_percent_encode(segment, SEGMENT));
        }
        url.push('/');
        url
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl<S: Into<String>> FromIterator<S> for Slug {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A note read from the content root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Routing identifier
    pub slug: Slug,

    /// Front-matter title, or the file stem
    pub title: String,

    /// Raw markdown content, front-matter stripped
    pub content: String,

    /// Source file path relative to the content root, `/`-separated
    pub path: String,

    /// File modification time
    pub last_modified: Option<DateTime<Local>>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(slug: Slug, title: String, content: String, path: String) -> Self {
        Self {
            slug,
            title,
            content,
            path,
            last_modified: None,
        }
    }

    /// Whether the source file is an `index.md`
    pub fn is_index(&self) -> bool {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.strip_suffix(".md") == Some(INDEX_STEM)
    }
}
