//! Navigation tree of the content root

use serde::Serialize;

use super::Slug;

/// A directory holding notes, directly or further down
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    /// Segments from the content root to this directory
    pub path: Vec<String>,
    pub children: Vec<DirectoryNode>,
    pub files: Vec<FileNode>,
}

/// A markdown file leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
    /// File name with the extension stripped
    pub name: String,
    /// Path relative to the content root, `/`-separated
    pub path: String,
    pub slug: Slug,
}

impl DirectoryNode {
    pub fn new(name: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path,
            children: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.files.is_empty()
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(|c| c.file_count()).sum::<usize>()
    }

    /// Find a descendant directory by name
    pub fn child(&self, name: &str) -> Option<&DirectoryNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Every file in this subtree, depth first
    pub fn all_files(&self) -> Vec<&FileNode> {
        let mut files: Vec<&FileNode> = self.files.iter().collect();
        for child in &self.children {
            files.extend(child.all_files());
        }
        files
    }

    /// Keep only the files matching `keep`, dropping directories left empty
    pub fn retain_files<F: Fn(&FileNode) -> bool>(&mut self, keep: &F) {
        self.files.retain(|f| keep(f));
        for child in &mut self.children {
            child.retain_files(keep);
        }
        self.children.retain(|c| !c.is_empty());
    }
}

impl FileNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let slug = Slug::from_relative_path(&path);
        Self {
            name: name.into(),
            path,
            slug,
        }
    }

    pub fn is_index(&self) -> bool {
        self.name == "index"
    }
}
