//! Print the navigation tree

use anyhow::Result;
use std::io::Write;

use crate::content::DirectoryNode;
use crate::Notes;

/// Print the content tree as an outline, or as JSON
pub fn run(notes: &Notes, json: bool) -> Result<()> {
    let tree = notes.indexer().build_directory_tree();
    let mut out = std::io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &tree)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", outline(&tree))?;
    }

    Ok(())
}

/// Indented outline, directories suffixed with `/`
pub fn outline(tree: &DirectoryNode) -> String {
    let mut text = format!("{}/ ({} notes)\n", tree.name, tree.file_count());
    push_children(&mut text, tree, 1);
    text
}

fn push_children(text: &mut String, dir: &DirectoryNode, depth: usize) {
    let indent = "  ".repeat(depth);
    for child in &dir.children {
        text.push_str(&format!("{}{}/\n", indent, child.name));
        push_children(text, child, depth + 1);
    }
    for file in &dir.files {
        text.push_str(&format!("{}{}\n", indent, file.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FileNode;

    #[test]
    fn test_outline() {
        let mut root = DirectoryNode::new("notes", Vec::new());
        let mut js = DirectoryNode::new("js", vec!["js".to_string()]);
        js.files.push(FileNode::new("closures", "js/closures.md"));
        root.children.push(js);
        root.files.push(FileNode::new("index", "index.md"));

        assert_eq!(
            outline(&root),
            "notes/ (2 notes)\n  js/\n    closures\n  index\n"
        );
    }
}
