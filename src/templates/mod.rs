//! Bare HTML page shell around rendered notes
//!
//! Layout and styling live outside this crate; these helpers only produce
//! enough markup to browse the routes: a navigation list, the note body and
//! a generic not-found page.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::content::{DirectoryNode, Post, Slug};

/// Stylesheet path for the highlight theme, relative to the site root
pub const HIGHLIGHT_CSS: &str = "highlight.css";

/// Full page for a note
pub fn post_page(site_title: &str, post: &Post, body_html: &str, nav: &DirectoryNode) -> String {
    let updated = post
        .last_modified
        .map(|t| {
            format!(
                "<p class=\"updated\">Updated <time datetime=\"{}\">{}</time></p>\n",
                t.to_rfc3339(),
                t.format("%Y-%m-%d")
            )
        })
        .unwrap_or_default();

    let main = format!(
        "<article>\n<header><h1 class=\"title\">{}</h1>\n{}</header>\n{}</article>",
        encode_text(&post.title),
        updated,
        body_html
    );

    layout(
        &format!("{} | {}", post.title, site_title),
        nav_html(nav, Some(&post.slug)).as_str(),
        &main,
    )
}

/// Generic page for slugs that do not resolve
pub fn not_found_page(site_title: &str, nav: &DirectoryNode) -> String {
    layout(
        &format!("Not found | {}", site_title),
        &nav_html(nav, None),
        "<article>\n<h1>Page not found</h1>\n<p>There is no note at this address.</p>\n</article>",
    )
}

fn layout(title: &str, nav: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<link rel="stylesheet" href="/{}">
</head>
<body>
<nav>
{}</nav>
<main>
{}
</main>
</body>
</html>
"#,
        encode_text(title),
        HIGHLIGHT_CSS,
        nav,
        main
    )
}

/// Nested `<ul>` mirroring the directory tree
pub fn nav_html(tree: &DirectoryNode, current: Option<&Slug>) -> String {
    let mut out = String::new();
    push_directory(&mut out, tree, current);
    out
}

fn push_directory(out: &mut String, dir: &DirectoryNode, current: Option<&Slug>) {
    out.push_str("<ul>\n");

    for file in &dir.files {
        let class = if current == Some(&file.slug) {
            " class=\"current\""
        } else {
            ""
        };
        out.push_str(&format!(
            "<li{}><a href=\"{}\">{}</a></li>\n",
            class,
            encode_double_quoted_attribute(&file.slug.url_path()),
            encode_text(&file.name)
        ));
    }

    for child in &dir.children {
        out.push_str(&format!(
            "<li class=\"dir\"><span>{}</span>\n",
            encode_text(&child.name)
        ));
        push_directory(out, child, current);
        out.push_str("</li>\n");
    }

    out.push_str("</ul>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FileNode;

    fn tree() -> DirectoryNode {
        let mut root = DirectoryNode::new("notes", Vec::new());
        let mut js = DirectoryNode::new("03. JavaScript", vec!["03. JavaScript".to_string()]);
        js.files
            .push(FileNode::new("closures", "03. JavaScript/closures.md"));
        root.files.push(FileNode::new("index", "index.md"));
        root.children.push(js);
        root
    }

    #[test]
    fn test_nav_links_are_encoded() {
        let html = nav_html(&tree(), None);
        assert!(html.contains(r#"<a href="/">index</a>"#));
        assert!(html.contains(r#"<a href="/03.%20JavaScript/closures/">closures</a>"#));
        assert!(html.contains("<span>03. JavaScript</span>"));
    }

    #[test]
    fn test_nav_marks_current() {
        let current: Slug = ["03. JavaScript", "closures"].into_iter().collect();
        let html = nav_html(&tree(), Some(&current));
        assert!(html.contains(r#"<li class="current"><a href="/03.%20JavaScript/closures/">"#));
    }

    #[test]
    fn test_post_page_escapes_title() {
        let post = Post::new(
            ["x"].into_iter().collect(),
            "<b>Tags</b> & more".to_string(),
            String::new(),
            "x.md".to_string(),
        );
        let html = post_page("Site", &post, "<p>body</p>", &tree());
        assert!(html.contains("&lt;b&gt;Tags&lt;/b&gt; &amp; more"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_not_found_page() {
        let html = not_found_page("Site", &tree());
        assert!(html.contains("Page not found"));
        assert!(html.contains("<title>Not found | Site</title>"));
    }
}
