//! Front-matter parsing

use serde_yaml::Value;

/// Front-matter data from a note
///
/// Only `title` is read; any other key is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Never fails: content without a well-formed leading `---` block is
    /// returned untouched together with an empty front-matter.
    pub fn parse(content: &str) -> (Self, &str) {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some((yaml_content, remaining)) = split_block(content) else {
            return (FrontMatter::default(), content);
        };

        // If YAML content is empty or whitespace-only, return default
        if yaml_content.trim().is_empty() {
            return (FrontMatter::default(), remaining);
        }

        // A note may open with a `---` thematic break; only strip the block
        // when it actually looks like `key: value` metadata.
        if !has_yaml_structure(yaml_content) {
            return (FrontMatter::default(), content);
        }

        match serde_yaml::from_str::<Value>(yaml_content) {
            Ok(Value::Mapping(map)) => {
                let title = map.get("title").and_then(scalar_to_string);
                (FrontMatter { title }, remaining)
            }
            Ok(_) => {
                tracing::warn!("Front-matter is not a mapping, treating as content");
                (FrontMatter::default(), content)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (FrontMatter::default(), content)
            }
        }
    }
}

/// Split `---\n<yaml>\n---\n<body>` into its yaml and body parts
fn split_block(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return Some((yaml, body.trim_start_matches(['\n', '\r'])));
        }
        offset += line.len();
    }

    // No closing ---, treat as no front-matter
    None
}

/// Valid front-matter has at least one `key:` line with a plain identifier key
fn has_yaml_structure(yaml_content: &str) -> bool {
    yaml_content.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Closures
tags:
  - javascript
  - scope
---

Closures capture their lexical environment.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Closures".to_string()));
        assert_eq!(remaining, "Closures capture their lexical environment.\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Promises\n\nBody.";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_empty_frontmatter_is_stripped() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody");
        assert_eq!(fm.title, None);
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let content = "---\nauthor: me\ndraft: true\n---\nText";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, "Text");
    }

    #[test]
    fn test_numeric_title() {
        let (fm, _) = FrontMatter::parse("---\ntitle: 2024\n---\nText");
        assert_eq!(fm.title, Some("2024".to_string()));
    }

    #[test]
    fn test_crlf_frontmatter() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, Some("Windows".to_string()));
        assert_eq!(remaining, "Body\r\n");
    }

    #[test]
    fn test_malformed_yaml_treated_as_absent() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_unclosed_block_treated_as_absent() {
        let content = "---\ntitle: Missing end\n\nBody";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert_eq!(remaining, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"---
Some text between rules, with a list:
- Item 1
- Item 2
---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Some text between rules"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\nhttps://example.com/path\n---\nMore content.";
        let (fm, remaining) = FrontMatter::parse(content);
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }
}
