//! Allow-list HTML sanitizer
//!
//! Runs the rendered markup (generated tags and raw HTML from the source
//! alike) through a streaming rewriter, so every fragment is parsed as real
//! elements before the policy is applied.

use lol_html::errors::RewritingError;
use lol_html::{doc_comments, element, rewrite_str, RewriteStrSettings};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::markdown::Diagnostic;

/// Tags allowed through, roughly GitHub's rendering set
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "col", "colgroup", "dd",
    "del", "details", "dfn", "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "i", "img", "input", "ins", "kbd", "li", "mark", "ol", "p", "pre",
    "q", "rp", "rt", "ruby", "s", "samp", "section", "small", "span", "strike", "strong", "sub",
    "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "tt", "u", "ul",
    "var", "wbr",
];

/// Tags removed together with everything inside them
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript",
    "noembed", "noframes", "template", "textarea", "title", "xmp", "plaintext", "select",
    "option", "button", "form", "base", "link", "meta", "svg", "math",
];

/// Dropped tags that configuration can never re-enable
///
/// `svg` and `math` switch the parser into foreign content, where CDATA
/// sections hide markup from the rewriter.
const FORBIDDEN_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript",
    "template", "base", "link", "meta", "form", "svg", "math",
];

/// Attributes never kept, whatever the tag allows
const FORBIDDEN_ATTRIBUTES: &[&str] = &["style", "srcdoc", "formaction", "xlink:href"];

const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "title", "lang", "dir", "aria-hidden"];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "name", "rel", "target"]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("input", &["type", "checked", "disabled"]),
    ("td", &["align", "colspan", "rowspan"]),
    ("th", &["align", "colspan", "rowspan", "scope"]),
    ("col", &["span"]),
    ("colgroup", &["span"]),
    ("ol", &["start", "reversed", "type"]),
    ("li", &["value"]),
    ("details", &["open"]),
    ("q", &["cite"]),
    ("blockquote", &["cite"]),
    ("del", &["cite", "datetime"]),
    ("ins", &["cite", "datetime"]),
    ("sup", &["data-footnote-ref"]),
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite", "poster", "action", "data", "background"];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Which tags, attributes and URL schemes survive sanitization
#[derive(Debug, Clone)]
pub struct SanitizePolicy {
    tags: HashSet<String>,
    dropped: HashSet<String>,
    global_attributes: HashSet<String>,
    tag_attributes: HashMap<String, HashSet<String>>,
    url_schemes: HashSet<String>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<HashSet<_>>();
        Self {
            tags: set(ALLOWED_TAGS),
            dropped: set(DROPPED_TAGS),
            global_attributes: set(GLOBAL_ATTRIBUTES),
            tag_attributes: TAG_ATTRIBUTES
                .iter()
                .map(|(tag, attrs)| (tag.to_string(), set(attrs)))
                .collect(),
            url_schemes: set(URL_SCHEMES),
        }
    }
}

impl SanitizePolicy {
    /// Allow an extra tag, optionally with tag-specific attributes
    ///
    /// Tags that can run script or hide markup stay dropped.
    pub fn allow_tag(mut self, tag: &str, attributes: &[&str]) -> Self {
        let tag = tag.to_ascii_lowercase();
        if FORBIDDEN_TAGS.contains(&tag.as_str()) {
            tracing::warn!("Refusing to allow <{}> through the sanitizer", tag);
            return self;
        }
        self.dropped.remove(&tag);
        self.tags.insert(tag.clone());
        self.tag_attributes
            .entry(tag)
            .or_default()
            .extend(attributes.iter().map(|a| a.to_ascii_lowercase()));
        self
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn drops_content(&self, tag: &str) -> bool {
        self.dropped.contains(tag)
    }

    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        if attribute.starts_with("on") || FORBIDDEN_ATTRIBUTES.contains(&attribute) {
            return false;
        }
        self.global_attributes.contains(attribute)
            || self
                .tag_attributes
                .get(tag)
                .is_some_and(|attrs| attrs.contains(attribute))
    }

    /// Relative references, fragments and allow-listed schemes pass
    pub fn allows_url(&self, value: &str) -> bool {
        let decoded = html_escape::decode_html_entities(value);
        let url: String = decoded
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect();

        let delim = url.find(['/', '?', '#']);
        let Some(colon) = url.find(':') else {
            // An entity left undecoded could still be hiding a scheme
            let head = &url[..delim.unwrap_or(url.len())];
            return !head.contains('&');
        };
        // A colon after the first '/', '?' or '#' belongs to a relative reference
        if delim.is_some_and(|delim| delim < colon) {
            return true;
        }
        self.url_schemes
            .contains(url[..colon].to_ascii_lowercase().as_str())
    }
}

/// Apply `policy` to `html`, recording what was stripped
pub fn sanitize(
    html: &str,
    policy: &SanitizePolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<String, RewritingError> {
    let stripped = RefCell::new(Vec::new());

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", |el| {
                let tag = el.tag_name().to_ascii_lowercase();

                if policy.drops_content(&tag) {
                    el.remove();
                    stripped.borrow_mut().push(Diagnostic::StrippedElement(tag));
                    return Ok(());
                }

                if !policy.allows_tag(&tag) {
                    el.remove_and_keep_content();
                    stripped.borrow_mut().push(Diagnostic::StrippedElement(tag));
                    return Ok(());
                }

                // Task list markers are the only form control that survives
                if tag == "input"
                    && !el
                        .get_attribute("type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
                {
                    el.remove();
                    stripped.borrow_mut().push(Diagnostic::StrippedElement(tag));
                    return Ok(());
                }

                let names: Vec<String> = el
                    .attributes()
                    .iter()
                    .map(|a| a.name().to_ascii_lowercase())
                    .collect();

                for name in names {
                    let keep = policy.allows_attribute(&tag, &name)
                        && (!URL_ATTRIBUTES.contains(&name.as_str())
                            || el
                                .get_attribute(&name)
                                .is_some_and(|v| policy.allows_url(&v)));
                    if !keep {
                        el.remove_attribute(&name);
                        stripped.borrow_mut().push(Diagnostic::StrippedAttribute {
                            element: tag.clone(),
                            attribute: name,
                        });
                    }
                }

                Ok(())
            })],
            document_content_handlers: vec![doc_comments!(|c| {
                c.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;

    diagnostics.extend(stripped.into_inner());
    Ok(output)
}
