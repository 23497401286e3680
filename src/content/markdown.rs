//! Markdown rendering with syntax highlighting and sanitization

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::fmt;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::sanitize::{self, SanitizePolicy};

/// Default syntect theme for the highlight stylesheet
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Something the renderer changed or could not honour
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A fenced code block named a language with no known syntax
    UnknownLanguage(String),
    /// An element was removed or unwrapped by the sanitizer
    StrippedElement(String),
    /// An attribute was removed by the sanitizer
    StrippedAttribute { element: String, attribute: String },
    /// The HTML rewriter gave up; the source was emitted as escaped text
    RewriteFailed(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownLanguage(lang) => {
                write!(f, "unknown code block language `{}`", lang)
            }
            Diagnostic::StrippedElement(tag) => write!(f, "stripped <{}> element", tag),
            Diagnostic::StrippedAttribute { element, attribute } => {
                write!(f, "stripped `{}` attribute from <{}>", attribute, element)
            }
            Diagnostic::RewriteFailed(e) => write!(f, "html rewriting failed: {}", e),
        }
    }
}

/// Rendered HTML together with the renderer's warnings
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    policy: SanitizePolicy,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, highlight: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            highlight,
            policy: SanitizePolicy::default(),
        }
    }

    /// Replace the sanitizer policy
    pub fn with_policy(mut self, policy: SanitizePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Render markdown to sanitized HTML
    pub fn render_to_html(&self, markdown: &str) -> String {
        self.render_with_diagnostics(markdown).html
    }

    /// Render markdown to sanitized HTML, keeping the warnings
    pub fn render_with_diagnostics(&self, markdown: &str) -> Rendered {
        let mut diagnostics = Vec::new();
        let raw = self.markdown_to_html(markdown, &mut diagnostics);

        let html = match sanitize::sanitize(&raw, &self.policy, &mut diagnostics) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to sanitize rendered markdown: {}", e);
                diagnostics.push(Diagnostic::RewriteFailed(e.to_string()));
                format!("<pre>{}</pre>", html_escape::encode_text(markdown))
            }
        };

        Rendered { html, diagnostics }
    }

    /// Stylesheet for the class-based highlight markup
    pub fn theme_css(&self) -> Result<String> {
        let theme = self
            .theme()
            .ok_or_else(|| anyhow!("No syntax highlighting themes available"))?;
        Ok(css_for_theme_with_class_style(theme, ClassStyle::Spaced)?)
    }

    /// Markdown to unsanitized HTML, raw HTML passed through as-is
    fn markdown_to_html(&self, markdown: &str, diagnostics: &mut Vec<Diagnostic>) -> String {
        // Front-matter is stripped by the indexer, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let block =
                        self.code_block(&code_block_content, lang.as_deref(), diagnostics);
                    events.push(Event::Html(CowStr::from(block)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render one code block, highlighted when its language is known
    fn code_block(
        &self,
        code: &str,
        lang: Option<&str>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code));
        };
        let class = html_escape::encode_double_quoted_attribute(lang);

        if self.highlight {
            match self.find_syntax(lang) {
                Some(syntax) => match self.highlight_code(code, syntax) {
                    Ok(highlighted) => {
                        return format!(
                            "<pre><code class=\"highlight language-{}\">{}</code></pre>\n",
                            class, highlighted
                        );
                    }
                    Err(e) => tracing::warn!("Failed to highlight {} code block: {}", lang, e),
                },
                None => {
                    tracing::debug!("No syntax for code block language {:?}", lang);
                    diagnostics.push(Diagnostic::UnknownLanguage(lang.to_string()));
                }
            }
        }

        // Fallback to plain code block
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            class,
            html_escape::encode_text(code)
        )
    }

    fn find_syntax(&self, lang: &str) -> Option<&SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .or_else(|| {
                let alias = match lang.to_ascii_lowercase().as_str() {
                    "ts" | "typescript" | "tsx" | "jsx" => "js",
                    "shell" | "zsh" | "console" => "sh",
                    "yml" => "yaml",
                    _ => return None,
                };
                self.syntax_set.find_syntax_by_token(alias)
            })
    }

    fn highlight_code(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of a fence info string, e.g. `rust` in ```` ```rust,ignore ````
fn fence_language(info: &str) -> Option<String> {
    let lang = info
        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
        .trim();
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    }
}
