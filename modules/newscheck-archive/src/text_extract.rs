use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;

/// Elements whose text never belongs to an article body.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "aside", "form", "header",
];

/// Elements that start a new block of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "pre", "table", "tr", "td", "th", "figcaption", "br",
];

/// Blocks longer than this are prose, whatever they start with.
const BOILERPLATE_MAX_CHARS: usize = 200;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static BOILERPLATE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:copyright\b\s*(?:©|\(c\)|\d{4})|©|all rights reserved\b|subscribe\b|sign up\b|read more\b)",
    )
    .expect("valid regex")
});

/// Visible text of an element with whitespace collapsed, skipping scripts,
/// styles and page chrome (nav, header, footer, aside, forms).
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element_blocks(element))
}

/// Visible text of an element, one line per block-level element. Source
/// line breaks inside a block are collapsed.
pub fn element_blocks(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(&WHITESPACE_RE.replace_all(text, " "));
            }
            Node::Element(el) if !SKIPPED_TAGS.contains(&el.name()) => {
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, out);
                }
                if block {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Length of text sitting directly in the element: its own text nodes plus
/// the text of direct `<p>` children. Nested containers don't count.
pub(crate) fn direct_text_len(element: ElementRef<'_>) -> usize {
    element
        .children()
        .map(|child| match child.value() {
            Node::Text(text) => text.trim().chars().count(),
            Node::Element(el) if el.name() == "p" => ElementRef::wrap(child)
                .map(|p| element_text(p).chars().count())
                .unwrap_or(0),
            _ => 0,
        })
        .sum()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Drop boilerplate blocks (subscribe prompts, copyright lines) from
/// line-separated text, cut each block at a `©`, and join what is left
/// into one whitespace-normalized string. Prose that merely mentions a
/// marker word is kept.
pub fn strip_boilerplate(text: &str) -> String {
    text.lines()
        .map(|line| normalize_whitespace(line.split('©').next().unwrap_or(line)))
        .filter(|block| !block.is_empty() && !is_boilerplate_block(block))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_boilerplate_block(block: &str) -> bool {
    block.chars().count() <= BOILERPLATE_MAX_CHARS && BOILERPLATE_BLOCK_RE.is_match(block)
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
