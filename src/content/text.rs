//! Text extraction helpers shared by the extractors

use crate::content::noise::is_region_noise;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

/// Elements that start a new line when text is flattened line by line
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol",
    "li", "blockquote", "pre", "br", "hr", "table", "tr", "td", "th", "figure", "figcaption",
];

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Visible text of an element: trimmed text nodes joined by single spaces
pub fn element_text(element: &ElementRef<'_>) -> String {
    let pieces: Vec<&str> = element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect();
    collapse_whitespace(&pieces.join(" "))
}

/// Visible text of an element ignoring noise subtrees, scripts and styles
pub fn pruned_text(element: &ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    collect_pruned(element, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_pruned(element: &ElementRef<'_>, pieces: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            Node::Element(inner) if !is_region_noise(inner) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_pruned(&child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

/// Text of an element split at block boundaries, noise removed
///
/// Each returned line is whitespace-collapsed and non-empty.
pub fn text_lines(element: &ElementRef<'_>) -> Vec<String> {
    let mut buffer = String::new();
    collect_lines(element, &mut buffer);
    buffer
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

fn collect_lines(element: &ElementRef<'_>, buffer: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buffer.push_str(text),
            Node::Element(inner) if !is_region_noise(inner) => {
                let is_block = BLOCK_TAGS.contains(&inner.name());
                if is_block {
                    buffer.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_lines(&child_element, buffer);
                }
                if is_block {
                    buffer.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Escapes text for inclusion in HTML element content
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wraps every line longer than `min_line_chars` characters in a `<p>` element
pub fn paragraphs_from_lines(lines: &[String], min_line_chars: usize) -> String {
    lines
        .iter()
        .filter(|line| line.chars().count() > min_line_chars)
        .map(|line| format!("<p>{}</p>", escape_text(line)))
        .collect()
}

/// Descendant elements of `element` matching `selector`, excluding `element` itself
pub fn select_within<'a, 'b>(
    element: &ElementRef<'a>,
    selector: &'b scraper::Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    let own_id = element.id();
    element.select(selector).filter(move |found| found.id() != own_id)
}
