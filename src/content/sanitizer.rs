//! Content sanitizer
//!
//! Turns arbitrary extracted markup into a small, attribute-free HTML subset.
//! The input tree is rendered into a fresh string rather than edited in place:
//!
//! - media, embeds, scripts, page chrome and form controls are dropped with
//!   their content
//! - elements carrying a noise class are dropped with their content
//! - links become their text; empty links disappear
//! - whitelisted structural tags are kept without attributes, but only when
//!   they still contain text (`br` and `hr` are always kept); a heading nested
//!   in another heading is flattened into it
//! - generic containers are unwrapped so their content is never lost
//! - any other tag is replaced by its text followed by a space
//!
//! Whitespace is then normalized. Sanitizing already-sanitized output returns
//! it unchanged.

use crate::content::noise::has_noise_class;
use crate::content::text::{collapse_whitespace, escape_text};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

/// Output shorter than this many characters is reported as empty
pub const MIN_CLEAN_CHARS: usize = 10;

/// Elements removed together with everything inside them
const REMOVED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "img", "iframe",
    "video", "audio", "embed", "object", "svg", "canvas", "figure", "picture", "source", "track",
    "nav", "header", "footer", "aside", "form", "button", "input", "select", "textarea", "label",
];

/// Structural tags kept in the output, stripped of attributes
const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "strong", "em", "b",
    "i", "u", "pre", "code",
];

/// Structural tags that are kept even though they never hold text
const VOID_TAGS: &[&str] = &["br", "hr"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Containers replaced by their children
const UNWRAPPED_TAGS: &[&str] = &["div", "span", "section", "article", "main", "html", "body"];

static SPACE_AFTER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]+)>\s+").expect("hardcoded regex pattern is valid"));
static SPACE_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+</").expect("hardcoded regex pattern is valid"));
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));
static SPACE_BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("hardcoded regex pattern is valid"));

/// Rendered markup of a subtree plus whether it carries any visible text
#[derive(Debug, Default)]
struct Rendered {
    html: String,
    has_text: bool,
}

impl Rendered {
    fn text(text: &str) -> Self {
        Self {
            html: escape_text(text),
            has_text: !text.trim().is_empty(),
        }
    }

    fn append(&mut self, other: Rendered) {
        self.html.push_str(&other.html);
        self.has_text |= other.has_text;
    }
}

/// Sanitizes an HTML fragment
///
/// # Arguments
///
/// * `html` - Markup of a content region, or a whole document
///
/// # Returns
///
/// The cleaned HTML, or an empty string when fewer than ten characters remain
///
/// # Example
///
/// ```
/// use blog_harvest::content::clean;
///
/// let html = r#"<div class="x"><p style="color:red">Hello <a href="/y">world</a></p><script>z()</script></div>"#;
/// assert_eq!(clean(html), "<p>Hello world</p>");
/// ```
pub fn clean(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let rendered = render_children(&fragment.root_element(), false);
    let normalized = normalize_whitespace(&rendered.html);

    if normalized.chars().count() < MIN_CLEAN_CHARS {
        String::new()
    } else {
        normalized
    }
}

fn render_children(element: &ElementRef<'_>, in_heading: bool) -> Rendered {
    let mut rendered = Rendered::default();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => rendered.append(Rendered::text(text)),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    rendered.append(render_element(&child_element, in_heading));
                }
            }
            // Comments, doctypes and processing instructions
            _ => {}
        }
    }
    rendered
}

fn is_removed(element: &scraper::node::Element) -> bool {
    REMOVED_TAGS.contains(&element.name()) || has_noise_class(element)
}

/// Text of the parts of a subtree that survive sanitizing
fn kept_text(element: &ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    collect_kept_text(element, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_kept_text(element: &ElementRef<'_>, pieces: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            Node::Element(inner) if !is_removed(inner) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_kept_text(&child_element, pieces);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: &ElementRef<'_>, in_heading: bool) -> Rendered {
    let name = element.value().name();

    if is_removed(element.value()) {
        return Rendered::default();
    }

    if name == "a" {
        return Rendered::text(&kept_text(element));
    }

    if VOID_TAGS.contains(&name) {
        return Rendered {
            html: format!("<{}>", name),
            has_text: false,
        };
    }

    let is_heading = HEADING_TAGS.contains(&name);
    if is_heading && in_heading {
        let mut inner = render_children(element, true);
        inner.html.push(' ');
        return inner;
    }

    if ALLOWED_TAGS.contains(&name) {
        let inner = render_children(element, in_heading || is_heading);
        if !inner.has_text {
            return Rendered::default();
        }
        return Rendered {
            html: format!("<{name}>{}</{name}>", inner.html),
            has_text: true,
        };
    }

    if UNWRAPPED_TAGS.contains(&name) {
        return render_children(element, in_heading);
    }

    let text = kept_text(element);
    if text.is_empty() {
        Rendered::default()
    } else {
        Rendered::text(&format!("{} ", text))
    }
}

fn normalize_whitespace(html: &str) -> String {
    let html = SPACE_AFTER_TAG.replace_all(html, "<$1>");
    let html = SPACE_BEFORE_CLOSE.replace_all(&html, "</");
    let html = SPACE_RUNS.replace_all(&html, " ");
    let html = SPACE_BETWEEN_TAGS.replace_all(&html, "><");
    html.trim().to_string()
}
