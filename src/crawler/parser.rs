//! HTML parser for extracting page text and links
//!
//! This module handles parsing HTML content to extract:
//! - Readable text to hand to the classifier
//! - Links to follow (from <a> tags)
//! - The page title, for log lines

use scraper::{Html, Node, Selector};
use url::Url;

/// Elements whose text never reaches the classifier
const NON_CONTENT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Visible text, whitespace-collapsed
    pub text: String,

    /// All followable links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts text, title, and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, in document order
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Hrefs that do not resolve against the base URL
///
/// Fragment links are kept. Telling `/p#top` apart from `/p` is the
/// frontier's job.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use topic_sieve::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Funds</title></head>
///     <body><p>Index  funds</p><a href="/more">More</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title.as_deref(), Some("Funds"));
/// assert_eq!(parsed.text, "Funds Index funds More");
/// assert_eq!(parsed.links, vec!["https://example.com/more".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: document_text(&document),
        links: document_links(&document, base_url),
    }
}

/// Returns the readable text of an HTML document
///
/// Text nodes are joined with single spaces; runs of whitespace collapse and
/// script/style content is skipped.
pub fn extract_text(html: &str) -> String {
    document_text(&Html::parse_document(html))
}

/// Returns the absolute URLs of the followable links in an HTML document
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    document_links(&Html::parse_document(html), base_url)
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn document_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| NON_CONTENT_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

fn document_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
