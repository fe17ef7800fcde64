//! Best-effort article content extraction.
//!
//! Given a URL and the search-result snippet for it, [`ContentExtractor`]
//! always produces *something*: an ordered chain of three tiers is tried and
//! the first success wins.
//!
//! 1. **Article parse**: structural parse of the page: byline and publish
//!    date from meta tags / JSON-LD, body text from the article region.
//!    Only counts as a success when the body is at least 250 characters.
//! 2. **Paragraph fallback**: raw fetch with a desktop-browser user agent,
//!    then the text of every `<p>` under the first of `<article>`, `<main>`,
//!    or `<body>`, joined by single spaces.
//! 3. **Snippet**: the caller-supplied snippet verbatim. Cannot fail.
//!
//! Tier failures are logged and swallowed here; nothing propagates.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Desktop-browser identification sent with fallback fetches.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Minimum body length for the article-parse tier to count as a success.
const MIN_ARTICLE_CHARS: usize = 250;

/// Per-request timeout for extraction fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Transient result of one extraction. Folded into the source metadata and
/// the LLM prompt text; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    pub authors: Vec<String>,
    /// ISO `YYYY-MM-DD`, or `"N/A"` when undetected.
    pub publish_date: String,
}

impl ExtractedContent {
    /// The final-tier result: snippet text, no metadata.
    fn from_snippet(snippet: &str) -> Self {
        Self {
            text: snippet.to_string(),
            authors: Vec::new(),
            publish_date: "N/A".to_string(),
        }
    }
}

/// Seam for the collector: anything that can turn a URL + snippet into content.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract content for one source. Infallible by contract.
    async fn extract(&self, url: &str, fallback_snippet: &str) -> ExtractedContent;
}

/// Production extractor implementing the three-tier chain.
pub struct ContentExtractor {
    client: Option<reqwest::Client>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .ok();
        Self { client }
    }

    /// Fetch a URL and return the body text, with a human-readable failure
    /// reason on any error.
    async fn fetch(&self, url: &str) -> Result<String, String> {
        let client = self.client.as_ref().ok_or("HTTP client unavailable")?;

        let resp = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                format!("request error: {e}")
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        resp.text().await.map_err(|e| format!("failed to read body: {e}"))
    }

    /// Tier 1: structural article parse with metadata detection.
    async fn article_parse(&self, url: &str) -> Result<ExtractedContent, String> {
        let html = self.fetch(url).await?;
        parse_article(&html)
    }

    /// Tier 2: paragraph concatenation under the first content root.
    async fn paragraph_fallback(&self, url: &str) -> Result<ExtractedContent, String> {
        let html = self.fetch(url).await?;
        let text = paragraph_text(&html)?;
        Ok(ExtractedContent {
            text,
            authors: Vec::new(),
            publish_date: "N/A".to_string(),
        })
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for ContentExtractor {
    async fn extract(&self, url: &str, fallback_snippet: &str) -> ExtractedContent {
        match self.article_parse(url).await {
            Ok(content) => return content,
            Err(reason) => {
                debug!(url, reason, "Article parse failed, trying paragraph fallback");
            }
        }

        match self.paragraph_fallback(url).await {
            Ok(content) => return content,
            Err(reason) => {
                debug!(url, reason, "Paragraph fallback failed, using snippet");
            }
        }

        ExtractedContent::from_snippet(fallback_snippet)
    }
}

// ---------------------------------------------------------------------------
// HTML parsing helpers (synchronous: `scraper::Html` is !Send and must not
// live across an await)
// ---------------------------------------------------------------------------

/// Parse a full page as an article: body text plus detected byline and date.
fn parse_article(html: &str) -> Result<ExtractedContent, String> {
    let doc = Html::parse_document(html);

    let text = article_body_text(&doc).ok_or("no article region found")?;
    if text.chars().count() < MIN_ARTICLE_CHARS {
        return Err(format!(
            "article body too short ({} chars)",
            text.chars().count()
        ));
    }

    Ok(ExtractedContent {
        authors: detect_authors(&doc),
        publish_date: detect_publish_date(&doc).unwrap_or_else(|| "N/A".to_string()),
        text,
    })
}

/// Body text from the first focused content region.
fn article_body_text(doc: &Html) -> Option<String> {
    for sel_str in ["article", "[role=\"main\"]", "main"] {
        let sel = Selector::parse(sel_str).ok()?;
        if let Some(el) = doc.select(&sel).next() {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Readable text of an element: child text nodes with block-level breaks
/// collapsed to single spaces, skipping script/style/nav noise.
fn element_text(el: &scraper::ElementRef<'_>) -> String {
    const SKIP_TAGS: &[&str] = &[
        "script", "style", "nav", "header", "footer", "noscript", "svg", "aside", "form", "iframe",
    ];

    let mut buf = String::new();
    collect_text(el, &mut buf, SKIP_TAGS);
    collapse_whitespace(&buf)
}

fn collect_text(node: &scraper::ElementRef<'_>, buf: &mut String, skip_tags: &[&str]) {
    use scraper::Node;

    for child in node.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                if skip_tags.contains(&el.name()) {
                    continue;
                }
                buf.push(' ');
                if let Some(child_ref) = scraper::ElementRef::wrap(child) {
                    collect_text(&child_ref, buf, skip_tags);
                }
            }
            _ => {}
        }
    }
}

/// Collapse all whitespace runs to single spaces and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byline detection: author meta tags first, JSON-LD `author` second.
fn detect_authors(doc: &Html) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();

    for sel_str in ["meta[name=\"author\"]", "meta[property=\"article:author\"]"] {
        if let Ok(sel) = Selector::parse(sel_str) {
            for el in doc.select(&sel) {
                if let Some(content) = el.value().attr("content") {
                    push_author(&mut authors, content);
                }
            }
        }
    }

    if authors.is_empty() {
        for value in json_ld_values(doc) {
            for name in json_ld_author_names(&value) {
                push_author(&mut authors, &name);
            }
        }
    }

    authors
}

/// Append a cleaned author name, skipping empties, URLs, and duplicates.
fn push_author(authors: &mut Vec<String>, raw: &str) {
    let name = raw.trim();
    if name.is_empty() || name.starts_with("http://") || name.starts_with("https://") {
        return;
    }
    if !authors.iter().any(|a| a == name) {
        authors.push(name.to_string());
    }
}

/// Publish-date detection across meta tags, `<time datetime>`, and JSON-LD.
fn detect_publish_date(doc: &Html) -> Option<String> {
    for sel_str in [
        "meta[property=\"article:published_time\"]",
        "meta[name=\"date\"]",
    ] {
        if let Ok(sel) = Selector::parse(sel_str) {
            for el in doc.select(&sel) {
                if let Some(date) = el.value().attr("content").and_then(normalize_date) {
                    return Some(date);
                }
            }
        }
    }

    if let Ok(sel) = Selector::parse("time[datetime]") {
        for el in doc.select(&sel) {
            if let Some(date) = el.value().attr("datetime").and_then(normalize_date) {
                return Some(date);
            }
        }
    }

    for value in json_ld_values(doc) {
        if let Some(date) = json_ld_date(&value) {
            return Some(date);
        }
    }

    None
}

/// All parseable `<script type="application/ld+json">` payloads.
fn json_ld_values(doc: &Html) -> Vec<serde_json::Value> {
    let Ok(sel) = Selector::parse("script[type=\"application/ld+json\"]") else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|el| {
            let raw: String = el.text().collect();
            serde_json::from_str(&raw).ok()
        })
        .collect()
}

/// Author names from a JSON-LD value: `author` as a string, an object with
/// a `name`, or an array of either.
fn json_ld_author_names(value: &serde_json::Value) -> Vec<String> {
    let objects: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut names = Vec::new();
    for obj in objects {
        let Some(author) = obj.get("author") else {
            continue;
        };
        let entries: Vec<&serde_json::Value> = match author {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for entry in entries {
            match entry {
                serde_json::Value::String(s) => names.push(s.clone()),
                serde_json::Value::Object(map) => {
                    if let Some(name) = map.get("name").and_then(|n| n.as_str()) {
                        names.push(name.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    names
}

/// `datePublished` from a JSON-LD value (or the first element of an array).
fn json_ld_date(value: &serde_json::Value) -> Option<String> {
    let objects: Vec<&serde_json::Value> = match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    objects
        .iter()
        .filter_map(|obj| obj.get("datePublished").and_then(|d| d.as_str()))
        .find_map(normalize_date)
}

/// Normalize a raw date string to ISO `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%Y-%m-%d").to_string());
    }
    // Many sites emit a bare date or a date with a non-RFC suffix.
    let prefix: String = raw.chars().take(10).collect();
    chrono::NaiveDate::parse_from_str(&prefix, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Tier-2 text: every `<p>` under the first of `article`, `main`, `body`,
/// joined by single spaces.
fn paragraph_text(html: &str) -> Result<String, String> {
    let doc = Html::parse_document(html);

    let root = ["article", "main", "body"].iter().find_map(|sel_str| {
        Selector::parse(sel_str)
            .ok()
            .and_then(|sel| doc.select(&sel).next())
    });
    let root = root.ok_or("document has no body")?;

    let p_sel = Selector::parse("p").map_err(|e| format!("selector error: {e}"))?;
    let text = root
        .select(&p_sel)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"<html><head>
        <meta name="author" content="Jane Doe">
        <meta property="article:published_time" content="2024-03-05T10:30:00Z">
        </head><body>
        <nav><p>Menu item</p></nav>
        <article><p>PADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPAD
        PADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPAD
        PADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPAD
        PADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPADPAD</p></article>
        </body></html>"#;

    #[test]
    fn test_parse_article_success() {
        let content = parse_article(ARTICLE_HTML).unwrap();
        assert_eq!(content.authors, vec!["Jane Doe".to_string()]);
        assert_eq!(content.publish_date, "2024-03-05");
        assert!(content.text.starts_with("PAD"));
        assert!(content.text.chars().count() >= MIN_ARTICLE_CHARS);
    }

    #[test]
    fn test_parse_article_too_short() {
        let html = "<html><body><article><p>Short.</p></article></body></html>";
        let err = parse_article(html).unwrap_err();
        assert!(err.contains("too short"));
    }

    #[test]
    fn test_parse_article_no_region() {
        let html = "<html><body><div><p>Plain page text.</p></div></body></html>";
        assert!(parse_article(html).is_err());
    }

    #[test]
    fn test_paragraph_text_prefers_article_root() {
        let html = r#"<html><body>
            <p>outside</p>
            <article><p>First para.</p><p>Second para.</p></article>
            </body></html>"#;
        let text = paragraph_text(html).unwrap();
        assert_eq!(text, "First para. Second para.");
    }

    #[test]
    fn test_paragraph_text_body_fallback() {
        let html = "<html><body><p>One.</p><div><p>Two.</p></div></body></html>";
        let text = paragraph_text(html).unwrap();
        assert_eq!(text, "One. Two.");
    }

    #[test]
    fn test_detect_authors_from_json_ld() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type": "NewsArticle",
             "author": [{"name": "Alice Smith"}, {"name": "Bob Jones"}],
             "datePublished": "2023-11-20T08:00:00+01:00"}
            </script></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(
            detect_authors(&doc),
            vec!["Alice Smith".to_string(), "Bob Jones".to_string()]
        );
        assert_eq!(detect_publish_date(&doc), Some("2023-11-20".to_string()));
    }

    #[test]
    fn test_author_url_values_skipped() {
        let html = r#"<html><head>
            <meta property="article:author" content="https://example.com/profile/jane">
            </head><body></body></html>"#;
        let doc = Html::parse_document(html);
        assert!(detect_authors(&doc).is_empty());
    }

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(
            normalize_date("2024-03-05T10:30:00Z"),
            Some("2024-03-05".to_string())
        );
        assert_eq!(normalize_date("2024-03-05"), Some("2024-03-05".to_string()));
        assert_eq!(normalize_date("last Tuesday"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n  b\tc  "), "a b c");
    }

    #[tokio::test]
    async fn test_total_network_failure_returns_snippet() {
        // Port 9 (discard) is closed on loopback; the connection is refused
        // immediately, so both network tiers fail.
        let extractor = ContentExtractor::new();
        let content = extractor
            .extract("http://127.0.0.1:9/article", "the snippet")
            .await;
        assert_eq!(content.text, "the snippet");
        assert!(content.authors.is_empty());
        assert_eq!(content.publish_date, "N/A");
    }
}
