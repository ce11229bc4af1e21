use std::time::Duration;

use reqwest::{header, Client};
use scraper::{Html, Node};
use url::Url;

use crate::configuration::ScraperSettings;

const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Visible text of a page. An empty `text` with a `warning` means the fetch failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedText {
    pub text: String,
    pub warning: Option<String>,
}

/// Where page text comes from. [`TextExtractor`] fetches it over HTTP.
#[allow(async_fn_in_trait)]
pub trait TextSource {
    async fn scrape_website(&self, url: &str) -> ScrapedText;
}

pub struct TextExtractor {
    client: Client,
    max_chars: usize,
}

impl TextExtractor {
    pub fn new(settings: &ScraperSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(TextExtractor {
            client,
            max_chars: settings.max_chars,
        })
    }

    async fn fetch_html(&self, url: Url) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

impl TextSource for TextExtractor {
    /// Never fails: problems come back as a warning next to empty text.
    async fn scrape_website(&self, url: &str) -> ScrapedText {
        if url.trim().is_empty() {
            return ScrapedText {
                text: String::new(),
                warning: Some("No website given".to_string()),
            };
        }
        let url = normalize_url(url);
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Not scraping invalid url {}: {:?}", url, e);
                return ScrapedText {
                    text: String::new(),
                    warning: Some(format!("Invalid URL {}: {}", url, e)),
                };
            }
        };

        match self.fetch_html(parsed).await {
            Ok(html) => ScrapedText {
                text: extract_visible_text(&html, self.max_chars),
                warning: None,
            },
            Err(e) => {
                log::warn!("Failed to scrape {}: {:?}", url, e);
                ScrapedText {
                    text: String::new(),
                    warning: Some(format!("Failed to scrape {}: {}", url, e)),
                }
            }
        }
    }
}

/// Adds `https://` when the input carries no http(s) scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    match lower.starts_with("http://") || lower.starts_with("https://") {
        true => trimmed.to_string(),
        false => format!("https://{}", trimmed),
    }
}

/// Text nodes outside scripts, styles and `<head>`, space-joined and cut to `max_chars` characters.
pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let pieces: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
            })
        })
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    pieces.join(" ").chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use crate::{
        configuration::ScraperSettings,
        services::text_extractor::{
            extract_visible_text, normalize_url, TextExtractor, TextSource,
        },
    };

    fn extractor() -> TextExtractor {
        TextExtractor::new(&ScraperSettings {
            timeout_secs: 2,
            max_chars: 4000,
            user_agent: "pitchcraft-test".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn normalize_url_adds_missing_scheme() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  example.com/about "), "https://example.com/about");
    }

    #[test]
    fn normalize_url_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn extracts_visible_text_only() {
        let html = r#"
            <html>
                <head><title>Acme</title><style>body { color: red; }</style></head>
                <body>
                    <h1>Acme   CRM</h1>
                    <script>window.track = true;</script>
                    <p>We sell <b>CRM software</b> to retailers.</p>
                    <noscript>Enable JavaScript</noscript>
                </body>
            </html>
        "#;

        assert_eq!(
            extract_visible_text(html, 4000),
            "Acme   CRM We sell CRM software to retailers."
        )
    }

    #[test]
    fn truncates_by_characters() {
        let html = "<p>héllo wörld</p>";

        assert_eq!(extract_visible_text(html, 5), "héllo");
        assert_eq!(extract_visible_text(html, 0), "");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        assert_eq!(extract_visible_text("", 4000), "");
    }

    #[tokio::test]
    async fn empty_input_is_a_warning() {
        let scraped = extractor().scrape_website("   ").await;

        assert!(scraped.text.is_empty());
        assert_eq!(scraped.warning.as_deref(), Some("No website given"));
    }

    #[tokio::test]
    async fn unparsable_url_is_a_warning() {
        let scraped = extractor().scrape_website("not a url").await;

        assert!(scraped.text.is_empty());
        assert!(scraped.warning.unwrap().starts_with("Invalid URL https://not a url"));
    }

    #[tokio::test]
    async fn refused_connection_is_a_warning() {
        let scraped = extractor().scrape_website("http://127.0.0.1:1").await;

        assert!(scraped.text.is_empty());
        assert!(scraped
            .warning
            .unwrap()
            .starts_with("Failed to scrape http://127.0.0.1:1"));
    }
}
