//! HTTP text sources: web pages and JSON APIs.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::counts::{self, WordCounts};
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: concat!("word-freq/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A fetched response body.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl Document {
    fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("html"))
    }

    /// Text to count. With a JSON pointer the body is decoded as JSON and the
    /// pointed-at value must be a string. Otherwise HTML is reduced to its
    /// visible text and anything else is taken as is.
    pub fn text(&self, json_pointer: Option<&str>) -> Result<String> {
        match json_pointer {
            Some(pointer) => match self.select(pointer)? {
                Value::String(s) => Ok(s),
                other => Err(Error::InvalidArgument(counts::kind_name(&other))),
            },
            None if self.is_html() => Ok(html_text(&self.body)),
            None => Ok(self.body.clone()),
        }
    }

    pub fn count(&self, json_pointer: Option<&str>) -> Result<WordCounts> {
        match json_pointer {
            Some(pointer) => counts::count_value(&self.select(pointer)?),
            None => Ok(counts::count(&self.text(None)?)),
        }
    }

    fn select(&self, pointer: &str) -> Result<Value> {
        let mut json: Value = serde_json::from_str(&self.body)?;
        json.pointer_mut(pointer)
            .map(Value::take)
            .ok_or_else(|| Error::MissingField(pointer.to_string()))
    }
}

/// Title and visible body text, one space between text nodes.
pub fn html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").expect("static selector");
    let body_selector = Selector::parse("body").expect("static selector");

    let mut parts = Vec::new();
    if let Some(title) = document.select(&title_selector).next() {
        parts.push(title.text().collect::<String>().trim().to_string());
    }
    if let Some(body) = document.select(&body_selector).next() {
        parts.push(visible_text(body));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            match parent.value().name() {
                "script" | "style" | "noscript" => None,
                _ => Some(&**text),
            }
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {scheme:?}"),
        }),
    }
}

/// GET `url`, failing on a non-success status or a body over `max_bytes`.
pub async fn fetch_document(settings: &FetchSettings, url: &str) -> Result<Document> {
    let parsed = parse_url(url)?;
    let client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.as_str())
        .build()?;

    tracing::info!(url = %parsed, "fetching");
    let mut response = client.get(parsed).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let too_large = || Error::TooLarge {
        url: url.to_string(),
        max_bytes: settings.max_bytes,
    };
    if response.content_length().is_some_and(|len| len > settings.max_bytes) {
        return Err(too_large());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if (bytes.len() + chunk.len()) as u64 > settings.max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    tracing::debug!(url, bytes = bytes.len(), ?content_type, "fetched");

    Ok(Document {
        url: url.to_string(),
        content_type,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Fetch on a fresh runtime, for synchronous callers.
pub fn fetch_blocking(settings: &FetchSettings, url: &str) -> Result<Document> {
    let rt = tokio::runtime::Runtime::new().map_err(Error::Runtime)?;
    rt.block_on(fetch_document(settings, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>Fish Facts</title><style>p { color: red }</style></head>
<body><h1>One fish</h1><p>Two fish</p><script>var fish = 1;</script><p>red_fish blue-fish</p></body></html>"#;

    fn document(content_type: Option<&str>, body: &str) -> Document {
        Document {
            url: "http://example.test/".to_string(),
            content_type: content_type.map(str::to_string),
            body: body.to_string(),
        }
    }

    async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn html_text_skips_scripts_and_styles() {
        assert_eq!(html_text(PAGE), "Fish Facts One fish Two fish red_fish blue-fish");
    }

    #[test]
    fn html_document_counts_visible_words() {
        let counts = document(Some("text/html; charset=utf-8"), PAGE).count(None).unwrap();
        assert_eq!(counts.get("fish"), Some(5));
        assert_eq!(counts.get("var"), None);
        assert_eq!(counts.get("color"), None);
    }

    #[test]
    fn plain_document_is_counted_verbatim() {
        let counts = document(Some("text/plain"), "<b>bold</b>").count(None).unwrap();
        assert_eq!(counts.get("b"), Some(2));
        assert_eq!(counts.get("bold"), Some(1));
    }

    #[test]
    fn json_pointer_selects_string() {
        let doc = document(
            Some("application/json"),
            r#"{"results": [{"name": "Luke Skywalker", "bio": "Luke, a farm boy"}]}"#,
        );
        let counts = doc.count(Some("/results/0/bio")).unwrap();
        assert_eq!(counts.get("luke"), Some(1));
        assert_eq!(counts.total(), 4);
        assert_eq!(doc.text(Some("/results/0/name")).unwrap(), "Luke Skywalker");
    }

    #[test]
    fn json_pointer_to_non_text_is_invalid_argument() {
        let doc = document(Some("application/json"), r#"{"name": null, "height": 172}"#);
        assert!(matches!(doc.count(Some("/name")), Err(Error::InvalidArgument("null"))));
        assert!(matches!(doc.text(Some("/height")), Err(Error::InvalidArgument("a number"))));
    }

    #[test]
    fn json_pointer_missing() {
        let doc = document(Some("application/json"), r#"{"name": "x"}"#);
        assert!(matches!(doc.count(Some("/nope")), Err(Error::MissingField(p)) if p == "/nope"));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(parse_url("ftp://example.com/x"), Err(Error::InvalidUrl { .. })));
        assert!(matches!(parse_url("not a url"), Err(Error::InvalidUrl { .. })));
        assert!(parse_url("https://example.com/x").is_ok());
    }

    #[tokio::test]
    async fn fetches_html_page() {
        let server = serve(
            "/page",
            ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"),
        )
        .await;
        let url = format!("{}/page", server.uri());
        let doc = fetch_document(&FetchSettings::default(), &url).await.unwrap();
        assert_eq!(doc.url, url);
        assert!(doc.is_html());
        assert_eq!(doc.count(None).unwrap().get("fish"), Some(5));
    }

    #[tokio::test]
    async fn fetches_json_api_field() {
        let server = serve(
            "/api/people/1",
            ResponseTemplate::new(200).set_body_raw(
                r#"{"name": "Luke Skywalker", "bio": "Luke left Tatooine; luke_returned."}"#,
                "application/json",
            ),
        )
        .await;
        let url = format!("{}/api/people/1", server.uri());
        let doc = fetch_document(&FetchSettings::default(), &url).await.unwrap();
        let counts = doc.count(Some("/bio")).unwrap();
        assert_eq!(counts.get("luke"), Some(2));
        assert_eq!(counts.get("returned"), Some(1));
        assert_eq!(counts.total(), 5);
        assert!(matches!(doc.count(Some("/age")), Err(Error::MissingField(_))));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = serve("/missing", ResponseTemplate::new(404)).await;
        let url = format!("{}/missing", server.uri());
        let err = fetch_document(&FetchSettings::default(), &url).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let server = serve(
            "/big",
            ResponseTemplate::new(200).set_body_raw("word ".repeat(100), "text/plain"),
        )
        .await;
        let settings = FetchSettings {
            max_bytes: 64,
            ..FetchSettings::default()
        };
        let url = format!("{}/big", server.uri());
        let err = fetch_document(&settings, &url).await.unwrap_err();
        assert!(matches!(err, Error::TooLarge { max_bytes: 64, .. }));
    }
}
