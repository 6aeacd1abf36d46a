//! URL 코퍼스 소스
//!
//! HTTP로 지식베이스를 가져옵니다.
//! HTML 응답은 본문 텍스트만 추출하고, 그 외(text/plain 등)는 그대로 사용합니다.
//! 재시도하지 않습니다. 실패는 호출자에게 그대로 전달됩니다.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use super::CorpusSource;

/// URL 소스
#[derive(Debug, Clone)]
pub struct UrlSource {
    url: Url,
    client: reqwest::Client,
}

impl UrlSource {
    /// 새 URL 소스 생성 (http/https만 허용)
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported URL scheme: {}", url.scheme());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("plant-rag/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("HTTP 클라이언트 생성 실패")?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl CorpusSource for UrlSource {
    async fn load(&self) -> Result<String> {
        tracing::info!("Fetching corpus: {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("HTTP 요청 실패")?
            .error_for_status()
            .context("HTTP 오류 응답")?;

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("html"))
            .unwrap_or(false);

        let body = response.text().await.context("응답 본문 읽기 실패")?;

        if is_html {
            Ok(extract_content(&Html::parse_document(&body)))
        } else {
            Ok(body)
        }
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

// ============================================================================
// HTML Extraction
// ============================================================================

/// 본문 추출 (HTML 태그 제거)
///
/// 우선순위: article > main > [role=main] > .content > #content > body
/// 블록 요소 단위로 줄을 나눠 문장 경계를 최대한 유지합니다.
pub fn extract_content(document: &Html) -> String {
    let selectors = ["article", "main", "[role=main]", ".content", "#content"];

    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = extract_text_from_element(&element);
                if text.len() > 100 {
                    return text;
                }
            }
        }
    }

    // 폴백: 전체 body 텍스트
    if let Ok(selector) = Selector::parse("body") {
        if let Some(element) = document.select(&selector).next() {
            return extract_text_from_element(&element);
        }
    }

    String::new()
}

/// 줄을 나누는 블록 요소
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "br", "tr", "td", "th",
    "table", "section", "article", "main", "header", "footer", "nav", "aside", "blockquote",
    "pre", "dd", "dt", "figcaption",
];

/// 요소에서 텍스트 추출 (스크립트/스타일 제외)
///
/// 인라인 요소는 같은 줄에 이어 붙이고 블록 요소 경계에서만 줄을 나눕니다.
fn extract_text_from_element(element: &scraper::ElementRef) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    collect_text(*element, &mut current, &mut lines);
    flush_line(&mut current, &mut lines);

    lines.join("\n")
}

fn collect_text(element: scraper::ElementRef, current: &mut String, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
            continue;
        }

        let Some(child) = scraper::ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if matches!(name, "script" | "style" | "noscript") {
            continue;
        }

        let is_block = BLOCK_ELEMENTS.contains(&name);
        if is_block {
            flush_line(current, lines);
        }
        collect_text(child, current, lines);
        if is_block {
            flush_line(current, lines);
        }
    }
}

/// 모은 텍스트의 공백을 정리해 한 줄로 확정
fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_source_validation() {
        assert!(UrlSource::new("https://example.com/plant.txt").is_ok());
        assert!(UrlSource::new("ftp://example.com/plant.txt").is_err());
        assert!(UrlSource::new("plant.txt").is_err());
    }

    #[test]
    fn test_describe_is_url() {
        let source = UrlSource::new("https://example.com/facts").unwrap();
        assert_eq!(source.describe(), "https://example.com/facts");
    }

    #[test]
    fn test_extract_content_from_article() {
        let html = r#"
            <html>
                <body>
                    <nav>Navigation menu</nav>
                    <article>
                        <p>Aloe vera needs bright indirect light.</p>
                        <p>Water it every three weeks and let the soil dry out fully.</p>
                        <p>Repot it in spring when the roots crowd the pot.</p>
                    </article>
                    <footer>Footer content</footer>
                </body>
            </html>
        "#;
        let content = extract_content(&Html::parse_document(html));

        assert!(content.contains("Aloe vera needs bright indirect light."));
        assert!(!content.contains("Navigation"));
        assert!(!content.contains("Footer"));
    }

    #[test]
    fn test_extract_content_skips_scripts() {
        let html = r#"
            <html>
                <head><style>p { color: red; }</style></head>
                <body>
                    <script>var x = 1;</script>
                    <p>Ferns prefer shade.</p>
                </body>
            </html>
        "#;
        let content = extract_content(&Html::parse_document(html));

        assert_eq!(content, "Ferns prefer shade.");
    }

    #[test]
    fn test_extract_content_keeps_block_boundaries() {
        let html = "<html><body><p>Cacti like sun.</p><p>Water rarely.</p></body></html>";
        let content = extract_content(&Html::parse_document(html));
        assert_eq!(content, "Cacti like sun.\nWater rarely.");
    }

    #[test]
    fn test_extract_content_joins_inline_markup() {
        let html = "<html><body><p>Water <b>rarely</b>. Ferns like <em>shade</em>!</p>\
                    <ul><li>Mist <a href=\"#\">ferns</a> daily.</li><li>Feed in spring.<br>Rest in winter.</li></ul>\
                    </body></html>";
        let content = extract_content(&Html::parse_document(html));

        assert_eq!(
            content,
            "Water rarely. Ferns like shade!\nMist ferns daily.\nFeed in spring.\nRest in winter."
        );

        let sentences: Vec<_> = crate::knowledge::segment(&content)
            .into_iter()
            .map(|s| s.original_text)
            .collect();
        assert_eq!(
            sentences,
            vec![
                "Water rarely.",
                "Ferns like shade!",
                "Mist ferns daily.",
                "Feed in spring.",
                "Rest in winter."
            ]
        );
    }
}
