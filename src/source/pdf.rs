//! PDF 텍스트 추출
//!
//! pdf-extract 크레이트로 PDF를 코퍼스 텍스트로 변환합니다.
//! 페이지는 빈 줄로 구분합니다.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// PDF에서 코퍼스 텍스트 추출
///
/// 텍스트가 없는 PDF(스캔 문서 등)는 경고 후 빈 문자열을 돌려줍니다.
/// 빈 코퍼스 처리는 인덱스 단계의 몫입니다.
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned document.",
            path
        );
        return Ok(String::new());
    }

    let pages = split_pdf_pages(&text);
    tracing::debug!("Extracted {} page(s) from {:?}", pages.len(), path);

    Ok(pages.join("\n\n"))
}

fn page_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 예: "--- Page 1 ---", "=== 2 ==="
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[\s]*[-=]+[\s]*(?:Page[\s]*)?(\d+)[\s]*[-=]+[\s]*$")
            .expect("Invalid regex")
    })
}

/// PDF 텍스트를 페이지별로 분리
///
/// 폼피드(\x0c) 우선, 없으면 페이지 구분 줄, 둘 다 없으면 전체를 한 페이지로.
fn split_pdf_pages(text: &str) -> Vec<String> {
    let pages: Vec<String> = text
        .split('\x0c')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if pages.len() > 1 {
        return pages;
    }

    let marker = page_marker_re();
    if marker.is_match(text) {
        let pages: Vec<String> = marker
            .split(text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if pages.len() > 1 {
            return pages;
        }
    }

    vec![text.trim().to_string()]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pdf_pages_with_formfeed() {
        let text = "Aloe likes sun.\x0cFerns like shade.\x0c\x0cCacti need little water.";
        let pages = split_pdf_pages(text);
        assert_eq!(
            pages,
            vec!["Aloe likes sun.", "Ferns like shade.", "Cacti need little water."]
        );
    }

    #[test]
    fn test_split_pdf_pages_with_markers() {
        let text = "Aloe likes sun.\n--- Page 2 ---\nFerns like shade.";
        let pages = split_pdf_pages(text);
        assert_eq!(pages, vec!["Aloe likes sun.", "Ferns like shade."]);
    }

    #[test]
    fn test_split_pdf_pages_no_separator() {
        let pages = split_pdf_pages("  Just one page of facts.  ");
        assert_eq!(pages, vec!["Just one page of facts."]);
    }

    #[test]
    fn test_extract_missing_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_text_from_pdf(&dir.path().join("missing.pdf")).unwrap_err();
        assert!(err.to_string().contains("Failed to read PDF"));
    }
}
