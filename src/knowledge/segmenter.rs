//! 문장 분할 모듈
//!
//! 코퍼스 텍스트를 문장 단위로 나눕니다.
//! 문장 경계 = `.`, `!`, `?` 바로 뒤의 공백 구간.

use std::sync::OnceLock;

use regex::Regex;

use super::normalizer::normalize;

// ============================================================================
// Sentence
// ============================================================================

/// 분할된 문장
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// 원문 (줄바꿈은 공백으로 치환, 앞뒤 공백 제거)
    pub original_text: String,
    /// 정규화된 텍스트 (비교용)
    pub normalized_text: String,
    /// `?`로 끝나는 문장 여부
    pub is_question: bool,
}

impl Sentence {
    /// 원문에서 문장 생성
    pub fn new(original_text: impl Into<String>) -> Self {
        let original_text = original_text.into();
        let normalized_text = normalize(&original_text);
        let is_question = original_text.trim_end().ends_with('?');

        Self {
            original_text,
            normalized_text,
            is_question,
        }
    }

    /// 인덱싱 대상 여부 (질문이 아니고 정규화 결과가 비어있지 않음)
    pub fn is_statement(&self) -> bool {
        !self.is_question && !self.normalized_text.trim().is_empty()
    }
}

// ============================================================================
// Segmenter Trait
// ============================================================================

/// 문장 분할 전략 트레이트
pub trait Segmenter: Send + Sync {
    /// 텍스트를 문장으로 분할
    fn segment(&self, text: &str) -> Vec<Sentence>;

    /// 분할기 이름
    fn name(&self) -> &'static str;
}

/// 종결 부호 기반 문장 분할기
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSegmenter;

impl Segmenter for SentenceSegmenter {
    fn segment(&self, text: &str) -> Vec<Sentence> {
        split_sentences(text)
            .into_iter()
            .map(Sentence::new)
            .collect()
    }

    fn name(&self) -> &'static str {
        "SentenceSegmenter"
    }
}

/// 기본 분할기로 문장 분할
pub fn segment(text: &str) -> Vec<Sentence> {
    SentenceSegmenter.segment(text)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 종결 부호 + 뒤따르는 공백 구간
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("Invalid regex"))
}

fn newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n").expect("Invalid regex"))
}

/// 원문 문장 목록으로 분할
///
/// 종결 부호는 앞 문장에 남고, 뒤의 공백 구간은 버립니다.
fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return vec![];
    }

    let mut fragments = Vec::new();
    let mut start = 0;

    for m in boundary_re().find_iter(text) {
        // 종결 부호는 ASCII 1바이트
        fragments.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .map(|f| newline_re().replace_all(f, " ").trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn originals(text: &str) -> Vec<String> {
        segment(text).into_iter().map(|s| s.original_text).collect()
    }

    #[test]
    fn test_segment_terminal_punctuation() {
        assert_eq!(originals("A. B? C!"), vec!["A.", "B?", "C!"]);
    }

    #[test]
    fn test_segment_newline_boundary() {
        assert_eq!(originals("A.\nB."), vec!["A.", "B."]);
    }

    #[test]
    fn test_segment_collapses_internal_newlines() {
        assert_eq!(
            originals("Aloe vera needs\nbright light. Water\r\nsparingly."),
            vec!["Aloe vera needs bright light.", "Water sparingly."]
        );
    }

    #[test]
    fn test_segment_no_boundary_without_whitespace() {
        // 소수점, 약어 등은 공백이 없으면 경계가 아님
        assert_eq!(originals("Use 0.5 cups. Done."), vec!["Use 0.5 cups.", "Done."]);
        assert_eq!(originals("e.g.x"), vec!["e.g.x"]);
    }

    #[test]
    fn test_segment_trailing_fragment_without_punctuation() {
        assert_eq!(originals("First. second part"), vec!["First.", "second part"]);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t ").is_empty());
    }

    #[test]
    fn test_sentence_fields() {
        let sentences = segment("How often should I water? Water 2x a Week!");
        assert_eq!(sentences.len(), 2);

        assert!(sentences[0].is_question);
        assert!(!sentences[0].is_statement());

        assert!(!sentences[1].is_question);
        assert_eq!(sentences[1].normalized_text, "water x a week");
        assert!(sentences[1].is_statement());
    }

    #[test]
    fn test_punctuation_only_sentence_is_not_statement() {
        let sentences = segment("Good. 42! ...");
        assert_eq!(sentences.len(), 3);
        assert!(sentences[0].is_statement());
        assert!(!sentences[1].is_statement());
        assert!(!sentences[2].is_statement());
    }

    #[test]
    fn test_segmenter_name() {
        assert_eq!(SentenceSegmenter.name(), "SentenceSegmenter");
    }
}
