//! 텍스트 정규화 + 토큰화
//!
//! 문장과 쿼리를 같은 비교 형태로 변환합니다.
//! - 소문자 변환
//! - 라틴 소문자(a-z)와 공백 외 모든 문자 제거 (숫자, 구두점, 비ASCII 포함)
//! - 공백은 합치지 않음 (토큰화가 연속 공백을 처리)

/// 문장 정규화
///
/// 음역(transliteration)은 하지 않습니다. `é`는 `e`가 되지 않고 제거됩니다.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect()
}

/// 토큰화 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// 최소 토큰 길이 (문자 수). 1이면 모든 토큰 유지
    pub min_token_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_token_len: 1 }
    }
}

impl TokenizerConfig {
    /// 정규화된 텍스트를 공백 기준으로 토큰화
    pub fn tokenize<'a>(&self, normalized: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let min_len = self.min_token_len;
        normalized
            .split_whitespace()
            .filter(move |t| t.len() >= min_len)
    }
}

// ============================================================================
// Tests
// ============================================================================
