//! Scorer - 쿼리와 인덱스 문장 간 코사인 유사도

use serde::Serialize;

use super::index::TfIdfIndex;
use super::normalizer::normalize;

/// 문장 위치별 유사도
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredMatch {
    /// 인덱스 내 문장 위치 (문서 순서)
    pub position: usize,
    /// 코사인 유사도 (0.0 ~ 1.0)
    pub score: f32,
}

/// 쿼리를 모든 인덱스 문장과 비교
///
/// 인덱스 문장마다 하나씩, 인덱스 순서대로 반환합니다.
/// 어휘와 겹치는 토큰이 없으면 전부 0.0입니다.
pub fn score(query: &str, index: &TfIdfIndex) -> Vec<ScoredMatch> {
    let normalized = normalize(query);
    let query_vector = index.project(&normalized);

    if query_vector.is_zero() {
        tracing::debug!("Query has no terms in vocabulary: {:?}", normalized.trim());
    }

    index
        .vectors()
        .iter()
        .enumerate()
        .map(|(position, vector)| ScoredMatch {
            position,
            // 부동소수점 오차로 1.0을 살짝 넘는 경우 방지
            score: query_vector.dot(vector).clamp(0.0, 1.0),
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
