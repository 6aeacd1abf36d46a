//! Selector - 상위 N개 선택 + 관련도 임계값
//!
//! 1. 전체 최고 점수가 global floor 미만이면 매칭 없음
//! 2. 점수 내림차순(동률은 앞 문장 우선)으로 상위 N개
//! 3. 그 중 item floor 초과인 것만 남김
//! 4. 원문을 빈 줄로 연결

use serde::{Deserialize, Serialize};

use super::answer::{Answer, NoMatchReason, RankedSentence};
use super::scorer::ScoredMatch;

/// 기본 결과 개수
pub const DEFAULT_TOP_N: usize = 3;
/// 전체 최고 점수 하한
pub const DEFAULT_GLOBAL_FLOOR: f32 = 0.15;
/// 개별 결과 포함 하한 (초과해야 포함)
pub const DEFAULT_ITEM_FLOOR: f32 = 0.05;

/// 답변 구분자
pub const ANSWER_SEPARATOR: &str = "\n\n";

/// 선택 설정
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub top_n: usize,
    pub global_floor: f32,
    pub item_floor: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            global_floor: DEFAULT_GLOBAL_FLOOR,
            item_floor: DEFAULT_ITEM_FLOOR,
        }
    }
}

/// 점수 목록에서 답변 선택
///
/// `original_texts`는 `matches`의 position으로 조회됩니다.
pub fn select(
    matches: &[ScoredMatch],
    original_texts: &[String],
    config: &SelectionConfig,
) -> Result<Answer, NoMatchReason> {
    let best = matches.iter().map(|m| m.score).fold(0.0_f32, f32::max);

    if best < config.global_floor {
        tracing::debug!(
            "Best score {:.4} below global floor {:.2}",
            best,
            config.global_floor
        );
        return Err(NoMatchReason::GlobalNoMatch);
    }

    let mut ranked: Vec<ScoredMatch> = matches.to_vec();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.position.cmp(&b.position))
    });
    ranked.truncate(config.top_n);

    let survivors: Vec<RankedSentence> = ranked
        .into_iter()
        .filter(|m| m.score > config.item_floor)
        .filter_map(|m| {
            original_texts.get(m.position).map(|text| RankedSentence {
                position: m.position,
                score: m.score,
                text: text.clone(),
            })
        })
        .collect();

    if survivors.is_empty() {
        tracing::debug!("All top candidates at or below item floor {:.2}", config.item_floor);
        return Err(NoMatchReason::NoIndividualMatch);
    }

    let text = survivors
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(ANSWER_SEPARATOR);

    Ok(Answer {
        text,
        matches: survivors,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Sentence {}.", i)).collect()
    }

    fn matches(scores: &[f32]) -> Vec<ScoredMatch> {
        scores
            .iter()
            .enumerate()
            .map(|(position, &score)| ScoredMatch { position, score })
            .collect()
    }

    #[test]
    fn test_select_orders_by_score() {
        let answer = select(
            &matches(&[0.3, 0.9, 0.6]),
            &texts(3),
            &SelectionConfig::default(),
        )
        .unwrap();

        assert_eq!(answer.text, "Sentence 1.\n\nSentence 2.\n\nSentence 0.");
        let positions: Vec<usize> = answer.matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
    }

    #[test]
    fn test_select_global_floor() {
        let result = select(&matches(&[0.1, 0.14, 0.0]), &texts(3), &SelectionConfig::default());
        assert_eq!(result.unwrap_err(), NoMatchReason::GlobalNoMatch);
    }

    #[test]
    fn test_select_global_floor_is_inclusive() {
        // 최고 점수 == floor 이면 통과
        let result = select(&matches(&[0.15]), &texts(1), &SelectionConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_select_all_zero_is_global_no_match() {
        let result = select(&matches(&[0.0, 0.0]), &texts(2), &SelectionConfig::default());
        assert_eq!(result.unwrap_err(), NoMatchReason::GlobalNoMatch);
    }

    #[test]
    fn test_select_empty_matches() {
        let result = select(&[], &[], &SelectionConfig::default());
        assert_eq!(result.unwrap_err(), NoMatchReason::GlobalNoMatch);
    }

    #[test]
    fn test_select_item_floor_drops_weak_matches() {
        let answer = select(
            &matches(&[0.04, 0.9, 0.02]),
            &texts(3),
            &SelectionConfig::default(),
        )
        .unwrap();

        assert_eq!(answer.text, "Sentence 1.");
        assert_eq!(answer.matches.len(), 1);
    }

    #[test]
    fn test_select_item_floor_is_strict() {
        let answer = select(
            &matches(&[0.9, 0.05]),
            &texts(2),
            &SelectionConfig::default(),
        )
        .unwrap();
        assert_eq!(answer.matches.len(), 1);
    }

    #[test]
    fn test_select_no_individual_match() {
        // global floor는 통과하지만 item floor가 더 높은 설정
        let config = SelectionConfig {
            top_n: 3,
            global_floor: 0.15,
            item_floor: 0.5,
        };
        let result = select(&matches(&[0.2, 0.16, 0.1]), &texts(3), &config);
        assert_eq!(result.unwrap_err(), NoMatchReason::NoIndividualMatch);
    }

    #[test]
    fn test_select_top_n_limit() {
        let config = SelectionConfig {
            top_n: 2,
            ..Default::default()
        };
        let answer = select(&matches(&[0.5, 0.4, 0.9, 0.8]), &texts(4), &config).unwrap();

        let positions: Vec<usize> = answer.matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![2, 3]);
    }

    #[test]
    fn test_select_ties_prefer_earlier_position() {
        let answer = select(
            &matches(&[0.2, 0.7, 0.2, 0.7]),
            &texts(4),
            &SelectionConfig::default(),
        )
        .unwrap();

        let positions: Vec<usize> = answer.matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 3, 0]);
    }

    #[test]
    fn test_select_is_deterministic() {
        let m = matches(&[0.3, 0.3, 0.3, 0.3, 0.9]);
        let first = select(&m, &texts(5), &SelectionConfig::default()).unwrap();
        for _ in 0..5 {
            assert_eq!(select(&m, &texts(5), &SelectionConfig::default()).unwrap(), first);
        }
    }
}
