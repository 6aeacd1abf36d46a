//! 답변 결과 타입
//!
//! 호출자는 variant로 결과를 구분합니다. 메시지 문자열 비교는 하지 않습니다.

use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// 답변에 포함된 문장
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSentence {
    /// 인덱스 내 문장 위치
    pub position: usize,
    /// 코사인 유사도
    pub score: f32,
    /// 원문
    pub text: String,
}

/// 선택된 답변
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// 최종 답변 (문장들을 빈 줄로 연결, 점수 순)
    pub text: String,
    /// 점수 순 문장 목록
    pub matches: Vec<RankedSentence>,
}

/// 매칭 실패 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// 전체 최고 점수가 global floor 미만
    GlobalNoMatch,
    /// 후보는 있었으나 모두 item floor 이하
    NoIndividualMatch,
}

impl NoMatchReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            NoMatchReason::GlobalNoMatch => {
                "I'm sorry, I couldn't find any relevant information for that specific query in my knowledge base."
            }
            NoMatchReason::NoIndividualMatch => {
                "I couldn't find a sufficiently relevant answer in the data."
            }
        }
    }
}

/// 쿼리 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerResult {
    /// 관련 문장 발견
    Answer(Answer),
    /// 관련 문장 없음 (에러가 아닌 정상 종료)
    NoMatch { reason: NoMatchReason },
    /// 지식베이스 로드 실패
    CorpusUnavailable { source: String, reason: String },
    /// 사용 가능한 문장이 없는 지식베이스
    EmptyCorpus,
}

impl AnswerResult {
    /// 사용자에게 보여줄 메시지
    pub fn user_message(&self) -> String {
        match self {
            AnswerResult::Answer(answer) => answer.text.clone(),
            AnswerResult::NoMatch { reason } => reason.user_message().to_string(),
            AnswerResult::CorpusUnavailable { source, reason } => {
                format!("Error: cannot load the knowledge base from {}: {}", source, reason)
            }
            AnswerResult::EmptyCorpus => {
                "The knowledge base is empty or only contains questions. I cannot answer."
                    .to_string()
            }
        }
    }

    /// 답변이 있는지
    pub fn is_answer(&self) -> bool {
        matches!(self, AnswerResult::Answer(_))
    }

    /// 지식베이스 자체의 문제인지 (CLI 종료 코드 결정용)
    pub fn is_corpus_error(&self) -> bool {
        matches!(
            self,
            AnswerResult::CorpusUnavailable { .. } | AnswerResult::EmptyCorpus
        )
    }
}

impl From<Result<Answer, NoMatchReason>> for AnswerResult {
    fn from(selection: Result<Answer, NoMatchReason>) -> Self {
        match selection {
            Ok(answer) => AnswerResult::Answer(answer),
            Err(reason) => AnswerResult::NoMatch { reason },
        }
    }
}

impl From<RetrievalError> for AnswerResult {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::CorpusUnavailable {
                source_name,
                reason,
            } => AnswerResult::CorpusUnavailable {
                source: source_name,
                reason,
            },
            RetrievalError::EmptyCorpus => AnswerResult::EmptyCorpus,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
