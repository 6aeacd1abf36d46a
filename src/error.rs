//! 에러 타입
//!
//! 파이프라인 경계에서 사용하는 타입 에러입니다.
//! 소스 로딩/CLI 같은 바깥쪽 배관은 `anyhow::Result`를 그대로 사용하고,
//! 호출자가 구분해야 하는 실패만 여기서 variant로 표현합니다.

use thiserror::Error;

/// 검색 파이프라인 에러
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// 지식베이스 원본을 읽을 수 없음
    #[error("cannot load the knowledge base from {source_name}: {reason}")]
    CorpusUnavailable { source_name: String, reason: String },

    /// 로드는 되었으나 사용 가능한 문장(질문 제외, 비어있지 않음)이 없음
    #[error("knowledge base contains no usable statements")]
    EmptyCorpus,
}

/// 설정 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 값 범위 위반
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// 환경변수 파싱 실패
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },
}

impl RetrievalError {
    /// `anyhow::Error` 체인을 CorpusUnavailable로 변환
    pub fn corpus_unavailable(source_name: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::CorpusUnavailable {
            source_name: source_name.into(),
            // {:#} - 컨텍스트 체인을 한 줄로
            reason: format!("{:#}", err),
        }
    }
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
