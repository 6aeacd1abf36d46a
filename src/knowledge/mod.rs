//! Knowledge 모듈 - 문장 단위 TF-IDF 검색
//!
//! - Segmenter: 종결 부호 기준 문장 분할
//! - Normalizer: 소문자 + a-z/공백만 남기기
//! - Index: 질문을 제외한 문장의 TF-IDF 벡터 (L2 정규화)
//! - Scorer: 쿼리와 모든 문장의 코사인 유사도
//! - Selector: 상위 N개 + 관련도 임계값
//! - Retriever: 로드부터 답변까지의 파이프라인

mod answer;
mod cache;
mod index;
mod normalizer;
mod retriever;
mod scorer;
mod segmenter;
mod selector;

// Re-exports
pub use answer::{Answer, AnswerResult, NoMatchReason, RankedSentence};
pub use cache::IndexCache;
pub use index::{smoothed_idf, SparseVector, TfIdfIndex};
pub use normalizer::{normalize, TokenizerConfig};
pub use retriever::{answer_from_text, answer_with_index, KnowledgeRetriever};
pub use scorer::{score, ScoredMatch};
pub use segmenter::{segment, Segmenter, Sentence, SentenceSegmenter};
pub use selector::{
    select, SelectionConfig, ANSWER_SEPARATOR, DEFAULT_GLOBAL_FLOOR, DEFAULT_ITEM_FLOOR,
    DEFAULT_TOP_N,
};
