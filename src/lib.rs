//! plant-rag - 문장 단위 TF-IDF 지식 검색
//!
//! 평문 지식베이스(기본: plant.txt)를 문장으로 나누고,
//! 쿼리와 가장 관련 있는 문장을 TF-IDF 코사인 유사도로 찾습니다.
//! 임베딩이나 외부 API 없이 동작하는 단발성, 무상태 조회입니다.

pub mod cli;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod source;

// Re-exports
pub use config::{default_corpus_path, get_data_dir, RetrieverConfig};
pub use error::{ConfigError, RetrievalError, RetrievalResult};
pub use knowledge::{
    answer_from_text, normalize, score, segment, select, Answer, AnswerResult, IndexCache,
    KnowledgeRetriever, NoMatchReason, RankedSentence, ScoredMatch, SelectionConfig, Sentence,
    TfIdfIndex, TokenizerConfig,
};
pub use source::{
    load_corpus, CorpusLocation, CorpusSource, DirectorySource, FileSource, InlineSource,
    LoadedCorpus, UrlSource,
};
