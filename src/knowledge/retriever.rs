//! 지식 검색기 - 전체 파이프라인
//!
//! 로드 -> 문장 분할 -> 정규화 -> TF-IDF 인덱스 -> 점수 -> 선택
//!
//! 기본 동작은 매 쿼리마다 코퍼스를 다시 읽고 인덱스를 새로 만드는 것입니다.
//! 쿼리 간 공유 상태가 없으므로 동시 호출에 락이 필요 없습니다.
//! `cache_index`를 켜면 `IndexCache`가 같은 코퍼스의 인덱스를 재사용합니다.

use std::sync::Arc;

use super::answer::AnswerResult;
use super::cache::IndexCache;
use super::index::TfIdfIndex;
use super::scorer::score;
use super::segmenter::{Segmenter, SentenceSegmenter};
use super::selector::{select, SelectionConfig};
use crate::config::RetrieverConfig;
use crate::error::{ConfigError, RetrievalError, RetrievalResult};
use crate::source::{load_corpus, CorpusSource, LoadedCorpus};

// ============================================================================
// Pure pipeline
// ============================================================================

/// 코퍼스 텍스트로 바로 답변 (I/O 없음)
pub fn answer_from_text(corpus: &str, query: &str, config: &RetrieverConfig) -> AnswerResult {
    let sentences = SentenceSegmenter.segment(corpus);

    match TfIdfIndex::build(&sentences, config.tokenizer()) {
        Ok(index) => answer_with_index(&index, query, &config.selection()),
        Err(e) => e.into(),
    }
}

/// 이미 만든 인덱스로 답변
pub fn answer_with_index(
    index: &TfIdfIndex,
    query: &str,
    selection: &SelectionConfig,
) -> AnswerResult {
    let matches = score(query, index);
    select(&matches, index.original_texts(), selection).into()
}

// ============================================================================
// KnowledgeRetriever
// ============================================================================

/// 지식 검색기
///
/// 코퍼스 소스 + 설정을 묶어 `answer_query`를 제공합니다.
pub struct KnowledgeRetriever {
    source: Box<dyn CorpusSource>,
    segmenter: Box<dyn Segmenter>,
    config: RetrieverConfig,
    cache: Option<IndexCache>,
}

impl KnowledgeRetriever {
    /// 새 검색기 생성 (설정 검증 포함)
    pub fn new(source: Box<dyn CorpusSource>, config: RetrieverConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cache = config.cache_index.then(IndexCache::new);

        Ok(Self {
            source,
            segmenter: Box::new(SentenceSegmenter),
            config,
            cache,
        })
    }

    /// 쿼리에 답변
    ///
    /// 실패는 모두 `AnswerResult` variant로 표현되며 재시도하지 않습니다.
    pub async fn answer_query(&self, query: &str) -> AnswerResult {
        let corpus = match self.load().await {
            Ok(corpus) => corpus,
            Err(e) => return e.into(),
        };

        let index = match self.build_index(&corpus) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Knowledge base has no usable statements: {}", corpus.source);
                return e.into();
            }
        };

        let result = answer_with_index(&index, query, &self.config.selection());

        match &result {
            AnswerResult::Answer(answer) => {
                tracing::debug!("Answered with {} sentence(s)", answer.matches.len())
            }
            AnswerResult::NoMatch { reason } => tracing::debug!("No match: {:?}", reason),
            _ => {}
        }

        result
    }

    /// 코퍼스 로드
    pub async fn load(&self) -> RetrievalResult<LoadedCorpus> {
        load_corpus(self.source.as_ref()).await.map_err(|e| {
            tracing::error!("Failed to load corpus {}: {:#}", self.source.describe(), e);
            RetrievalError::corpus_unavailable(self.source.describe(), &e)
        })
    }

    /// 로드된 코퍼스로 인덱스 생성 (캐시 사용 시 재사용)
    pub fn build_index(&self, corpus: &LoadedCorpus) -> RetrievalResult<Arc<TfIdfIndex>> {
        match &self.cache {
            Some(cache) => {
                cache.get_or_build(corpus, self.segmenter.as_ref(), self.config.tokenizer())
            }
            None => {
                let sentences = self.segmenter.segment(&corpus.text);
                TfIdfIndex::build(&sentences, self.config.tokenizer()).map(Arc::new)
            }
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    pub fn segmenter(&self) -> &dyn Segmenter {
        self.segmenter.as_ref()
    }

    /// 소스 설명
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// 캐시 사용 여부
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::answer::NoMatchReason;
    use crate::source::{FileSource, InlineSource};

    const PLANTS: &str = "\
How often should I water my aloe vera?
Aloe vera should be watered every three weeks.
Aloe vera needs bright, indirect sunlight.
Ferns prefer high humidity and shade! Mist ferns daily.
Snake plants tolerate low light and irregular watering.
What is the best soil for cacti?
Cacti need sandy, well-draining soil.";

    fn retriever(text: &str, config: RetrieverConfig) -> KnowledgeRetriever {
        KnowledgeRetriever::new(Box::new(InlineSource::new("plants", text)), config).unwrap()
    }

    #[test]
    fn test_answer_from_text_relevant() {
        let result = answer_from_text(PLANTS, "How much humidity do ferns want?", &RetrieverConfig::default());

        match result {
            AnswerResult::Answer(answer) => {
                assert_eq!(answer.matches[0].text, "Ferns prefer high humidity and shade!");
                assert!(answer.text.starts_with("Ferns prefer high humidity and shade!"));
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_never_contains_questions() {
        let result = answer_from_text(
            PLANTS,
            "How often should I water my aloe vera?",
            &RetrieverConfig::default(),
        );

        match result {
            AnswerResult::Answer(answer) => {
                assert!(answer.matches.iter().all(|m| !m.text.ends_with('?')));
                assert_eq!(answer.matches[0].text, "Aloe vera should be watered every three weeks.");
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_joined_with_blank_line() {
        let result = answer_from_text(PLANTS, "aloe vera", &RetrieverConfig::default());

        match result {
            AnswerResult::Answer(answer) => {
                assert_eq!(answer.matches.len(), 2);
                let parts: Vec<&str> = answer.text.split("\n\n").collect();
                assert_eq!(parts.len(), 2);
                assert!(parts.iter().all(|p| p.starts_with("Aloe vera")));
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_overlap_is_global_no_match() {
        let result = answer_from_text(PLANTS, "quantum chromodynamics", &RetrieverConfig::default());
        assert_eq!(
            result,
            AnswerResult::NoMatch {
                reason: NoMatchReason::GlobalNoMatch
            }
        );
    }

    #[test]
    fn test_empty_query_is_no_match() {
        let result = answer_from_text(PLANTS, "", &RetrieverConfig::default());
        assert_eq!(
            result,
            AnswerResult::NoMatch {
                reason: NoMatchReason::GlobalNoMatch
            }
        );
    }

    #[test]
    fn test_only_questions_is_empty_corpus() {
        let result = answer_from_text("Why? How? When is spring?", "spring", &RetrieverConfig::default());
        assert_eq!(result, AnswerResult::EmptyCorpus);
    }

    #[test]
    fn test_answer_is_deterministic() {
        let config = RetrieverConfig::default();
        let first = answer_from_text(PLANTS, "light for snake plants", &config);
        for _ in 0..10 {
            assert_eq!(answer_from_text(PLANTS, "light for snake plants", &config), first);
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RetrieverConfig {
            top_n: 0,
            ..Default::default()
        };
        let result = KnowledgeRetriever::new(Box::new(InlineSource::new("x", PLANTS)), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_answer_query_inline() {
        let r = retriever(PLANTS, RetrieverConfig::default());
        let result = r.answer_query("sandy soil for cacti").await;

        match result {
            AnswerResult::Answer(answer) => {
                assert_eq!(answer.text, "Cacti need sandy, well-draining soil.");
            }
            other => panic!("expected answer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_answer_query_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("plant.txt"));
        let r = KnowledgeRetriever::new(Box::new(source), RetrieverConfig::default()).unwrap();

        let result = r.answer_query("aloe").await;
        match &result {
            AnswerResult::CorpusUnavailable { source, reason } => {
                assert!(source.ends_with("plant.txt"));
                assert!(!reason.is_empty());
            }
            other => panic!("expected CorpusUnavailable, got {:?}", other),
        }
        assert!(result.is_corpus_error());
    }

    #[tokio::test]
    async fn test_answer_query_reloads_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant.txt");
        std::fs::write(&path, "Ferns like shade.").unwrap();

        for cache_index in [false, true] {
            std::fs::write(&path, "Ferns like shade.").unwrap();
            let config = RetrieverConfig {
                cache_index,
                ..Default::default()
            };
            let r = KnowledgeRetriever::new(Box::new(FileSource::new(&path)), config).unwrap();
            assert!(!r.answer_query("cacti").await.is_answer());

            std::fs::write(&path, "Ferns like shade. Cacti like sun.").unwrap();
            assert!(r.answer_query("cacti").await.is_answer());
        }
    }

    #[tokio::test]
    async fn test_cached_and_uncached_agree() {
        let plain = retriever(PLANTS, RetrieverConfig::default());
        let cached = retriever(
            PLANTS,
            RetrieverConfig {
                cache_index: true,
                ..Default::default()
            },
        );
        assert!(cached.is_cached());

        for query in ["aloe vera", "ferns", "soil", "nothing relevant here"] {
            assert_eq!(plain.answer_query(query).await, cached.answer_query(query).await);
        }
    }
}
