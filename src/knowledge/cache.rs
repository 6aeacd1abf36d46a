//! 인덱스 캐시 - 코퍼스 해시 기반 read-through 캐시
//!
//! 코퍼스는 매 쿼리마다 다시 로드하지만, SHA-256 해시가 같으면
//! 마지막으로 만든 인덱스를 재사용합니다. 해시가 바뀌면 다시 만듭니다.
//! 기본은 비활성 (매번 재구축).

use std::sync::{Arc, Mutex, MutexGuard};

use super::index::TfIdfIndex;
use super::normalizer::TokenizerConfig;
use super::segmenter::Segmenter;
use crate::error::RetrievalResult;
use crate::source::LoadedCorpus;

#[derive(Debug)]
struct CachedIndex {
    digest: String,
    tokenizer: TokenizerConfig,
    index: Arc<TfIdfIndex>,
}

/// 마지막 인덱스 1개를 보관하는 캐시
#[derive(Debug, Default)]
pub struct IndexCache {
    entry: Mutex<Option<CachedIndex>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 캐시된 인덱스를 돌려주거나 새로 만들어 저장
    ///
    /// 락은 조회/저장 시에만 잡습니다. 동시에 미스가 나면 둘 다 빌드하고
    /// 나중 것이 남습니다 (결과는 동일).
    pub fn get_or_build(
        &self,
        corpus: &LoadedCorpus,
        segmenter: &dyn Segmenter,
        tokenizer: TokenizerConfig,
    ) -> RetrievalResult<Arc<TfIdfIndex>> {
        if let Some(cached) = self.lock().as_ref() {
            if cached.digest == corpus.digest && cached.tokenizer == tokenizer {
                tracing::debug!("Index cache hit (sha256={})", &corpus.digest[..12]);
                return Ok(Arc::clone(&cached.index));
            }
        }

        tracing::debug!("Index cache miss (sha256={})", &corpus.digest[..12]);
        let sentences = segmenter.segment(&corpus.text);
        let index = Arc::new(TfIdfIndex::build(&sentences, tokenizer)?);

        *self.lock() = Some(CachedIndex {
            digest: corpus.digest.clone(),
            tokenizer,
            index: Arc::clone(&index),
        });

        Ok(index)
    }

    /// 캐시된 코퍼스 해시
    pub fn cached_digest(&self) -> Option<String> {
        self.lock().as_ref().map(|c| c.digest.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedIndex>> {
        // 캐시 값은 언제든 다시 만들 수 있으므로 poison은 무시
        self.entry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use crate::knowledge::segmenter::SentenceSegmenter;

    fn corpus(text: &str) -> LoadedCorpus {
        LoadedCorpus::new(text.to_string(), "inline:test")
    }

    #[test]
    fn test_cache_hit_reuses_index() {
        let cache = IndexCache::new();
        let c = corpus("Ferns like shade. Cacti like sun.");

        let first = cache
            .get_or_build(&c, &SentenceSegmenter, TokenizerConfig::default())
            .unwrap();
        let second = cache
            .get_or_build(&c, &SentenceSegmenter, TokenizerConfig::default())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.cached_digest(), Some(c.digest.clone()));
    }

    #[test]
    fn test_cache_invalidated_on_content_change() {
        let cache = IndexCache::new();

        let first = cache
            .get_or_build(&corpus("Ferns like shade."), &SentenceSegmenter, TokenizerConfig::default())
            .unwrap();
        let second = cache
            .get_or_build(
                &corpus("Ferns like shade. Cacti like sun."),
                &SentenceSegmenter,
                TokenizerConfig::default(),
            )
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_cache_keyed_on_tokenizer() {
        let cache = IndexCache::new();
        let c = corpus("Water x a week.");

        let a = cache
            .get_or_build(&c, &SentenceSegmenter, TokenizerConfig::default())
            .unwrap();
        let b = cache
            .get_or_build(&c, &SentenceSegmenter, TokenizerConfig { min_token_len: 2 })
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert!(b.idf("x").is_none());
    }

    #[test]
    fn test_empty_corpus_not_cached() {
        let cache = IndexCache::new();
        let result = cache.get_or_build(
            &corpus("Is this a question?"),
            &SentenceSegmenter,
            TokenizerConfig::default(),
        );

        assert!(matches!(result, Err(RetrievalError::EmptyCorpus)));
        assert_eq!(cache.cached_digest(), None);
    }
}
