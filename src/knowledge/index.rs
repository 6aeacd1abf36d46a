//! Corpus Index - TF-IDF 벡터 공간 모델
//!
//! 질문이 아닌 문장들로 어휘(vocabulary)와 문장별 TF-IDF 벡터를 만듭니다.
//! 모든 문장 벡터는 L2 정규화되어 있어 코사인 유사도 = 내적입니다.
//!
//! IDF (smoothed):
//! idf(t) = ln((1 + N) / (1 + df(t))) + 1
//!
//! ref: https://scikit-learn.org/stable/modules/feature_extraction.html#tfidf-term-weighting

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::normalizer::TokenizerConfig;
use super::segmenter::Sentence;
use crate::error::{RetrievalError, RetrievalResult};

// ============================================================================
// Sparse Vector
// ============================================================================

/// 희소 벡터 (term id 오름차순 정렬된 (term id, weight) 목록)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// term id -> weight 맵에서 생성 (정렬 + L2 정규화)
    pub fn from_weights(weights: HashMap<usize, f32>) -> Self {
        let mut entries: Vec<(usize, f32)> = weights
            .into_iter()
            .filter(|(_, w)| *w != 0.0)
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);

        let mut vector = Self { entries };
        vector.normalize();
        vector
    }

    /// L2 정규화 (영벡터는 그대로)
    fn normalize(&mut self) {
        let norm: f32 = self
            .entries
            .iter()
            .map(|(_, w)| w * w)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            self.entries.iter_mut().for_each(|(_, w)| *w /= norm);
        }
    }

    /// 내적 (정렬된 두 목록의 병합 순회)
    ///
    /// 둘 다 정규화되어 있으면 코사인 유사도와 같습니다.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_id, a_w) = self.entries[i];
            let (b_id, b_w) = other.entries[j];

            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }

        sum
    }

    /// 0이 아닌 항목 수
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// (term id, weight) 목록
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }
}

// ============================================================================
// TfIdfIndex
// ============================================================================

/// TF-IDF 인덱스
///
/// 문장 순서는 문서 순서와 같으며, 위치(position)로 원문을 조회합니다.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    /// term -> term id (알파벳 순서로 부여)
    vocabulary: BTreeMap<String, usize>,
    /// term id -> idf
    idf: Vec<f32>,
    /// 문장별 정규화된 TF-IDF 벡터
    vectors: Vec<SparseVector>,
    /// 문장별 원문
    original_texts: Vec<String>,
    tokenizer: TokenizerConfig,
}

impl TfIdfIndex {
    /// 문장 목록으로 인덱스 생성
    ///
    /// 질문과 정규화 결과가 빈 문장은 제외합니다.
    /// 남는 문장이 없으면 `RetrievalError::EmptyCorpus`.
    pub fn build(sentences: &[Sentence], tokenizer: TokenizerConfig) -> RetrievalResult<Self> {
        let statements: Vec<&Sentence> = sentences.iter().filter(|s| s.is_statement()).collect();

        if statements.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }

        // 1. 문장별 term frequency
        let term_counts: Vec<HashMap<&str, usize>> = statements
            .iter()
            .map(|s| {
                let mut counts = HashMap::new();
                for token in tokenizer.tokenize(&s.normalized_text) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // 2. 어휘 (정렬된 term 집합)
        let terms: BTreeSet<&str> = term_counts
            .iter()
            .flat_map(|counts| counts.keys().copied())
            .collect();

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.to_string(), id))
            .collect();

        // 3. document frequency -> idf
        let mut df = vec![0usize; vocabulary.len()];
        for counts in &term_counts {
            for term in counts.keys() {
                df[vocabulary[*term]] += 1;
            }
        }

        let n = statements.len();
        let idf: Vec<f32> = df.iter().map(|&d| smoothed_idf(n, d)).collect();

        // 4. 문장 벡터
        let vectors: Vec<SparseVector> = term_counts
            .iter()
            .map(|counts| {
                let weights = counts
                    .iter()
                    .map(|(term, &tf)| {
                        let id = vocabulary[*term];
                        (id, tf as f32 * idf[id])
                    })
                    .collect();
                SparseVector::from_weights(weights)
            })
            .collect();

        let original_texts = statements.iter().map(|s| s.original_text.clone()).collect();

        tracing::debug!(
            "Built TF-IDF index: {} statements, {} terms",
            n,
            vocabulary.len()
        );

        Ok(Self {
            vocabulary,
            idf,
            vectors,
            original_texts,
            tokenizer,
        })
    }

    /// 정규화된 쿼리를 인덱스 벡터 공간으로 투영
    ///
    /// 어휘에 없는 토큰은 무시합니다.
    pub fn project(&self, normalized_query: &str) -> SparseVector {
        let mut weights: HashMap<usize, f32> = HashMap::new();

        for token in self.tokenizer.tokenize(normalized_query) {
            if let Some(&id) = self.vocabulary.get(token) {
                *weights.entry(id).or_insert(0.0) += self.idf[id];
            }
        }

        SparseVector::from_weights(weights)
    }

    /// 인덱싱된 문장 수
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// 어휘 크기
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// term의 idf (어휘에 없으면 None)
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary.get(term).map(|&id| self.idf[id])
    }

    /// idf 상위 term 목록 (희귀한 term 우선, 동률은 알파벳 순)
    pub fn rarest_terms(&self, limit: usize) -> Vec<(&str, f32)> {
        let mut terms: Vec<(&str, f32)> = self
            .vocabulary
            .iter()
            .map(|(term, &id)| (term.as_str(), self.idf[id]))
            .collect();

        // vocabulary가 알파벳 순이므로 안정 정렬로 동률 순서 유지
        terms.sort_by(|a, b| b.1.total_cmp(&a.1));
        terms.truncate(limit);
        terms
    }

    /// 위치의 문장 벡터
    pub fn vector(&self, position: usize) -> Option<&SparseVector> {
        self.vectors.get(position)
    }

    /// 전체 문장 벡터 (문서 순서)
    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// 위치의 원문
    pub fn original_text(&self, position: usize) -> Option<&str> {
        self.original_texts.get(position).map(String::as_str)
    }

    /// 전체 원문 (문서 순서)
    pub fn original_texts(&self) -> &[String] {
        &self.original_texts
    }

    pub fn tokenizer(&self) -> TokenizerConfig {
        self.tokenizer
    }
}

/// Smoothed IDF
///
/// 모든 문장에 등장하는 term도 1.0을 받으며, df가 작을수록 커집니다.
pub fn smoothed_idf(n_documents: usize, document_frequency: usize) -> f32 {
    (((1 + n_documents) as f32) / ((1 + document_frequency) as f32)).ln() + 1.0
}

// ============================================================================
// Tests
// ============================================================================
