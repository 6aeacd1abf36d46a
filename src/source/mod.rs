//! 코퍼스 소스 모듈
//!
//! 지식베이스 원문 텍스트를 제공하는 수집기들입니다.
//! - 파일: 텍스트 직접 읽기, PDF는 pdf-extract
//! - 폴더: .gitignore를 존중하며 재귀 수집
//! - URL: HTTP로 가져와 HTML이면 본문 텍스트 추출
//! - 인라인: 메모리/임베디드 텍스트
//!
//! 매 쿼리마다 새로 로드합니다. 캐시는 `knowledge::IndexCache` 담당.

pub mod directory;
pub mod pdf;
pub mod web;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use directory::{DirectoryConfig, DirectorySource};
pub use web::UrlSource;

// ============================================================================
// CorpusSource Trait
// ============================================================================

/// 코퍼스 소스 트레이트
///
/// 동시 읽기에 안전해야 합니다 (쓰기는 이 시스템 범위 밖).
#[async_trait]
pub trait CorpusSource: Send + Sync {
    /// 원문 텍스트 로드
    async fn load(&self) -> Result<String>;

    /// 소스 설명 (로그/에러 메시지용)
    fn describe(&self) -> String;
}

// ============================================================================
// LoadedCorpus
// ============================================================================

/// 로드된 코퍼스
#[derive(Debug, Clone, Serialize)]
pub struct LoadedCorpus {
    /// 원문 텍스트
    pub text: String,
    /// 소스 설명
    pub source: String,
    /// SHA-256 콘텐츠 해시 (hex)
    pub digest: String,
    /// 로드 시각
    pub loaded_at: DateTime<Utc>,
}

impl LoadedCorpus {
    pub fn new(text: String, source: impl Into<String>) -> Self {
        let digest = content_digest(&text);
        Self {
            text,
            source: source.into(),
            digest,
            loaded_at: Utc::now(),
        }
    }

    /// 바이트 크기
    pub fn size(&self) -> usize {
        self.text.len()
    }
}

/// 소스에서 코퍼스 로드
pub async fn load_corpus(source: &dyn CorpusSource) -> Result<LoadedCorpus> {
    let text = source.load().await?;
    let corpus = LoadedCorpus::new(text, source.describe());

    tracing::info!(
        "Loaded corpus: {} ({} bytes, sha256={})",
        corpus.source,
        corpus.size(),
        &corpus.digest[..12]
    );

    Ok(corpus)
}

/// 텍스트의 SHA-256 hex 해시
pub fn content_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// File Types
// ============================================================================

/// 지원하는 코퍼스 파일 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFileType {
    /// 텍스트 파일 (txt, md 등)
    Text,
    /// PDF 파일
    Pdf,
}

impl CorpusFileType {
    /// 확장자로 파일 타입 결정
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" | "markdown" | "rst" => Some(CorpusFileType::Text),
            "pdf" => Some(CorpusFileType::Pdf),
            _ => None,
        }
    }

    /// 파일 경로에서 타입 결정
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// 파일 하나를 텍스트로 읽기
///
/// PDF는 CPU 바운드이므로 spawn_blocking, 나머지는 텍스트로 읽습니다.
pub(crate) async fn read_corpus_file(path: &Path) -> Result<String> {
    match CorpusFileType::from_path(path) {
        Some(CorpusFileType::Pdf) => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(&path))
                .await
                .context("PDF extraction task failed")?
        }
        _ => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read text file: {:?}", path)),
    }
}

// ============================================================================
// FileSource
// ============================================================================

/// 단일 파일 소스
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSource for FileSource {
    async fn load(&self) -> Result<String> {
        read_corpus_file(&self.path).await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// InlineSource
// ============================================================================

/// 메모리 텍스트 소스 (임베디드 리소스, 테스트)
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    text: String,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl CorpusSource for InlineSource {
    async fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        format!("inline:{}", self.name)
    }
}

// ============================================================================
// Factory
// ============================================================================

/// 코퍼스 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusLocation {
    File(PathBuf),
    Directory(PathBuf, DirectoryConfig),
    Url(String),
}

impl CorpusLocation {
    /// 위치에 맞는 소스 생성
    pub fn into_source(self) -> Result<Box<dyn CorpusSource>> {
        Ok(match self {
            CorpusLocation::File(path) => Box::new(FileSource::new(path)),
            CorpusLocation::Directory(path, config) => Box::new(DirectorySource::new(path, config)),
            CorpusLocation::Url(url) => Box::new(UrlSource::new(&url)?),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
