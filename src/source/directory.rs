//! 폴더 코퍼스 소스
//!
//! 폴더를 재귀적으로 수집하여 하나의 코퍼스로 합칩니다.
//! .gitignore 패턴을 존중하고, 지원하는 확장자만 수집합니다.
//! 파일은 경로 순으로 정렬되어 매번 같은 순서로 합쳐집니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ignore::WalkBuilder;

use super::{read_corpus_file, CorpusFileType, CorpusSource};

/// 폴더 수집 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// .gitignore 패턴 존중 여부
    pub respect_gitignore: bool,
    /// 숨김 파일 포함 여부
    pub include_hidden: bool,
    /// 최대 파일 크기 (바이트, 0이면 제한 없음)
    pub max_file_size: u64,
    /// PDF 파일 건너뛰기
    pub skip_pdfs: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 10 * 1024 * 1024, // 10MB
            skip_pdfs: false,
        }
    }
}

/// 폴더 소스
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    config: DirectoryConfig,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, config: DirectoryConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// 수집 대상 파일 목록 (경로 순 정렬)
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            anyhow::bail!("Directory not found: {:?}", self.root);
        }

        if !self.root.is_dir() {
            anyhow::bail!("Not a directory: {:?}", self.root);
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            // git 저장소가 아닌 폴더에서도 .gitignore 적용
            .require_git(!self.config.respect_gitignore)
            .build();

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            if self.should_include(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();

        tracing::info!("Collected {} files from {:?}", files.len(), self.root);
        Ok(files)
    }

    /// 파일이 필터 조건을 만족하는지 확인
    fn should_include(&self, path: &Path) -> bool {
        let file_type = match CorpusFileType::from_path(path) {
            Some(ft) => ft,
            None => return false,
        };

        if self.config.skip_pdfs && file_type == CorpusFileType::Pdf {
            return false;
        }

        if self.config.max_file_size > 0 {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > self.config.max_file_size => {
                    tracing::debug!("Skipping large file: {:?} ({} bytes)", path, meta.len());
                    return false;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to read metadata {:?}: {}", path, e);
                    return false;
                }
            }
        }

        true
    }
}

#[async_trait]
impl CorpusSource for DirectorySource {
    async fn load(&self) -> Result<String> {
        let root = self.clone();
        let files = tokio::task::spawn_blocking(move || root.collect_files())
            .await
            .context("Directory walk task failed")??;

        let mut parts = Vec::with_capacity(files.len());

        for path in &files {
            match read_corpus_file(path).await {
                Ok(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
                Ok(_) => tracing::debug!("Skipping empty file: {:?}", path),
                Err(e) => tracing::warn!("Skipping unreadable file {:?}: {:#}", path, e),
            }
        }

        // 파일 경계도 문장 경계가 되도록 빈 줄로 연결
        Ok(parts.join("\n\n"))
    }

    fn describe(&self) -> String {
        format!("{}/", self.root.display())
    }
}

// ============================================================================
// Tests
// ============================================================================
