//! CLI 모듈
//!
//! plant-rag CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::{default_corpus_path, RetrieverConfig};
use crate::knowledge::{AnswerResult, KnowledgeRetriever, TfIdfIndex};
use crate::source::{CorpusLocation, DirectoryConfig};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "plant-rag")]
#[command(version, about = "문장 단위 TF-IDF 지식 검색", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// 코퍼스 위치 (하나만 지정, 없으면 기본 경로)
#[derive(Args, Debug, Default)]
pub struct CorpusArgs {
    /// 코퍼스 파일 (.txt, .md, .pdf)
    #[arg(short, long, conflicts_with_all = ["dir", "url"])]
    pub corpus: Option<PathBuf>,

    /// 코퍼스 폴더 (재귀, .gitignore 존중)
    #[arg(short, long, conflicts_with = "url")]
    pub dir: Option<PathBuf>,

    /// 코퍼스 URL (http/https)
    #[arg(short, long)]
    pub url: Option<String>,

    /// 폴더 수집 시 .gitignore 무시
    #[arg(long, requires = "dir")]
    pub no_gitignore: bool,

    /// 폴더 수집 시 숨김 파일 포함
    #[arg(long, requires = "dir")]
    pub include_hidden: bool,

    /// 폴더 수집 시 PDF 제외
    #[arg(long, requires = "dir")]
    pub skip_pdfs: bool,

    /// 폴더 수집 시 최대 파일 크기 (바이트, 0이면 제한 없음)
    #[arg(long, requires = "dir")]
    pub max_file_size: Option<u64>,
}

impl CorpusArgs {
    /// 코퍼스 위치 결정
    pub fn location(&self) -> CorpusLocation {
        if let Some(ref url) = self.url {
            CorpusLocation::Url(url.clone())
        } else if let Some(ref dir) = self.dir {
            CorpusLocation::Directory(dir.clone(), self.directory_config())
        } else if let Some(ref path) = self.corpus {
            CorpusLocation::File(path.clone())
        } else {
            CorpusLocation::File(default_corpus_path())
        }
    }

    /// 폴더 수집 설정
    pub fn directory_config(&self) -> DirectoryConfig {
        let mut config = DirectoryConfig {
            respect_gitignore: !self.no_gitignore,
            include_hidden: self.include_hidden,
            skip_pdfs: self.skip_pdfs,
            ..Default::default()
        };
        if let Some(size) = self.max_file_size {
            config.max_file_size = size;
        }
        config
    }
}

/// 검색 튜닝 (환경변수보다 우선)
#[derive(Args, Debug, Default)]
pub struct TuningArgs {
    /// 답변에 포함할 최대 문장 수
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// 전체 최고 점수 하한
    #[arg(long)]
    pub global_floor: Option<f32>,

    /// 개별 문장 포함 하한
    #[arg(long)]
    pub item_floor: Option<f32>,

    /// 최소 토큰 길이
    #[arg(long)]
    pub min_token_len: Option<usize>,

    /// 코퍼스가 바뀌지 않았으면 인덱스 재사용
    #[arg(long)]
    pub cache: bool,
}

impl TuningArgs {
    /// 환경변수 설정 위에 플래그 적용
    pub fn apply(&self, mut config: RetrieverConfig) -> RetrieverConfig {
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(floor) = self.global_floor {
            config.global_floor = floor;
        }
        if let Some(floor) = self.item_floor {
            config.item_floor = floor;
        }
        if let Some(len) = self.min_token_len {
            config.min_token_len = len;
        }
        if self.cache {
            config.cache_index = true;
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// 질문 하나에 답변
    Ask {
        /// 질문
        query: String,

        /// JSON 출력
        #[arg(long)]
        json: bool,

        /// 순위와 점수 표시
        #[arg(long)]
        explain: bool,
    },

    /// 대화형 질의 (빈 줄 무시, exit/quit 종료)
    Chat,

    /// 문장 분할 및 인덱스 통계
    Inspect {
        /// 표시할 문장/term 수
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// JSON 출력
        #[arg(long)]
        json: bool,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli
        .tuning
        .apply(RetrieverConfig::from_env().context("환경변수 설정 오류")?);
    let location = cli.corpus.location();

    match cli.command {
        Commands::Ask {
            query,
            json,
            explain,
        } => cmd_ask(location, config, &query, json, explain).await,
        Commands::Chat => cmd_chat(location, config).await,
        Commands::Inspect { limit, json } => cmd_inspect(location, config, limit, json).await,
        Commands::Status => cmd_status(location, config).await,
    }
}

fn build_retriever(location: CorpusLocation, config: RetrieverConfig) -> Result<KnowledgeRetriever> {
    let source = location.into_source().context("코퍼스 소스 생성 실패")?;
    KnowledgeRetriever::new(source, config).context("설정 검증 실패")
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 질문 명령어 (ask)
///
/// 매칭 없음은 정상 종료, 코퍼스 문제는 에러로 종료합니다.
async fn cmd_ask(
    location: CorpusLocation,
    config: RetrieverConfig,
    query: &str,
    json: bool,
    explain: bool,
) -> Result<()> {
    let retriever = build_retriever(location, config)?;
    let result = retriever.answer_query(query).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("JSON 직렬화 실패")?
        );
        if result.is_corpus_error() {
            bail!("지식베이스를 사용할 수 없습니다");
        }
        return Ok(());
    }

    if result.is_corpus_error() {
        bail!("{}", result.user_message());
    }

    if explain {
        print_explain(&result);
    }

    println!("{}", result.user_message());
    Ok(())
}

/// 대화형 명령어 (chat)
///
/// 쿼리 간 상태는 없습니다. 같은 코퍼스의 인덱스만 캐시합니다.
async fn cmd_chat(location: CorpusLocation, mut config: RetrieverConfig) -> Result<()> {
    config.cache_index = true;
    let retriever = build_retriever(location, config)?;

    println!("[*] 지식베이스: {}", retriever.source_description());
    println!("    질문을 입력하세요 (종료: exit)");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("입력 읽기 실패")? else {
            break;
        };

        let query = match parse_chat_line(&line) {
            ChatInput::Skip => continue,
            ChatInput::Exit => break,
            ChatInput::Query(query) => query,
        };

        let result = retriever.answer_query(query).await;
        match &result {
            AnswerResult::Answer(_) => println!("\n{}", result.user_message()),
            _ => println!("\n[!] {}", result.user_message()),
        }
    }

    println!();
    Ok(())
}

/// 대화형 입력 한 줄의 해석
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Skip,
    Exit,
    Query(&'a str),
}

fn parse_chat_line(line: &str) -> ChatInput<'_> {
    let query = line.trim();
    if query.is_empty() {
        ChatInput::Skip
    } else if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
        ChatInput::Exit
    } else {
        ChatInput::Query(query)
    }
}

/// 인덱스 통계 (inspect)
#[derive(Debug, Serialize)]
struct InspectReport {
    source: String,
    digest: String,
    bytes: usize,
    sentences: usize,
    questions: usize,
    indexed: usize,
    vocabulary_size: usize,
    rarest_terms: Vec<(String, f32)>,
    sample: Vec<SentenceRow>,
}

#[derive(Debug, Serialize)]
struct SentenceRow {
    kind: &'static str,
    text: String,
}

/// 검사 명령어 (inspect)
///
/// 문장 분할 결과와 TF-IDF 인덱스 통계를 보여줍니다.
async fn cmd_inspect(
    location: CorpusLocation,
    config: RetrieverConfig,
    limit: usize,
    json: bool,
) -> Result<()> {
    let retriever = build_retriever(location, config)?;
    let corpus = retriever.load().await?;

    let sentences = retriever.segmenter().segment(&corpus.text);
    let index: Option<std::sync::Arc<TfIdfIndex>> = match retriever.build_index(&corpus) {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::debug!("Index build failed: {}", e);
            None
        }
    };

    let report = InspectReport {
        source: corpus.source.clone(),
        digest: corpus.digest.clone(),
        bytes: corpus.size(),
        sentences: sentences.len(),
        questions: sentences.iter().filter(|s| s.is_question).count(),
        indexed: index.as_ref().map(|i| i.len()).unwrap_or(0),
        vocabulary_size: index.as_ref().map(|i| i.vocabulary_size()).unwrap_or(0),
        rarest_terms: index
            .as_ref()
            .map(|i| {
                i.rarest_terms(limit)
                    .into_iter()
                    .map(|(t, idf)| (t.to_string(), idf))
                    .collect()
            })
            .unwrap_or_default(),
        sample: sentences
            .iter()
            .take(limit)
            .map(|s| SentenceRow {
                kind: if s.is_question {
                    "question"
                } else if s.is_statement() {
                    "statement"
                } else {
                    "skipped"
                },
                text: s.original_text.clone(),
            })
            .collect(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("JSON 직렬화 실패")?
        );
        return Ok(());
    }

    println!("[*] 코퍼스: {}", report.source);
    println!(
        "    {} | sha256 {}",
        format_bytes(report.bytes),
        &report.digest[..12]
    );
    println!(
        "[OK] 문장 {} 개 (질문 {}, 인덱싱 {})",
        report.sentences, report.questions, report.indexed
    );

    if index.is_none() {
        println!("[!] 사용 가능한 문장이 없습니다 (질문만 있거나 비어있음)");
    } else {
        println!("[OK] 어휘 {} 개", report.vocabulary_size);
        println!("\n희귀 term (idf 순):");
        for (term, idf) in &report.rarest_terms {
            println!("  {:<20} {:.4}", term, idf);
        }
    }

    println!("\n문장 샘플:");
    for (i, row) in report.sample.iter().enumerate() {
        let mark = match row.kind {
            "question" => "Q",
            "statement" => "S",
            _ => "-",
        };
        println!("  {:>3}. [{}] {}", i + 1, mark, truncate_text(&row.text, 80));
    }

    Ok(())
}

/// 상태 명령어 (status)
///
/// 설정과 코퍼스 상태를 확인합니다.
async fn cmd_status(location: CorpusLocation, config: RetrieverConfig) -> Result<()> {
    println!("plant-rag v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!(
        "[*] 설정: top_n={}, global_floor={:.2}, item_floor={:.2}, min_token_len={}, cache={}",
        config.top_n, config.global_floor, config.item_floor, config.min_token_len, config.cache_index
    );

    let retriever = match build_retriever(location, config) {
        Ok(r) => r,
        Err(e) => {
            println!("[!] {:#}", e);
            return Ok(());
        }
    };

    println!("[*] 코퍼스: {}", retriever.source_description());

    match retriever.load().await {
        Ok(corpus) => {
            println!(
                "[OK] 로드됨: {} | sha256 {}",
                format_bytes(corpus.size()),
                &corpus.digest[..12]
            );
            println!("     로드 시각: {}", corpus.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"));

            match retriever.build_index(&corpus) {
                Ok(index) => println!(
                    "[OK] 인덱스: 문장 {} 개, 어휘 {} 개",
                    index.len(),
                    index.vocabulary_size()
                ),
                Err(e) => println!("[!] 인덱스 생성 실패: {}", e),
            }
        }
        Err(e) => {
            println!("[!] {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 순위/점수 출력 (--explain)
fn print_explain(result: &AnswerResult) {
    match result {
        AnswerResult::Answer(answer) => {
            println!("[OK] 관련 문장 {} 건:", answer.matches.len());
            for (i, m) in answer.matches.iter().enumerate() {
                println!(
                    "  {}. [점수: {:.4}] #{} {}",
                    i + 1,
                    m.score,
                    m.position,
                    truncate_text(&m.text, 60)
                );
            }
            println!();
        }
        AnswerResult::NoMatch { reason } => {
            println!("[!] 매칭 없음: {:?}\n", reason);
        }
        _ => {}
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================
