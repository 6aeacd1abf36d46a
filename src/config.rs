//! 설정 모듈
//!
//! 우선순위: CLI 플래그 > 환경변수 > 기본값
//!
//! | 필드            | 기본값 | 환경변수                  |
//! |-----------------|--------|---------------------------|
//! | `top_n`         | 3      | `PLANT_RAG_TOP_N`         |
//! | `global_floor`  | 0.15   | `PLANT_RAG_GLOBAL_FLOOR`  |
//! | `item_floor`    | 0.05   | `PLANT_RAG_ITEM_FLOOR`    |
//! | `min_token_len` | 1      | `PLANT_RAG_MIN_TOKEN_LEN` |
//! | `cache_index`   | false  | `PLANT_RAG_CACHE_INDEX`   |

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::knowledge::{
    SelectionConfig, TokenizerConfig, DEFAULT_GLOBAL_FLOOR, DEFAULT_ITEM_FLOOR, DEFAULT_TOP_N,
};

/// 기본 코퍼스 파일 이름
pub const DEFAULT_CORPUS_FILE: &str = "plant.txt";

pub const ENV_CORPUS: &str = "PLANT_RAG_CORPUS";
pub const ENV_TOP_N: &str = "PLANT_RAG_TOP_N";
pub const ENV_GLOBAL_FLOOR: &str = "PLANT_RAG_GLOBAL_FLOOR";
pub const ENV_ITEM_FLOOR: &str = "PLANT_RAG_ITEM_FLOOR";
pub const ENV_MIN_TOKEN_LEN: &str = "PLANT_RAG_MIN_TOKEN_LEN";
pub const ENV_CACHE_INDEX: &str = "PLANT_RAG_CACHE_INDEX";

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (<data_local_dir>/plant-rag/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plant-rag")
}

/// 기본 코퍼스 경로
///
/// 1. `PLANT_RAG_CORPUS` 환경변수
/// 2. 현재 디렉토리의 `plant.txt` (존재할 때)
/// 3. 데이터 디렉토리의 `plant.txt`
pub fn default_corpus_path() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_CORPUS) {
        if !path.is_empty() {
            tracing::debug!("Using corpus path from {}", ENV_CORPUS);
            return PathBuf::from(path);
        }
    }

    let local = PathBuf::from(DEFAULT_CORPUS_FILE);
    if local.exists() {
        return local;
    }

    get_data_dir().join(DEFAULT_CORPUS_FILE)
}

// ============================================================================
// RetrieverConfig
// ============================================================================

/// 검색기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// 답변에 포함할 최대 문장 수
    pub top_n: usize,
    /// 전체 최고 점수 하한 (미만이면 매칭 없음)
    pub global_floor: f32,
    /// 개별 문장 포함 하한 (초과해야 포함)
    pub item_floor: f32,
    /// 최소 토큰 길이
    pub min_token_len: usize,
    /// 코퍼스 해시 기반 인덱스 캐시 사용 여부
    pub cache_index: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            global_floor: DEFAULT_GLOBAL_FLOOR,
            item_floor: DEFAULT_ITEM_FLOOR,
            min_token_len: 1,
            cache_index: false,
        }
    }
}

impl RetrieverConfig {
    /// 환경변수를 기본값 위에 적용
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// 임의의 조회 함수로 설정 생성 (빈 값은 미설정으로 취급)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, ENV_TOP_N)? {
            config.top_n = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_GLOBAL_FLOOR)? {
            config.global_floor = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_ITEM_FLOOR)? {
            config.item_floor = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MIN_TOKEN_LEN)? {
            config.min_token_len = v;
        }
        if let Some(raw) = non_empty(&lookup, ENV_CACHE_INDEX) {
            config.cache_index = parse_bool(ENV_CACHE_INDEX, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be >= 1".into()));
        }
        check_floor("global_floor", self.global_floor)?;
        check_floor("item_floor", self.item_floor)?;
        if self.min_token_len == 0 {
            return Err(ConfigError::Invalid("min_token_len must be >= 1".into()));
        }
        Ok(())
    }

    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            top_n: self.top_n,
            global_floor: self.global_floor,
            item_floor: self.item_floor,
        }
    }

    pub fn tokenizer(&self) -> TokenizerConfig {
        TokenizerConfig {
            min_token_len: self.min_token_len,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, var) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw,
        }),
        None => Ok(None),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn check_floor(name: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
