//! 配置模块，负责从 JSON 文件加载交互式查询 shell 的配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 在工作目录中查找的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "card_query.json";

/// 覆盖 [`DEFAULT_CONFIG_FILE`] 的环境变量
pub const CONFIG_ENV: &str = "CARD_QUERY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// 行编辑器跨会话保存历史的位置
    pub history_file: Option<PathBuf>,
    pub prompt: String,
    /// 每行输出 token 流
    pub show_tokens: bool,
    /// 每行输出可能的过滤条件范围
    pub show_ranges: bool,
    /// 输出完整查询的持久化形式
    pub show_json: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            prompt: "query> ".to_string(),
            show_tokens: false,
            show_ranges: true,
            show_json: false,
        }
    }
}

impl ReplConfig {
    /// 从 JSON 文件加载配置，缺失的键取默认值
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 设置了 `$CARD_QUERY_CONFIG` 时使用它，否则使用 `card_query.json`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
