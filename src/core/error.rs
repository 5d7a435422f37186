//! 技能错误类型
//!
//! 所有错误都在技能内部消化：加载失败降级为空诗集 + 错误日志，
//! 空诗集选诗降级为口头提示，不会让宿主进程崩溃。

use std::path::PathBuf;

use thiserror::Error;

use crate::poems::Corpus;

/// 诗集加载错误
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("The file {} does not exist.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Malformed document {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidSchema(String),

    /// 结构错误：已解析出的诗保留在 partial 中（部分成功可接受）
    #[error("Error loading poems: {reason}")]
    Structure { reason: String, partial: Corpus },
}

impl LoadError {
    /// 错误发生前已累积的诗（仅结构错误时非空）
    pub fn into_partial(self) -> Corpus {
        match self {
            LoadError::Structure { partial, .. } => partial,
            _ => Corpus::default(),
        }
    }

    /// 错误类别名，用于日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::FileNotFound(_) => "file_not_found",
            LoadError::MalformedDocument { .. } => "malformed_document",
            LoadError::InvalidSchema(_) => "invalid_schema",
            LoadError::Structure { .. } => "structure",
        }
    }
}

/// 选诗错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("Corpus is empty")]
    EmptyCorpus,
}

/// settings.json 读写错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings root must be a JSON object: {}", .0.display())]
    NotAnObject(PathBuf),
}

/// 对话模板错误
#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Dialog template not found: {0}")]
    NotFound(String),

    #[error("Dialog template has no lines: {0}")]
    Empty(String),

    #[error("Dialog I/O error: {0}")]
    Io(#[from] std::io::Error),
}
