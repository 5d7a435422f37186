//! 技能设置：settings.json 键值存储
//!
//! 宿主为每个技能维护一个 settings.json；首次运行时把 DEFAULT_SETTINGS 中缺失的键合并进去（new_only）。
//! 设置可能在两次调用之间被外部修改，需要最新值时显式调用 `reload`。

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::core::SettingsError;

/// 诗集文件路径的设置键
pub const POETRY_FILENAME: &str = "PoetryFilename";

/// 默认诗集：技能目录下自带的示例诗集
pub const DEFAULT_POETRY_FILENAME: &str = "data/poems/sample_poems.json";

/// 技能默认设置
pub fn default_settings() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        POETRY_FILENAME.to_string(),
        Value::from(DEFAULT_POETRY_FILENAME),
    );
    map
}

/// 显式的设置读取接口：`get(key, default)`，每次调用都是一个读取点
pub trait SettingsAccessor {
    fn get(&self, key: &str, default: Value) -> Value;
}

/// settings.json 键值存储
#[derive(Debug, Clone, Default)]
pub struct SkillSettings {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl SkillSettings {
    /// 纯内存设置（不落盘）
    pub fn in_memory(values: Map<String, Value>) -> Self {
        Self { path: None, values }
    }

    /// 从 settings.json 加载；文件不存在时为空设置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = read_values(&path)?;
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.values.get(key).cloned().unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// 合并默认值；new_only 时只补充缺失的键。返回是否有改动
    pub fn merge(&mut self, defaults: &Map<String, Value>, new_only: bool) -> bool {
        let mut changed = false;
        for (key, value) in defaults {
            if new_only && self.values.contains_key(key) {
                continue;
            }
            if self.values.get(key) != Some(value) {
                self.values.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// 写回 settings.json（内存设置时为空操作）
    pub fn store(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: path.clone(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(&self.values).map_err(|source| {
            SettingsError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })
    }

    /// 从磁盘重新读取（内存设置时为空操作）
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(path) = &self.path {
            self.values = read_values(path)?;
        }
        Ok(())
    }
}

impl SettingsAccessor for SkillSettings {
    fn get(&self, key: &str, default: Value) -> Value {
        self.get_or(key, default)
    }
}

fn read_values(path: &Path) -> Result<Map<String, Value>, SettingsError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(SettingsError::NotAnObject(path.to_path_buf())),
        Err(source) => Err(SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        }),
    }
}
