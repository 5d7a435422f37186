//! 宿主配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `POEM_SKILL__*` 覆盖（双下划线表示嵌套，如 `POEM_SKILL__SKILL__LANG=en-us`）。

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// 配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub skill: SkillSection,
}

/// [skill] 段：技能目录、settings.json 位置、语言
#[derive(Debug, Clone, Deserialize)]
pub struct SkillSection {
    /// 技能根目录：相对的诗集路径与 locale 目录都以此为基准
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// settings.json 路径，未设置时为 <root>/settings.json
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
    /// locale 目录，未设置时为 <root>/locale
    #[serde(default)]
    pub locale_dir: Option<PathBuf>,
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_lang() -> String {
    "en-us".to_string()
}

impl Default for SkillSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            settings_path: None,
            locale_dir: None,
            lang: default_lang(),
        }
    }
}

impl SkillSection {
    pub fn settings_path(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| self.root.join("settings.json"))
    }

    /// 当前语言的 locale 目录，如 ./locale/en-us
    pub fn lang_dir(&self) -> PathBuf {
        self.locale_dir
            .clone()
            .unwrap_or_else(|| self.root.join("locale"))
            .join(&self.lang)
    }
}

/// 加载配置，环境变量 POEM_SKILL__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 POEM_SKILL__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        let path = format!("{}.toml", name);
        if Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("POEM_SKILL")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
