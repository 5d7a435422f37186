//! Tell Me A Poem 技能
//!
//! 技能实例独占设置与诗集：构造时合并默认设置并加载诗集，之后诗集只读；
//! 每个意图事件同步处理完毕，通过 Speaker 输出。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::core::SelectError;
use crate::intent::Intent;
use crate::poems::{Corpus, CorpusLoader, PoemSelector};
use crate::settings::{
    default_settings, SettingsAccessor, SkillSettings, DEFAULT_POETRY_FILENAME, POETRY_FILENAME,
};
use crate::speaker::Speaker;

/// 对话模板名
pub const DIALOG_HELLO_WORLD: &str = "hello_world";
pub const DIALOG_ROBOTICS: &str = "robotics";
pub const DIALOG_NO_POEMS: &str = "no_poems";

/// 技能运行前提：完全离线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeRequirements {
    pub internet_before_load: bool,
    pub network_before_load: bool,
    pub gui_before_load: bool,
    pub requires_internet: bool,
    pub requires_network: bool,
    pub requires_gui: bool,
    pub no_internet_fallback: bool,
    pub no_network_fallback: bool,
    pub no_gui_fallback: bool,
}

/// 念诗技能
#[derive(Debug)]
pub struct TellMeAPoemSkill {
    settings: SkillSettings,
    skill_root: PathBuf,
    corpus: Corpus,
}

impl TellMeAPoemSkill {
    /// 构造技能：合并默认设置，按 PoetryFilename 加载诗集（失败时诗集为空，技能仍可用）
    pub fn new(settings: SkillSettings, skill_root: impl Into<PathBuf>) -> Self {
        let mut skill = Self {
            settings,
            skill_root: skill_root.into(),
            corpus: Corpus::default(),
        };
        skill.initialize();
        skill.corpus = CorpusLoader::load_or_empty(skill.poem_path());
        skill
    }

    pub fn runtime_requirements() -> RuntimeRequirements {
        RuntimeRequirements {
            internet_before_load: false,
            network_before_load: false,
            gui_before_load: false,
            requires_internet: false,
            requires_network: false,
            requires_gui: false,
            no_internet_fallback: true,
            no_network_fallback: true,
            no_gui_fallback: true,
        }
    }

    /// 合并默认设置（只补缺失键），有改动时写回 settings.json
    pub fn initialize(&mut self) {
        if self.settings.merge(&default_settings(), true) {
            if let Err(e) = self.settings.store() {
                tracing::warn!("Failed to persist default settings: {}", e);
            }
        }
    }

    pub fn settings(&self) -> &SkillSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SkillSettings {
        &mut self.settings
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// 当前诗集文件路径：相对路径以技能根目录为基准
    pub fn poem_path(&self) -> PathBuf {
        let value = SettingsAccessor::get(
            &self.settings,
            POETRY_FILENAME,
            Value::from(DEFAULT_POETRY_FILENAME),
        );
        let filename = match value.as_str() {
            Some(s) if !s.trim().is_empty() => s.to_string(),
            _ => {
                tracing::warn!(value = %value, "PoetryFilename is not a path, using default");
                DEFAULT_POETRY_FILENAME.to_string()
            }
        };
        resolve(&self.skill_root, Path::new(&filename))
    }

    /// 重新读取 settings.json 并整体重建诗集，返回诗的数量
    pub fn reload_poems(&mut self) -> usize {
        if let Err(e) = self.settings.reload() {
            tracing::warn!("Failed to reload settings, keeping previous values: {}", e);
        }
        self.settings.merge(&default_settings(), true);
        self.corpus = CorpusLoader::load_or_empty(self.poem_path());
        self.corpus.len()
    }

    /// 分发意图到对应处理函数
    pub fn handle(&self, intent: &Intent, speaker: &mut dyn Speaker) {
        tracing::debug!(intent = intent.name(), "Handling intent");
        match intent {
            Intent::TellMeAPoem => self.handle_tell_me_a_poem(speaker),
            Intent::HelloWorld => self.handle_hello_world(speaker),
            Intent::RoboticsLaws { law } => self.handle_robotics_laws(law.as_deref(), speaker),
        }
    }

    pub fn handle_tell_me_a_poem(&self, speaker: &mut dyn Speaker) {
        let poem = match PoemSelector::select(&self.corpus) {
            Ok(poem) => poem,
            Err(SelectError::EmptyCorpus) => {
                tracing::warn!("No poems loaded, speaking fallback");
                speaker.speak_dialog(DIALOG_NO_POEMS, &HashMap::new());
                return;
            }
        };

        speaker.speak(&format!(
            "Here's one of my favorites from the book {}",
            poem.book_title
        ));
        speaker.speak(&format!("by {}", poem.book_author));
        speaker.speak(&format!("the poem is called {}", poem.poem_title));
        speaker.speak("and it goes like this");
        speaker.speak(&poem.content);
    }

    pub fn handle_hello_world(&self, speaker: &mut dyn Speaker) {
        tracing::info!(intent = "HelloWorldIntent", "Saying hello");
        speaker.speak_dialog(DIALOG_HELLO_WORLD, &HashMap::new());
    }

    pub fn handle_robotics_laws(&self, law: Option<&str>, speaker: &mut dyn Speaker) {
        let mut data = HashMap::new();
        if let Some(law) = law {
            data.insert("law".to_string(), law.to_string());
        }
        speaker.speak_dialog(DIALOG_ROBOTICS, &data);
    }

    /// 没有可停止的播放，返回 false
    pub fn stop(&self) -> bool {
        false
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
