//! Poem Skill - Tell Me A Poem 语音助手技能
//!
//! 模块划分：
//! - **config**: 宿主配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **dialog**: 对话模板渲染（locale/<lang>/dialog/*.dialog）
//! - **intent**: 规则意图识别（念诗 / 打招呼 / 机器人定律）
//! - **observability**: tracing 日志初始化
//! - **poems**: 诗集加载与随机选诗
//! - **settings**: 技能 settings.json 键值存储
//! - **skill**: 技能本体与意图处理
//! - **speaker**: 语音输出通道

pub mod config;
pub mod core;
pub mod dialog;
pub mod intent;
pub mod observability;
pub mod poems;
pub mod settings;
pub mod skill;
pub mod speaker;

pub use intent::{Intent, IntentRecognizer, Vocabulary};
pub use poems::{Corpus, CorpusLoader, PoemRecord, PoemSelector};
pub use skill::TellMeAPoemSkill;
