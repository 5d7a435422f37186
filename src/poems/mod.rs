//! 诗集系统
//!
//! 加载器在技能构造时读取一次诗集文档并展平；选诗器在每次「给我念首诗」意图时随机取一首。

mod loader;
mod selector;

pub use loader::{Corpus, CorpusLoader, PoemRecord, UNKNOWN_TITLE};
pub use selector::PoemSelector;
